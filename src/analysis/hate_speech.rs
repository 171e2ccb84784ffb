use anyhow::{Result, bail};

use super::AnalysisRun;
use crate::models::{Fact, Message};

const NON_BLOCKED_LABEL: &str = "Non-Blocked";

const BLOCKED_ABS_OUTLIERNESS: f64 = 9.10;
const BLOCKED_REL_OUTLIERNESS: f64 = 9.09;
const BLOCKED_EXAMPLE_OUTLIERNESS: f64 = 9.08;

/// Hate-speech statistics: absolute and relative blocked counts plus the
/// highest-confidence blocked comment as an example. A blocked count of
/// zero still yields the absolute message, but with zero interest so the
/// planner never selects it.
pub fn generate_messages(_language: &str, run: &AnalysisRun) -> Result<Vec<Message>> {
    let Some(output) = &run.hate_speech else {
        return Ok(vec![]);
    };
    if output.labels.len() != run.comments.len() {
        bail!(
            "hate-speech labels do not align with comments: {} != {}",
            output.labels.len(),
            run.comments.len()
        );
    }
    if output.confidences.len() != output.labels.len() {
        bail!(
            "hate-speech confidences do not align with labels: {} != {}",
            output.confidences.len(),
            output.labels.len()
        );
    }

    let blocked: Vec<usize> = output
        .labels
        .iter()
        .enumerate()
        .filter(|(_, label)| label.as_str() != NON_BLOCKED_LABEL)
        .map(|(idx, _)| idx)
        .collect();

    #[allow(clippy::cast_possible_wrap)]
    let abs_count = blocked.len() as i64;
    let abs_outlierness = if blocked.is_empty() {
        0.0
    } else {
        BLOCKED_ABS_OUTLIERNESS
    };
    let mut messages = vec![Message::new(Fact::new(
        abs_count,
        "hate_speech:blocked:abs",
        abs_outlierness,
    ))];

    if !blocked.is_empty() {
        #[allow(clippy::cast_precision_loss)]
        let rel = blocked.len() as f64 / output.labels.len() as f64 * 100.0;
        messages.push(Message::new(Fact::new(
            rel,
            "hate_speech:blocked:rel",
            BLOCKED_REL_OUTLIERNESS,
        )));

        let example = blocked.iter().copied().max_by(|a, b| {
            output.confidences[*a]
                .partial_cmp(&output.confidences[*b])
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        if let Some(idx) = example {
            messages.push(Message::new(Fact::new(
                run.comments[idx].as_str(),
                "hate_speech:blocked:example",
                BLOCKED_EXAMPLE_OUTLIERNESS,
            )));
        }
    }

    Ok(messages)
}
