use anyhow::{Result, bail};

use super::AnalysisRun;
use crate::models::{Fact, Message};

const POSITIVE_CUTOFF: f64 = 0.5;

const MEAN_OUTLIERNESS: f64 = 7.10;
const PERC_POSITIVE_OUTLIERNESS: f64 = 7.09;
const MOST_POSITIVE_OUTLIERNESS: f64 = 7.08;

/// Sentiment statistics: the batch mean, the share of positive comments
/// (sentiment >= 0.5) when any exist, and the most positive comment.
pub fn generate_messages(_language: &str, run: &AnalysisRun) -> Result<Vec<Message>> {
    let Some(output) = &run.sentiment else {
        return Ok(vec![]);
    };
    if output.sentiments.len() != run.comments.len() {
        bail!(
            "sentiment scores do not align with comments: {} != {}",
            output.sentiments.len(),
            run.comments.len()
        );
    }
    if output.sentiments.is_empty() {
        return Ok(vec![]);
    }

    #[allow(clippy::cast_precision_loss)]
    let mean = output.sentiments.iter().sum::<f64>() / output.sentiments.len() as f64;
    let mut messages = vec![Message::new(Fact::new(
        mean,
        "sentiment:mean",
        MEAN_OUTLIERNESS,
    ))];

    let n_positive = output
        .sentiments
        .iter()
        .filter(|s| **s >= POSITIVE_CUTOFF)
        .count();
    if n_positive > 0 {
        #[allow(clippy::cast_precision_loss)]
        let perc = n_positive as f64 / output.sentiments.len() as f64 * 100.0;
        messages.push(Message::new(Fact::new(
            perc,
            "sentiment:perc_positive",
            PERC_POSITIVE_OUTLIERNESS,
        )));
    }

    let most_positive = output
        .sentiments
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    if let Some((idx, _)) = most_positive {
        messages.push(Message::new(Fact::new(
            run.comments[idx].as_str(),
            "sentiment:most_positive",
            MOST_POSITIVE_OUTLIERNESS,
        )));
    }

    Ok(messages)
}
