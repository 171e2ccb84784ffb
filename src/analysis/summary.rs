use anyhow::Result;

use super::AnalysisRun;
use crate::models::{Fact, Message};

const SUMMARY_OUTLIERNESS: f64 = 8.10;

/// The batch-level extractive summary as a single message.
pub fn generate_messages(_language: &str, run: &AnalysisRun) -> Result<Vec<Message>> {
    let Some(output) = &run.summary else {
        return Ok(vec![]);
    };
    let text = output.sentences.join(" ");
    if text.trim().is_empty() {
        return Ok(vec![]);
    }
    Ok(vec![Message::new(Fact::new(
        text,
        "summary",
        SUMMARY_OUTLIERNESS,
    ))])
}
