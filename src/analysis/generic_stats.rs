use anyhow::Result;

use super::AnalysisRun;
use crate::models::{Fact, Message, Value};

const COUNT_OUTLIERNESS: f64 = 10.10;
const DISCLAIMER_OUTLIERNESS: f64 = 10.09;

/// Batch-level statistics: the comment count and the machine-generation
/// disclaimer. Always produces both messages.
pub fn generate_messages(_language: &str, run: &AnalysisRun) -> Result<Vec<Message>> {
    #[allow(clippy::cast_possible_wrap)]
    let count = run.comments.len() as i64;
    Ok(vec![
        Message::new(Fact::new(count, "stats:count", COUNT_OUTLIERNESS)),
        Message::new(Fact::new(
            Value::Null,
            "stats:disclaimer",
            DISCLAIMER_OUTLIERNESS,
        )),
    ])
}
