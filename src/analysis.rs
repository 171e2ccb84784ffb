use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::models::Message;

pub mod generic_stats;
pub mod hate_speech;
pub mod sentiment;
pub mod summary;
pub mod topics;

/// A comment batch plus the raw outputs of the external analysis producers,
/// keyed by topic. A missing topic output means that analysis found nothing
/// to say; the corresponding parser produces no messages rather than
/// failing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisRun {
    pub comments: Vec<String>,
    #[serde(default)]
    pub sentiment: Option<SentimentOutput>,
    #[serde(default)]
    pub hate_speech: Option<HateSpeechOutput>,
    #[serde(default)]
    pub topics: Option<TopicModelOutput>,
    #[serde(default)]
    pub summary: Option<SummaryOutput>,
}

/// Per-comment sentiment scores in `[0, 1]`, aligned with the comment batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentOutput {
    pub sentiments: Vec<f64>,
}

/// Per-comment hate-speech labels and model confidences, aligned with the
/// comment batch. Anything other than `Non-Blocked` counts as blocked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HateSpeechOutput {
    pub labels: Vec<String>,
    pub confidences: Vec<f64>,
}

/// Ranked topic labels per comment, most relevant first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicModelOutput {
    pub labels: Vec<Vec<String>>,
}

/// Extractive summary sentences for the whole batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryOutput {
    pub sentences: Vec<String>,
}

/// A registered message parser: maps (output language, analysis run) to zero
/// or more messages, or fails — which aborts the whole generation request.
pub type MessageParser = Arc<dyn Fn(&str, &AnalysisRun) -> anyhow::Result<Vec<Message>> + Send + Sync>;

/// The full parser set, one per analysis topic, in registration order.
#[must_use]
pub fn default_parsers() -> Vec<MessageParser> {
    vec![
        Arc::new(generic_stats::generate_messages),
        Arc::new(hate_speech::generate_messages),
        Arc::new(summary::generate_messages),
        Arc::new(sentiment::generate_messages),
        Arc::new(topics::generate_messages),
    ]
}
