use rand::rngs::StdRng;
use tracing::debug;

use super::{PipelineError, PipelineStage, StageData};
use crate::{
    models::{Document, Message, Paragraph},
    registry::Registry,
};

pub const MAX_PARAGRAPHS: usize = 5;
pub const NEW_PARAGRAPH_ABSOLUTE_THRESHOLD: f64 = 0.5;

/// Loop and stopping policy of a [`DocumentPlanner`]. Headline and body
/// planning share nucleus selection and differ only here.
#[derive(Debug, Clone)]
pub enum PlannerMode {
    /// A single nucleus selection; the document is one satellite-free
    /// paragraph.
    Headline,
    /// The paragraph loop: up to `max_paragraphs` nuclei, each gated by the
    /// interestingness thresholds, each elaborated by same-category
    /// satellites. `max_satellites` caps satellites per nucleus when set;
    /// the default planner leaves it unbounded.
    Body {
        max_paragraphs: usize,
        absolute_threshold: f64,
        max_satellites: Option<usize>,
    },
}

/// Builds an ordered document outline from scored messages.
#[derive(Debug, Clone)]
pub struct DocumentPlanner {
    mode: PlannerMode,
}

impl DocumentPlanner {
    #[must_use]
    pub fn new(mode: PlannerMode) -> Self {
        Self { mode }
    }

    #[must_use]
    pub fn headline() -> Self {
        Self::new(PlannerMode::Headline)
    }

    #[must_use]
    pub fn body() -> Self {
        Self::new(PlannerMode::Body {
            max_paragraphs: MAX_PARAGRAPHS,
            absolute_threshold: NEW_PARAGRAPH_ABSOLUTE_THRESHOLD,
            max_satellites: None,
        })
    }

    /// Plans a document from the scored message pool.
    ///
    /// # Errors
    /// [`PipelineError::NoInterestingMessages`] when not a single paragraph
    /// could be seeded — messages existed but none was interesting enough,
    /// or the pool was empty.
    pub fn plan(&self, messages: Vec<Message>) -> Result<Document, PipelineError> {
        match &self.mode {
            PlannerMode::Headline => plan_headline(messages),
            PlannerMode::Body {
                max_paragraphs,
                absolute_threshold,
                max_satellites,
            } => plan_body(messages, *max_paragraphs, *absolute_threshold, *max_satellites),
        }
    }
}

impl PipelineStage for DocumentPlanner {
    fn name(&self) -> &'static str {
        match self.mode {
            PlannerMode::Headline => "headline-document-planner",
            PlannerMode::Body { .. } => "body-document-planner",
        }
    }

    fn run(
        &self,
        _registry: &Registry,
        _rng: &mut StdRng,
        _language: &str,
        input: StageData,
    ) -> Result<StageData, PipelineError> {
        let StageData::Messages(messages) = input else {
            return Err(PipelineError::StageInput {
                stage: self.name(),
                expected: "messages",
                actual: input.kind(),
            });
        };
        Ok(StageData::Document(self.plan(messages)?))
    }
}

fn plan_headline(mut available: Vec<Message>) -> Result<Document, PipelineError> {
    let Some(nucleus) = select_next_nucleus(&mut available) else {
        return Err(PipelineError::NoInterestingMessages);
    };
    Ok(Document::new(vec![Paragraph::new(nucleus, vec![])]))
}

fn plan_body(
    messages: Vec<Message>,
    max_paragraphs: usize,
    absolute_threshold: f64,
    max_satellites: Option<usize>,
) -> Result<Document, PipelineError> {
    let mut available = messages;
    let mut paragraphs: Vec<Paragraph> = Vec::new();
    let mut selected_nuclei: Vec<Message> = Vec::new();

    while paragraphs.len() < max_paragraphs {
        sort_by_score(&mut available);
        let Some(candidate) = available.first() else {
            break;
        };

        // The default relative threshold is -inf, leaving the absolute
        // threshold as the sole gate.
        let threshold = absolute_threshold.max(relative_threshold(&selected_nuclei));
        if candidate.score < threshold {
            debug!(
                score = candidate.score,
                threshold, "next nucleus below threshold, ending document"
            );
            break;
        }

        let nucleus = available.remove(0);
        debug!(nucleus = %nucleus, score = nucleus.score, "starting a new paragraph");
        let satellites = select_satellites(&nucleus, &mut available, max_satellites);
        selected_nuclei.push(nucleus.clone());
        paragraphs.push(Paragraph::new(nucleus, satellites));
    }

    if paragraphs.is_empty() {
        return Err(PipelineError::NoInterestingMessages);
    }
    Ok(Document::new(paragraphs))
}

/// Highest-scored available message, ties broken by list order. Removes the
/// selected message from the pool.
fn select_next_nucleus(available: &mut Vec<Message>) -> Option<Message> {
    sort_by_score(available);
    if available.is_empty() {
        return None;
    }
    Some(available.remove(0))
}

/// Interestingness floor derived from the nuclei chosen so far. The default
/// policy imposes none.
fn relative_threshold(_selected_nuclei: &[Message]) -> f64 {
    f64::NEG_INFINITY
}

/// Greedily drains from the pool every positive-score message sharing the
/// nucleus's topical category, most important first, up to `cap` when set.
fn select_satellites(
    nucleus: &Message,
    available: &mut Vec<Message>,
    cap: Option<usize>,
) -> Vec<Message> {
    let category = nucleus.main_fact.category().to_string();
    let mut satellites: Vec<Message> = Vec::new();

    loop {
        if cap.is_some_and(|cap| satellites.len() >= cap) {
            break;
        }
        let best = available
            .iter()
            .enumerate()
            .filter(|(_, m)| m.score > 0.0 && m.main_fact.category() == category)
            .max_by(|(a_idx, a), (b_idx, b)| {
                a.score
                    .partial_cmp(&b.score)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(b_idx.cmp(a_idx))
            })
            .map(|(idx, _)| idx);
        let Some(idx) = best else {
            break;
        };
        let satellite = available.remove(idx);
        debug!(satellite = %satellite, score = satellite.score, "added satellite");
        satellites.push(satellite);
    }

    satellites
}

/// Stable descending sort by score; ties keep their relative order.
fn sort_by_score(messages: &mut [Message]) {
    messages.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}
