use rand::rngs::StdRng;

use super::{PipelineError, PipelineStage, StageData};
use crate::{models::Message, registry::Registry};

/// Copies each message's outlierness into its selection score and orders
/// the list by descending score.
///
/// The sort must be stable: ties keep their relative input order, which the
/// planner's nucleus selection depends on for reproducibility.
#[derive(Debug, Default, Clone)]
pub struct ImportanceAllocator;

impl ImportanceAllocator {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

/// Pure scoring function, exposed for library use.
#[must_use]
pub fn allocate_importance(mut messages: Vec<Message>) -> Vec<Message> {
    for message in &mut messages {
        message.score = message.main_fact.outlierness;
    }
    messages.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    messages
}

impl PipelineStage for ImportanceAllocator {
    fn name(&self) -> &'static str {
        "importance-allocator"
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
        Ok(StageData::Messages(allocate_importance(messages)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Fact;

    fn message(value_type: &str, outlierness: f64) -> Message {
        Message::new(Fact::new(value_type, value_type, outlierness))
    }

    #[test]
    fn scores_come_from_outlierness() {
        let scored = allocate_importance(vec![message("a", 3.0), message("b", 7.0)]);
        assert!(scored.iter().all(|m| m.score == m.main_fact.outlierness));
    }

    #[test]
    fn sorted_descending_with_stable_ties() {
        let scored = allocate_importance(vec![
            message("low", 1.0),
            message("tie-first", 5.0),
            message("tie-second", 5.0),
            message("high", 9.0),
        ]);

        let order: Vec<_> = scored
            .iter()
            .map(|m| m.main_fact.value_type.as_str())
            .collect();
        assert_eq!(order, vec!["high", "tie-first", "tie-second", "low"]);
    }
}
