use std::collections::HashSet;

use rand::rngs::StdRng;
use tracing::{debug, error};

use super::{PipelineError, PipelineStage, StageData};
use crate::{
    analysis::MessageParser,
    models::{Fact, Message},
    registry::Registry,
};

/// Registry key under which the service stores the parser list.
pub const MESSAGE_PARSERS_KEY: &str = "message-parsers";

/// Runs every registered parser over the analysis run and deduplicates the
/// result by main-fact identity.
///
/// A parser failure is fatal for the whole request: one broken analysis
/// topic invalidates the report instead of silently omitting it.
#[derive(Debug, Default, Clone)]
pub struct MessageGenerator;

impl MessageGenerator {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl PipelineStage for MessageGenerator {
    fn name(&self) -> &'static str {
        "message-generator"
    }

    fn run(
        &self,
        registry: &Registry,
        _rng: &mut StdRng,
        language: &str,
        input: StageData,
    ) -> Result<StageData, PipelineError> {
        let StageData::Analysis(run) = input else {
            return Err(PipelineError::StageInput {
                stage: self.name(),
                expected: "analysis",
                actual: input.kind(),
            });
        };

        let parsers = registry.get::<Vec<MessageParser>>(MESSAGE_PARSERS_KEY)?;

        let mut messages: Vec<Message> = Vec::new();
        for (idx, parser) in parsers.iter().enumerate() {
            match parser.as_ref()(language, &run) {
                Ok(new_messages) => {
                    debug!(parser = idx, count = new_messages.len(), "parser produced messages");
                    messages.extend(new_messages);
                }
                Err(err) => {
                    error!(parser = idx, error = %err, "message parser crashed");
                    return Err(PipelineError::Parser(err));
                }
            }
        }

        let messages = dedup_by_fact(messages);
        if messages.is_empty() {
            error!("no parser produced any message");
            return Err(PipelineError::NoMessagesAvailable);
        }

        Ok(StageData::Messages(messages))
    }
}

/// Drops messages whose main fact duplicates an earlier one, keeping the
/// order of first occurrence. Fact equality covers `(value, value_type)`.
fn dedup_by_fact(messages: Vec<Message>) -> Vec<Message> {
    let mut seen: HashSet<Fact> = HashSet::with_capacity(messages.len());
    messages
        .into_iter()
        .filter(|message| seen.insert(message.main_fact.clone()))
        .collect()
}
