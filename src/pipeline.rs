use rand::rngs::StdRng;
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    analysis::AnalysisRun,
    models::{Document, Message},
    registry::Registry,
};

pub mod generate;
pub mod importance;
pub mod plan;

/// Payload handed from one pipeline stage to the next. Each stage declares
/// which variant it consumes; receiving any other variant is a wiring bug
/// surfaced as [`PipelineError::StageInput`].
#[derive(Debug, Clone)]
pub enum StageData {
    Analysis(AnalysisRun),
    Messages(Vec<Message>),
    Document(Document),
}

impl StageData {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            StageData::Analysis(_) => "analysis",
            StageData::Messages(_) => "messages",
            StageData::Document(_) => "document",
        }
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Every parser ran without raising but none produced a message.
    #[error("no messages available for selection")]
    NoMessagesAvailable,
    /// Messages existed but none cleared the planner's interestingness gate.
    #[error("no messages were interesting enough to report")]
    NoInterestingMessages,
    /// A message parser crashed; fatal for the whole request.
    #[error("message parser failed: {0}")]
    Parser(#[source] anyhow::Error),
    #[error("stage {stage} expected {expected} input, got {actual}")]
    StageInput {
        stage: &'static str,
        expected: &'static str,
        actual: &'static str,
    },
    #[error("registry access failed: {0}")]
    Registry(#[from] crate::registry::RegistryError),
}

/// One step of an NLG pipeline run.
///
/// Stages are pure over (registry, seeded rng, output language, input
/// payload) and run to completion synchronously; the runner never retries
/// or partially recovers a stage.
pub trait PipelineStage: Send + Sync {
    fn name(&self) -> &'static str;

    /// # Errors
    /// Any stage error aborts the pipeline run; classification into a
    /// user-facing outcome happens in the service layer.
    fn run(
        &self,
        registry: &Registry,
        rng: &mut StdRng,
        language: &str,
        input: StageData,
    ) -> Result<StageData, PipelineError>;
}

/// Ordered stage sequence sharing one registry, rng, and language per run.
///
/// The body and headline pipelines of one generation request are two
/// instances of this type fed the same rng, so a fixed seed reproduces the
/// whole request byte for byte.
pub struct NlgPipeline {
    stages: Vec<Box<dyn PipelineStage>>,
}

impl NlgPipeline {
    #[must_use]
    pub fn new(stages: Vec<Box<dyn PipelineStage>>) -> Self {
        Self { stages }
    }

    /// Runs every stage strictly in order, feeding each stage's output to
    /// the next.
    ///
    /// # Errors
    /// Propagates the first stage failure untouched.
    pub fn run(
        &self,
        registry: &Registry,
        rng: &mut StdRng,
        language: &str,
        input: StageData,
    ) -> Result<StageData, PipelineError> {
        let mut data = input;
        for stage in &self.stages {
            debug!(stage = stage.name(), input = data.kind(), "running stage");
            data = stage.run(registry, rng, language, data)?;
        }
        info!(stages = self.stages.len(), language, "pipeline complete");
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;
    use crate::models::Fact;

    struct RecordingStage {
        name: &'static str,
    }

    impl PipelineStage for RecordingStage {
        fn name(&self) -> &'static str {
            self.name
        }

        fn run(
            &self,
            _registry: &Registry,
            _rng: &mut StdRng,
            _language: &str,
            input: StageData,
        ) -> Result<StageData, PipelineError> {
            let StageData::Messages(mut messages) = input else {
                return Err(PipelineError::StageInput {
                    stage: self.name,
                    expected: "messages",
                    actual: input.kind(),
                });
            };
            messages.push(Message::new(Fact::new(self.name, "trace:stage", 0.0)));
            Ok(StageData::Messages(messages))
        }
    }

    struct FailingStage;

    impl PipelineStage for FailingStage {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn run(
            &self,
            _registry: &Registry,
            _rng: &mut StdRng,
            _language: &str,
            _input: StageData,
        ) -> Result<StageData, PipelineError> {
            Err(PipelineError::NoMessagesAvailable)
        }
    }

    #[test]
    fn stages_run_in_declared_order() {
        let pipeline = NlgPipeline::new(vec![
            Box::new(RecordingStage { name: "first" }),
            Box::new(RecordingStage { name: "second" }),
        ]);
        let registry = Registry::new();
        let mut rng = StdRng::seed_from_u64(1);

        let output = pipeline
            .run(&registry, &mut rng, "en", StageData::Messages(vec![]))
            .expect("pipeline runs");

        let StageData::Messages(messages) = output else {
            panic!("expected messages output");
        };
        let order: Vec<_> = messages
            .iter()
            .map(|m| m.main_fact.value.to_string())
            .collect();
        assert_eq!(order, vec!["first", "second"]);
    }

    #[test]
    fn first_failure_aborts_the_run() {
        let pipeline = NlgPipeline::new(vec![
            Box::new(FailingStage),
            Box::new(RecordingStage { name: "unreached" }),
        ]);
        let registry = Registry::new();
        let mut rng = StdRng::seed_from_u64(1);

        let result = pipeline.run(&registry, &mut rng, "en", StageData::Messages(vec![]));
        assert!(matches!(result, Err(PipelineError::NoMessagesAvailable)));
    }

    #[test]
    fn stage_input_mismatch_names_the_stage() {
        let stage = RecordingStage { name: "typed" };
        let registry = Registry::new();
        let mut rng = StdRng::seed_from_u64(1);

        let result = stage.run(
            &registry,
            &mut rng,
            "en",
            StageData::Document(Document::default()),
        );
        match result {
            Err(PipelineError::StageInput {
                stage,
                expected,
                actual,
            }) => {
                assert_eq!(stage, "typed");
                assert_eq!(expected, "messages");
                assert_eq!(actual, "document");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
