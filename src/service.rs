use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::{
    analysis::{AnalysisRun, MessageParser, default_parsers},
    localization::{self, ErrorMessageKey},
    models::{Document, Message},
    pipeline::{
        NlgPipeline, PipelineError, StageData,
        generate::{MESSAGE_PARSERS_KEY, MessageGenerator},
        importance::{self, ImportanceAllocator},
        plan::DocumentPlanner,
    },
    registry::{Registry, RegistryError},
};

pub const SEED_KEY: &str = "seed";
pub const CONJUNCTIONS_KEY: &str = "conjunctions";

/// Outcome of one planned pipeline: either a document for the realizer or a
/// canned, localized fallback text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlanOutcome {
    Planned { document: Document },
    Fallback { text: String },
}

/// The always-succeeding result of one generation request: the planned body
/// and headline (or their fallbacks) plus machine-readable error tags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannedReport {
    pub body: PlanOutcome,
    pub headline: PlanOutcome,
    pub errors: Vec<String>,
}

/// Content-selection service: owns the shared registry (parsers, seed,
/// lexical data), builds fresh body and headline pipelines per request, and
/// maps every pipeline failure onto a canned outcome.
pub struct ReportService {
    registry: Arc<Registry>,
    seed: u64,
}

impl ReportService {
    /// Builds the registry once for the service lifetime. When `seed` is
    /// `None` a random one is drawn and logged, so every run of the service
    /// remains reproducible after the fact.
    ///
    /// # Errors
    /// Fails only on registry wiring errors, i.e. a duplicate key.
    pub fn new(seed: Option<u64>) -> Result<Self, RegistryError> {
        let seed = match seed {
            Some(value) => {
                info!(seed = value, "using preset PRNG seed");
                value
            }
            None => {
                let value = rand::rng().random_range(1u64..10_000_000);
                info!(seed = value, "no preset seed, drew a random one");
                value
            }
        };

        let mut registry = Registry::new();
        registry.register(MESSAGE_PARSERS_KEY, default_parsers())?;
        registry.register(SEED_KEY, seed)?;
        registry.register(CONJUNCTIONS_KEY, localization::conjunctions())?;

        Ok(Self {
            registry: Arc::new(registry),
            seed,
        })
    }

    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Plans the body and headline documents for one analysis run.
    ///
    /// Never fails: each pipeline's failure is classified and replaced by a
    /// canned localized text, and the response is tagged with the failure
    /// kind. Both pipelines share one rng seeded from the registry seed.
    #[must_use]
    pub fn plan_report(&self, language: &str, run: &AnalysisRun) -> PlannedReport {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut errors = Vec::new();

        info!(language, comments = run.comments.len(), "running body pipeline");
        let body = self.run_one(body_pipeline(), &mut rng, language, run, &mut errors);
        info!(language, "running headline pipeline");
        let headline = self.run_one(headline_pipeline(), &mut rng, language, run, &mut errors);

        PlannedReport {
            body,
            headline,
            errors,
        }
    }

    fn run_one(
        &self,
        pipeline: NlgPipeline,
        rng: &mut StdRng,
        language: &str,
        run: &AnalysisRun,
        errors: &mut Vec<String>,
    ) -> PlanOutcome {
        let result = pipeline.run(
            &self.registry,
            rng,
            language,
            StageData::Analysis(run.clone()),
        );
        match result {
            Ok(StageData::Document(document)) => PlanOutcome::Planned { document },
            Ok(other) => {
                error!(output = other.kind(), "pipeline produced a non-document output");
                errors.push(format!("UnexpectedPipelineOutput: {}", other.kind()));
                fallback(language, ErrorMessageKey::GeneralError)
            }
            Err(PipelineError::NoMessagesAvailable) => {
                error!("no messages available for selection");
                errors.push("NoMessagesAvailable".to_string());
                fallback(language, ErrorMessageKey::NoMessagesForSelection)
            }
            Err(PipelineError::NoInterestingMessages) => {
                // Expected outcome for unremarkable batches, not a bug.
                info!("no messages were interesting enough to report");
                errors.push("NoInterestingMessages".to_string());
                fallback(language, ErrorMessageKey::NoInterestingMessages)
            }
            Err(err) => {
                error!(error = %err, "pipeline run failed");
                errors.push(format!("{}: {err}", error_kind(&err)));
                fallback(language, ErrorMessageKey::GeneralError)
            }
        }
    }

    /// Library facade over the generation stage: parse and deduplicate
    /// messages without planning them.
    ///
    /// # Errors
    /// [`PipelineError::Parser`] on a parser crash,
    /// [`PipelineError::NoMessagesAvailable`] when nothing was produced.
    pub fn generate_messages(
        &self,
        language: &str,
        run: &AnalysisRun,
    ) -> Result<Vec<Message>, PipelineError> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let output = crate::pipeline::PipelineStage::run(
            &MessageGenerator::new(),
            &self.registry,
            &mut rng,
            language,
            StageData::Analysis(run.clone()),
        )?;
        match output {
            StageData::Messages(messages) => Ok(messages),
            other => Err(PipelineError::StageInput {
                stage: "message-generator",
                expected: "messages",
                actual: other.kind(),
            }),
        }
    }

    /// Library facade over body planning for already-generated messages.
    ///
    /// # Errors
    /// [`PipelineError::NoInterestingMessages`] when no paragraph could be
    /// seeded.
    pub fn plan_body(&self, messages: Vec<Message>) -> Result<Document, PipelineError> {
        DocumentPlanner::body().plan(importance::allocate_importance(messages))
    }

    /// Library facade over headline planning: the single top message, if
    /// any candidate exists.
    #[must_use]
    pub fn plan_headline(&self, messages: Vec<Message>) -> Option<Message> {
        DocumentPlanner::headline()
            .plan(importance::allocate_importance(messages))
            .ok()
            .and_then(|document| document.paragraphs.into_iter().next())
            .map(|paragraph| paragraph.nucleus)
    }
}

fn body_pipeline() -> NlgPipeline {
    NlgPipeline::new(vec![
        Box::new(MessageGenerator::new()),
        Box::new(ImportanceAllocator::new()),
        Box::new(DocumentPlanner::body()),
    ])
}

fn headline_pipeline() -> NlgPipeline {
    NlgPipeline::new(vec![
        Box::new(MessageGenerator::new()),
        Box::new(ImportanceAllocator::new()),
        Box::new(DocumentPlanner::headline()),
    ])
}

fn fallback(language: &str, key: ErrorMessageKey) -> PlanOutcome {
    PlanOutcome::Fallback {
        text: localization::error_message(language, key).to_string(),
    }
}

fn error_kind(err: &PipelineError) -> &'static str {
    match err {
        PipelineError::NoMessagesAvailable => "NoMessagesAvailable",
        PipelineError::NoInterestingMessages => "NoInterestingMessages",
        PipelineError::Parser(_) => "ParserFailure",
        PipelineError::StageInput { .. } => "StageInputMismatch",
        PipelineError::Registry(_) => "RegistryError",
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::models::Fact;

    fn service() -> ReportService {
        ReportService::new(Some(4_551_546)).expect("service builds")
    }

    fn run_with_comments(n: usize) -> AnalysisRun {
        AnalysisRun {
            comments: (0..n).map(|i| format!("comment {i}")).collect(),
            ..AnalysisRun::default()
        }
    }

    #[test]
    fn registry_is_populated_once() {
        let service = service();
        assert!(service.registry().contains(MESSAGE_PARSERS_KEY));
        assert_eq!(
            *service.registry().get::<u64>(SEED_KEY).expect("seed"),
            4_551_546
        );
        assert!(service.registry().contains(CONJUNCTIONS_KEY));
    }

    #[test]
    fn plan_report_yields_documents_for_a_plain_batch() {
        let service = service();
        let report = service.plan_report("en", &run_with_comments(3));

        assert!(report.errors.is_empty());
        let PlanOutcome::Planned { document } = &report.body else {
            panic!("expected a planned body");
        };
        assert!(!document.is_empty());
        let PlanOutcome::Planned { document } = &report.headline else {
            panic!("expected a planned headline");
        };
        assert_eq!(document.paragraphs.len(), 1);
    }

    #[test]
    fn fixed_seed_reproduces_the_report() {
        let run = run_with_comments(4);
        let first = service().plan_report("en", &run);
        let second = service().plan_report("en", &run);

        assert_eq!(
            serde_json::to_string(&first).expect("serialize"),
            serde_json::to_string(&second).expect("serialize")
        );
    }

    #[test]
    fn parser_crash_maps_to_general_error_with_tag() {
        let mut registry = Registry::new();
        let parsers: Vec<MessageParser> =
            vec![Arc::new(|_, _| anyhow::bail!("backend exploded"))];
        registry
            .register(MESSAGE_PARSERS_KEY, parsers)
            .expect("register");
        registry.register(SEED_KEY, 1u64).expect("register");
        let service = ReportService {
            registry: Arc::new(registry),
            seed: 1,
        };

        let report = service.plan_report("en", &run_with_comments(1));

        let PlanOutcome::Fallback { text } = &report.body else {
            panic!("expected a fallback body");
        };
        assert_eq!(
            text,
            localization::error_message("en", ErrorMessageKey::GeneralError)
        );
        assert!(report.errors[0].starts_with("ParserFailure:"));
    }

    #[test]
    fn empty_parsers_map_to_nothing_to_report() {
        let mut registry = Registry::new();
        let parsers: Vec<MessageParser> = vec![Arc::new(|_, _| Ok(vec![]))];
        registry
            .register(MESSAGE_PARSERS_KEY, parsers)
            .expect("register");
        let service = ReportService {
            registry: Arc::new(registry),
            seed: 9,
        };

        let report = service.plan_report("fi", &run_with_comments(1));

        assert_eq!(
            report.errors,
            vec!["NoMessagesAvailable".to_string(), "NoMessagesAvailable".to_string()]
        );
        let PlanOutcome::Fallback { text } = &report.body else {
            panic!("expected a fallback body");
        };
        assert_eq!(
            text,
            localization::error_message("fi", ErrorMessageKey::NoMessagesForSelection)
        );
    }

    #[test]
    fn uninteresting_messages_map_to_nothing_interesting() {
        let mut registry = Registry::new();
        let parsers: Vec<MessageParser> = vec![Arc::new(|_, _| {
            Ok(vec![Message::new(Fact::new(1i64, "stats:count", 0.2))])
        })];
        registry
            .register(MESSAGE_PARSERS_KEY, parsers)
            .expect("register");
        let service = ReportService {
            registry: Arc::new(registry),
            seed: 9,
        };

        let report = service.plan_report("en", &run_with_comments(1));

        let PlanOutcome::Fallback { text } = &report.body else {
            panic!("expected a fallback body");
        };
        assert_eq!(
            text,
            localization::error_message("en", ErrorMessageKey::NoInterestingMessages)
        );
        assert!(report.errors.contains(&"NoInterestingMessages".to_string()));
        // The headline has no threshold, so it still plans.
        assert!(matches!(report.headline, PlanOutcome::Planned { .. }));
    }

    #[test]
    fn plan_headline_returns_the_top_message() {
        let service = service();
        let messages = vec![
            Message::new(Fact::new("a", "summary", 8.10)),
            Message::new(Fact::new(5i64, "stats:count", 10.10)),
        ];

        let headline = service.plan_headline(messages).expect("headline exists");
        assert_eq!(headline.main_fact.value_type, "stats:count");
        assert!(service.plan_headline(vec![]).is_none());
    }
}
