use anyhow::{Result, bail};

use super::{AnalysisRun, TopicModelOutput};
use crate::models::{Fact, Message};

const STOPWORDS_LABEL: &str = "stopwords";

const MOST_COMMON_NAME_OUTLIERNESS: f64 = 6.09;
const MOST_COMMON_PREVALENCE_OUTLIERNESS: f64 = 6.08;
const MOST_COMMON_EXAMPLE_OUTLIERNESS: f64 = 6.07;
const SECOND_NAME_OUTLIERNESS: f64 = 5.09;
const SECOND_PREVALENCE_OUTLIERNESS: f64 = 5.08;
const SECOND_EXAMPLE_OUTLIERNESS: f64 = 5.07;

/// Topic-model statistics: name, prevalence, and an example comment for the
/// two most common topics across the batch.
pub fn generate_messages(_language: &str, run: &AnalysisRun) -> Result<Vec<Message>> {
    let Some(output) = &run.topics else {
        return Ok(vec![]);
    };
    if output.labels.len() != run.comments.len() {
        bail!(
            "topic labels do not align with comments: {} != {}",
            output.labels.len(),
            run.comments.len()
        );
    }

    let mut messages = Vec::new();
    messages.extend(topic_messages(
        run,
        output,
        0,
        "most_common_topic",
        MOST_COMMON_NAME_OUTLIERNESS,
        MOST_COMMON_PREVALENCE_OUTLIERNESS,
        MOST_COMMON_EXAMPLE_OUTLIERNESS,
    ));
    messages.extend(topic_messages(
        run,
        output,
        1,
        "second_most_common_topic",
        SECOND_NAME_OUTLIERNESS,
        SECOND_PREVALENCE_OUTLIERNESS,
        SECOND_EXAMPLE_OUTLIERNESS,
    ));
    Ok(messages)
}

fn topic_messages(
    run: &AnalysisRun,
    output: &TopicModelOutput,
    rank: usize,
    prefix: &str,
    name_outlierness: f64,
    prevalence_outlierness: f64,
    example_outlierness: f64,
) -> Vec<Message> {
    let Some(label) = nth_most_common_label(&output.labels, rank) else {
        return vec![];
    };

    let carrying = output
        .labels
        .iter()
        .filter(|label_list| label_list.contains(&label))
        .count();
    #[allow(clippy::cast_precision_loss)]
    let prevalence = carrying as f64 / output.labels.len() as f64 * 100.0;

    let mut messages = vec![
        Message::new(Fact::new(
            label.as_str(),
            format!("{prefix}:name"),
            name_outlierness,
        )),
        Message::new(Fact::new(
            prevalence,
            format!("{prefix}:prevalence"),
            prevalence_outlierness,
        )),
    ];

    // The first comment carrying the label exemplifies the topic.
    let example = run
        .comments
        .iter()
        .zip(&output.labels)
        .find(|(_, label_list)| label_list.contains(&label))
        .map(|(comment, _)| comment);
    if let Some(example) = example {
        messages.push(Message::new(Fact::new(
            example.as_str(),
            format!("{prefix}:example"),
            example_outlierness,
        )));
    }

    messages
}

/// The `n`th most common label across the batch, weighting each comment's
/// labels by `1 / (rank + 1)` and skipping the stopwords pseudo-label.
/// First-occurrence order breaks weight ties so the result is stable.
fn nth_most_common_label(labels: &[Vec<String>], n: usize) -> Option<String> {
    let mut order: Vec<String> = Vec::new();
    let mut weights: Vec<f64> = Vec::new();

    for label_list in labels {
        for (rank, label) in label_list.iter().enumerate() {
            if label.eq_ignore_ascii_case(STOPWORDS_LABEL) {
                continue;
            }
            #[allow(clippy::cast_precision_loss)]
            let weight = 1.0 / (rank + 1) as f64;
            match order.iter().position(|known| known == label) {
                Some(idx) => weights[idx] += weight,
                None => {
                    order.push(label.clone());
                    weights.push(weight);
                }
            }
        }
    }

    let mut ranked: Vec<(usize, f64)> = weights.iter().copied().enumerate().collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    ranked.get(n).map(|(idx, _)| order[*idx].clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Value;

    fn labels(lists: &[&[&str]]) -> Vec<Vec<String>> {
        lists
            .iter()
            .map(|list| list.iter().map(ToString::to_string).collect())
            .collect()
    }

    #[test]
    fn weighting_prefers_high_ranked_labels() {
        let labels = labels(&[&["economy", "housing"], &["housing", "economy"], &[
            "economy",
        ]]);
        // economy: 1 + 0.5 + 1 = 2.5, housing: 0.5 + 1 = 1.5
        assert_eq!(
            nth_most_common_label(&labels, 0),
            Some("economy".to_string())
        );
        assert_eq!(
            nth_most_common_label(&labels, 1),
            Some("housing".to_string())
        );
        assert_eq!(nth_most_common_label(&labels, 2), None);
    }

    #[test]
    fn stopwords_label_is_skipped() {
        let labels = labels(&[&["Stopwords", "traffic"], &["stopwords"]]);
        assert_eq!(
            nth_most_common_label(&labels, 0),
            Some("traffic".to_string())
        );
    }

    #[test]
    fn emits_name_prevalence_and_example_per_topic() {
        let run = AnalysisRun {
            comments: vec!["on housing".into(), "on economy".into(), "more economy".into()],
            topics: Some(TopicModelOutput {
                labels: labels(&[&["housing"], &["economy"], &["economy"]]),
            }),
            ..AnalysisRun::default()
        };

        let messages = generate_messages("en", &run).expect("parser runs");

        let types: Vec<_> = messages
            .iter()
            .map(|m| m.main_fact.value_type.as_str())
            .collect();
        assert_eq!(types, vec![
            "most_common_topic:name",
            "most_common_topic:prevalence",
            "most_common_topic:example",
            "second_most_common_topic:name",
            "second_most_common_topic:prevalence",
            "second_most_common_topic:example",
        ]);
        assert_eq!(messages[0].main_fact.value, Value::Text("economy".into()));
        assert_eq!(messages[2].main_fact.value, Value::Text("on economy".into()));
        assert_eq!(messages[3].main_fact.value, Value::Text("housing".into()));
    }

    #[test]
    fn single_topic_batch_omits_the_second_topic() {
        let run = AnalysisRun {
            comments: vec!["a".into(), "b".into()],
            topics: Some(TopicModelOutput {
                labels: labels(&[&["economy"], &["economy"]]),
            }),
            ..AnalysisRun::default()
        };

        let messages = generate_messages("en", &run).expect("parser runs");

        assert!(
            messages
                .iter()
                .all(|m| m.main_fact.value_type.starts_with("most_common_topic"))
        );
    }

    #[test]
    fn missing_output_produces_nothing() {
        let run = AnalysisRun {
            comments: vec!["a".into()],
            ..AnalysisRun::default()
        };
        assert!(generate_messages("en", &run).expect("parser runs").is_empty());
    }
}
