//! Model training and verification from a curated dataset.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use rand::seq::SliceRandom;
use rand::Rng;
use textcat::{Example, TrainReport, Verification};
use tracing::info;

use crate::dataset::Dataset;
use crate::error::{CuratorError, Result};
use crate::store::DatasetFile;
use crate::ui;

/// Share of examples used for training; the rest is held out.
const TRAIN_FRACTION: f64 = 0.8;

/// A text and the label the model is expected to give it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    pub text: String,
    pub expected_label: String,
}

/// Every label used in the dataset, including the ignore label.
#[must_use]
pub fn all_labels(dataset: &Dataset) -> BTreeSet<String> {
    dataset.values().map(|record| record.label.clone()).collect()
}

/// One example per record, targeting `true` for its own label only.
#[must_use]
pub fn build_examples(dataset: &Dataset, labels: &BTreeSet<String>) -> Vec<Example> {
    dataset
        .values()
        .map(|record| {
            let cats: BTreeMap<String, bool> = labels
                .iter()
                .map(|label| (label.clone(), *label == record.label))
                .collect();
            Example::new(record.text.clone(), cats)
        })
        .collect()
}

/// Shuffle `examples` and split them into training and holdout sets.
pub fn split_examples<R: Rng + ?Sized>(
    mut examples: Vec<Example>,
    rng: &mut R,
) -> (Vec<Example>, Vec<Example>) {
    let train_limit = (examples.len() as f64 * TRAIN_FRACTION) as usize;
    examples.shuffle(rng);
    let holdout = examples.split_off(train_limit);
    (examples, holdout)
}

/// Train a model from the dataset in `data_file` into `output_dir`.
pub fn train(data_file: &Path, output_dir: &Path, test_text: Option<&str>) -> Result<TrainReport> {
    if output_dir.as_os_str().is_empty() {
        return Err(CuratorError::Validation(
            "The output dir was not specified, please try again".to_string(),
        ));
    }

    let DatasetFile { data, .. } = DatasetFile::load(data_file, true)?;
    let labels = all_labels(&data);
    info!(records = data.len(), labels = labels.len(), "Preparing training data");

    let report = textcat::train_textcat_model(
        || split_examples(build_examples(&data, &labels), &mut rand::thread_rng()),
        output_dir,
        &labels,
        test_text,
    )?;

    ui::print_success(&format!(
        "Trained on {} examples ({} held out), model saved to {}",
        report.train_examples,
        report.holdout_examples,
        report.model_path.display()
    ));
    if let Some(accuracy) = report.holdout_accuracy {
        ui::print_info(&format!("Holdout accuracy: {:.1}%", accuracy * 100.0));
    }
    if let (Some(text), Some(scores)) = (test_text, &report.smoke_test) {
        ui::print_info(&format!("Scores for \"{text}\":"));
        ui::print_scores(scores);
    }

    Ok(report)
}

/// Parse tab-separated `text<TAB>expected_label` lines.
pub fn parse_test_cases(content: &str, source: &str) -> Result<Vec<TestCase>> {
    content
        .lines()
        .enumerate()
        .map(|(index, line)| {
            let fields: Vec<&str> = line.split('\t').collect();
            match fields.as_slice() {
                [text, label] => Ok(TestCase {
                    text: (*text).to_string(),
                    expected_label: (*label).to_string(),
                }),
                _ => Err(CuratorError::Validation(format!(
                    "Line {} of {source} is invalid, it should contain two tab-separated values, but has {}",
                    index + 1,
                    fields.len()
                ))),
            }
        })
        .collect()
}

/// Read test cases from a tab-separated file.
pub fn read_test_file(path: &Path) -> Result<Vec<TestCase>> {
    let content = std::fs::read_to_string(path)?;
    parse_test_cases(&content, &path.display().to_string())
}

/// Gather test cases from either a test file or a single text/label pair.
pub fn collect_test_cases(
    test_text: Option<&str>,
    expected_label: Option<&str>,
    test_file: Option<&Path>,
) -> Result<Vec<TestCase>> {
    if let Some(path) = test_file {
        return read_test_file(path);
    }

    let text = test_text
        .ok_or_else(|| CuratorError::Validation("Text to test must be provided".to_string()))?;
    let expected_label = expected_label.ok_or_else(|| {
        CuratorError::Validation("An expected label must be provided with the test text".to_string())
    })?;

    Ok(vec![TestCase {
        text: text.to_string(),
        expected_label: expected_label.to_string(),
    }])
}

/// Check every case against the model in `model_dir`.
///
/// Returns the verifications; the run passes only if all of them pass.
pub fn verify(model_dir: &Path, cases: &[TestCase]) -> Result<Vec<Verification>> {
    if model_dir.as_os_str().is_empty() {
        return Err(CuratorError::Validation(
            "The model dir was not specified, please try again".to_string(),
        ));
    }

    ui::print_info(&format!("Loading model from {}", model_dir.display()));
    cases
        .iter()
        .map(|case| {
            let verification =
                textcat::test_textcat_model(model_dir, &case.text, &case.expected_label)?;
            ui::print_verification(&verification);
            Ok(verification)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::ClassificationRecord;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tempfile::TempDir;

    fn dataset() -> Dataset {
        Dataset::from([
            ("1-U1".to_string(), ClassificationRecord::new("hi all", "greeting")),
            ("2-U1".to_string(), ClassificationRecord::new("good morning", "greeting")),
            ("3-U2".to_string(), ClassificationRecord::new("api is down", "outage")),
            ("4-U2".to_string(), ClassificationRecord::new("database down again", "outage")),
            ("5-U3".to_string(), ClassificationRecord::new("lunch?", "ignore")),
        ])
    }

    #[test]
    fn test_all_labels_include_ignore() {
        let labels = all_labels(&dataset());
        assert_eq!(
            labels.into_iter().collect::<Vec<_>>(),
            vec!["greeting", "ignore", "outage"]
        );
    }

    #[test]
    fn test_build_examples() {
        let data = dataset();
        let labels = all_labels(&data);
        let examples = build_examples(&data, &labels);

        assert_eq!(examples.len(), 5);
        for example in &examples {
            assert_eq!(example.cats.len(), 3);
            assert_eq!(example.cats.values().filter(|v| **v).count(), 1);
        }
        let first = &examples[0];
        assert_eq!(first.text, "hi all");
        assert_eq!(first.true_label(), Some("greeting"));
    }

    #[test]
    fn test_split_eighty_twenty() {
        let data = dataset();
        let examples = build_examples(&data, &all_labels(&data));
        let mut rng = StdRng::seed_from_u64(7);

        let (train, holdout) = split_examples(examples, &mut rng);
        assert_eq!(train.len(), 4);
        assert_eq!(holdout.len(), 1);

        let (train, holdout) = split_examples(Vec::new(), &mut rng);
        assert!(train.is_empty() && holdout.is_empty());
    }

    #[test]
    fn test_parse_test_cases() {
        let cases = parse_test_cases("hi there\tgreeting\napi down\toutage", "cases.tsv").unwrap();
        assert_eq!(
            cases,
            vec![
                TestCase {
                    text: "hi there".to_string(),
                    expected_label: "greeting".to_string()
                },
                TestCase {
                    text: "api down".to_string(),
                    expected_label: "outage".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_parse_invalid_line() {
        let err = parse_test_cases("hi\tgreeting\nno tab here", "cases.tsv").unwrap_err();
        assert!(matches!(err, CuratorError::Validation(_)));
        assert_eq!(
            err.to_string(),
            "Line 2 of cases.tsv is invalid, it should contain two tab-separated values, but has 1"
        );
    }

    #[test]
    fn test_collect_test_cases_requires_input() {
        assert!(matches!(
            collect_test_cases(None, None, None),
            Err(CuratorError::Validation(_))
        ));
        assert!(matches!(
            collect_test_cases(Some("hi"), None, None),
            Err(CuratorError::Validation(_))
        ));
        assert_eq!(
            collect_test_cases(Some("hi"), Some("greeting"), None)
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn test_train_and_verify() {
        let dir = TempDir::new().unwrap();
        let data_file = dir.path().join("latest.json");
        let model_dir = dir.path().join("model");
        DatasetFile::new(dataset(), None).persist(&data_file).unwrap();

        let report = train(&data_file, &model_dir, Some("good morning")).unwrap();
        assert_eq!(report.train_examples + report.holdout_examples, 5);
        assert!(report.smoke_test.is_some());

        let cases = vec![TestCase {
            text: "api is down".to_string(),
            expected_label: "outage".to_string(),
        }];
        let results = verify(&model_dir, &cases).unwrap();
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_verify_without_model_fails() {
        let dir = TempDir::new().unwrap();
        let cases = vec![TestCase {
            text: "hi".to_string(),
            expected_label: "greeting".to_string(),
        }];
        assert!(matches!(
            verify(dir.path(), &cases),
            Err(CuratorError::Textcat(_))
        ));
    }
}
