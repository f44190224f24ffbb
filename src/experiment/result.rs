//! Result payload returned by a successful experiment.

use serde::{Deserialize, Serialize};

use super::error::ExperimentError;

/// Scores for one evaluation pass (full text or prefix only).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassificationMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    /// Rows are actual labels, columns predicted labels, ordered like `label_names`.
    pub confusion_matrix: Vec<Vec<u64>>,
}

/// Base64-encoded PNG plots rendered by the service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlotSet {
    pub comparison: String,
    pub confusion_full: String,
    pub confusion_prefix: String,
}

/// Complete outcome of one experiment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExperimentResult {
    pub full_text: ClassificationMetrics,
    pub prefix: ClassificationMetrics,
    /// Prefix accuracy as a percentage of full-text accuracy.
    pub performance_retention: f64,
    pub prefix_length: u32,
    pub dataset_size: u64,
    pub train_size: u64,
    pub test_size: u64,
    pub label_names: Vec<String>,
    pub plots: PlotSet,
}

impl ExperimentResult {
    /// Parse and shape-check a success body.
    ///
    /// Missing fields, wrong types, and inconsistent matrices all map to
    /// [`ExperimentError::MalformedResponse`]; a partial result is never returned.
    pub fn from_json(body: &str) -> Result<Self, ExperimentError> {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            return Err(ExperimentError::MalformedResponse(
                "Empty response body".to_string(),
            ));
        }
        let result: Self = serde_json::from_str(trimmed)
            .map_err(|err| ExperimentError::MalformedResponse(err.to_string()))?;
        result.validate().map_err(ExperimentError::MalformedResponse)?;
        Ok(result)
    }

    /// Check the invariants serde cannot express.
    pub fn validate(&self) -> Result<(), String> {
        if self.label_names.is_empty() {
            return Err("label_names is empty".to_string());
        }
        if !self.performance_retention.is_finite() || self.performance_retention < 0.0 {
            return Err(format!(
                "performance_retention {} is not a non-negative number",
                self.performance_retention
            ));
        }
        let labels = self.label_names.len();
        validate_metrics("full_text", &self.full_text, labels)?;
        validate_metrics("prefix", &self.prefix, labels)?;
        Ok(())
    }

    /// Accuracy lost by classifying the prefix only, in percentage points.
    pub fn accuracy_drop_points(&self) -> f64 {
        (self.full_text.accuracy - self.prefix.accuracy) * 100.0
    }
}

fn validate_metrics(
    section: &str,
    metrics: &ClassificationMetrics,
    labels: usize,
) -> Result<(), String> {
    for (name, value) in [
        ("accuracy", metrics.accuracy),
        ("precision", metrics.precision),
        ("recall", metrics.recall),
        ("f1_score", metrics.f1_score),
    ] {
        if !(0.0..=1.0).contains(&value) {
            return Err(format!("{section}.{name} {value} is outside 0..=1"));
        }
    }
    let rows = metrics.confusion_matrix.len();
    if rows != labels {
        return Err(format!(
            "{section}.confusion_matrix has {rows} rows for {labels} labels"
        ));
    }
    if let Some((index, row)) = metrics
        .confusion_matrix
        .iter()
        .enumerate()
        .find(|(_, row)| row.len() != labels)
    {
        return Err(format!(
            "{section}.confusion_matrix row {index} has {} columns for {labels} labels",
            row.len()
        ));
    }
    Ok(())
}
