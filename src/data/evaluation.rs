//! Model evaluation endpoint
//!
//! `POST /evaluate` runs the backend's qualification dataset against every
//! configured model and reports accuracy, failure rate and latency per model.

use std::collections::BTreeMap;
use std::time::Duration;

use log::info;
use serde::{Deserialize, Serialize};

use super::client::{ApiClient, ApiError};

/// Models offered for message generation and compared by the evaluation
pub const MODELS: [(&str, &str); 3] = [
    ("grok-3", "Grok 3"),
    ("grok-4-fast-reasoning", "Grok 4 Fast (Reasoning)"),
    ("grok-4-fast-non-reasoning", "Grok 4 Fast (Non-Reasoning)"),
];

/// Evaluation runs the whole dataset, so it gets a longer timeout than other requests
const EVALUATION_TIMEOUT_FACTOR: u32 = 10;

/// Display name for a model id, falling back to the id itself
pub fn model_name(id: &str) -> &str {
    MODELS
        .iter()
        .find(|(model_id, _)| *model_id == id)
        .map(|(_, name)| *name)
        .unwrap_or(id)
}

/// Aggregate results for one model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelScore {
    /// Percentage of cases where the predicted stage matched (0-100)
    pub accuracy: f64,
    /// Percentage of cases that errored or returned invalid JSON (0-100)
    pub failure_rate: f64,
    /// Mean latency of successful cases in seconds
    pub avg_latency: f64,
}

/// A single failed evaluation case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationFailure {
    pub model: String,
    #[serde(default)]
    pub category: String,
    pub issue: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Response of `POST /evaluate`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationReport {
    /// Scores keyed by model id
    pub results: BTreeMap<String, ModelScore>,
    pub failures: Vec<EvaluationFailure>,
}

impl EvaluationReport {
    /// Model with the highest accuracy; ties go to the lower failure rate
    pub fn recommended(&self) -> Option<&str> {
        self.results
            .iter()
            .max_by(|(_, a), (_, b)| {
                a.accuracy
                    .total_cmp(&b.accuracy)
                    .then(b.failure_rate.total_cmp(&a.failure_rate))
            })
            .map(|(id, _)| id.as_str())
    }
}

impl ApiClient {
    /// Runs a model evaluation (`POST /evaluate`)
    pub async fn evaluate(&self) -> Result<EvaluationReport, ApiError> {
        let timeout = self.timeout().saturating_mul(EVALUATION_TIMEOUT_FACTOR);
        let request = self.post("/evaluate").timeout(timeout.max(Duration::from_secs(1)));
        let report: EvaluationReport = self.send_json(request).await?;
        info!(
            "Evaluation finished: {} models, {} failures",
            report.results.len(),
            report.failures.len()
        );
        Ok(report)
    }
}
