//! Runs the shared model over feature vectors; labels rows and summarizes.

use super::safety::{batch_safety, single_safety, Label};
use crate::error::{Result, SentinelError};
use crate::features::{to_matrix, FeatureVector};
use crate::model::ModelHandle;
use serde::{Deserialize, Serialize};

/// One scored input row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredRecord {
    pub index: usize,
    pub raw_score: f64,
    pub label: Label,
    pub features: FeatureVector,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetySummary {
    /// Batch safety from the mean raw score, 0–100
    pub avg_safety: u8,
    pub total: usize,
    pub anomalies: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredBatch {
    pub records: Vec<ScoredRecord>,
    pub summary: SafetySummary,
}

/// Interactive-path result for one vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SingleScore {
    pub safety: u8,
    pub raw_score: f64,
}

impl SingleScore {
    /// Reported when no model is loaded.
    pub const UNAVAILABLE: SingleScore = SingleScore {
        safety: 0,
        raw_score: 0.0,
    };
}

#[derive(Debug, Clone)]
pub struct AnomalyScorer {
    model: ModelHandle,
}

impl AnomalyScorer {
    pub fn new(model: ModelHandle) -> Self {
        Self { model }
    }

    /// Score every vector with one model call. Requires a loaded model.
    pub fn score_batch(&self, vectors: &[FeatureVector]) -> Result<ScoredBatch> {
        if vectors.is_empty() {
            return Err(SentinelError::input("no usable data found"));
        }
        let model = self
            .model
            .current()
            .ok_or_else(|| SentinelError::configuration("no scoring model loaded"))?;

        let raw = model.decision_function(to_matrix(vectors).view())?;
        if raw.len() != vectors.len() {
            return Err(SentinelError::model(format!(
                "model returned {} scores for {} rows",
                raw.len(),
                vectors.len()
            )));
        }

        let records: Vec<ScoredRecord> = raw
            .iter()
            .zip(vectors)
            .enumerate()
            .map(|(index, (&raw_score, features))| ScoredRecord {
                index,
                raw_score,
                label: Label::from_raw(raw_score),
                features: *features,
            })
            .collect();

        let mean = raw.iter().sum::<f64>() / raw.len() as f64;
        let summary = SafetySummary {
            avg_safety: batch_safety(mean),
            total: records.len(),
            anomalies: records.iter().filter(|r| r.label == Label::Anomaly).count(),
        };
        tracing::info!(
            total = summary.total,
            anomalies = summary.anomalies,
            avg_safety = summary.avg_safety,
            mean_raw = mean,
            "batch scored"
        );
        Ok(ScoredBatch { records, summary })
    }

    /// Score one vector on the single-vector scale. Without a model this
    /// returns [`SingleScore::UNAVAILABLE`] instead of failing.
    pub fn score_single(&self, vector: &FeatureVector) -> Result<SingleScore> {
        let Some(model) = self.model.current() else {
            tracing::warn!("no scoring model loaded; reporting zero safety");
            return Ok(SingleScore::UNAVAILABLE);
        };
        let raw = model.decision_function(to_matrix(std::slice::from_ref(vector)).view())?;
        let raw_score = raw
            .first()
            .copied()
            .ok_or_else(|| SentinelError::model("model returned no score"))?;
        Ok(SingleScore {
            safety: single_safety(raw_score),
            raw_score,
        })
    }
}
