//! Response shape: per-record results in input order plus the batch summary.

use super::engine::{ScoredBatch, ScoredRecord};
use super::safety::Label;
use crate::features::FeatureVector;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    pub avg_safety: u8,
    pub total_flows: usize,
    pub anomalies: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordResult {
    pub id: usize,
    pub raw_score: f64,
    pub label: Label,
    pub features: FeatureVector,
}

impl From<ScoredRecord> for RecordResult {
    fn from(r: ScoredRecord) -> Self {
        Self {
            id: r.index,
            raw_score: r.raw_score,
            label: r.label,
            features: r.features,
        }
    }
}

/// `{"summary": {...}, "data": [...]}`. No filtering, sorting or truncation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub summary: ReportSummary,
    pub data: Vec<RecordResult>,
}

impl From<ScoredBatch> for AnalysisReport {
    fn from(batch: ScoredBatch) -> Self {
        Self {
            summary: ReportSummary {
                avg_safety: batch.summary.avg_safety,
                total_flows: batch.summary.total,
                anomalies: batch.summary.anomalies,
            },
            data: batch.records.into_iter().map(RecordResult::from).collect(),
        }
    }
}
