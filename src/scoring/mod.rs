//! Anomaly scoring: model output → labels, safety scores and the response shape.

mod engine;
mod report;
mod safety;

pub use engine::{AnomalyScorer, SafetySummary, ScoredBatch, ScoredRecord, SingleScore};
pub use report::{AnalysisReport, RecordResult, ReportSummary};
pub use safety::{batch_safety, single_safety, Label, ANOMALY_THRESHOLD};
