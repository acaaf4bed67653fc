//! NIDS Sentinel: offline network-flow anomaly scoring.
//!
//! Modular structure:
//! - [`capture`]: pcap/pcapng container reading and packet header decoding
//! - [`flow`]: per-(source, destination) flow aggregation
//! - [`features`]: fixed-schema feature vectors from flows or tabular rows
//! - [`model`]: outlier models (ONNX, isolation forest) behind a shared handle
//! - [`scoring`]: labels, safety scores and the analysis report
//! - [`scenario`]: preset normal/attack profiles on the interactive scale
//! - [`analysis`]: upload → features → scores → report
//! - [`logging`]: tracing setup and JSON-lines output

pub mod analysis;
pub mod capture;
pub mod config;
pub mod error;
pub mod features;
pub mod flow;
pub mod logging;
pub mod model;
pub mod scenario;
pub mod scoring;

pub use analysis::Analyzer;
pub use config::SentinelConfig;
pub use error::{Result, SentinelError};
pub use features::{FeatureExtractor, FeatureVector, FEATURE_COUNT, FEATURE_NAMES};
pub use flow::{FlowAggregate, FlowAggregator, FlowKey, FlowTable};
pub use logging::StructuredLogger;
pub use model::{AnomalyModel, IsolationForest, ModelHandle, OnnxModel};
pub use scenario::{simulate, SafetyBand, Scenario, Simulation};
pub use scoring::{AnalysisReport, AnomalyScorer, Label};
