//! Feature extraction pipeline: upload → packets/rows → fixed-order vectors.

use super::schema::{canonical_name, feature_index};
use super::table::{parse_table, Table};
use super::{FeatureVector, FEATURE_COUNT};
use crate::capture::{read_capture, PacketRecord};
use crate::error::{Result, SentinelError};
use crate::flow::FlowAggregator;

/// How an upload is decoded, decided by its file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Capture,
    Table,
}

impl UploadKind {
    pub fn from_filename(name: &str) -> Self {
        let lower = name.to_ascii_lowercase();
        if lower.ends_with(".pcap") || lower.ends_with(".pcapng") {
            UploadKind::Capture
        } else {
            UploadKind::Table
        }
    }
}

/// Unparsable and NaN cells become 0.
fn coerce(cell: &str) -> f64 {
    match cell.trim().parse::<f64>() {
        Ok(v) if !v.is_nan() => v,
        _ => 0.0,
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureExtractor {
    aggregator: FlowAggregator,
}

impl FeatureExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// One vector per flow, in first-seen order.
    pub fn from_packets(&self, packets: &[PacketRecord]) -> Vec<FeatureVector> {
        self.aggregator
            .aggregate(packets)
            .iter()
            .map(|(_, flow)| FeatureVector::from_flow(flow))
            .collect()
    }

    pub fn from_capture(&self, bytes: &[u8]) -> Result<Vec<FeatureVector>> {
        let packets = read_capture(bytes)?;
        let vectors = self.from_packets(&packets);
        if vectors.is_empty() {
            return Err(SentinelError::input("no usable data found: capture has no IP flows"));
        }
        Ok(vectors)
    }

    /// Build a vector from one string-keyed row. Total: unknown columns are
    /// ignored, missing features are 0, the first column for a feature wins.
    pub fn from_row<'a, I>(row: I) -> FeatureVector
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut values = [0.0; FEATURE_COUNT];
        let mut seen = [false; FEATURE_COUNT];
        for (header, cell) in row {
            let Some(i) = canonical_name(header).and_then(feature_index) else {
                continue;
            };
            if !seen[i] {
                seen[i] = true;
                values[i] = coerce(cell);
            }
        }
        FeatureVector::new(values)
    }

    /// One vector per table row, in row order, each built by [`Self::from_row`].
    pub fn from_table(&self, table: &Table) -> Result<Vec<FeatureVector>> {
        let mut recognised = [false; FEATURE_COUNT];
        for header in &table.headers {
            if let Some(i) = canonical_name(header).and_then(feature_index) {
                recognised[i] = true;
            }
        }
        let mapped = recognised.iter().filter(|r| **r).count();
        if mapped == 0 {
            return Err(SentinelError::input(
                "no usable data found: no recognised feature columns",
            ));
        }
        if table.rows.is_empty() {
            return Err(SentinelError::input("no usable data found: table has no rows"));
        }
        tracing::debug!(mapped, defaulted = FEATURE_COUNT - mapped, "feature columns resolved");

        Ok(table.records().map(Self::from_row).collect())
    }

    pub fn from_table_bytes(&self, bytes: &[u8]) -> Result<Vec<FeatureVector>> {
        self.from_table(&parse_table(bytes)?)
    }

    /// Decode an upload by file name and extract its vectors.
    /// Never returns an empty vector list.
    pub fn extract(&self, filename: &str, bytes: &[u8]) -> Result<Vec<FeatureVector>> {
        if bytes.is_empty() {
            return Err(SentinelError::input("empty upload"));
        }
        let kind = UploadKind::from_filename(filename);
        let vectors = match kind {
            UploadKind::Capture => self.from_capture(bytes)?,
            UploadKind::Table => self.from_table_bytes(bytes)?,
        };
        tracing::info!(file = filename, kind = ?kind, vectors = vectors.len(), "features extracted");
        Ok(vectors)
    }
}
