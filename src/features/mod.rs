//! Fixed-schema feature vectors, built from flow aggregates or tabular rows.

mod pipeline;
mod schema;
mod table;

pub use pipeline::{FeatureExtractor, UploadKind};
pub use schema::{canonical_name, normalize_column, COLUMN_ALIASES};
pub use table::{parse_table, Table};

use crate::flow::FlowAggregate;
use ndarray::Array2;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Width of every feature vector.
pub const FEATURE_COUNT: usize = 10;

/// Canonical feature names, in the column order the scoring model was fit with.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "Flow Duration",
    "Total Fwd Packets",
    "Total Backward Packets",
    "Total Length of Fwd Packets",
    "Fwd Packet Length Max",
    "Flow IAT Mean",
    "Fwd IAT Total",
    "Fwd IAT Mean",
    "Fwd PSH Flags",
    "FIN Flag Count",
];

/// One flow or row as model input. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    values: [f64; FEATURE_COUNT],
}

impl FeatureVector {
    pub fn new(values: [f64; FEATURE_COUNT]) -> Self {
        Self { values }
    }

    /// Inter-arrival times are not tracked per packet: the forward IAT total is
    /// the flow duration and both IAT means are duration / forward packets.
    pub fn from_flow(flow: &FlowAggregate) -> Self {
        let duration = flow.duration();
        let iat_mean = if flow.fwd_packets == 0 {
            0.0
        } else {
            duration / flow.fwd_packets as f64
        };
        Self::new([
            duration,
            flow.fwd_packets as f64,
            flow.bwd_packets as f64,
            flow.fwd_bytes as f64,
            flow.fwd_max_len as f64,
            iat_mean,
            duration,
            iat_mean,
            flow.psh_count as f64,
            flow.fin_count as f64,
        ])
    }

    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.values
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURE_NAMES
            .iter()
            .position(|n| *n == name)
            .map(|i| self.values[i])
    }

    /// (canonical name, value) pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        FEATURE_NAMES.iter().copied().zip(self.values.iter().copied())
    }
}

impl From<[f64; FEATURE_COUNT]> for FeatureVector {
    fn from(values: [f64; FEATURE_COUNT]) -> Self {
        Self::new(values)
    }
}

/// Serializes as `{"Flow Duration": .., ...}` in canonical order.
impl Serialize for FeatureVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(FEATURE_COUNT))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, &value)?;
        }
        map.end()
    }
}

/// Stack vectors row-wise into an `[N, FEATURE_COUNT]` matrix.
pub fn to_matrix(vectors: &[FeatureVector]) -> Array2<f64> {
    let mut m = Array2::zeros((vectors.len(), FEATURE_COUNT));
    for (mut row, v) in m.rows_mut().into_iter().zip(vectors) {
        for (cell, x) in row.iter_mut().zip(v.values.iter()) {
            *cell = *x;
        }
    }
    m
}
