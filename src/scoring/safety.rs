//! Raw decision-function values → labels and 0–100 safety scores.
//!
//! The batch and single-vector scales are calibrated separately and are kept
//! as two functions on purpose: they do not agree for the same input.

use serde::{Deserialize, Serialize};

/// Rows scoring strictly below this are anomalies.
pub const ANOMALY_THRESHOLD: f64 = -0.05;

/// Batch scale: mean raw score over [-0.15, 0.15] → [0, 100].
const BATCH_FLOOR: f64 = 0.15;
const BATCH_SPAN: f64 = 0.30;

/// Single-vector scale: raw score over [-0.1, 0.1] → [0, 100].
const SINGLE_MIN: f64 = -0.1;
const SINGLE_MAX: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Label {
    Normal,
    Anomaly,
}

impl Label {
    pub fn from_raw(raw_score: f64) -> Self {
        if raw_score < ANOMALY_THRESHOLD {
            Label::Anomaly
        } else {
            Label::Normal
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Normal => "Normal",
            Label::Anomaly => "Anomaly",
        }
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregate safety for a batch, from the mean raw score. Rounded.
pub fn batch_safety(mean_raw_score: f64) -> u8 {
    let pct = ((mean_raw_score + BATCH_FLOOR) / BATCH_SPAN) * 100.0;
    pct.clamp(0.0, 100.0).round() as u8
}

/// Safety for one vector on the interactive path. Truncated.
pub fn single_safety(raw_score: f64) -> u8 {
    let clamped = raw_score.clamp(SINGLE_MIN, SINGLE_MAX);
    let pct = (clamped - SINGLE_MIN) / (SINGLE_MAX - SINGLE_MIN) * 100.0;
    pct.clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_threshold_is_strict() {
        assert_eq!(Label::from_raw(-0.05), Label::Normal);
        assert_eq!(Label::from_raw(-0.050001), Label::Anomaly);
        assert_eq!(Label::from_raw(0.2), Label::Normal);
        assert_eq!(Label::from_raw(-3.0), Label::Anomaly);
    }

    #[test]
    fn label_serializes_as_name() {
        assert_eq!(serde_json::to_string(&Label::Anomaly).unwrap(), "\"Anomaly\"");
        assert_eq!(Label::Normal.to_string(), "Normal");
    }

    #[test]
    fn batch_scale_points() {
        assert_eq!(batch_safety(-0.15), 0);
        assert_eq!(batch_safety(0.0), 50);
        assert_eq!(batch_safety(0.15), 100);
        assert_eq!(batch_safety(0.03), 60);
        assert_eq!(batch_safety(-10.0), 0);
        assert_eq!(batch_safety(10.0), 100);
    }

    #[test]
    fn batch_scale_rounds() {
        // 0.0015 → 50.5 → 51; a truncating scale would give 50
        assert_eq!(batch_safety(0.0016), 51);
        assert_eq!(batch_safety(0.0014), 50);
    }

    #[test]
    fn batch_scale_is_monotonic() {
        let mut prev = 0;
        let mut m = -0.5;
        while m <= 0.5 {
            let s = batch_safety(m);
            assert!(s >= prev, "{} at {}", s, m);
            assert!(s <= 100);
            prev = s;
            m += 0.001;
        }
    }

    #[test]
    fn single_scale_points() {
        assert_eq!(single_safety(-0.1), 0);
        assert_eq!(single_safety(0.0), 50);
        assert_eq!(single_safety(0.1), 100);
        assert_eq!(single_safety(-5.0), 0);
        assert_eq!(single_safety(5.0), 100);
        // truncation, not rounding: 0.0999 → 99.95
        assert_eq!(single_safety(0.0999), 99);
    }

    #[test]
    fn scales_disagree_off_center() {
        assert_ne!(batch_safety(0.05), single_safety(0.05));
        assert_eq!(single_safety(0.05), 75);
        assert_eq!(batch_safety(0.05), 67);
    }

    #[test]
    fn nan_maps_to_zero() {
        assert_eq!(batch_safety(f64::NAN), 0);
        assert_eq!(single_safety(f64::NAN), 0);
    }
}
