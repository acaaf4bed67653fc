//! Preset traffic profiles scored on the single-vector scale, with the
//! status band shown to the operator.

use crate::config::BandConfig;
use crate::error::{Result, SentinelError};
use crate::features::FeatureVector;
use crate::scoring::AnomalyScorer;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Short, small flow: the normal traffic baseline.
pub const NORMAL_PROFILE: [f64; 10] = [64.0, 3.0, 4.0, 160.0, 37.0, 21.33, 64.0, 21.33, 0.0, 0.0];

/// Long, heavy flow typical of DoS/DDoS traffic.
pub const ATTACK_PROFILE: [f64; 10] = [
    1_000_000.0,
    100.0,
    100.0,
    10_000.0,
    100.0,
    9900.5,
    1_000_000.0,
    9900.5,
    1.0,
    0.0,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    Normal,
    Attack,
}

impl Scenario {
    pub fn features(&self) -> FeatureVector {
        match self {
            Scenario::Normal => FeatureVector::new(NORMAL_PROFILE),
            Scenario::Attack => FeatureVector::new(ATTACK_PROFILE),
        }
    }
}

impl FromStr for Scenario {
    type Err = SentinelError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(Scenario::Normal),
            "attack" | "ddos" => Ok(Scenario::Attack),
            other => Err(SentinelError::input(format!("unknown scenario {:?}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SafetyBand {
    Safe,
    Elevated,
    Critical,
}

impl SafetyBand {
    pub fn from_score(score: u8, config: &BandConfig) -> Self {
        if score >= config.safe_threshold {
            SafetyBand::Safe
        } else if score >= config.elevated_threshold {
            SafetyBand::Elevated
        } else {
            SafetyBand::Critical
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            SafetyBand::Safe => "SAFE: normal traffic baseline",
            SafetyBand::Elevated => "ALERT: elevated risk, anomalous traffic detected",
            SafetyBand::Critical => "CRITICAL: anomaly detected, potential DoS/DDoS attack",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Simulation {
    pub scenario: Scenario,
    pub safety: u8,
    pub raw_score: f64,
    pub band: SafetyBand,
}

pub fn simulate(scorer: &AnomalyScorer, scenario: Scenario, bands: &BandConfig) -> Result<Simulation> {
    let score = scorer.score_single(&scenario.features())?;
    let band = SafetyBand::from_score(score.safety, bands);
    tracing::info!(
        scenario = ?scenario,
        safety = score.safety,
        raw_score = score.raw_score,
        band = ?band,
        "scenario scored"
    );
    Ok(Simulation {
        scenario,
        safety: score.safety,
        raw_score: score.raw_score,
        band,
    })
}
