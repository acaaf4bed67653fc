//! One request, start to finish: upload → vectors → batch score → report.
//! Fails as a whole; nothing partial is returned.

use crate::error::Result;
use crate::features::{FeatureExtractor, FeatureVector};
use crate::model::ModelHandle;
use crate::scoring::{AnalysisReport, AnomalyScorer};

#[derive(Debug, Clone)]
pub struct Analyzer {
    extractor: FeatureExtractor,
    scorer: AnomalyScorer,
}

impl Analyzer {
    pub fn new(model: ModelHandle) -> Self {
        Self {
            extractor: FeatureExtractor::new(),
            scorer: AnomalyScorer::new(model),
        }
    }

    pub fn scorer(&self) -> &AnomalyScorer {
        &self.scorer
    }

    pub fn extract(&self, filename: &str, bytes: &[u8]) -> Result<Vec<FeatureVector>> {
        self.extractor.extract(filename, bytes)
    }

    pub fn analyze(&self, filename: &str, bytes: &[u8]) -> Result<AnalysisReport> {
        let vectors = self.extract(filename, bytes)?;
        let batch = self.scorer.score_batch(&vectors)?;
        Ok(AnalysisReport::from(batch))
    }
}
