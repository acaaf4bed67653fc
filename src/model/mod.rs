//! Outlier-model collaborators and the shared, swappable model handle.
//!
//! Models expose a decision function: one float per input row, more negative
//! means more anomalous.

mod forest;
mod onnx;

pub use forest::{ForestParams, IsolationForest};
pub use onnx::OnnxModel;

use crate::config::ModelConfig;
use crate::error::{Result, SentinelError};
use crate::features::FEATURE_COUNT;
use ndarray::{Array2, ArrayView2};
use parking_lot::RwLock;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

/// Read-only inference over an `[N, FEATURE_COUNT]` matrix.
pub trait AnomalyModel: Send + Sync {
    fn decision_function(&self, matrix: ArrayView2<'_, f64>) -> Result<Vec<f64>>;

    /// Short description for logs.
    fn describe(&self) -> String;
}

/// Process-wide model slot, injected into the scorer. Loaded once, read-only
/// afterwards; [`ModelHandle::replace`] and [`ModelHandle::reload`] swap it
/// under the write lock.
#[derive(Clone, Default)]
pub struct ModelHandle {
    inner: Arc<RwLock<Option<Arc<dyn AnomalyModel>>>>,
}

impl std::fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelHandle")
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

impl ModelHandle {
    /// Handle with no model; batch scoring fails until one is installed.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_model(model: Arc<dyn AnomalyModel>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Some(model))),
        }
    }

    /// Load per config. A missing model file leaves the handle empty unless the
    /// synthetic fallback is enabled; a file that fails to load is an error.
    pub fn load(config: &ModelConfig) -> Result<Self> {
        let handle = Self::empty();
        handle.reload(config)?;
        Ok(handle)
    }

    /// Re-read the model from config and swap it in.
    pub fn reload(&self, config: &ModelConfig) -> Result<()> {
        let model = load_model(config)?;
        *self.inner.write() = model;
        Ok(())
    }

    pub fn replace(&self, model: Option<Arc<dyn AnomalyModel>>) {
        *self.inner.write() = model;
    }

    pub fn is_loaded(&self) -> bool {
        self.inner.read().is_some()
    }

    /// Snapshot of the current model; the lock is not held while scoring.
    pub fn current(&self) -> Option<Arc<dyn AnomalyModel>> {
        self.inner.read().clone()
    }
}

fn load_model(config: &ModelConfig) -> Result<Option<Arc<dyn AnomalyModel>>> {
    if config.path.exists() {
        let model = OnnxModel::load(&config.path, config.output_name.as_deref())?;
        tracing::info!(model = %model.describe(), "scoring model loaded");
        return Ok(Some(Arc::new(model)));
    }
    if config.synthetic_fallback {
        tracing::warn!(
            path = %config.path.display(),
            "model not found; fitting synthetic isolation forest on random data"
        );
        return Ok(Some(Arc::new(synthetic_model()?)));
    }
    tracing::warn!(path = %config.path.display(), "model not found; batch scoring disabled");
    Ok(None)
}

const SYNTHETIC_ROWS: usize = 200;
const SYNTHETIC_SEED: u64 = 42;
const SYNTHETIC_CONTAMINATION: f64 = 0.05;

/// Forest fit on uniform [0, 1) noise. Keeps the service answering without a
/// trained model; its scores carry no meaning for real traffic.
pub fn synthetic_model() -> Result<IsolationForest> {
    let mut rng = StdRng::seed_from_u64(SYNTHETIC_SEED);
    let data = Array2::from_shape_fn((SYNTHETIC_ROWS, FEATURE_COUNT), |_| rng.gen::<f64>());
    IsolationForest::fit(
        data.view(),
        &ForestParams {
            contamination: Some(SYNTHETIC_CONTAMINATION),
            seed: SYNTHETIC_SEED,
            ..ForestParams::default()
        },
    )
}

/// Checks shared by all models before inference.
pub(crate) fn check_matrix(matrix: &ArrayView2<'_, f64>) -> Result<()> {
    if matrix.ncols() != FEATURE_COUNT {
        return Err(SentinelError::model(format!(
            "expected {} feature columns, got {}",
            FEATURE_COUNT,
            matrix.ncols()
        )));
    }
    Ok(())
}
