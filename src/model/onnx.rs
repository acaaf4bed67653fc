//! ONNX Runtime inference for an exported outlier model (e.g. scikit-learn
//! IsolationForest via skl2onnx). Input: `[N, 10]` f32. The configured output
//! carries the decision function, one value per row.

use super::{check_matrix, AnomalyModel};
use crate::error::{Result, SentinelError};
use ndarray::ArrayView2;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};

fn ort_err(e: impl std::fmt::Display) -> SentinelError {
    SentinelError::model(e.to_string())
}

pub struct OnnxModel {
    // Runs are serialized: the session is not assumed reentrant.
    session: Mutex<Session>,
    output_name: String,
    path: PathBuf,
}

impl OnnxModel {
    /// Load a model file. `output_name` selects the decision-function output;
    /// the first graph output is used when it is `None`.
    pub fn load(path: &Path, output_name: Option<&str>) -> Result<Self> {
        let session = Session::builder()
            .map_err(ort_err)?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(ort_err)?
            .commit_from_file(path)
            .map_err(|e| {
                SentinelError::configuration(format!("failed to load {}: {}", path.display(), e))
            })?;

        let output_name = match output_name {
            Some(name) if session.outputs.iter().any(|o| o.name == name) => name.to_string(),
            Some(name) => {
                return Err(SentinelError::configuration(format!(
                    "model {} has no output named {:?}",
                    path.display(),
                    name
                )))
            }
            None => session
                .outputs
                .first()
                .map(|o| o.name.clone())
                .ok_or_else(|| SentinelError::configuration("model defines no outputs"))?,
        };

        Ok(Self {
            session: Mutex::new(session),
            output_name,
            path: path.to_path_buf(),
        })
    }
}

impl AnomalyModel for OnnxModel {
    fn decision_function(&self, matrix: ArrayView2<'_, f64>) -> Result<Vec<f64>> {
        check_matrix(&matrix)?;
        let rows = matrix.nrows();
        let input = Tensor::from_array(matrix.mapv(|x| x as f32)).map_err(ort_err)?;

        let mut session = self.session.lock();
        let outputs = session.run(ort::inputs![input]).map_err(ort_err)?;
        let output = outputs
            .get(self.output_name.as_str())
            .ok_or_else(|| SentinelError::model(format!("no output {:?}", self.output_name)))?;
        let (_, data) = output.try_extract_tensor::<f32>().map_err(ort_err)?;
        let scores: Vec<f64> = data.iter().map(|&s| s as f64).collect();

        if scores.len() != rows {
            return Err(SentinelError::model(format!(
                "model returned {} scores for {} rows",
                scores.len(),
                rows
            )));
        }
        Ok(scores)
    }

    fn describe(&self) -> String {
        format!("onnx {} [{}]", self.path.display(), self.output_name)
    }
}
