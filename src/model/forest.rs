//! Native isolation forest with a scikit-learn style decision function.
//!
//! `score_samples(x) = -2^(-E[h(x)] / c(ψ))`, `decision(x) = score_samples(x) - offset`,
//! where `offset` is -0.5 for automatic contamination, or the contamination
//! percentile of the training scores.

use super::AnomalyModel;
use crate::error::{Result, SentinelError};
use ndarray::{ArrayView1, ArrayView2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;
const AUTO_OFFSET: f64 = -0.5;

#[derive(Debug, Clone)]
pub struct ForestParams {
    pub n_estimators: usize,
    /// Subsample size ψ per tree (capped at the number of rows)
    pub max_samples: usize,
    /// Expected outlier fraction; `None` uses the fixed -0.5 offset
    pub contamination: Option<f64>,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_samples: 256,
            contamination: None,
            seed: 0,
        }
    }
}

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        size: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone)]
struct Tree {
    nodes: Vec<Node>,
}

/// c(n): average unsuccessful-search path length in a BST of n points.
fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

impl Tree {
    fn grow(data: &ArrayView2<'_, f64>, rows: Vec<usize>, max_depth: usize, rng: &mut StdRng) -> Self {
        let mut nodes = Vec::new();
        Self::grow_node(&mut nodes, data, rows, 0, max_depth, rng);
        Self { nodes }
    }

    fn grow_node(
        nodes: &mut Vec<Node>,
        data: &ArrayView2<'_, f64>,
        rows: Vec<usize>,
        depth: usize,
        max_depth: usize,
        rng: &mut StdRng,
    ) -> usize {
        let id = nodes.len();
        nodes.push(Node::Leaf { size: rows.len() });
        if depth >= max_depth || rows.len() <= 1 {
            return id;
        }

        // Only features that still vary (and are finite) can split.
        let candidates: Vec<(usize, f64, f64)> = (0..data.ncols())
            .filter_map(|f| {
                let (lo, hi) = rows.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &r| {
                    let v = data[[r, f]];
                    (lo.min(v), hi.max(v))
                });
                (lo.is_finite() && hi.is_finite() && hi > lo).then_some((f, lo, hi))
            })
            .collect();
        if candidates.is_empty() {
            return id;
        }

        let (feature, lo, hi) = candidates[rng.gen_range(0..candidates.len())];
        let threshold = rng.gen_range(lo..hi);
        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) =
            rows.into_iter().partition(|&r| data[[r, feature]] < threshold);

        let left = Self::grow_node(nodes, data, left_rows, depth + 1, max_depth, rng);
        let right = Self::grow_node(nodes, data, right_rows, depth + 1, max_depth, rng);
        nodes[id] = Node::Split {
            feature,
            threshold,
            left,
            right,
        };
        id
    }

    fn path_length(&self, x: &ArrayView1<'_, f64>) -> f64 {
        let mut at = 0;
        let mut depth = 0.0;
        loop {
            match self.nodes[at] {
                Node::Leaf { size } => return depth + average_path_length(size),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    at = if x[feature] < threshold { left } else { right };
                    depth += 1.0;
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct IsolationForest {
    trees: Vec<Tree>,
    sample_size: usize,
    n_features: usize,
    offset: f64,
}

impl IsolationForest {
    pub fn fit(data: ArrayView2<'_, f64>, params: &ForestParams) -> Result<Self> {
        let n = data.nrows();
        if n == 0 || data.ncols() == 0 {
            return Err(SentinelError::model("cannot fit isolation forest on empty data"));
        }
        if params.n_estimators == 0 {
            return Err(SentinelError::model("isolation forest needs at least one tree"));
        }
        if let Some(c) = params.contamination {
            if !(0.0..=0.5).contains(&c) || c == 0.0 {
                return Err(SentinelError::model(format!(
                    "contamination must be in (0, 0.5], got {}",
                    c
                )));
            }
        }

        let sample_size = params.max_samples.clamp(1, n);
        let max_depth = (sample_size.max(2) as f64).log2().ceil() as usize;
        let mut rng = StdRng::seed_from_u64(params.seed);

        let trees = (0..params.n_estimators)
            .map(|_| {
                let rows = rand::seq::index::sample(&mut rng, n, sample_size).into_vec();
                Tree::grow(&data, rows, max_depth, &mut rng)
            })
            .collect();

        let mut forest = Self {
            trees,
            sample_size,
            n_features: data.ncols(),
            offset: AUTO_OFFSET,
        };
        if let Some(c) = params.contamination {
            let mut scores = forest.score_samples(data)?;
            scores.sort_by(f64::total_cmp);
            forest.offset = percentile(&scores, 100.0 * c);
        }
        tracing::debug!(
            trees = forest.trees.len(),
            sample_size,
            offset = forest.offset,
            "isolation forest fitted"
        );
        Ok(forest)
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Opposite of the anomaly score: in [-1, 0), lower is more abnormal.
    pub fn score_samples(&self, matrix: ArrayView2<'_, f64>) -> Result<Vec<f64>> {
        if matrix.ncols() != self.n_features {
            return Err(SentinelError::model(format!(
                "expected {} feature columns, got {}",
                self.n_features,
                matrix.ncols()
            )));
        }
        let norm = average_path_length(self.sample_size).max(f64::MIN_POSITIVE);
        let scores = matrix
            .rows()
            .into_iter()
            .map(|row| {
                let total: f64 = self.trees.iter().map(|t| t.path_length(&row)).sum();
                let mean = total / self.trees.len() as f64;
                -(2f64.powf(-mean / norm))
            })
            .collect();
        Ok(scores)
    }
}

impl AnomalyModel for IsolationForest {
    fn decision_function(&self, matrix: ArrayView2<'_, f64>) -> Result<Vec<f64>> {
        Ok(self
            .score_samples(matrix)?
            .into_iter()
            .map(|s| s - self.offset)
            .collect())
    }

    fn describe(&self) -> String {
        format!(
            "isolation forest ({} trees, psi={})",
            self.trees.len(),
            self.sample_size
        )
    }
}

/// Linear-interpolated percentile of sorted values, q in [0, 100].
fn percentile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let pos = (q / 100.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr2, Array2};

    fn cloud(rows: usize, seed: u64) -> Array2<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        Array2::from_shape_fn((rows, 3), |_| rng.gen_range(0.0..1.0))
    }

    #[test]
    fn path_length_constants() {
        assert_eq!(average_path_length(1), 0.0);
        assert_eq!(average_path_length(2), 1.0);
        let c256 = average_path_length(256);
        assert!((c256 - 10.2448).abs() < 1e-3, "{}", c256);
    }

    #[test]
    fn percentile_interpolates() {
        let v = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(percentile(&v, 0.0), 1.0);
        assert_eq!(percentile(&v, 50.0), 3.0);
        assert_eq!(percentile(&v, 100.0), 5.0);
        assert!((percentile(&v, 10.0) - 1.4).abs() < 1e-12);
    }

    #[test]
    fn outliers_score_below_inliers() {
        let data = cloud(300, 1);
        let forest = IsolationForest::fit(data.view(), &ForestParams::default()).unwrap();
        let probe = arr2(&[[0.5, 0.5, 0.5], [25.0, -30.0, 40.0]]);
        let s = forest.decision_function(probe.view()).unwrap();
        assert!(s[1] < s[0]);
        assert!(s[1] < 0.0);
    }

    #[test]
    fn auto_offset_shifts_by_half() {
        let data = cloud(64, 2);
        let forest = IsolationForest::fit(data.view(), &ForestParams::default()).unwrap();
        assert_eq!(forest.offset(), -0.5);
        let raw = forest.score_samples(data.view()).unwrap();
        let dec = forest.decision_function(data.view()).unwrap();
        for (r, d) in raw.iter().zip(&dec) {
            assert!((d - (r + 0.5)).abs() < 1e-12);
            assert!(*r < 0.0 && *r >= -1.0);
        }
    }

    #[test]
    fn contamination_sets_training_outlier_fraction() {
        let data = cloud(400, 3);
        let params = ForestParams {
            contamination: Some(0.1),
            seed: 9,
            ..ForestParams::default()
        };
        let forest = IsolationForest::fit(data.view(), &params).unwrap();
        let dec = forest.decision_function(data.view()).unwrap();
        let below = dec.iter().filter(|d| **d < 0.0).count();
        assert!((30..=50).contains(&below), "{}", below);
    }

    #[test]
    fn same_seed_same_scores() {
        let data = cloud(128, 4);
        let params = ForestParams { seed: 5, ..ForestParams::default() };
        let a = IsolationForest::fit(data.view(), &params).unwrap();
        let b = IsolationForest::fit(data.view(), &params).unwrap();
        assert_eq!(
            a.decision_function(data.view()).unwrap(),
            b.decision_function(data.view()).unwrap()
        );
    }

    #[test]
    fn constant_data_fits_to_single_leaves() {
        let data = Array2::from_elem((10, 3), 1.0);
        let forest = IsolationForest::fit(data.view(), &ForestParams::default()).unwrap();
        let s = forest.decision_function(data.view()).unwrap();
        assert!(s.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn invalid_inputs_are_rejected() {
        let empty = Array2::<f64>::zeros((0, 3));
        assert!(IsolationForest::fit(empty.view(), &ForestParams::default()).is_err());
        let bad = ForestParams { contamination: Some(0.9), ..ForestParams::default() };
        assert!(IsolationForest::fit(cloud(10, 0).view(), &bad).is_err());
        let forest = IsolationForest::fit(cloud(10, 0).view(), &ForestParams::default()).unwrap();
        assert!(forest.decision_function(Array2::zeros((1, 2)).view()).is_err());
    }
}
