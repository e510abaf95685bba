//! Isolation forest: an ensemble of randomized partitioning trees.
//!
//! Anomalies are isolated in fewer random splits than normal points, so a
//! short average path length across the ensemble means a high indicator.
//!
//! - [`IsolationForest::fit`] builds every tree from its own subsample.
//! - [`IsolationForest::score_samples`] returns `2^(-E[h(x)] / c(ψ))` per row,
//!   in (0, 1]; higher is more anomalous.
//!
//! Every random draw comes from the caller's seeded generator. Per-tree seeds
//! are drawn sequentially before any tree is built, so the parallel and
//! sequential paths produce identical forests.

use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

/// Euler–Mascheroni constant, used to approximate harmonic numbers.
const EULER_GAMMA: f64 = 0.577_215_664_9;

#[derive(Debug, Clone)]
pub struct IsolationForestParams {
    pub n_trees: usize,
    /// Upper bound on rows drawn (without replacement) per tree.
    pub max_samples: usize,
    /// Expected outlier fraction; selects the decision offset only.
    pub contamination: f64,
    /// Build and score on the rayon pool.
    pub parallel: bool,
}

impl Default for IsolationForestParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_samples: 256,
            contamination: 0.1,
            parallel: true,
        }
    }
}

#[derive(Debug, Clone)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        size: usize,
    },
}

/// One isolation tree, stored as an arena with the root at index 0.
#[derive(Debug, Clone)]
pub struct IsolationTree {
    nodes: Vec<Node>,
}

impl IsolationTree {
    fn build(data: &[Vec<f64>], sample: Vec<usize>, max_depth: usize, rng: &mut StdRng) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        tree.grow(data, sample, 0, max_depth, rng);
        tree
    }

    /// Append the subtree for `rows` and return its node index.
    fn grow(
        &mut self,
        data: &[Vec<f64>],
        rows: Vec<usize>,
        depth: usize,
        max_depth: usize,
        rng: &mut StdRng,
    ) -> usize {
        let id = self.nodes.len();
        self.nodes.push(Node::Leaf { size: rows.len() });

        if rows.len() <= 1 || depth >= max_depth {
            return id;
        }

        // (feature, min, max) for every feature with spread in this node.
        let dim = data[rows[0]].len();
        let candidates: Vec<(usize, f64, f64)> = (0..dim)
            .filter_map(|f| {
                let (lo, hi) = rows.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &r| {
                    (lo.min(data[r][f]), hi.max(data[r][f]))
                });
                (hi > lo).then_some((f, lo, hi))
            })
            .collect();

        if candidates.is_empty() {
            return id;
        }

        let (feature, lo, hi) = candidates[rng.gen_range(0..candidates.len())];
        let threshold = split_threshold(lo, hi, rng);
        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) =
            rows.into_iter().partition(|&r| data[r][feature] <= threshold);

        let left = self.grow(data, left_rows, depth + 1, max_depth, rng);
        let right = self.grow(data, right_rows, depth + 1, max_depth, rng);
        self.nodes[id] = Node::Split {
            feature,
            threshold,
            left,
            right,
        };
        id
    }

    /// Depth at which `point` is isolated plus `c(leaf size)`.
    pub fn path_length(&self, point: &[f64]) -> f64 {
        let mut idx = 0;
        let mut depth = 0usize;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { size } => return depth as f64 + average_path_length(*size),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if point[*feature] <= *threshold { *left } else { *right };
                    depth += 1;
                }
            }
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

/// `c(n)`: average path length of an unsuccessful BST search over `n` points.
pub fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

#[derive(Debug, Clone)]
pub struct IsolationForest {
    trees: Vec<IsolationTree>,
    sample_size: usize,
    offset: f64,
    parallel: bool,
}

impl IsolationForest {
    /// Fit on `data` (rows of equal width). Returns `None` for an empty matrix.
    pub fn fit(data: &[Vec<f64>], params: &IsolationForestParams, rng: &mut StdRng) -> Option<Self> {
        if data.is_empty() || params.n_trees == 0 {
            return None;
        }

        let n = data.len();
        let sample_size = params.max_samples.max(1).min(n);
        let max_depth = (sample_size as f64).log2().ceil() as usize;

        let seeds: Vec<u64> = (0..params.n_trees).map(|_| rng.gen()).collect();
        let build = |seed: &u64| {
            let mut tree_rng = StdRng::seed_from_u64(*seed);
            let sample = index::sample(&mut tree_rng, n, sample_size).into_vec();
            IsolationTree::build(data, sample, max_depth, &mut tree_rng)
        };
        let trees: Vec<IsolationTree> = if params.parallel {
            seeds.par_iter().map(build).collect()
        } else {
            seeds.iter().map(build).collect()
        };

        let mut forest = Self {
            trees,
            sample_size,
            offset: 0.0,
            parallel: params.parallel,
        };
        let training_scores = forest.score_samples(data);
        forest.offset = upper_quantile(&training_scores, params.contamination);
        Some(forest)
    }

    /// Anomaly indicator per row, in (0, 1].
    pub fn score_samples(&self, data: &[Vec<f64>]) -> Vec<f64> {
        let norm = average_path_length(self.sample_size);
        let score_row = |row: &Vec<f64>| {
            // Summed in tree order so the result does not depend on threading.
            let total: f64 = self.trees.iter().map(|t| t.path_length(row)).sum();
            let mean = total / self.trees.len() as f64;
            if norm > 0.0 {
                2f64.powf(-mean / norm)
            } else {
                1.0
            }
        };
        if self.parallel {
            data.par_iter().map(score_row).collect()
        } else {
            data.iter().map(score_row).collect()
        }
    }

    /// Indicator value above which the `contamination` fraction of the
    /// training rows lies.
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Rows of `scores` strictly above the decision offset.
    pub fn count_outliers(&self, scores: &[f64]) -> usize {
        scores.iter().filter(|s| **s > self.offset).count()
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    pub fn trees(&self) -> &[IsolationTree] {
        &self.trees
    }
}

/// Uniform draw in `[lo, hi)`. Spans wider than `f64::MAX` are drawn on the
/// halved range and scaled back up.
fn split_threshold(lo: f64, hi: f64, rng: &mut StdRng) -> f64 {
    if (hi - lo).is_finite() {
        return rng.gen_range(lo..hi);
    }
    let half_lo = lo * 0.5;
    let t = (half_lo + rng.gen::<f64>() * (hi * 0.5 - half_lo)) * 2.0;
    if t >= lo && t < hi {
        t
    } else {
        half_lo + hi * 0.5
    }
}

/// Value with a `fraction` share of `values` above it (linear interpolation).
pub fn upper_quantile(values: &[f64], fraction: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let q = (1.0 - fraction).clamp(0.0, 1.0);
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clustered_with_outlier() -> Vec<Vec<f64>> {
        let mut data: Vec<Vec<f64>> = (0..40)
            .map(|i| vec![10.0 + (i % 5) as f64 * 0.1, 20.0 + (i % 7) as f64 * 0.1])
            .collect();
        data.push(vec![500.0, -300.0]);
        data
    }

    fn params(parallel: bool) -> IsolationForestParams {
        IsolationForestParams {
            n_trees: 50,
            parallel,
            ..Default::default()
        }
    }

    #[test]
    fn average_path_length_base_cases() {
        assert_eq!(average_path_length(0), 0.0);
        assert_eq!(average_path_length(1), 0.0);
        assert_eq!(average_path_length(2), 1.0);
        let c256 = average_path_length(256);
        assert!((c256 - 10.24).abs() < 0.05, "c(256) = {}", c256);
    }

    #[test]
    fn outlier_scores_highest() {
        let data = clustered_with_outlier();
        let forest = IsolationForest::fit(&data, &params(false), &mut StdRng::seed_from_u64(7)).unwrap();
        let scores = forest.score_samples(&data);

        let outlier = scores[data.len() - 1];
        assert!(scores[..data.len() - 1].iter().all(|s| *s < outlier));
        assert!(scores.iter().all(|s| *s > 0.0 && *s <= 1.0));
        assert!(forest.count_outliers(&scores) >= 1);
    }

    #[test]
    fn same_seed_same_scores() {
        let data = clustered_with_outlier();
        let a = IsolationForest::fit(&data, &params(false), &mut StdRng::seed_from_u64(42)).unwrap();
        let b = IsolationForest::fit(&data, &params(false), &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a.score_samples(&data), b.score_samples(&data));
    }

    #[test]
    fn parallel_matches_sequential() {
        let data = clustered_with_outlier();
        let seq = IsolationForest::fit(&data, &params(false), &mut StdRng::seed_from_u64(3)).unwrap();
        let par = IsolationForest::fit(&data, &params(true), &mut StdRng::seed_from_u64(3)).unwrap();
        assert_eq!(seq.score_samples(&data), par.score_samples(&data));
        assert_eq!(seq.offset(), par.offset());
    }

    #[test]
    fn subsample_capped_by_rows() {
        let data = clustered_with_outlier();
        let p = IsolationForestParams {
            n_trees: 3,
            max_samples: 16,
            ..Default::default()
        };
        let forest = IsolationForest::fit(&data, &p, &mut StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(forest.sample_size(), 16);
        assert_eq!(forest.n_trees(), 3);
        // Depth is capped at ceil(log2(16)) = 4, so at most 31 nodes.
        assert!(forest.trees().iter().all(|t| t.node_count() <= 31));

        let small = &data[..5];
        let forest = IsolationForest::fit(small, &p, &mut StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(forest.sample_size(), 5);
    }

    #[test]
    fn constant_data_yields_single_leaf_trees() {
        let data = vec![vec![1.0, 2.0]; 10];
        let forest = IsolationForest::fit(&data, &params(false), &mut StdRng::seed_from_u64(0)).unwrap();
        assert!(forest.trees().iter().all(|t| t.node_count() == 1));
        let scores = forest.score_samples(&data);
        assert!(scores.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn empty_input_has_no_model() {
        assert!(IsolationForest::fit(&[], &params(false), &mut StdRng::seed_from_u64(0)).is_none());
    }

    #[test]
    fn extreme_magnitudes_split_without_overflow() {
        let data: Vec<Vec<f64>> = [1e308, -1e308, 1.0, 2.0, 3.0, 4.0, f64::MAX, f64::MIN]
            .iter()
            .map(|v| vec![*v])
            .collect();
        let forest = IsolationForest::fit(&data, &params(false), &mut StdRng::seed_from_u64(3)).unwrap();
        let scores = forest.score_samples(&data);
        assert!(scores.iter().all(|s| s.is_finite() && *s > 0.0 && *s <= 1.0));

        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..1000 {
            let t = split_threshold(f64::MIN, f64::MAX, &mut rng);
            assert!(t >= f64::MIN && t < f64::MAX);
        }
    }

    #[test]
    fn upper_quantile_interpolates() {
        let values = [0.0, 1.0, 2.0, 3.0, 4.0];
        assert_eq!(upper_quantile(&values, 0.25), 3.0);
        assert!((upper_quantile(&values, 0.1) - 3.6).abs() < 1e-12);
        assert_eq!(upper_quantile(&[], 0.1), 0.0);
    }
}
