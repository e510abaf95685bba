//! Population statistics and the z-score outlier indicator.

/// Compute population-level mean and stddev per feature dimension.
///
/// Returns (means, stddevs). Stddevs are floored at EPSILON to avoid division by zero.
pub fn compute_population_stats(all_features: &[Vec<f64>]) -> (Vec<f64>, Vec<f64>) {
    if all_features.is_empty() {
        return (Vec::new(), Vec::new());
    }

    let dim = all_features[0].len();
    let n = all_features.len() as f64;

    let mut means = vec![0.0; dim];
    for fv in all_features {
        for i in 0..dim.min(fv.len()) {
            means[i] += fv[i];
        }
    }
    for m in &mut means {
        *m /= n;
    }

    let mut variance = vec![0.0; dim];
    for fv in all_features {
        for i in 0..dim.min(fv.len()) {
            let diff = fv[i] - means[i];
            variance[i] += diff * diff;
        }
    }

    let stddevs: Vec<f64> = variance
        .iter()
        .map(|v| (v / n).sqrt().max(f64::EPSILON))
        .collect();

    (means, stddevs)
}

/// Population standard deviation of a score vector.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt()
}

/// Outlier indicator for one row: `max|z| / 5`, clamped to [0, 1].
///
/// Dimensions without variance carry no signal and are skipped.
pub fn statistical_outlier_score(features: &[f64], pop_means: &[f64], pop_stddevs: &[f64]) -> f64 {
    let dim = features.len().min(pop_means.len()).min(pop_stddevs.len());
    if dim == 0 {
        return 0.0;
    }

    let max_z: f64 = (0..dim)
        .filter_map(|i| {
            let std = pop_stddevs[i];
            if std <= f64::EPSILON {
                None
            } else {
                Some(((features[i] - pop_means[i]) / std).abs())
            }
        })
        .fold(0.0, f64::max);

    (max_z / 5.0).min(1.0)
}
