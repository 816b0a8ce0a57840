use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

use super::types::{
    FeatureVector, PatternInterpretation, PatternReading, FEATURE_COUNT, FEATURE_LABELS,
    FEATURE_NAMES,
};

const JACOBI_MAX_SWEEPS: usize = 100;
const JACOBI_TOLERANCE: f64 = 1e-22;

/// Coordinates beyond this many standard units read as above/below average.
const DIRECTION_THRESHOLD: f64 = 0.5;

type Matrix = [[f64; FEATURE_COUNT]; FEATURE_COUNT];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureLoading {
    pub feature: String,
    pub loading: f64,
}

/// One principal direction in normalized space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternAxis {
    pub components: FeatureVector,
    pub eigenvalue: f64,
    pub explained_variance_ratio: f64,
    /// Strongest loadings by magnitude, largest first.
    pub top_features: Vec<FeatureLoading>,
}

/// Principal-component projection used only for interpretation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternReducer {
    mean: FeatureVector,
    axes: Vec<PatternAxis>,
}

impl PatternReducer {
    /// Fit `n_components` axes on normalized training vectors.
    pub fn fit(
        points: &[FeatureVector],
        n_components: usize,
        top_loadings: usize,
    ) -> Result<Self, AnalysisError> {
        if n_components == 0 || n_components >= FEATURE_COUNT {
            return Err(AnalysisError::InvalidConfiguration(format!(
                "pattern axes must be between 1 and {}, got {n_components}",
                FEATURE_COUNT - 1
            )));
        }
        if points.len() < 2 {
            return Err(AnalysisError::InsufficientData(
                "need at least 2 records to extract patterns".into(),
            ));
        }

        let n = points.len() as f64;
        let mut mean = [0.0; FEATURE_COUNT];
        for p in points {
            for j in 0..FEATURE_COUNT {
                mean[j] += p[j] / n;
            }
        }

        let mut cov: Matrix = [[0.0; FEATURE_COUNT]; FEATURE_COUNT];
        for p in points {
            for i in 0..FEATURE_COUNT {
                let di = p[i] - mean[i];
                for j in i..FEATURE_COUNT {
                    cov[i][j] += di * (p[j] - mean[j]);
                }
            }
        }
        for i in 0..FEATURE_COUNT {
            for j in i..FEATURE_COUNT {
                cov[i][j] /= n - 1.0;
                cov[j][i] = cov[i][j];
            }
        }

        let (eigenvalues, eigenvectors) = jacobi_eigen(cov);

        let total_variance: f64 = eigenvalues.iter().map(|v| v.max(0.0)).sum();
        let mut order: Vec<usize> = (0..FEATURE_COUNT).collect();
        order.sort_by(|&a, &b| eigenvalues[b].total_cmp(&eigenvalues[a]).then(a.cmp(&b)));

        let axes = order
            .into_iter()
            .take(n_components)
            .map(|col| {
                let mut components = [0.0; FEATURE_COUNT];
                for (row, slot) in components.iter_mut().enumerate() {
                    *slot = eigenvectors[row][col];
                }
                fix_sign(&mut components);

                let eigenvalue = eigenvalues[col].max(0.0);
                let explained_variance_ratio = if total_variance > 0.0 {
                    eigenvalue / total_variance
                } else {
                    0.0
                };

                PatternAxis {
                    top_features: top_loadings_of(&components, top_loadings),
                    components,
                    eigenvalue,
                    explained_variance_ratio,
                }
            })
            .collect();

        Ok(Self { mean, axes })
    }

    pub fn axes(&self) -> &[PatternAxis] {
        &self.axes
    }

    pub fn explained_variance_ratio(&self) -> Vec<f64> {
        self.axes.iter().map(|a| a.explained_variance_ratio).collect()
    }

    /// Coordinates of a normalized vector on each axis.
    pub fn transform(&self, normalized: &FeatureVector) -> Vec<f64> {
        self.axes
            .iter()
            .map(|axis| {
                axis.components
                    .iter()
                    .zip(normalized.iter().zip(&self.mean))
                    .map(|(c, (x, m))| c * (x - m))
                    .sum()
            })
            .collect()
    }

    /// Sum of absolute loadings per feature across all axes.
    pub fn feature_importance(&self) -> BTreeMap<String, f64> {
        FEATURE_NAMES
            .iter()
            .enumerate()
            .map(|(j, name)| {
                let weight = self.axes.iter().map(|a| a.components[j].abs()).sum();
                (name.to_string(), weight)
            })
            .collect()
    }

    /// Project a normalized vector and describe where it sits on each axis.
    pub fn interpret(&self, normalized: &FeatureVector) -> PatternInterpretation {
        let readings = self
            .transform(normalized)
            .into_iter()
            .zip(&self.axes)
            .enumerate()
            .map(|(idx, (coordinate, axis))| {
                let drivers: Vec<String> =
                    axis.top_features.iter().map(|f| f.feature.clone()).collect();
                let summary = describe_axis(idx + 1, coordinate, axis, &drivers);
                PatternReading {
                    axis: idx + 1,
                    coordinate,
                    explained_variance_ratio: axis.explained_variance_ratio,
                    drivers,
                    summary,
                }
            })
            .collect();

        PatternInterpretation {
            readings,
            feature_importance: self.feature_importance(),
        }
    }
}

fn describe_axis(number: usize, coordinate: f64, axis: &PatternAxis, drivers: &[String]) -> String {
    let position = if coordinate > DIRECTION_THRESHOLD {
        "above"
    } else if coordinate < -DIRECTION_THRESHOLD {
        "below"
    } else {
        "near"
    };

    format!(
        "Pattern {number} ({:.0}% of variation) is primarily driven by {}; this patient sits {position} the population average.",
        axis.explained_variance_ratio * 100.0,
        join_names(drivers)
    )
}

/// "a", "a and b", "a, b and c"
fn join_names(names: &[String]) -> String {
    match names {
        [] => "no single feature".to_string(),
        [one] => one.clone(),
        [init @ .., last] => format!("{} and {last}", init.join(", ")),
    }
}

fn top_loadings_of(components: &FeatureVector, count: usize) -> Vec<FeatureLoading> {
    let mut ranked: Vec<usize> = (0..FEATURE_COUNT).collect();
    ranked.sort_by(|&a, &b| {
        components[b]
            .abs()
            .total_cmp(&components[a].abs())
            .then(a.cmp(&b))
    });
    ranked
        .into_iter()
        .take(count)
        .map(|j| FeatureLoading {
            feature: FEATURE_LABELS[j].to_string(),
            loading: components[j],
        })
        .collect()
}

/// Flip the axis so its largest-magnitude loading is positive.
fn fix_sign(components: &mut FeatureVector) {
    let mut pivot = 0;
    for j in 1..FEATURE_COUNT {
        if components[j].abs() > components[pivot].abs() {
            pivot = j;
        }
    }
    if components[pivot] < 0.0 {
        for c in components.iter_mut() {
            *c = -*c;
        }
    }
}

/// Cyclic Jacobi eigen-decomposition of a symmetric matrix. Returns the
/// eigenvalues and a matrix whose columns are the matching unit eigenvectors.
fn jacobi_eigen(mut a: Matrix) -> (FeatureVector, Matrix) {
    let n = FEATURE_COUNT;
    let mut v: Matrix = [[0.0; FEATURE_COUNT]; FEATURE_COUNT];
    for (i, row) in v.iter_mut().enumerate() {
        row[i] = 1.0;
    }

    for _ in 0..JACOBI_MAX_SWEEPS {
        let off: f64 = (0..n)
            .flat_map(|i| (0..n).filter(move |&j| j != i).map(move |j| (i, j)))
            .map(|(i, j)| a[i][j] * a[i][j])
            .sum();
        if off < JACOBI_TOLERANCE {
            break;
        }

        for p in 0..n {
            for q in (p + 1)..n {
                if a[p][q].abs() < f64::MIN_POSITIVE {
                    continue;
                }

                let theta = (a[q][q] - a[p][p]) / (2.0 * a[p][q]);
                let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
                let t = if theta == 0.0 { 1.0 } else { t };
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;

                for k in 0..n {
                    let akp = a[k][p];
                    let akq = a[k][q];
                    a[k][p] = c * akp - s * akq;
                    a[k][q] = s * akp + c * akq;
                }
                for k in 0..n {
                    let apk = a[p][k];
                    let aqk = a[q][k];
                    a[p][k] = c * apk - s * aqk;
                    a[q][k] = s * apk + c * aqk;
                }
                for row in v.iter_mut() {
                    let vkp = row[p];
                    let vkq = row[q];
                    row[p] = c * vkp - s * vkq;
                    row[q] = s * vkp + c * vkq;
                }
            }
        }
    }

    let mut eigenvalues = [0.0; FEATURE_COUNT];
    for (i, value) in eigenvalues.iter_mut().enumerate() {
        *value = a[i][i];
    }
    (eigenvalues, v)
}
