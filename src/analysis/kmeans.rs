//! k-means clustering in normalized feature space.
//!
//! Lloyd iterations seeded with k-means++, restarted `n_init` times from
//! seeds derived off one master seed. The lowest-inertia run wins, so a
//! given seed and population always produce the same model.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

use super::types::{FeatureVector, FEATURE_COUNT};

/// Below this a training radius is treated as zero.
const DISTANCE_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KMeansParams {
    pub k: usize,
    pub n_init: usize,
    pub max_iterations: usize,
    pub seed: u64,
}

/// Frozen clustering state. Only inference reads it after fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterModel {
    centroids: Vec<FeatureVector>,
    /// Largest point-to-own-centroid distance seen in training.
    max_observed_distance: f64,
    inertia: f64,
    silhouette: f64,
    sizes: Vec<usize>,
    iterations: usize,
}

/// One Lloyd run from one seeding.
struct Run {
    centroids: Vec<FeatureVector>,
    labels: Vec<usize>,
    inertia: f64,
    iterations: usize,
}

impl ClusterModel {
    /// Fit on normalized points. Returns the model and the training label of
    /// every point.
    pub fn fit(
        points: &[FeatureVector],
        params: KMeansParams,
    ) -> Result<(Self, Vec<usize>), AnalysisError> {
        if params.k == 0 || params.n_init == 0 || params.max_iterations == 0 {
            return Err(AnalysisError::InvalidConfiguration(format!(
                "k, n_init and max_iterations must be positive (got {}, {}, {})",
                params.k, params.n_init, params.max_iterations
            )));
        }
        if points.len() < params.k {
            return Err(AnalysisError::InsufficientData(format!(
                "{} records cannot form {} clusters",
                points.len(),
                params.k
            )));
        }

        let mut master = StdRng::seed_from_u64(params.seed);
        let mut best: Option<Run> = None;

        for run_idx in 0..params.n_init {
            let mut rng = StdRng::seed_from_u64(master.gen::<u64>());
            let run = lloyd(points, params.k, params.max_iterations, &mut rng);

            tracing::debug!(
                run = run_idx,
                inertia = run.inertia,
                iterations = run.iterations,
                "k-means run finished"
            );

            if best.as_ref().map_or(true, |b| run.inertia < b.inertia) {
                best = Some(run);
            }
        }

        let Some(run) = best else {
            return Err(AnalysisError::InvalidConfiguration(
                "n_init must be positive".into(),
            ));
        };

        let mut sizes = vec![0usize; params.k];
        let mut max_observed_distance = 0.0_f64;
        for (point, &label) in points.iter().zip(&run.labels) {
            sizes[label] += 1;
            max_observed_distance = max_observed_distance.max(distance(point, &run.centroids[label]));
        }

        let silhouette = silhouette_score(points, &run.labels, params.k);

        let model = Self {
            centroids: run.centroids,
            max_observed_distance,
            inertia: run.inertia,
            silhouette,
            sizes,
            iterations: run.iterations,
        };
        Ok((model, run.labels))
    }

    /// Nearest centroid and the distance to it. Ties go to the lower index.
    pub fn assign(&self, point: &FeatureVector) -> (usize, f64) {
        nearest(&self.centroids, point)
    }

    /// `1 - distance / max_observed_distance`, clamped to [0, 1].
    ///
    /// A zero training radius (every member sat on its centroid) gives 1
    /// for a point on a centroid and 0 for anything else.
    pub fn similarity(&self, distance: f64) -> f64 {
        if self.max_observed_distance <= DISTANCE_EPSILON {
            return if distance <= DISTANCE_EPSILON { 1.0 } else { 0.0 };
        }
        (1.0 - distance / self.max_observed_distance).clamp(0.0, 1.0)
    }

    pub fn k(&self) -> usize {
        self.centroids.len()
    }

    pub fn centroids(&self) -> &[FeatureVector] {
        &self.centroids
    }

    pub fn max_observed_distance(&self) -> f64 {
        self.max_observed_distance
    }

    pub fn inertia(&self) -> f64 {
        self.inertia
    }

    pub fn silhouette(&self) -> f64 {
        self.silhouette
    }

    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }
}

fn lloyd(points: &[FeatureVector], k: usize, max_iterations: usize, rng: &mut StdRng) -> Run {
    let mut centroids = seed_plus_plus(points, k, rng);
    let mut labels = vec![usize::MAX; points.len()];
    let mut iterations = 0;

    for _ in 0..max_iterations {
        iterations += 1;

        let mut changed = false;
        for (i, point) in points.iter().enumerate() {
            let (cluster, _) = nearest(&centroids, point);
            if labels[i] != cluster {
                labels[i] = cluster;
                changed = true;
            }
        }

        if reseed_empty_clusters(points, &mut centroids, &mut labels) {
            changed = true;
        }

        centroids = recompute_centroids(points, &labels, k);

        if !changed {
            break;
        }
    }

    let inertia = points
        .iter()
        .zip(&labels)
        .map(|(p, &l)| squared_distance(p, &centroids[l]))
        .sum();

    Run {
        centroids,
        labels,
        inertia,
        iterations,
    }
}

/// k-means++: first centre uniform, each next one drawn with probability
/// proportional to squared distance from the nearest chosen centre.
fn seed_plus_plus(points: &[FeatureVector], k: usize, rng: &mut StdRng) -> Vec<FeatureVector> {
    let mut chosen: Vec<usize> = Vec::with_capacity(k);
    chosen.push(rng.gen_range(0..points.len()));

    let mut closest: Vec<f64> = points
        .iter()
        .map(|p| squared_distance(p, &points[chosen[0]]))
        .collect();

    while chosen.len() < k {
        let total: f64 = closest.iter().sum();

        let next = if total <= DISTANCE_EPSILON {
            // Remaining points all coincide with a centre.
            (0..points.len()).find(|i| !chosen.contains(i)).unwrap_or(0)
        } else {
            let target = rng.gen::<f64>() * total;
            let mut acc = 0.0;
            let mut pick = points.len() - 1;
            for (i, d) in closest.iter().enumerate() {
                acc += d;
                if acc > target && *d > 0.0 {
                    pick = i;
                    break;
                }
            }
            pick
        };

        chosen.push(next);
        for (i, p) in points.iter().enumerate() {
            closest[i] = closest[i].min(squared_distance(p, &points[next]));
        }
    }

    chosen.into_iter().map(|i| points[i]).collect()
}

/// Give every empty cluster the point farthest from its own centroid,
/// taken only from clusters that keep at least one member. Returns whether
/// any label moved.
fn reseed_empty_clusters(
    points: &[FeatureVector],
    centroids: &mut [FeatureVector],
    labels: &mut [usize],
) -> bool {
    let k = centroids.len();
    let mut moved = false;

    for empty in 0..k {
        let mut sizes = vec![0usize; k];
        for &l in labels.iter() {
            sizes[l] += 1;
        }
        if sizes[empty] > 0 {
            continue;
        }

        let mut donor: Option<(usize, f64)> = None;
        for (i, point) in points.iter().enumerate() {
            if sizes[labels[i]] < 2 {
                continue;
            }
            let d = distance(point, &centroids[labels[i]]);
            if donor.map_or(true, |(_, best)| d > best) {
                donor = Some((i, d));
            }
        }

        if let Some((i, _)) = donor {
            labels[i] = empty;
            centroids[empty] = points[i];
            moved = true;
        }
    }

    moved
}

fn recompute_centroids(points: &[FeatureVector], labels: &[usize], k: usize) -> Vec<FeatureVector> {
    let mut sums = vec![[0.0; FEATURE_COUNT]; k];
    let mut counts = vec![0usize; k];

    for (point, &label) in points.iter().zip(labels) {
        counts[label] += 1;
        for j in 0..FEATURE_COUNT {
            sums[label][j] += point[j];
        }
    }

    for (sum, &count) in sums.iter_mut().zip(&counts) {
        if count > 0 {
            for x in sum.iter_mut() {
                *x /= count as f64;
            }
        }
    }
    sums
}

fn nearest(centroids: &[FeatureVector], point: &FeatureVector) -> (usize, f64) {
    let mut best = (0, f64::INFINITY);
    for (idx, centroid) in centroids.iter().enumerate() {
        let d = distance(point, centroid);
        if d < best.1 {
            best = (idx, d);
        }
    }
    best
}

fn squared_distance(a: &FeatureVector, b: &FeatureVector) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum()
}

pub(crate) fn distance(a: &FeatureVector, b: &FeatureVector) -> f64 {
    squared_distance(a, b).sqrt()
}

/// Mean silhouette coefficient. Members of singleton clusters score 0, and
/// a single cluster scores 0 overall.
pub fn silhouette_score(points: &[FeatureVector], labels: &[usize], k: usize) -> f64 {
    if k < 2 || points.len() < 2 {
        return 0.0;
    }

    let mut total = 0.0;
    for (i, point) in points.iter().enumerate() {
        let mut sums = vec![0.0; k];
        let mut counts = vec![0usize; k];
        for (j, other) in points.iter().enumerate() {
            if i == j {
                continue;
            }
            sums[labels[j]] += distance(point, other);
            counts[labels[j]] += 1;
        }

        let own = labels[i];
        if counts[own] == 0 {
            continue;
        }
        let a = sums[own] / counts[own] as f64;
        let b = (0..k)
            .filter(|&c| c != own && counts[c] > 0)
            .map(|c| sums[c] / counts[c] as f64)
            .fold(f64::INFINITY, f64::min);
        if !b.is_finite() {
            continue;
        }

        let denom = a.max(b);
        if denom > 0.0 {
            total += (b - a) / denom;
        }
    }

    total / points.len() as f64
}
