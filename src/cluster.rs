//!
//! K-means clustering of single observations
//!
//! Used to obtain the initial state assignment of the K-means HMM learner
//! and `HmmBuilder::opdf_clustering`.
//!
use crate::error::{HmmError, Result};
use log::debug;
use rand::Rng;

///
/// Observation type that can be clustered.
///
/// `distance` must be minimized in expectation by `centroid`, i.e. the
/// centroid of a set of points is the point minimizing the sum of
/// distances to them. Squared euclidean distance with the arithmetic mean
/// satisfies this, which makes the Lloyd iteration terminate.
///
pub trait Centroid: Clone {
    type Center: Clone + std::fmt::Debug;
    ///
    /// Center of a non-empty set of points
    ///
    fn centroid(points: &[&Self]) -> Self::Center;
    ///
    /// The point itself as a center
    ///
    fn to_center(&self) -> Self::Center;
    ///
    /// Distance from the point to the center
    ///
    fn distance(&self, center: &Self::Center) -> f64;
}

impl Centroid for f64 {
    type Center = f64;
    fn centroid(points: &[&f64]) -> f64 {
        points.iter().copied().sum::<f64>() / points.len() as f64
    }
    fn to_center(&self) -> f64 {
        *self
    }
    fn distance(&self, center: &f64) -> f64 {
        (self - center) * (self - center)
    }
}

impl Centroid for usize {
    type Center = f64;
    fn centroid(points: &[&usize]) -> f64 {
        points.iter().map(|&&x| x as f64).sum::<f64>() / points.len() as f64
    }
    fn to_center(&self) -> f64 {
        *self as f64
    }
    fn distance(&self, center: &f64) -> f64 {
        let d = *self as f64 - center;
        d * d
    }
}

///
/// Cluster labels of a fixed set of observations.
///
/// An observation is identified by its index in the slice given to
/// `KMeansCalculator::new`, so equal values appearing twice are two
/// independent members.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KMeansCalculator {
    n_clusters: usize,
    labels: Vec<usize>,
}

impl KMeansCalculator {
    ///
    /// Cluster `points` into `n_clusters` groups with k-means++ seeding and
    /// Lloyd iterations.
    ///
    /// If `n_clusters` exceeds the number of distinct points, the extra
    /// clusters are left empty.
    ///
    pub fn new<O: Centroid, R: Rng + ?Sized>(
        n_clusters: usize,
        points: &[O],
        rng: &mut R,
    ) -> Result<Self> {
        if n_clusters == 0 {
            return Err(HmmError::NoStates);
        }
        if points.is_empty() {
            return Err(HmmError::EmptySequence);
        }
        let centers = seed_centers(n_clusters, points, rng);
        let labels = points.iter().map(|x| nearest(x, &centers).0).collect();
        let mut calc = KMeansCalculator { n_clusters, labels };
        calc.lloyd(points, centers);
        Ok(calc)
    }
    ///
    /// Move each point to a strictly closer center until nothing moves.
    ///
    fn lloyd<O: Centroid>(&mut self, points: &[O], mut centers: Vec<O::Center>) {
        let mut n_round = 0;
        loop {
            for (k, center) in centers.iter_mut().enumerate() {
                let members = self.cluster(k, points);
                if !members.is_empty() {
                    *center = O::centroid(&members);
                }
            }
            let mut n_moved = 0;
            for (i, x) in points.iter().enumerate() {
                let (best, d_best) = nearest(x, &centers);
                if d_best < x.distance(&centers[self.labels[i]]) {
                    self.labels[i] = best;
                    n_moved += 1;
                }
            }
            n_round += 1;
            debug!("kmeans round={} moved={}", n_round, n_moved);
            if n_moved == 0 {
                break;
            }
        }
    }
    pub fn n_clusters(&self) -> usize {
        self.n_clusters
    }
    ///
    /// Cluster label of the i-th point
    ///
    pub fn label(&self, i: usize) -> usize {
        self.labels[i]
    }
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }
    ///
    /// Put the i-th point into cluster `k`
    ///
    pub fn assign(&mut self, i: usize, k: usize) {
        assert!(k < self.n_clusters);
        self.labels[i] = k;
    }
    ///
    /// Indices of the points in cluster `k`, in ascending order
    ///
    pub fn members(&self, k: usize) -> Vec<usize> {
        self.labels
            .iter()
            .enumerate()
            .filter(|(_, &l)| l == k)
            .map(|(i, _)| i)
            .collect()
    }
    ///
    /// Points in cluster `k`
    ///
    pub fn cluster<'a, O>(&self, k: usize, points: &'a [O]) -> Vec<&'a O> {
        self.labels
            .iter()
            .zip(points)
            .filter(|(&l, _)| l == k)
            .map(|(_, x)| x)
            .collect()
    }
}

///
/// (index, distance) of the nearest center. Ties go to the smallest index.
///
fn nearest<O: Centroid>(x: &O, centers: &[O::Center]) -> (usize, f64) {
    let mut best = (0, f64::INFINITY);
    for (k, c) in centers.iter().enumerate() {
        let d = x.distance(c);
        if d < best.1 {
            best = (k, d);
        }
    }
    best
}

///
/// k-means++ seeding: the first center is a uniformly random point, and the
/// next ones are drawn with probability proportional to the distance to
/// the nearest center chosen so far.
///
fn seed_centers<O: Centroid, R: Rng + ?Sized>(
    n_clusters: usize,
    points: &[O],
    rng: &mut R,
) -> Vec<O::Center> {
    let n = points.len();
    let mut centers = Vec::with_capacity(n_clusters);
    centers.push(points[rng.gen_range(0..n)].to_center());
    let mut dists: Vec<f64> = points.iter().map(|x| x.distance(&centers[0])).collect();

    for c in 1..n_clusters {
        let total: f64 = dists.iter().sum();
        let chosen = if total == 0.0 {
            // every point already coincides with a center
            c % n
        } else {
            let threshold = rng.gen::<f64>() * total;
            let mut cumulative = 0.0;
            let mut chosen = n - 1;
            for (i, &d) in dists.iter().enumerate() {
                cumulative += d;
                if d > 0.0 && cumulative >= threshold {
                    chosen = i;
                    break;
                }
            }
            chosen
        };
        let center = points[chosen].to_center();
        for (d, x) in dists.iter_mut().zip(points) {
            *d = d.min(x.distance(&center));
        }
        centers.push(center);
    }
    centers
}
