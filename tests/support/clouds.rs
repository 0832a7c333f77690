#![allow(dead_code)]

use nalgebra::Vector3;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use symmetry_sampling::PointCloud;

/// Random points in a cube, rejection-sampled so every pair is at least
/// `min_spacing` apart.
pub fn separated_cloud(n: usize, min_spacing: f64, seed: u64) -> PointCloud {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let extent = min_spacing * (n as f64).cbrt() * 4.0;
    let mut points: Vec<Vector3<f64>> = Vec::with_capacity(n);
    while points.len() < n {
        let candidate = Vector3::new(
            rng.gen_range(0.0..extent),
            rng.gen_range(0.0..extent),
            rng.gen_range(0.0..extent),
        );
        if points
            .iter()
            .all(|point| (point - candidate).norm() >= min_spacing)
        {
            points.push(candidate);
        }
    }
    PointCloud::new(points)
}

/// Two points `spacing` apart along x.
pub fn close_pair(spacing: f64) -> PointCloud {
    PointCloud::new(vec![
        Vector3::new(0.0, 0.0, 0.0),
        Vector3::new(spacing, 0.0, 0.0),
    ])
}

/// A center point followed by two colinear outer points, slightly
/// asymmetric so nearest-neighbor ordering is deterministic.
pub fn symmetric_triple(spacing: f64) -> PointCloud {
    PointCloud::new(vec![
        Vector3::new(0.0, 0.0, 0.0),
        Vector3::new(-spacing, 0.0, 0.0),
        Vector3::new(spacing * 1.1, 0.0, 0.0),
    ])
}
