//! Weighted Gaussian point summaries and their fusion.

use nalgebra::{Matrix3, Vector3};

/// Full extent of one covariance-ellipsoid axis per unit standard
/// deviation. 1.73 approximates the half-width (in sigmas) covering a
/// uniform distribution of matching variance.
const AXIS_EXTENT: f64 = 2.0 * 1.73;

/// A weighted Gaussian summary standing in for one or more cloud points.
///
/// `deviation` is the unnormalized scatter accumulator of the summarized
/// points; their covariance is `deviation / omega`. The fields are private
/// so the cached volume can only be populated while they are stable:
/// construction and [`combine`](Distribution::combine) are the only ways a
/// distribution comes into being, and both leave the cache cleared.
#[derive(Debug, Clone)]
pub struct Distribution {
    point: Vector3<f64>,
    omega: f64,
    deviation: Matrix3<f64>,
    volume: Option<f64>,
    times: Vec<i64>,
    descriptors: Vec<f64>,
}

impl Distribution {
    /// Create a distribution with an uncomputed volume.
    ///
    /// `omega` must be positive for every distribution that enters a
    /// sampling pass; a zero weight makes the covariance (and therefore the
    /// volume) degenerate, which silently disqualifies the distribution
    /// from every merge.
    pub fn new(
        point: Vector3<f64>,
        omega: f64,
        deviation: Matrix3<f64>,
        times: Vec<i64>,
        descriptors: Vec<f64>,
    ) -> Self {
        Self {
            point,
            omega,
            deviation,
            volume: None,
            times,
            descriptors,
        }
    }

    /// Mean position.
    #[inline]
    pub fn point(&self) -> Vector3<f64> {
        self.point
    }

    /// Weight; proportional to the count/confidence of summarized points.
    #[inline]
    pub fn omega(&self) -> f64 {
        self.omega
    }

    /// Unnormalized scatter accumulator.
    #[inline]
    pub fn deviation(&self) -> &Matrix3<f64> {
        &self.deviation
    }

    /// Normalized covariance (`deviation / omega`).
    #[inline]
    pub fn covariance(&self) -> Matrix3<f64> {
        self.deviation / self.omega
    }

    /// Per-point time payload.
    #[inline]
    pub fn times(&self) -> &[i64] {
        &self.times
    }

    /// Per-point descriptor payload (the full descriptor row of the source
    /// cloud point, all channels included).
    #[inline]
    pub fn descriptors(&self) -> &[f64] {
        &self.descriptors
    }

    /// Fuse two weighted summaries into one.
    ///
    /// The merged mean is computed relative to `d2` to avoid cancellation
    /// bias, and the scatter follows the exact parallel-axis theorem, so
    /// the fusion is associative up to floating-point rounding.
    ///
    /// The `times`/`descriptors` payload is taken from `d1` unchanged
    /// rather than averaged; callers that care which payload survives
    /// must order the operands accordingly.
    pub fn combine(d1: &Distribution, d2: &Distribution) -> Distribution {
        let omega_c = d1.omega + d2.omega;
        let delta = d1.point - d2.point;

        let point_c = d2.point + (d1.omega / omega_c) * delta;
        let deviation_c = d1.deviation
            + d2.deviation
            + (d1.omega * d2.omega / omega_c) * (delta * delta.transpose());

        Distribution::new(
            point_c,
            omega_c,
            deviation_c,
            d1.times.clone(),
            d1.descriptors.clone(),
        )
    }

    /// Ellipsoid-extent proxy derived from the covariance eigenvalues,
    /// computed on first read and cached.
    ///
    /// Numerical noise can push an eigenvalue of a rank-deficient
    /// covariance slightly negative; the resulting NaN volume is left
    /// as is, since every acceptance test is a strict `<` comparison
    /// that NaN fails.
    pub fn volume(&mut self) -> f64 {
        if let Some(volume) = self.volume {
            return volume;
        }
        let eigen = self.covariance().symmetric_eigen();
        let volume = eigen
            .eigenvalues
            .iter()
            .map(|eigenvalue| AXIS_EXTENT * eigenvalue.sqrt())
            .product();
        self.volume = Some(volume);
        volume
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn isotropic(point: [f64; 3], omega: f64, variance: f64) -> Distribution {
        Distribution::new(
            Vector3::new(point[0], point[1], point[2]),
            omega,
            Matrix3::identity() * variance * omega,
            vec![],
            vec![],
        )
    }

    #[test]
    fn test_combine_weights_are_additive() {
        let a = isotropic([0.0, 0.0, 0.0], 1.5, 0.01);
        let b = isotropic([1.0, 0.0, 0.0], 2.5, 0.01);
        let c = Distribution::combine(&a, &b);
        assert_eq!(c.omega(), 4.0);
    }

    #[test]
    fn test_self_combination_keeps_position() {
        let d = isotropic([3.0, -2.0, 7.0], 2.0, 0.04);
        let c = Distribution::combine(&d, &d);
        assert_eq!(c.point(), d.point());
        assert_eq!(c.omega(), 2.0 * d.omega());
    }

    #[test]
    fn test_combine_applies_parallel_axis_term() {
        // Two unit-weight point masses at x = -1 and x = 1: the merged
        // scatter is (w1*w2 / (w1+w2)) * delta * delta^T = 0.5 * 4 along x.
        let a = Distribution::new(Vector3::new(1.0, 0.0, 0.0), 1.0, Matrix3::zeros(), vec![], vec![]);
        let b = Distribution::new(Vector3::new(-1.0, 0.0, 0.0), 1.0, Matrix3::zeros(), vec![], vec![]);
        let c = Distribution::combine(&a, &b);

        assert_eq!(c.point(), Vector3::new(0.0, 0.0, 0.0));
        assert_eq!(c.deviation()[(0, 0)], 2.0);
        assert_eq!(c.deviation()[(1, 1)], 0.0);
        assert_eq!(c.deviation()[(2, 2)], 0.0);
    }

    #[test]
    fn test_three_way_combination_is_associative() {
        let a = isotropic([0.0, 0.0, 0.0], 1.0, 0.01);
        let b = isotropic([0.2, -0.1, 0.4], 2.0, 0.02);
        let c = isotropic([-0.3, 0.5, 0.1], 0.5, 0.03);

        let left = Distribution::combine(&Distribution::combine(&a, &b), &c);
        let right = Distribution::combine(&a, &Distribution::combine(&b, &c));

        // Direct three-mass fusion, independent of fold order.
        let omega = a.omega() + b.omega() + c.omega();
        let mean = (a.omega() * a.point() + b.omega() * b.point() + c.omega() * c.point()) / omega;
        let mut deviation = *a.deviation() + *b.deviation() + *c.deviation();
        for d in [&a, &b, &c] {
            let delta = d.point() - mean;
            deviation += d.omega() * delta * delta.transpose();
        }

        for folded in [&left, &right] {
            assert!((folded.omega() - omega).abs() < 1e-12);
            assert!((folded.point() - mean).norm() < 1e-12);
            assert!((folded.deviation() - deviation).norm() < 1e-9);
        }
    }

    #[test]
    fn test_volume_of_isotropic_covariance() {
        let variance = 0.0009;
        let mut d = isotropic([0.0, 0.0, 0.0], 2.0, variance);
        let expected = (2.0 * 1.73 * variance.sqrt()).powi(3);
        let first = d.volume();
        assert!((first - expected).abs() < 1e-12);
        // Cached read returns the identical value.
        assert_eq!(d.volume(), first);
    }

    #[test]
    fn test_volume_of_zero_scatter_is_zero() {
        let mut d = Distribution::new(
            Vector3::new(1.0, 2.0, 3.0),
            1.0,
            Matrix3::zeros(),
            vec![],
            vec![],
        );
        assert_eq!(d.volume(), 0.0);
    }

    #[test]
    fn test_combined_volume_is_recomputed() {
        let mut a = isotropic([0.0, 0.0, 0.0], 1.0, 0.0009);
        let volume_a = a.volume();

        let mut c = Distribution::combine(&a, &a);
        // Same covariance as the inputs, so the same volume, computed
        // fresh from the combined fields rather than inherited.
        assert!((c.volume() - volume_a).abs() < 1e-15);

        let mut reference = Distribution::new(c.point(), c.omega(), *c.deviation(), vec![], vec![]);
        assert_eq!(c.volume(), reference.volume());
    }

    #[test]
    fn test_payload_kept_from_first_operand() {
        // Payload averaging is deliberately left undone: the merged
        // distribution carries d1's times and descriptors verbatim.
        // Expected behavior, not a bug to fix.
        let mut a = isotropic([0.0, 0.0, 0.0], 1.0, 0.01);
        let mut b = isotropic([0.1, 0.0, 0.0], 1.0, 0.01);
        a.times = vec![100];
        a.descriptors = vec![1.0, 5.0];
        b.times = vec![200];
        b.descriptors = vec![2.0, 6.0];

        let c = Distribution::combine(&a, &b);
        assert_eq!(c.times(), &[100]);
        assert_eq!(c.descriptors(), &[1.0, 5.0]);
    }
}
