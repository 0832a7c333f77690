//! Conversions between the cloud container and distribution lists.

use nalgebra::{Matrix3, Vector3};

use crate::cloud::PointCloud;
use crate::distribution::Distribution;

/// Scalar weight channel, one value per point.
pub(crate) const OMEGA_CHANNEL: &str = "omega";

/// Scatter channel: the 3x3 deviation matrix flattened row-major to nine
/// values per point. The matrix is symmetric, so the flattening order is
/// not observable, but it is kept fixed for reproducibility.
pub(crate) const DEVIATION_CHANNEL: &str = "deviation";

/// One distribution per cloud point, in point order.
pub(crate) fn distributions_from_cloud(cloud: &PointCloud) -> Vec<Distribution> {
    let mut distributions = Vec::with_capacity(cloud.len());
    for i in 0..cloud.len() {
        let omega = cloud.descriptor(OMEGA_CHANNEL, i)[0];
        let deviation = Matrix3::from_row_slice(cloud.descriptor(DEVIATION_CHANNEL, i));
        distributions.push(Distribution::new(
            cloud.point(i),
            omega,
            deviation,
            cloud.time(i).to_vec(),
            cloud.descriptor_row(i).to_vec(),
        ));
    }
    distributions
}

/// A cloud with `template`'s channel layout holding one row per
/// distribution, in list order.
///
/// Each row first receives the distribution's payload (full descriptor
/// row and time vector), then the `omega` and `deviation` channel slots
/// are overwritten from the distribution's own fields.
pub(crate) fn cloud_from_distributions(
    template: &PointCloud,
    distributions: &[Distribution],
) -> PointCloud {
    let mut out = template.similar_empty(distributions.len());
    let mut deviation_row = [0.0; 9];
    for (i, distribution) in distributions.iter().enumerate() {
        out.set_point(i, distribution.point());
        out.set_descriptor_row(i, distribution.descriptors());
        out.set_time(i, distribution.times());

        out.set_descriptor(OMEGA_CHANNEL, i, &[distribution.omega()]);
        let deviation = distribution.deviation();
        for row in 0..3 {
            for col in 0..3 {
                deviation_row[row * 3 + col] = deviation[(row, col)];
            }
        }
        out.set_descriptor(DEVIATION_CHANNEL, i, &deviation_row);
    }
    out
}

/// Coordinates only, feeding the neighbor matcher.
pub(crate) fn query_points(distributions: &[Distribution]) -> Vec<Vector3<f64>> {
    distributions.iter().map(|d| d.point()).collect()
}
