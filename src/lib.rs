//! Point-cloud compression by merging Gaussian point summaries.
//!
//! Every point carries a weight (`omega`) and an unnormalized 3x3 scatter
//! matrix (`deviation`), turning the cloud into a list of weighted Gaussian
//! summaries. Two sampling passes shrink that list: *symmetry sampling*
//! merges neighbor pairs that mirror each other about an anchor point and
//! folds the result into the anchor, while *overlap sampling* greedily
//! absorbs neighbors whose combined extent stays close to the sum of its
//! parts. A convergence loop alternates the passes until a round removes
//! almost no points, then writes the survivors back into the cloud.
//!
//! # Example
//!
//! ```
//! use nalgebra::Vector3;
//! use symmetry_sampling::{compress, PointCloud};
//!
//! // Two nearly coincident points collapse into one of weight 2.
//! let cloud = PointCloud::new(vec![
//!     Vector3::new(0.0, 0.0, 0.0),
//!     Vector3::new(0.0, 0.0, 1.0e-6),
//! ]);
//! let output = compress(&cloud).expect("compression should succeed");
//! assert_eq!(output.cloud.len(), 1);
//! assert_eq!(output.cloud.descriptor("omega", 0), &[2.0]);
//! ```

mod cloud;
mod distribution;
mod error;
mod matcher;
mod sampling;

pub use cloud::PointCloud;
pub use distribution::Distribution;
pub use error::SymmetryError;
pub use matcher::{
    KdTreeMatcher, KdTreeMatcherFactory, Matcher, MatcherFactory, Matches, INVALID_DIST,
    INVALID_ID,
};

/// Configuration for the symmetry-sampling filter.
///
/// Every field is range-checked by [`validate`](SymmetryConfig::validate),
/// which all entry points call before touching the cloud.
#[derive(Debug, Clone)]
pub struct SymmetryConfig {
    /// Volume ratio for symmetry sampling: a mirrored pair is merged when
    /// the combined volume divided by the sum of the pair's volumes stays
    /// strictly below this. Range `[0, inf)`.
    pub vrs: f64,
    /// Volume ratio for overlap sampling, same acceptance rule as `vrs`.
    /// Range `[0, inf)`.
    pub vro: f64,
    /// Distance threshold in meters for the symmetry coincidence test.
    /// Range `[0, inf)`.
    pub dt: f64,
    /// Compression tolerance: a round must retain less than this fraction
    /// of its input for the loop to keep iterating. Range `[0, 1]`.
    pub ct: f64,
    /// Nearest neighbors to consider per point, including the point
    /// itself. Minimum 3.
    pub knn: usize,
    /// Isotropic variance seeded into the `deviation` channel when the
    /// cloud arrives without one. Range `(0, inf)`.
    pub initial_variance: f64,
    /// Safety bound on convergence-loop rounds, in case every round keeps
    /// shaving just under the tolerance. Minimum 1.
    pub max_rounds: usize,
}

impl Default for SymmetryConfig {
    fn default() -> Self {
        Self {
            vrs: 5.0,
            vro: 1.025,
            dt: 0.05,
            ct: 0.95,
            knn: 5,
            initial_variance: 0.0009,
            max_rounds: 128,
        }
    }
}

impl SymmetryConfig {
    /// Check every field against its documented range.
    pub fn validate(&self) -> Result<(), SymmetryError> {
        fn invalid(name: &'static str, message: String) -> SymmetryError {
            SymmetryError::InvalidParameter { name, message }
        }

        if !(self.vrs >= 0.0) {
            return Err(invalid("vrs", format!("must be >= 0, got {}", self.vrs)));
        }
        if !(self.vro >= 0.0) {
            return Err(invalid("vro", format!("must be >= 0, got {}", self.vro)));
        }
        if !(self.dt >= 0.0) {
            return Err(invalid("dt", format!("must be >= 0, got {}", self.dt)));
        }
        if !(self.ct >= 0.0 && self.ct <= 1.0) {
            return Err(invalid("ct", format!("must be within [0, 1], got {}", self.ct)));
        }
        if self.knn < 3 {
            return Err(invalid("knn", format!("must be >= 3, got {}", self.knn)));
        }
        if !(self.initial_variance > 0.0) {
            return Err(invalid(
                "initial_variance",
                format!("must be > 0, got {}", self.initial_variance),
            ));
        }
        if self.max_rounds == 0 {
            return Err(invalid("max_rounds", "must be >= 1, got 0".to_string()));
        }
        Ok(())
    }
}

/// What the convergence loop did, for observability; not part of the
/// functional contract.
#[derive(Debug, Clone, Default)]
pub struct SamplingDiagnostics {
    /// Points entering the filter.
    pub input_points: usize,
    /// Points surviving the filter.
    pub output_points: usize,
    /// Total sampling passes executed (two per round).
    pub passes_run: usize,
    /// Times the loop reset for another full round.
    pub rounds_restarted: usize,
    /// Whether the `max_rounds` safety bound cut the loop short.
    pub round_cap_reached: bool,
}

impl SamplingDiagnostics {
    /// Fraction of input points surviving; NaN for an empty input.
    pub fn retained_fraction(&self) -> f64 {
        self.output_points as f64 / self.input_points as f64
    }
}

/// Output of a compression run.
#[derive(Debug, Clone)]
pub struct SamplingOutput {
    /// The reduced cloud, one row per surviving distribution.
    pub cloud: PointCloud,
    /// Diagnostics from the convergence loop.
    pub diagnostics: SamplingDiagnostics,
}

/// Compress a cloud with default settings.
pub fn compress(cloud: &PointCloud) -> Result<SamplingOutput, SymmetryError> {
    compress_with(cloud, &SymmetryConfig::default())
}

/// Compress a cloud with explicit configuration.
pub fn compress_with(
    cloud: &PointCloud,
    config: &SymmetryConfig,
) -> Result<SamplingOutput, SymmetryError> {
    let mut output = cloud.clone();
    let diagnostics = compress_in_place(&mut output, config)?;
    Ok(SamplingOutput {
        cloud: output,
        diagnostics,
    })
}

/// Compress a cloud in place with the default kd-tree matcher.
pub fn compress_in_place(
    cloud: &mut PointCloud,
    config: &SymmetryConfig,
) -> Result<SamplingDiagnostics, SymmetryError> {
    compress_in_place_with(cloud, config, &KdTreeMatcherFactory)
}

/// Compress a cloud in place with an injected neighbor-search strategy.
///
/// Seeds the `omega` (weight 1) and `deviation` (isotropic
/// `initial_variance`) channels when absent, runs the convergence loop,
/// and replaces the cloud's point set with one row per surviving
/// distribution, merge results first.
///
/// # Panics
///
/// If either channel is already present with the wrong width. The filter
/// is an internal pipeline stage; operating on a malformed cloud would
/// corrupt data silently, so it crashes instead.
pub fn compress_in_place_with(
    cloud: &mut PointCloud,
    config: &SymmetryConfig,
    matcher: &dyn MatcherFactory,
) -> Result<SamplingDiagnostics, SymmetryError> {
    config.validate()?;

    if !cloud.descriptor_exists(sampling::OMEGA_CHANNEL) {
        let omegas = vec![1.0; cloud.len()];
        cloud.add_descriptor(sampling::OMEGA_CHANNEL, 1, &omegas);
    }
    if !cloud.descriptor_exists(sampling::DEVIATION_CHANNEL) {
        let mut deviations = vec![0.0; 9 * cloud.len()];
        for row in deviations.chunks_exact_mut(9) {
            row[0] = config.initial_variance;
            row[4] = config.initial_variance;
            row[8] = config.initial_variance;
        }
        cloud.add_descriptor(sampling::DEVIATION_CHANNEL, 9, &deviations);
    }
    assert_eq!(
        cloud.descriptor_width(sampling::OMEGA_CHANNEL),
        Some(1),
        "omega channel must be scalar"
    );
    assert_eq!(
        cloud.descriptor_width(sampling::DEVIATION_CHANNEL),
        Some(9),
        "deviation channel must hold a flattened 3x3 matrix"
    );

    let distributions = sampling::distributions_from_cloud(cloud);
    let (distributions, diagnostics) = sampling::run_passes(distributions, config, matcher);
    *cloud = sampling::cloud_from_distributions(cloud, &distributions);
    Ok(diagnostics)
}
