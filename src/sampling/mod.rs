//! The two sampling passes and the convergence loop driving them.

mod bridge;
mod overlap;
mod symmetry;

pub(crate) use bridge::{
    cloud_from_distributions, distributions_from_cloud, query_points, DEVIATION_CHANNEL,
    OMEGA_CHANNEL,
};

use crate::distribution::Distribution;
use crate::matcher::MatcherFactory;
use crate::{SamplingDiagnostics, SymmetryConfig};

/// Per-slot fate of a distribution within one sampling pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PointStatus {
    /// Absorbed into another slot's merge; dropped at compaction.
    Removed,
    /// Untouched so far; still a merge candidate.
    Kept,
    /// Survives as the result of at least one merge.
    Merged,
}

/// Compact a pass result: merge results first, untouched entries after,
/// both groups in original relative order, removed entries dropped.
///
/// Consumers depend on this exact ordering for reproducibility; do not
/// change it.
pub(crate) fn compact(
    distributions: Vec<Distribution>,
    status: &[PointStatus],
) -> Vec<Distribution> {
    let mut merged = Vec::new();
    let mut untouched = Vec::new();
    for (distribution, &slot) in distributions.into_iter().zip(status) {
        match slot {
            PointStatus::Merged => merged.push(distribution),
            PointStatus::Kept => untouched.push(distribution),
            PointStatus::Removed => {}
        }
    }
    merged.extend(untouched);
    merged
}

/// Alternate symmetry and overlap sampling until a round removes almost
/// no points.
///
/// The counter starts at 2 and decrements before each pass: odd runs
/// symmetry sampling, even runs overlap sampling, so the default two
/// iterations are symmetry then overlap. A pass that retains less than
/// `ct` of its input when the counter hits 0 resets the counter for
/// another full round, bounded by `max_rounds` as a safety net against
/// rounds that each shave just under the tolerance forever.
pub(crate) fn run_passes(
    mut distributions: Vec<Distribution>,
    config: &SymmetryConfig,
    matcher: &dyn MatcherFactory,
) -> (Vec<Distribution>, SamplingDiagnostics) {
    let mut diagnostics = SamplingDiagnostics {
        input_points: distributions.len(),
        ..SamplingDiagnostics::default()
    };

    let mut counter: u32 = 2;
    while counter > 0 {
        counter -= 1;
        let before = distributions.len() as f64;
        if counter % 2 == 1 {
            distributions = symmetry::symmetry_sampling(distributions, config, matcher);
        } else {
            distributions = overlap::overlap_sampling(distributions, config, matcher);
        }
        diagnostics.passes_run += 1;
        let after = distributions.len() as f64;
        println!("Down to {} points", distributions.len());

        // NaN retained fraction (empty cloud) fails the comparison and
        // lets the counter run out.
        if after / before < config.ct {
            if counter == 0 {
                if diagnostics.rounds_restarted + 1 >= config.max_rounds {
                    diagnostics.round_cap_reached = true;
                    log::warn!(
                        "symmetry sampling stopped after {} rounds without converging",
                        config.max_rounds
                    );
                    break;
                }
                diagnostics.rounds_restarted += 1;
                counter = 2;
            }
        } else {
            println!("Almost no points removed");
        }
    }

    diagnostics.output_points = distributions.len();
    (distributions, diagnostics)
}
