//! Overlap sampling: greedily absorb overlapping neighbors into an
//! anchor, chained across the anchor's whole neighbor list.

use crate::distribution::Distribution;
use crate::matcher::{MatcherFactory, INVALID_DIST, INVALID_ID};
use crate::SymmetryConfig;

use super::{compact, query_points, PointStatus};

/// One overlap-sampling pass.
///
/// For each surviving anchor `i`, walk its neighbors in distance order,
/// folding each neighbor `m` into a running accumulator whenever the
/// combined volume stays below `vro` times the sum of the two operands'
/// volumes. One anchor can absorb several neighbors in a single pass.
pub(crate) fn overlap_sampling(
    mut distributions: Vec<Distribution>,
    config: &SymmetryConfig,
    matcher: &dyn MatcherFactory,
) -> Vec<Distribution> {
    println!("Overlap sampling");

    let count = distributions.len();
    if count == 0 {
        return distributions;
    }
    let knn = config.knn.min(count);
    let points = query_points(&distributions);
    let matches = matcher.build(&points, knn).find_closest(&points);

    let mut status = vec![PointStatus::Kept; count];

    for i in 0..count {
        if status[i] != PointStatus::Kept {
            continue;
        }
        let mut accumulator = distributions[i].clone();
        let mut was_overlap = false;

        // Rank 0 is the self-match.
        for j in 1..knn {
            if matches.dist(j, i) == INVALID_DIST || matches.id(j, i) == INVALID_ID {
                continue;
            }
            let m = matches.id(j, i);
            // Distance-0 ties can push the self-match past rank 0, so the
            // anchor must be skipped by identity, not by rank alone.
            if m == i || status[m] != PointStatus::Kept {
                continue;
            }

            let volume_m = distributions[m].volume();
            let volume_acc = accumulator.volume();
            let mut candidate = Distribution::combine(&distributions[m], &accumulator);
            if candidate.volume() / (volume_acc + volume_m) < config.vro {
                status[m] = PointStatus::Removed;
                was_overlap = true;
                accumulator = candidate;
            }
        }

        if was_overlap {
            status[i] = PointStatus::Merged;
            distributions[i] = accumulator;
        }
    }

    compact(distributions, &status)
}
