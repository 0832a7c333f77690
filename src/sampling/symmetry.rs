//! Symmetry sampling: collapse mirror-symmetric neighbor pairs into
//! their anchor point.

use crate::distribution::Distribution;
use crate::matcher::{MatcherFactory, INVALID_DIST, INVALID_ID};
use crate::SymmetryConfig;

use super::{compact, query_points, PointStatus};

/// One symmetry-sampling pass.
///
/// For each surviving anchor `i`, scan its neighbor list for a pair
/// `(m, n)` whose weighted interpolation point falls within `dt` of the
/// anchor: such a pair is roughly mirror-symmetric about `i`. The pair is
/// merged when the combined volume stays below `vrs` times the sum of its
/// parts, and the result is then folded into the anchor itself.
pub(crate) fn symmetry_sampling(
    mut distributions: Vec<Distribution>,
    config: &SymmetryConfig,
    matcher: &dyn MatcherFactory,
) -> Vec<Distribution> {
    println!("Symmetry sampling");

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
        let anchor = distributions[i].point();

        // Rank 0 is the self-match.
        'neighbors: for j in 1..knn {
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

            let mut combined: Option<Distribution> = None;
            for k in (j + 1)..knn {
                if matches.dist(k, i) == INVALID_DIST || matches.id(k, i) == INVALID_ID {
                    continue;
                }
                let n = matches.id(k, i);
                if n == i || status[n] != PointStatus::Kept {
                    continue;
                }

                // Point on the m-n segment implied by the pair's weights;
                // near the anchor it means m and n mirror each other about i.
                let (point_m, omega_m) = (distributions[m].point(), distributions[m].omega());
                let (point_n, omega_n) = (distributions[n].point(), distributions[n].omega());
                let coincidence = point_n + (omega_m / (omega_m + omega_n)) * (point_m - point_n);
                if (coincidence - anchor).norm() < config.dt {
                    let volume_n = distributions[n].volume();
                    let mut candidate =
                        Distribution::combine(&distributions[m], &distributions[n]);
                    if candidate.volume() / (volume_m + volume_n) < config.vrs {
                        status[m] = PointStatus::Removed;
                        status[n] = PointStatus::Removed;
                        combined = Some(candidate);
                        break;
                    }
                }
            }

            if let Some(pair) = combined {
                status[i] = PointStatus::Merged;
                let folded = Distribution::combine(&pair, &distributions[i]);
                distributions[i] = folded;
                break 'neighbors;
            }
        }
    }

    compact(distributions, &status)
}
