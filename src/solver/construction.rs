//! First-fit-decreasing construction heuristic.
//!
//! Places unplanned trucks one at a time, largest capacity first, each
//! on the placement with the best resulting score. Staying unassigned
//! is one of the candidates, so a truck that fits nowhere without a
//! hard penalty stays unplanned.
//!
//! # Reference
//! Johnson et al. (1974), "Worst-case performance bounds for simple
//! one-dimensional packing algorithms", SIAM J. Computing 3(4)

use crate::models::Placement;
use crate::moves::{DockYardMove, MoveSelector};
use crate::score::ScoreDirector;

/// Runs the heuristic and returns the number of trucks it planned.
///
/// Trucks with equal capacity keep their input order. Among placements
/// with equal score the first in catalog order wins.
pub(crate) fn construct(director: &mut ScoreDirector, selector: &MoveSelector) -> usize {
    let mut order: Vec<usize> = director
        .solution()
        .trucks()
        .iter()
        .enumerate()
        .filter(|(_, t)| !t.is_planned())
        .map(|(i, _)| i)
        .collect();
    order.sort_by_key(|&i| std::cmp::Reverse(director.solution().trucks()[i].capacity));

    let mut placed = 0;
    for truck in order {
        let current = director.solution().trucks()[truck].placement();
        let mut best: Option<(Placement, _)> = None;
        for to in selector.placements() {
            let delta = DockYardMove::reassign(truck, to).delta(director);
            if best.map_or(true, |(_, d)| delta < d) {
                best = Some((to, delta));
            }
        }

        if let Some((to, _)) = best {
            if to != current {
                let _ = DockYardMove::reassign(truck, to).apply(director);
            }
            if to.is_planned() {
                placed += 1;
            }
        }
    }
    placed
}
