// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Best-scan selection with rigorous refinement via a max-heap pop/refine/
//! re-score loop.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::scan::Scan;

/// A candidate scan paired with its current score, ordered by score so a
/// [`BinaryHeap`] pops the highest-scoring candidate first (:
/// "a max-heap is built keyed by score").
pub struct ScoredScan {
    pub scan: Scan,
    pub score: f64,
}

impl PartialEq for ScoredScan {
    fn eq(&self, other: &Self) -> bool {
        self.score == other.score
    }
}
impl Eq for ScoredScan {}

impl PartialOrd for ScoredScan {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScoredScan {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score.partial_cmp(&other.score).unwrap_or(Ordering::Equal)
    }
}

/// Repeatedly pop the heap's top candidate, rigorously re-verify and
/// re-score it, and push the result back; a candidate that is still on top
/// after refinement is committed. `refine` returns `None` if
/// the scan becomes infeasible under rigorous recomputation (station count
/// drops below the source minimum, or an observation duration becomes
/// invalid), in which case it is discarded and the loop continues.
pub fn select_best<F>(candidates: Vec<ScoredScan>, mut refine: F) -> Option<Scan>
where
    F: FnMut(&Scan) -> Option<ScoredScan>,
{
    let mut heap: BinaryHeap<ScoredScan> = BinaryHeap::from(candidates);

    loop {
        let top = heap.pop()?;

        let Some(refined) = refine(&top.scan) else {
            continue;
        };
        let refined_id = refined.scan.id;
        heap.push(refined);

        let still_top = heap.peek().is_some_and(|new_top| new_top.scan.id == refined_id);
        if still_top {
            return Some(heap.pop().expect("just peeked").scan);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::IdRegistry;
    use crate::scan::{ScanTimes, ScanType};
    use std::collections::HashMap;

    fn make_scan(ids: &mut IdRegistry, source_id: crate::id::SourceId) -> Scan {
        Scan::new(ids.next_scan(), ScanType::Single, source_id, HashMap::new(), ScanTimes::new(vec![]), vec![])
    }

    #[test]
    fn highest_scoring_survivor_is_committed_without_further_contest() {
        let mut ids = IdRegistry::new();
        let src = ids.next_source();
        let low = ScoredScan {
            scan: make_scan(&mut ids, src),
            score: 0.2,
        };
        let high = ScoredScan {
            scan: make_scan(&mut ids, src),
            score: 0.9,
        };
        let high_id = high.scan.id;

        let committed = select_best(vec![low, high], |s| Some(ScoredScan { scan: s.clone(), score: s.id.value() as f64 * 0.0 + 0.9 }));
        assert_eq!(committed.unwrap().id, high_id);
    }

    #[test]
    fn infeasible_top_candidate_is_discarded_and_runner_up_wins() {
        let mut ids = IdRegistry::new();
        let src = ids.next_source();
        let runner_up = ScoredScan {
            scan: make_scan(&mut ids, src),
            score: 0.5,
        };
        let runner_up_id = runner_up.scan.id;
        let doomed = ScoredScan {
            scan: make_scan(&mut ids, src),
            score: 0.95,
        };
        let doomed_id = doomed.scan.id;

        let committed = select_best(vec![runner_up, doomed], move |s| {
            if s.id == doomed_id {
                None
            } else {
                Some(ScoredScan { scan: s.clone(), score: 0.5 })
            }
        });
        assert_eq!(committed.unwrap().id, runner_up_id);
    }

    #[test]
    fn a_candidate_overtaken_after_refinement_is_requeued_not_committed() {
        let mut ids = IdRegistry::new();
        let src = ids.next_source();
        let a = ScoredScan {
            scan: make_scan(&mut ids, src),
            score: 0.9,
        };
        let a_id = a.scan.id;
        let b = ScoredScan {
            scan: make_scan(&mut ids, src),
            score: 0.4,
        };
        let b_id = b.scan.id;

        // `a` refines down to 0.1, below `b`'s 0.4; `b` then refines stably
        // and should be what's committed.
        let committed = select_best(vec![a, b], move |s| {
            if s.id == a_id {
                Some(ScoredScan { scan: s.clone(), score: 0.1 })
            } else if s.id == b_id {
                Some(ScoredScan { scan: s.clone(), score: 0.4 })
            } else {
                None
            }
        });
        assert_eq!(committed.unwrap().id, b_id);
    }
}
