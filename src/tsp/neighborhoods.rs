//! Neighborhood move operators for the TSP.
//!
//! Each operator enumerates its candidate moves over the current solution,
//! computes the candidate cost through an O(1) delta update (never a full
//! recomputation), skips tabu moves, and returns the single best candidate.
//! The chosen move's signature is recorded in the tabu list owned by the
//! caller.

use crate::error::{Result, SolverError};
use crate::tabu::{MoveKind, MoveSignature, TabuList};
use crate::tsp::instance::TspInstance;
use crate::tsp::solution::PathSolution;
use rayon::prelude::*;

/// Number of parallel workers used by the segment-reversal neighborhood
pub const DEFAULT_WORKERS: usize = 4;

/// A family of moves transforming one tour into structurally related tours
pub trait TspNeighborhood: Send + Sync {
    /// Tabu universe this operator belongs to
    fn kind(&self) -> MoveKind;

    fn name(&self) -> &str;

    /// Evaluate every non-tabu candidate move and return the cheapest
    /// resulting solution, recording its signature in `tabu`.
    /// Ties are broken in favor of the first candidate seen.
    fn find_best_candidate(
        &self,
        instance: &TspInstance,
        solution: &PathSolution,
        tabu: &mut TabuList<MoveSignature>,
    ) -> Option<PathSolution>;
}

impl PathSolution {
    /// The standard operator set searched at every iteration
    pub fn get_neighborhoods(&self) -> Vec<Box<dyn TspNeighborhood>> {
        vec![
            Box::new(SwapNeighborhood),
            Box::new(SegmentShift { segment_length: 1 }),
            Box::new(SegmentShift { segment_length: 2 }),
            Box::new(SegmentShift { segment_length: 3 }),
            Box::new(SegmentReverse {
                segment_length: 3,
                workers: DEFAULT_WORKERS,
            }),
        ]
    }
}

// ==================== Swap ====================

/// Exchanges the positions of two non-adjacent cities in the cycle.
///
/// Adjacent pairs (cycle distance 1 or 2) are skipped entirely: their
/// configurations degenerate and the 8-lookup delta formula does not apply.
pub struct SwapNeighborhood;

impl SwapNeighborhood {
    /// Apply the swap of cities `x` and `y`, computing the new cost from the
    /// 8 edges the move touches
    pub fn swap(
        &self,
        instance: &TspInstance,
        solution: &PathSolution,
        x: usize,
        y: usize,
    ) -> PathSolution {
        let mut after = solution.after.clone();
        let mut before = solution.before.clone();

        let before_x = before[x];
        let before_y = before[y];
        let after_x = after[x];
        let after_y = after[y];

        let cost = solution.cost(instance)
            + instance.distance(before_x, y)
            + instance.distance(y, after_x)
            + instance.distance(before_y, x)
            + instance.distance(x, after_y)
            - instance.distance(before_x, x)
            - instance.distance(x, after_x)
            - instance.distance(before_y, y)
            - instance.distance(y, after_y);

        before.swap(x, y);
        after.swap(x, y);

        after[before_x] = y;
        before[after_x] = y;
        after[before_y] = x;
        before[after_y] = x;

        PathSolution::new(after, before, Some(cost))
    }
}

impl TspNeighborhood for SwapNeighborhood {
    fn kind(&self) -> MoveKind {
        MoveKind::Swap
    }

    fn name(&self) -> &str {
        "Swap"
    }

    fn find_best_candidate(
        &self,
        instance: &TspInstance,
        solution: &PathSolution,
        tabu: &mut TabuList<MoveSignature>,
    ) -> Option<PathSolution> {
        let n = solution.dimension();
        let after = &solution.after;

        let mut result: Option<PathSolution> = None;
        let mut best_cost = f64::INFINITY;
        let mut best_pair: Option<MoveSignature> = None;

        for first in 0..n {
            for second in first + 1..n {
                if after[first] == second
                    || after[second] == first
                    || after[after[first]] == second
                    || after[after[second]] == first
                {
                    continue;
                }

                let pair = (first, second);
                if tabu.contains(&pair) {
                    continue;
                }

                let swapped = self.swap(instance, solution, first, second);
                let cost = swapped.cost(instance);
                if cost < best_cost {
                    best_cost = cost;
                    result = Some(swapped);
                    best_pair = Some(pair);
                }
            }
        }

        if let Some(pair) = best_pair {
            tabu.add(pair);
        }
        result
    }
}

// ==================== SegmentShift ====================

/// Relocates a contiguous segment of fixed length to a new position
/// immediately after a target city, preserving the segment's internal order.
pub struct SegmentShift {
    pub(crate) segment_length: usize,
}

impl SegmentShift {
    pub fn new(segment_length: usize) -> Result<Self> {
        if segment_length == 0 {
            return Err(SolverError::InvalidNeighborhood(
                "segment length must be at least 1".to_string(),
            ));
        }
        Ok(SegmentShift { segment_length })
    }

    /// Detach `segment` from the cycle and re-attach it right after city `x`.
    ///
    /// 3 edges are removed (segment boundaries plus the edge leaving `x`) and
    /// 3 new edges are added.
    pub fn insert_after(
        &self,
        instance: &TspInstance,
        solution: &PathSolution,
        segment: &[usize],
        x: usize,
    ) -> PathSolution {
        let mut after = solution.after.clone();
        let mut before = solution.before.clone();

        let head = segment[0];
        let tail = segment[segment.len() - 1];
        let before_segment = before[head];
        let after_segment = after[tail];
        let after_x = after[x];

        let cost = solution.cost(instance)
            + instance.distance(before_segment, after_segment)
            + instance.distance(x, head)
            + instance.distance(tail, after_x)
            - instance.distance(before_segment, head)
            - instance.distance(tail, after_segment)
            - instance.distance(x, after_x);

        after[before_segment] = after_segment;
        before[after_segment] = before_segment;
        after[x] = head;
        before[head] = x;
        after[tail] = after_x;
        before[after_x] = tail;

        PathSolution::new(after, before, Some(cost))
    }
}

impl TspNeighborhood for SegmentShift {
    fn kind(&self) -> MoveKind {
        MoveKind::SegmentShift
    }

    fn name(&self) -> &str {
        "SegmentShift"
    }

    fn find_best_candidate(
        &self,
        instance: &TspInstance,
        solution: &PathSolution,
        tabu: &mut TabuList<MoveSignature>,
    ) -> Option<PathSolution> {
        let n = solution.dimension();
        if n + 2 < self.segment_length {
            return None;
        }

        let path = solution.get_path();
        let mut result: Option<PathSolution> = None;
        let mut best_cost = f64::INFINITY;
        let mut best_pair: Option<MoveSignature> = None;

        for start in 0..n {
            let segment: Vec<usize> = (0..self.segment_length)
                .map(|d| path[(start + d) % n])
                .collect();
            let head = segment[0];
            let tail = segment[segment.len() - 1];

            for target in 0..n {
                // Re-attaching next to the segment's own boundary is a no-op
                // or breaks the 3-edge delta; a target inside the segment
                // would detach the cycle.
                if target == solution.before[head]
                    || target == solution.after[tail]
                    || segment.contains(&target)
                {
                    continue;
                }

                let pair = (head, target);
                if tabu.contains(&pair) {
                    continue;
                }

                let shifted = self.insert_after(instance, solution, &segment, target);
                let cost = shifted.cost(instance);
                if cost < best_cost {
                    best_cost = cost;
                    result = Some(shifted);
                    best_pair = Some(pair);
                }
            }
        }

        if let Some(pair) = best_pair {
            tabu.add(pair);
        }
        result
    }
}

// ==================== SegmentReverse ====================

/// Reverses the traversal direction of a contiguous segment of length >= 3.
///
/// Candidate segments are partitioned round-robin across a fixed number of
/// parallel workers. Each worker evaluates its batch against immutable
/// borrows of the solution and instance and returns its local best; the
/// coordinator reduces the worker results in partition order (deterministic
/// first-seen tie-break) and is the only party updating tabu state.
pub struct SegmentReverse {
    pub(crate) segment_length: usize,
    pub(crate) workers: usize,
}

impl SegmentReverse {
    /// Segment lengths below 3 are rejected eagerly: such reversals are
    /// either degenerate or equivalent to a swap.
    pub fn new(segment_length: usize, workers: usize) -> Result<Self> {
        if segment_length < 3 {
            return Err(SolverError::InvalidNeighborhood(
                "reversal segment length must be 3 or more".to_string(),
            ));
        }
        if workers == 0 {
            return Err(SolverError::InvalidNeighborhood(
                "worker count must be at least 1".to_string(),
            ));
        }
        Ok(SegmentReverse {
            segment_length,
            workers,
        })
    }

    /// Reverse `segment` in place: swap every member's `before`/`after`
    /// roles, then re-attach the swapped ends to the outer neighbors.
    pub fn reverse(
        &self,
        instance: &TspInstance,
        solution: &PathSolution,
        segment: &[usize],
    ) -> PathSolution {
        let mut after = solution.after.clone();
        let mut before = solution.before.clone();

        let head = segment[0];
        let tail = segment[segment.len() - 1];
        let before_segment = before[head];
        let after_segment = after[tail];

        let cost = solution.cost(instance)
            + instance.distance(before_segment, tail)
            + instance.distance(head, after_segment)
            - instance.distance(before_segment, head)
            - instance.distance(tail, after_segment);

        for &index in segment {
            std::mem::swap(&mut before[index], &mut after[index]);
        }

        before[tail] = before_segment;
        after[before_segment] = tail;
        before[after_segment] = head;
        after[head] = after_segment;

        PathSolution::new(after, before, Some(cost))
    }
}

impl TspNeighborhood for SegmentReverse {
    fn kind(&self) -> MoveKind {
        MoveKind::SegmentReverse
    }

    fn name(&self) -> &str {
        "SegmentReverse"
    }

    fn find_best_candidate(
        &self,
        instance: &TspInstance,
        solution: &PathSolution,
        tabu: &mut TabuList<MoveSignature>,
    ) -> Option<PathSolution> {
        let n = solution.dimension();
        // A segment spanning the whole cycle has no outer neighbors to
        // re-attach to
        if n <= self.segment_length {
            return None;
        }

        let path = solution.get_path();

        // Round-robin partition of segment start positions across workers
        let mut batches: Vec<Vec<Vec<usize>>> = vec![Vec::new(); self.workers];
        for start in 0..n {
            let segment: Vec<usize> = (0..self.segment_length)
                .map(|d| path[(start + d) % n])
                .collect();
            batches[start % self.workers].push(segment);
        }

        let locals: Vec<Option<(PathSolution, MoveSignature, f64)>> = batches
            .par_iter()
            .map(|batch| {
                let mut local: Option<(PathSolution, MoveSignature, f64)> = None;
                for segment in batch {
                    let reversed = self.reverse(instance, solution, segment);
                    let cost = reversed.cost(instance);
                    if local.as_ref().map_or(true, |(_, _, best)| cost < *best) {
                        let pair = (segment[0], segment[segment.len() - 1]);
                        local = Some((reversed, pair, cost));
                    }
                }
                local
            })
            .collect();

        // Sequential reduction in partition order
        let mut result: Option<PathSolution> = None;
        let mut best_cost = f64::INFINITY;
        let mut best_pair: Option<MoveSignature> = None;
        for local in locals.into_iter().flatten() {
            let (candidate, pair, cost) = local;
            if cost < best_cost {
                best_cost = cost;
                result = Some(candidate);
                best_pair = Some(pair);
            }
        }

        if let Some(pair) = best_pair {
            tabu.add(pair);
        }
        result
    }
}
