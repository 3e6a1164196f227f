//! Matching utilities for associating observations with live tracks.

use crate::tracker::rect::Rect;
use ndarray::Array2;

/// Observation input for the tracker: one detector-reported box for one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Observation {
    /// Bounding box in TLWH format
    pub bbox: Rect,
    /// Detector class index, if any
    pub class_id: Option<u32>,
    /// Detection confidence score
    pub confidence: f32,
    /// Opaque payload, e.g. the dominant colour of the box
    pub attribute: Option<String>,
}

impl Observation {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32, confidence: f32) -> Self {
        Self::from_rect(Rect::from_tlbr(x1, y1, x2, y2), confidence)
    }

    pub fn from_rect(bbox: Rect, confidence: f32) -> Self {
        Self {
            bbox,
            class_id: None,
            confidence,
            attribute: None,
        }
    }

    pub fn with_class(mut self, class_id: u32) -> Self {
        self.class_id = Some(class_id);
        self
    }

    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = Some(attribute.into());
        self
    }
}

/// How the distance matrix is turned into a bijection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssignmentPolicy {
    /// Repeatedly take the globally smallest remaining distance.
    ///
    /// This is an approximation of the minimum-cost matching: a locally
    /// greedy choice can force a worse pairing elsewhere. Ties are broken by
    /// row, then column, so the result is deterministic.
    #[default]
    Greedy,
    /// Minimum total cost matching via the Jonker-Volgenant solver.
    ///
    /// Among equal-cost matchings, lower rows are served first and take
    /// lower columns, as with `Greedy` on tied costs.
    Optimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentResult {
    /// `(row, col)` pairs, i.e. `(track index, observation index)`
    pub matches: Vec<(usize, usize)>,
    pub unmatched_tracks: Vec<usize>,
    pub unmatched_observations: Vec<usize>,
}

impl AssignmentResult {
    fn from_matches(matches: Vec<(usize, usize)>, num_rows: usize, num_cols: usize) -> Self {
        let mut row_used = vec![false; num_rows];
        let mut col_used = vec![false; num_cols];
        for &(r, c) in &matches {
            row_used[r] = true;
            col_used[c] = true;
        }

        Self {
            matches,
            unmatched_tracks: (0..num_rows).filter(|&r| !row_used[r]).collect(),
            unmatched_observations: (0..num_cols).filter(|&c| !col_used[c]).collect(),
        }
    }
}

/// Assign rows to columns of `cost_matrix` according to `policy`.
///
/// Pairs whose cost exceeds `max_cost` are never matched.
pub fn assign(
    cost_matrix: &Array2<f32>,
    policy: AssignmentPolicy,
    max_cost: Option<f32>,
) -> AssignmentResult {
    let (num_rows, num_cols) = cost_matrix.dim();

    if num_rows == 0 || num_cols == 0 {
        return AssignmentResult::from_matches(vec![], num_rows, num_cols);
    }

    let matches = match policy {
        AssignmentPolicy::Greedy => greedy_matches(cost_matrix, max_cost),
        AssignmentPolicy::Optimal => optimal_matches(cost_matrix, max_cost),
    };

    AssignmentResult::from_matches(matches, num_rows, num_cols)
}

fn greedy_matches(cost_matrix: &Array2<f32>, max_cost: Option<f32>) -> Vec<(usize, usize)> {
    let (num_rows, num_cols) = cost_matrix.dim();

    // Row-major enumeration plus a stable sort keeps ties in scan order.
    let mut candidates: Vec<(f32, usize, usize)> = cost_matrix
        .indexed_iter()
        .map(|((r, c), &d)| (d, r, c))
        .collect();
    candidates.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut row_used = vec![false; num_rows];
    let mut col_used = vec![false; num_cols];
    let mut matches = Vec::with_capacity(num_rows.min(num_cols));

    for (d, r, c) in candidates {
        if matches.len() == num_rows.min(num_cols) {
            break;
        }
        if let Some(limit) = max_cost {
            if d > limit {
                break;
            }
        }
        if row_used[r] || col_used[c] {
            continue;
        }
        row_used[r] = true;
        col_used[c] = true;
        matches.push((r, c));
    }

    matches.sort_unstable();
    matches
}

const UNREACHABLE_COST: f64 = 1e9;

fn optimal_matches(cost_matrix: &Array2<f32>, max_cost: Option<f32>) -> Vec<(usize, usize)> {
    let plain = solve_padded(cost_matrix, max_cost, 0.0);
    let tied = solve_padded(cost_matrix, max_cost, tie_break_step(cost_matrix));

    match (plain, tied) {
        // The index bias may only choose among equal-cost solutions.
        (Some(plain), Some(tied)) => {
            if padded_total(cost_matrix, &tied) > padded_total(cost_matrix, &plain) {
                plain
            } else {
                tied
            }
        }
        (Some(matches), None) | (None, Some(matches)) => matches,
        (None, None) => greedy_matches(cost_matrix, max_cost),
    }
}

/// Index bias added to cell `(i, j)` in units of the tie-break step.
///
/// Among assignments of equal cost the bias is smallest when lower rows are
/// matched first and rows take columns in ascending order, which is what the
/// greedy scan yields on tied costs.
#[inline]
fn tie_bias(i: usize, j: usize, size: usize) -> f64 {
    (i + j * (size - i)) as f64
}

/// Step small enough that the summed bias of a whole assignment stays below
/// the smallest gap between two distinct costs.
fn tie_break_step(cost_matrix: &Array2<f32>) -> f64 {
    let (num_rows, num_cols) = cost_matrix.dim();
    let size = num_rows.max(num_cols) as f64;

    let mut values: Vec<f64> = cost_matrix.iter().map(|&d| d as f64).collect();
    values.sort_by(|a, b| a.total_cmp(b));
    let min_gap = values
        .windows(2)
        .map(|w| w[1] - w[0])
        .filter(|&g| g > 0.0)
        .fold(f64::INFINITY, f64::min);
    let min_gap = if min_gap.is_finite() { min_gap } else { 1.0 };

    min_gap / (4.0 * size * size * size)
}

fn solve_padded(
    cost_matrix: &Array2<f32>,
    max_cost: Option<f32>,
    step: f64,
) -> Option<Vec<(usize, usize)>> {
    let (num_rows, num_cols) = cost_matrix.dim();

    let size = num_rows.max(num_cols);
    let mut padded = Array2::<f64>::from_elem((size, size), UNREACHABLE_COST);

    for ((i, j), &d) in cost_matrix.indexed_iter() {
        let gated = max_cost.is_some_and(|limit| d > limit);
        if !gated {
            padded[[i, j]] = d as f64 + step * tie_bias(i, j, size);
        }
    }

    match lapjv::lapjv(&padded) {
        Ok((row_to_col, _)) => Some(
            row_to_col
                .iter()
                .enumerate()
                .filter(|&(r, &c)| r < num_rows && c < num_cols)
                .filter(|&(r, &c)| max_cost.is_none_or(|limit| cost_matrix[[r, c]] <= limit))
                .map(|(r, &c)| (r, c))
                .collect(),
        ),
        Err(e) => {
            log::warn!("Optimal assignment failed: {:?}", e);
            None
        }
    }
}

/// Unbiased cost of `matches` on the padded problem; unmatched rows pay the
/// padding cost.
fn padded_total(cost_matrix: &Array2<f32>, matches: &[(usize, usize)]) -> f64 {
    let (num_rows, num_cols) = cost_matrix.dim();
    let size = num_rows.max(num_cols);
    let real: f64 = matches.iter().map(|&(r, c)| cost_matrix[[r, c]] as f64).sum();
    real + UNREACHABLE_COST * (size - matches.len()) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_greedy_picks_global_minimum_first() {
        // Greedy takes (0,0)=1 first, leaving (1,1)=10: total 11.
        // The optimal pairing (0,1)+(1,0) costs 2+2 = 4.
        let cost = array![[1.0, 2.0], [2.0, 10.0]];
        let res = assign(&cost, AssignmentPolicy::Greedy, None);
        assert_eq!(res.matches, vec![(0, 0), (1, 1)]);

        let res = assign(&cost, AssignmentPolicy::Optimal, None);
        assert_eq!(res.matches, vec![(0, 1), (1, 0)]);
    }

    #[test]
    fn test_greedy_tie_break_is_row_then_column() {
        let cost = array![[3.0, 3.0], [3.0, 3.0]];
        let res = assign(&cost, AssignmentPolicy::Greedy, None);
        assert_eq!(res.matches, vec![(0, 0), (1, 1)]);
    }

    #[test]
    fn test_optimal_tie_break_matches_greedy() {
        let cost = array![[3.0, 3.0], [3.0, 3.0]];
        let res = assign(&cost, AssignmentPolicy::Optimal, None);
        assert_eq!(res.matches, vec![(0, 0), (1, 1)]);

        let cost = array![[0.0, 0.0, 0.0], [0.0, 0.0, 0.0]];
        let res = assign(&cost, AssignmentPolicy::Optimal, None);
        assert_eq!(res.matches, vec![(0, 0), (1, 1)]);
        assert_eq!(res.unmatched_observations, vec![2]);

        let cost = array![[3.0], [3.0], [3.0]];
        let res = assign(&cost, AssignmentPolicy::Optimal, None);
        assert_eq!(res.matches, vec![(0, 0)]);
        assert_eq!(res.unmatched_tracks, vec![1, 2]);
    }

    #[test]
    fn test_optimal_tie_break_keeps_real_cost_order() {
        // Costs differ by less than any index bias could reach.
        let cost = array![[1.0, 1.0 + 1e-4], [1.0, 1.0]];
        let res = assign(&cost, AssignmentPolicy::Optimal, None);
        assert_eq!(res.matches, vec![(0, 0), (1, 1)]);

        let cost = array![[1.0 + 1e-4, 1.0], [1.0, 1.0]];
        let res = assign(&cost, AssignmentPolicy::Optimal, None);
        assert_eq!(res.matches, vec![(0, 1), (1, 0)]);
    }

    #[test]
    fn test_more_columns_than_rows() {
        let cost = array![[5.0, 1.0, 9.0]];
        let res = assign(&cost, AssignmentPolicy::Greedy, None);
        assert_eq!(res.matches, vec![(0, 1)]);
        assert!(res.unmatched_tracks.is_empty());
        assert_eq!(res.unmatched_observations, vec![0, 2]);
    }

    #[test]
    fn test_more_rows_than_columns_optimal() {
        let cost = array![[5.0], [1.0], [9.0]];
        let res = assign(&cost, AssignmentPolicy::Optimal, None);
        assert_eq!(res.matches, vec![(1, 0)]);
        assert_eq!(res.unmatched_tracks, vec![0, 2]);
        assert!(res.unmatched_observations.is_empty());
    }

    #[test]
    fn test_gate_rejects_far_pairs() {
        let cost = array![[1.0, 50.0], [60.0, 70.0]];
        for policy in [AssignmentPolicy::Greedy, AssignmentPolicy::Optimal] {
            let res = assign(&cost, policy, Some(20.0));
            assert_eq!(res.matches, vec![(0, 0)]);
            assert_eq!(res.unmatched_tracks, vec![1]);
            assert_eq!(res.unmatched_observations, vec![1]);
        }
    }

    #[test]
    fn test_empty_matrix() {
        let cost = Array2::<f32>::zeros((0, 3));
        let res = assign(&cost, AssignmentPolicy::Greedy, None);
        assert!(res.matches.is_empty());
        assert_eq!(res.unmatched_observations, vec![0, 1, 2]);

        let cost = Array2::<f32>::zeros((2, 0));
        let res = assign(&cost, AssignmentPolicy::Optimal, None);
        assert_eq!(res.unmatched_tracks, vec![0, 1]);
    }

    #[test]
    fn test_bijection() {
        let cost = array![
            [4.0, 1.0, 3.0, 7.0],
            [2.0, 0.0, 5.0, 1.0],
            [3.0, 2.0, 2.0, 8.0]
        ];
        for policy in [AssignmentPolicy::Greedy, AssignmentPolicy::Optimal] {
            let res = assign(&cost, policy, None);
            let mut rows: Vec<_> = res.matches.iter().map(|m| m.0).collect();
            let mut cols: Vec<_> = res.matches.iter().map(|m| m.1).collect();
            rows.dedup();
            cols.sort_unstable();
            cols.dedup();
            assert_eq!(rows.len(), 3);
            assert_eq!(cols.len(), 3);
            assert_eq!(res.unmatched_observations.len(), 1);
        }
    }
}
