//! Computes the t-value quality parameter of a digital net.
//!
//! A net's s generating matrices (each R x C over GF(2)) have t-value
//! `C - kmax`, where `kmax` is the largest k such that every way of drawing
//! a composition of k into s positive parts (aᵢ rows from matrix i) yields a
//! linearly independent row set. [`CompositionMaker`] enumerates those
//! compositions in single-unit-move order so each successive check only
//! needs one [`ProgressiveRowReducer::replace_row`] instead of a fresh
//! reduction.
//!
//! Matrices are addressed 0-indexed; composition part `p` (1-indexed, as
//! [`CompositionMaker`] produces) draws from matrix `s - p`, so the last
//! matrix backs the first part and the first matrix backs the last
//! (largest, in the starting composition) part. This mapping, and the use
//! of `reducer.rank() == k` (rather than `smallest_full_rank() == n_cols`)
//! as the per-composition full-rank check, are resolutions of ambiguity in
//! how the underlying routine's matrix indexing and full-rank signal were
//! described; both are chosen to match the worked example of a (3,3)
//! identity/all-ones net pair having t-value 1.

use hashbrown::HashMap;

use crate::bitmatrix::GF2Matrix;
use crate::composition::CompositionMaker;
use crate::error::{Error, Result};
use crate::reducer::ProgressiveRowReducer;

fn validate_matrices(matrices: &[GF2Matrix]) -> Result<(usize, usize)> {
    let s = matrices.len();
    if s == 0 {
        return Err(Error::ShapeMismatch("a net needs at least one generating matrix".into()));
    }
    let c = matrices[0].n_cols();
    for m in matrices {
        if m.n_cols() != c {
            return Err(Error::ShapeMismatch(format!(
                "generating matrices disagree in column count: {} vs {}",
                m.n_cols(),
                c
            )));
        }
    }
    Ok((s, c))
}

/// `true` iff every composition of `k` into `s` positive parts, drawing
/// `a_p` rows from matrix `s - p`, gives a rank-`k` (linearly independent)
/// row set.
fn all_compositions_full_rank(matrices: &[GF2Matrix], k: usize, s: usize) -> Result<bool> {
    let mut maker = CompositionMaker::new(k, s);
    let mut reducer = ProgressiveRowReducer::new(matrices[0].n_cols());
    let mut origin_to_row: HashMap<(usize, usize), usize> = HashMap::new();

    let initial = maker.current().to_vec();
    for part in 1..=s {
        let matrix_index = s - part;
        let count = initial[part - 1];
        for unit in 1..=count {
            let bits: Vec<usize> = matrices[matrix_index].row_entries(unit - 1).collect();
            let reducer_row = reducer.n_rows();
            reducer.add_row(&bits)?;
            origin_to_row.insert((part, unit), reducer_row);
        }
    }

    let mut all_full = reducer.rank() == k;
    while all_full && maker.advance() {
        let delta = maker.delta().expect("delta available after advance");
        let reducer_row = *origin_to_row
            .get(&(delta.from_part, delta.from_unit))
            .expect("composition transition references a tracked origin");
        let matrix_index = s - delta.to_part;
        let bits: Vec<usize> = matrices[matrix_index].row_entries(delta.to_unit - 1).collect();
        reducer.replace_row(reducer_row, &bits)?;
        origin_to_row.remove(&(delta.from_part, delta.from_unit));
        origin_to_row.insert((delta.to_part, delta.to_unit), reducer_row);
        all_full = reducer.rank() == k;
    }
    Ok(all_full)
}

/// Computes the t-value of a single net from its s generating matrices.
///
/// `s = 1` gives `t = 0` by definition. Otherwise searches k downward from
/// `C - 1`, returning `C - k` at the first (largest) k where every
/// composition of k into s parts is full rank.
pub fn single_net_t_value(matrices: &[GF2Matrix]) -> Result<usize> {
    let (s, c) = validate_matrices(matrices)?;
    if s == 1 {
        return Ok(0);
    }
    if c < s {
        return Err(Error::ShapeMismatch(format!(
            "{s} generating matrices need at least {s} columns, got {c}"
        )));
    }
    for k in (s..c).rev() {
        if all_compositions_full_rank(matrices, k, s)? {
            return Ok(c - k);
        }
    }
    Ok(c - (s - 1))
}

/// Per-level t-values for an embedded (multilevel) net, for embedding
/// levels `m_min + 1 ..= C`.
///
/// Each returned entry is tightened against (never below) the
/// corresponding bound in `max_sub_proj`, and the sequence respects
/// `t(l + 1) <= t(l) + 1`.
pub fn compute_t_value(base_matrices: &[GF2Matrix], m_min: usize, max_sub_proj: &[usize]) -> Result<Vec<usize>> {
    let (s, c) = validate_matrices(base_matrices)?;
    if m_min >= c {
        return Ok(Vec::new());
    }
    let n_levels = c - m_min;
    if max_sub_proj.len() != n_levels {
        return Err(Error::ShapeMismatch(format!(
            "max_sub_proj has {} entries, expected {}",
            max_sub_proj.len(),
            n_levels
        )));
    }

    let mut levels = if s == 1 {
        single_matrix_levels(&base_matrices[0], m_min)?
    } else {
        let mut levels = Vec::with_capacity(n_levels);
        for l in (m_min + 1)..=c {
            let truncated: Vec<GF2Matrix> = base_matrices
                .iter()
                .map(|m| m.sub(0, 0, m.n_rows().min(l), l))
                .collect::<Result<_>>()?;
            levels.push(single_net_t_value(&truncated)?);
        }
        levels
    };

    for (level, bound) in levels.iter_mut().zip(max_sub_proj) {
        if *level < *bound {
            *level = *bound;
        }
    }
    for i in 1..levels.len() {
        if levels[i] > levels[i - 1] + 1 {
            levels[i] = levels[i - 1] + 1;
        }
    }
    Ok(levels)
}

/// The s=1 shortcut: t(level l) = l - (count of pivots with `max(row, col) < l`).
///
/// Counting must be strict (`< l`, not `<= l`): a pivot at level `l - 1` is
/// the `l`-th one seen by level `l`, so using `<= l` double-counts it and
/// the formula can go negative (e.g. `identity(n)` must give t ≡ 0 at every
/// level, since every pivot `(r, r)` sits at level `r < l` for all levels
/// past it).
fn single_matrix_levels(matrix: &GF2Matrix, m_min: usize) -> Result<Vec<usize>> {
    let c = matrix.n_cols();
    let mut reducer = ProgressiveRowReducer::new(c);
    let mut used = vec![0usize; c + 1];
    for r in 0..matrix.n_rows().min(c) {
        let before = reducer.rank();
        let bits: Vec<usize> = matrix.row_entries(r).collect();
        reducer.add_row(&bits)?;
        if reducer.rank() > before {
            let col = reducer.pivot_of_row(r).expect("row just gained a pivot");
            let level = r.max(col);
            if level < used.len() {
                used[level] += 1;
            }
        }
    }
    let mut prefix = vec![0usize; c + 1];
    for l in 0..=c {
        prefix[l] = used[l] + if l > 0 { prefix[l - 1] } else { 0 };
    }
    // prefix[l - 1] counts pivots with level <= l - 1, i.e. level < l; l is
    // always >= 1 here since the range starts at m_min + 1.
    Ok(((m_min + 1)..=c).map(|l| l.saturating_sub(prefix[l - 1])).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(n: usize) -> GF2Matrix {
        GF2Matrix::from_row_indices(n, (0..n).map(|i| vec![i]).collect()).unwrap()
    }

    fn all_ones(n: usize) -> GF2Matrix {
        GF2Matrix::from_row_indices(n, (0..n).map(|_| (0..n).collect()).collect()).unwrap()
    }

    #[test]
    fn single_matrix_t_value_is_zero() {
        let m = identity(3);
        assert_eq!(single_net_t_value(&[m]).unwrap(), 0);
    }

    #[test]
    fn identity_and_all_ones_has_t_value_one() {
        // Matches S1: (R,C)=(3,3), M1 = I3, M2 = J.
        let matrices = vec![identity(3), all_ones(3)];
        assert_eq!(single_net_t_value(&matrices).unwrap(), 1);
    }

    #[test]
    fn two_identical_matrices_are_maximally_dependent() {
        let m = identity(3);
        let matrices = vec![m.clone(), m];
        // Any composition drawing >1 row total from the same space of rows
        // collides; the best achievable k is s - 1, per the trivial floor.
        let t = single_net_t_value(&matrices).unwrap();
        assert!(t >= 1);
    }

    #[test]
    fn compute_t_value_respects_sub_proj_bound_and_monotonicity() {
        let matrices = vec![identity(4)];
        let bounds = vec![0, 0, 0];
        let levels = compute_t_value(&matrices, 1, &bounds).unwrap();
        assert_eq!(levels.len(), 3);
        for w in levels.windows(2) {
            assert!(w[1] <= w[0] + 1);
        }
        for (l, b) in levels.iter().zip(&bounds) {
            assert!(l >= b);
        }
    }
}
