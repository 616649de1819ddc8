//! Online reduced row-echelon form over GF(2), with row replacement.
//!
//! This is the hot engine behind [`crate::tvalue`]: unlike a textbook
//! Gaussian elimination that is re-run from scratch, [`ProgressiveRowReducer`]
//! keeps a matrix in reduced form across a sequence of `addRow`/`addColumn`/
//! `replaceRow` mutations, each touching only the rows actually affected.
//! The bookkeeping mirrors the way `tomchaplin-lophat`'s `SerialAlgorithm`
//! keeps a `low_inverse: HashMap<usize, usize>` up to date incrementally
//! rather than recomputing it (`algorithms/serial.rs`), generalized from
//! "one pivot map" to the full pivot/non-pivot row and column bookkeeping
//! this engine's contract requires.

use hashbrown::{HashMap, HashSet};
use tracing::trace;

use crate::bitmatrix::GF2Matrix;
use crate::error::{Error, Result};

fn sorted_insert(v: &mut Vec<usize>, value: usize) {
    match v.binary_search(&value) {
        Ok(_) => {}
        Err(pos) => v.insert(pos, value),
    }
}

fn sorted_remove(v: &mut Vec<usize>, value: usize) {
    if let Ok(pos) = v.binary_search(&value) {
        v.remove(pos);
    }
}

/// Incrementally-maintained reduced row-echelon form of a GF(2) matrix.
///
/// See the module docs and spec §4.2/§3 for the full contract. All public
/// mutators maintain the invariants documented there; violating them is a
/// programming error caught by [`ProgressiveRowReducer::check_invariants`]
/// in debug builds.
#[derive(Debug, Clone)]
pub struct ProgressiveRowReducer {
    /// The raw (unreduced) input rows, as last given to `add_row`/`replace_row`.
    /// `replace_row` needs these to recompute any other row whose `ops`
    /// depends on the replaced one; `reduced`/`ops` alone can't express that.
    originals: GF2Matrix,
    reduced: GF2Matrix,
    ops: GF2Matrix,
    pivot_by_row: HashMap<usize, usize>,
    pivot_by_col: HashMap<usize, usize>,
    cols_without_pivot: Vec<usize>,
    rows_without_pivot: Vec<usize>,
    smallest_full_rank: usize,
    n_rows: usize,
    n_cols: usize,
}

impl ProgressiveRowReducer {
    /// A reducer over zero rows and `n_cols` columns.
    pub fn new(n_cols: usize) -> Self {
        Self {
            originals: GF2Matrix::zeros(0, n_cols),
            reduced: GF2Matrix::zeros(0, n_cols),
            ops: GF2Matrix::zeros(0, 0),
            pivot_by_row: HashMap::new(),
            pivot_by_col: HashMap::new(),
            cols_without_pivot: (0..n_cols).collect(),
            rows_without_pivot: Vec::new(),
            smallest_full_rank: 0,
            n_rows: 0,
            n_cols,
        }
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// Number of rows that currently hold a pivot: the rank of the matrix so far.
    pub fn rank(&self) -> usize {
        self.pivot_by_row.len()
    }

    pub fn pivot_of_row(&self, row: usize) -> Option<usize> {
        self.pivot_by_row.get(&row).copied()
    }

    pub fn row_of_pivot(&self, col: usize) -> Option<usize> {
        self.pivot_by_col.get(&col).copied()
    }

    /// The least `C*` such that the first `C*` columns span the full row
    /// rank, i.e. every row added so far has a pivot among columns `< C*`.
    /// `n_cols() + 1` if some row is (still) a dependent combination of the
    /// others, and so can never gain a pivot.
    pub fn smallest_full_rank(&self) -> usize {
        self.smallest_full_rank
    }

    /// Read access to the current reduced form.
    pub fn reduced(&self) -> &GF2Matrix {
        &self.reduced
    }

    /// Read access to the row-operations matrix: `ops * original = reduced`.
    pub fn ops(&self) -> &GF2Matrix {
        &self.ops
    }

    fn check_row(&self, row: usize) -> Result<()> {
        if row >= self.n_rows {
            Err(Error::OutOfBounds {
                index: row,
                limit: self.n_rows,
            })
        } else {
            Ok(())
        }
    }

    /// Eliminates the pivot columns, in increasing order, out of `row`.
    /// Because a pivot row's only nonzero entry among pivot columns is its
    /// own, processing in increasing column order never reintroduces a bit
    /// at an earlier pivot column.
    fn eliminate_against_pivots(&mut self, row: usize) {
        let mut pivot_cols: Vec<usize> = self.pivot_by_col.keys().copied().collect();
        pivot_cols.sort_unstable();
        for c in pivot_cols {
            if self.reduced.get(row, c) {
                let p = self.pivot_by_col[&c];
                if p == row {
                    continue;
                }
                self.reduced.row_xor(row, p).expect("row indices in range");
                self.ops.row_xor(row, p).expect("row indices in range");
            }
        }
    }

    /// Makes `row` the pivot row for `col`: removes the bit from every other
    /// row, pivot or not, and records the pivot.
    fn promote(&mut self, row: usize, col: usize) {
        for r in 0..self.n_rows {
            if r != row && self.reduced.get(r, col) {
                self.reduced.row_xor(r, row).expect("row indices in range");
                self.ops.row_xor(r, row).expect("row indices in range");
            }
        }
        self.pivot_by_row.insert(row, col);
        self.pivot_by_col.insert(col, row);
        sorted_remove(&mut self.rows_without_pivot, row);
        sorted_remove(&mut self.cols_without_pivot, col);
        trace!(row, col, "promoted row to pivot");
    }

    /// Undoes the pivot status of `row`, if it has one: its pivot column
    /// becomes free again. Does not touch `row`'s contents.
    fn release(&mut self, row: usize) -> Option<usize> {
        let col = self.pivot_by_row.remove(&row)?;
        self.pivot_by_col.remove(&col);
        sorted_insert(&mut self.cols_without_pivot, col);
        Some(col)
    }

    fn recompute_smallest_full_rank(&mut self) {
        self.smallest_full_rank = if !self.rows_without_pivot.is_empty() {
            self.n_cols + 1
        } else if self.pivot_by_col.is_empty() {
            0
        } else {
            self.pivot_by_col.keys().copied().max().unwrap() + 1
        };
    }

    /// Stacks `new_row` (given as its set-bit column indices) below the
    /// matrix, reduces it against existing pivots, and if a nonzero
    /// remainder survives, gives it a fresh pivot at its first set bit.
    pub fn add_row(&mut self, new_row: &[usize]) -> Result<()> {
        for &c in new_row {
            if c >= self.n_cols {
                return Err(Error::OutOfBounds {
                    index: c,
                    limit: self.n_cols,
                });
            }
        }
        let row = self.n_rows;
        self.ops.grow_cols(1);
        self.ops.push_row(std::iter::empty())?;
        self.ops.set(row, row, true);
        self.originals.push_row(new_row.iter().copied())?;
        self.reduced.push_row(new_row.iter().copied())?;
        self.n_rows += 1;
        self.rows_without_pivot.push(row);

        self.eliminate_against_pivots(row);
        if let Some(col) = self.reduced.row_first_one(row) {
            self.promote(row, col);
        }
        self.recompute_smallest_full_rank();
        trace!(row, n_rows = self.n_rows, "add_row");
        Ok(())
    }

    /// Appends a new column, given as the set of original-row indices that
    /// carry a 1 in it (i.e. a column of the matrix `ops` is applied to, not
    /// of `reduced` directly). Promotes a pivot-free row if one now has a 1
    /// there.
    pub fn add_column(&mut self, new_col: &[usize]) -> Result<()> {
        let col = self.n_cols;
        for &r in new_col {
            if r >= self.n_rows {
                return Err(Error::OutOfBounds {
                    index: r,
                    limit: self.n_rows,
                });
            }
        }
        self.n_cols += 1;
        self.reduced.grow_cols(1);
        self.originals.grow_cols(1);
        sorted_insert(&mut self.cols_without_pivot, col);

        let origin: HashSet<usize> = new_col.iter().copied().collect();
        for &r in &origin {
            self.originals.set(r, col, true);
        }
        for i in 0..self.n_rows {
            let parity = self
                .ops
                .row_entries(i)
                .filter(|j| origin.contains(j))
                .count()
                % 2
                == 1;
            self.reduced.set(i, col, parity);
        }

        let promote_row = self
            .rows_without_pivot
            .iter()
            .copied()
            .find(|&r| self.reduced.get(r, col));
        if let Some(row) = promote_row {
            self.promote(row, col);
        }
        self.recompute_smallest_full_rank();
        trace!(col, n_cols = self.n_cols, "add_column");
        Ok(())
    }

    /// Replaces row `i`'s contents with `new_row` (raw, unreduced column
    /// indices) and restores reduced form. This is the hot path used by
    /// [`crate::tvalue::TValueEngine`].
    ///
    /// `promote` routinely XORs a pivot row into every other row with a 1 in
    /// its pivot column, so other rows' `ops` can (and in practice
    /// routinely do) reference row `i`'s original content, not just row
    /// `i`'s own `ops`. Every such row's `reduced` entry is stale the moment
    /// row `i`'s input changes, so they are re-derived here from the
    /// retained `originals`, not just row `i` itself.
    pub fn replace_row(&mut self, i: usize, new_row: &[usize]) -> Result<()> {
        self.check_row(i)?;
        for &c in new_row {
            if c >= self.n_cols {
                return Err(Error::OutOfBounds {
                    index: c,
                    limit: self.n_cols,
                });
            }
        }

        // Identify every row whose recorded combination (`ops`) still
        // touches row `i`'s old content, before that content or `ops[i]`
        // itself changes under us.
        let mut stale: Vec<usize> = (0..self.n_rows).filter(|&r| self.ops.row_entries(r).any(|src| src == i)).collect();
        if !stale.contains(&i) {
            stale.push(i);
        }
        stale.sort_unstable();

        self.originals.set_row(i, new_row.iter().copied())?;
        // Row `i`'s own combination resets to just itself: its previous
        // content is gone, not merely stale.
        self.ops.set_row(i, std::iter::once(i))?;

        for &r in &stale {
            self.release(r);
            if !self.rows_without_pivot.contains(&r) {
                sorted_insert(&mut self.rows_without_pivot, r);
            }
        }

        for &r in &stale {
            let mut acc: HashSet<usize> = HashSet::new();
            for src in self.ops.row_entries(r).collect::<Vec<_>>() {
                for c in self.originals.row_entries(src) {
                    if !acc.remove(&c) {
                        acc.insert(c);
                    }
                }
            }
            let mut bits: Vec<usize> = acc.into_iter().collect();
            bits.sort_unstable();
            self.reduced.set_row(r, bits.iter().copied())?;
        }

        // Re-derive RREF over the stale rows in increasing order, exactly
        // as a fresh sequence of `add_row` calls would against the pivots
        // that remain valid throughout.
        for r in stale {
            self.eliminate_against_pivots(r);
            if let Some(col) = self.reduced.row_first_one(r) {
                if !self.pivot_by_col.contains_key(&col) {
                    self.promote(r, col);
                }
            }
        }

        self.recompute_smallest_full_rank();
        trace!(row = i, "replace_row");
        Ok(())
    }

    /// For `c = first_col .. first_col + n`, the rank of the submatrix
    /// restricted to columns `0..=c`.
    pub fn compute_ranks(&self, first_col: usize, n: usize) -> Vec<usize> {
        let mut pivot_cols: Vec<usize> = self.pivot_by_col.keys().copied().collect();
        pivot_cols.sort_unstable();
        (0..n)
            .map(|i| {
                let c = first_col + i;
                pivot_cols.partition_point(|&pc| pc <= c)
            })
            .collect()
    }

    /// Debug-only consistency check of the documented invariants. Intended
    /// for use in tests, not the hot path.
    #[cfg(any(test, debug_assertions))]
    pub fn check_invariants(&self) {
        assert_eq!(
            self.pivot_by_row.len() + self.rows_without_pivot.len(),
            self.n_rows
        );
        assert_eq!(self.pivot_by_row.len(), self.pivot_by_col.len());
        for (&row, &col) in self.pivot_by_row.iter() {
            assert!(self.reduced.get(row, col), "pivot bit must be set");
            for r in 0..self.n_rows {
                if r != row {
                    assert!(!self.reduced.get(r, col), "pivot column must be clean elsewhere");
                }
            }
        }
        for &row in &self.rows_without_pivot {
            // Every bit set in a pivot-free row must land on a pivot-free column.
            assert!(self
                .reduced
                .row_entries(row)
                .all(|c| !self.pivot_by_col.contains_key(&c)));
        }
        for row in 0..self.n_rows {
            // ops * originals == reduced, checked directly rather than only
            // through pivot bookkeeping.
            let mut acc: HashSet<usize> = HashSet::new();
            for src in self.ops.row_entries(row) {
                for c in self.originals.row_entries(src) {
                    if !acc.remove(&c) {
                        acc.insert(c);
                    }
                }
            }
            let mut expected: Vec<usize> = acc.into_iter().collect();
            expected.sort_unstable();
            let actual: Vec<usize> = self.reduced.row_entries(row).collect();
            assert_eq!(expected, actual, "ops * originals must equal reduced for row {row}");
        }
    }
}
