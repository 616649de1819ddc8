//! A packed bit matrix over GF(2).
//!
//! Each row is stored as a [`BitSet`], the same packed-word representation
//! `tomchaplin-lophat` uses for a single boundary column (see
//! `columns/bit_set.rs`); here every row of the matrix gets one. Addition in
//! GF(2) is XOR, which `BitSet` exposes as `symmetric_difference_with` in
//! O(C / word-size).

use bit_set::BitSet;

use crate::error::Error;

/// A rectangular array of bits of shape `(n_rows, n_cols)`.
///
/// `n_rows` and `n_cols` are fixed at construction. Rows are the unit of
/// mutation: `row_xor`, `swap_rows` and `set_row` all operate at row
/// granularity, matching the column-oriented mutation the teacher's
/// `Column` trait exposes, transposed to rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GF2Matrix {
    rows: Vec<BitSet>,
    n_rows: usize,
    n_cols: usize,
}

impl GF2Matrix {
    /// An all-zero matrix of the given shape.
    pub fn zeros(n_rows: usize, n_cols: usize) -> Self {
        Self {
            rows: (0..n_rows).map(|_| BitSet::with_capacity(n_cols)).collect(),
            n_rows,
            n_cols,
        }
    }

    /// Builds a matrix from a list of rows, each given as the sorted indices
    /// of its set bits.
    pub fn from_row_indices(n_cols: usize, rows: Vec<Vec<usize>>) -> crate::error::Result<Self> {
        let n_rows = rows.len();
        let mut out = Self::zeros(n_rows, n_cols);
        for (r, entries) in rows.into_iter().enumerate() {
            for c in entries {
                if c >= n_cols {
                    return Err(Error::OutOfBounds {
                        index: c,
                        limit: n_cols,
                    });
                }
                out.rows[r].insert(c);
            }
        }
        Ok(out)
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    fn check_row(&self, r: usize) -> crate::error::Result<()> {
        if r >= self.n_rows {
            Err(Error::OutOfBounds {
                index: r,
                limit: self.n_rows,
            })
        } else {
            Ok(())
        }
    }

    fn check_col(&self, c: usize) -> crate::error::Result<()> {
        if c >= self.n_cols {
            Err(Error::OutOfBounds {
                index: c,
                limit: self.n_cols,
            })
        } else {
            Ok(())
        }
    }

    /// Reads bit `(r, c)`.
    pub fn get(&self, r: usize, c: usize) -> bool {
        self.rows[r].contains(c)
    }

    /// Writes bit `(r, c)`.
    pub fn set(&mut self, r: usize, c: usize, value: bool) {
        if value {
            self.rows[r].insert(c);
        } else {
            self.rows[r].remove(c);
        }
    }

    /// A read-only view of a single row's set bit indices, in increasing order.
    pub fn row_entries(&self, r: usize) -> impl Iterator<Item = usize> + '_ {
        self.rows[r].iter()
    }

    /// The smallest set-bit index in a row, if any.
    pub fn row_first_one(&self, r: usize) -> Option<usize> {
        self.rows[r].iter().next()
    }

    /// `rows[dst] <- rows[dst] XOR rows[src]`, the GF(2) row addition.
    pub fn row_xor(&mut self, dst: usize, src: usize) -> crate::error::Result<()> {
        self.check_row(dst)?;
        self.check_row(src)?;
        if dst == src {
            self.rows[dst].clear();
            return Ok(());
        }
        let src_row = self.rows[src].clone();
        self.rows[dst].symmetric_difference_with(&src_row);
        Ok(())
    }

    /// Replaces row `i` wholesale with the given row, given as set-bit indices.
    pub fn set_row(&mut self, i: usize, entries: impl IntoIterator<Item = usize>) -> crate::error::Result<()> {
        self.check_row(i)?;
        let mut row = BitSet::with_capacity(self.n_cols);
        for c in entries {
            self.check_col(c)?;
            row.insert(c);
        }
        self.rows[i] = row;
        Ok(())
    }

    /// Swaps two rows.
    pub fn swap_rows(&mut self, i: usize, j: usize) -> crate::error::Result<()> {
        self.check_row(i)?;
        self.check_row(j)?;
        self.rows.swap(i, j);
        Ok(())
    }

    /// Returns a copy of the contiguous window
    /// `[row_start, row_start + n_rows) x [col_start, col_start + n_cols)`.
    pub fn sub(
        &self,
        row_start: usize,
        col_start: usize,
        n_rows: usize,
        n_cols: usize,
    ) -> crate::error::Result<Self> {
        if row_start + n_rows > self.n_rows {
            return Err(Error::OutOfBounds {
                index: row_start + n_rows,
                limit: self.n_rows,
            });
        }
        if col_start + n_cols > self.n_cols {
            return Err(Error::OutOfBounds {
                index: col_start + n_cols,
                limit: self.n_cols,
            });
        }
        let mut out = Self::zeros(n_rows, n_cols);
        for r in 0..n_rows {
            for c in self.rows[row_start + r].iter() {
                if c >= col_start && c < col_start + n_cols {
                    out.rows[r].insert(c - col_start);
                }
            }
        }
        Ok(out)
    }

    /// Appends `other`'s rows below this matrix's rows. Requires equal column counts.
    pub fn stack_below(&self, other: &Self) -> crate::error::Result<Self> {
        if self.n_cols != other.n_cols {
            return Err(Error::ShapeMismatch(format!(
                "cannot stack matrix of width {} below matrix of width {}",
                other.n_cols, self.n_cols
            )));
        }
        let mut rows = self.rows.clone();
        rows.extend(other.rows.iter().cloned());
        Ok(Self {
            n_rows: rows.len(),
            n_cols: self.n_cols,
            rows,
        })
    }

    /// Appends a single row below the matrix, given as set-bit indices.
    pub fn push_row(&mut self, entries: impl IntoIterator<Item = usize>) -> crate::error::Result<()> {
        let mut row = BitSet::with_capacity(self.n_cols);
        for c in entries {
            self.check_col(c)?;
            row.insert(c);
        }
        self.rows.push(row);
        self.n_rows += 1;
        Ok(())
    }

    /// Widens the matrix by `extra` columns, without touching any existing bit.
    /// Used by the reducer, whose `ops` and `reduced` matrices grow as rows
    /// and columns are progressively added.
    pub fn grow_cols(&mut self, extra: usize) {
        self.n_cols += extra;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_xor_is_addition() {
        let mut m = GF2Matrix::from_row_indices(3, vec![vec![0, 1], vec![1, 2]]).unwrap();
        m.row_xor(0, 1).unwrap();
        assert_eq!(m.row_entries(0).collect::<Vec<_>>(), vec![0, 2]);
    }

    #[test]
    fn sub_extracts_window() {
        let m = GF2Matrix::from_row_indices(4, vec![vec![0, 1, 2], vec![1, 2, 3], vec![0, 3]]).unwrap();
        let window = m.sub(1, 1, 2, 2).unwrap();
        assert_eq!(window.n_rows(), 2);
        assert_eq!(window.n_cols(), 2);
        assert_eq!(window.row_entries(0).collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(window.row_entries(1).collect::<Vec<_>>(), Vec::<usize>::new());
    }

    #[test]
    fn stack_below_requires_matching_width() {
        let a = GF2Matrix::zeros(1, 3);
        let b = GF2Matrix::zeros(1, 4);
        assert!(matches!(a.stack_below(&b), Err(Error::ShapeMismatch(_))));
    }

    #[test]
    fn stack_below_concatenates_rows() {
        let a = GF2Matrix::from_row_indices(2, vec![vec![0]]).unwrap();
        let b = GF2Matrix::from_row_indices(2, vec![vec![1]]).unwrap();
        let stacked = a.stack_below(&b).unwrap();
        assert_eq!(stacked.n_rows(), 2);
        assert!(stacked.get(0, 0));
        assert!(stacked.get(1, 1));
    }
}
