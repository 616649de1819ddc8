//! Explicit construction: the generating "value" for a coordinate is an
//! R x C matrix outright, so [`ExplicitConstruction`] is mostly a thin
//! passthrough over [`NetConstruction`] plus the rejection-sampling rule
//! for drawing a random matrix whose rows stack to full rank.

use rand::RngCore;

use crate::bitmatrix::GF2Matrix;
use crate::error::{Error, Result};
use crate::net::NetConstruction;

pub struct ExplicitConstruction {
    n_rows: usize,
    n_cols: usize,
    max_attempts: usize,
}

impl ExplicitConstruction {
    pub fn new(n_rows: usize, n_cols: usize) -> Self {
        Self {
            n_rows,
            n_cols,
            max_attempts: 10_000,
        }
    }

    pub fn with_max_attempts(n_rows: usize, n_cols: usize, max_attempts: usize) -> Self {
        Self {
            n_rows,
            n_cols,
            max_attempts,
        }
    }
}

impl NetConstruction for ExplicitConstruction {
    type Value = GF2Matrix;

    fn n_rows(&self) -> usize {
        self.n_rows
    }

    fn n_cols(&self) -> usize {
        self.n_cols
    }

    fn check_value(&self, value: &Self::Value) -> Result<()> {
        if value.n_rows() != self.n_rows || value.n_cols() != self.n_cols {
            return Err(Error::ShapeMismatch(format!(
                "explicit matrix is {}x{}, expected {}x{}",
                value.n_rows(),
                value.n_cols(),
                self.n_rows,
                self.n_cols
            )));
        }
        Ok(())
    }

    fn make_matrix(&self, value: &Self::Value) -> Result<GF2Matrix> {
        self.check_value(value)?;
        Ok(value.clone())
    }

    fn value_space_for_coord(&self, _coord: usize) -> Vec<Self::Value> {
        // The space of all R x C matrices is enumerable in principle but is
        // astronomically large for any useful size; explicit construction
        // is meant to be driven by caller-supplied matrices (random search
        // or direct specification), not exhaustive search.
        Vec::new()
    }

    fn sample_random(&self, _coord: usize, rng: &mut dyn RngCore) -> Self::Value {
        'attempt: for _ in 0..self.max_attempts {
            let mut rows = Vec::with_capacity(self.n_rows);
            for _ in 0..self.n_rows {
                let entries: Vec<usize> = (0..self.n_cols).filter(|_| rng.next_u32() & 1 == 1).collect();
                rows.push(entries);
            }
            let matrix = match GF2Matrix::from_row_indices(self.n_cols, rows) {
                Ok(m) => m,
                Err(_) => continue 'attempt,
            };
            if full_row_rank(&matrix) {
                return matrix;
            }
        }
        GF2Matrix::zeros(self.n_rows, self.n_cols)
    }

    fn format(&self, value: &Self::Value) -> String {
        (0..value.n_rows())
            .map(|r| {
                (0..value.n_cols())
                    .map(|c| if value.get(r, c) { '1' } else { '0' })
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("/")
    }
}

fn full_row_rank(matrix: &GF2Matrix) -> bool {
    use crate::reducer::ProgressiveRowReducer;
    let mut reducer = ProgressiveRowReducer::new(matrix.n_cols());
    for r in 0..matrix.n_rows() {
        let bits: Vec<usize> = matrix.row_entries(r).collect();
        if reducer.add_row(&bits).is_err() {
            return false;
        }
    }
    reducer.rank() == matrix.n_rows()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn check_value_rejects_wrong_shape() {
        let construction = ExplicitConstruction::new(3, 3);
        let wrong = GF2Matrix::zeros(2, 3);
        assert!(construction.check_value(&wrong).is_err());
    }

    #[test]
    fn make_matrix_passes_through() {
        let construction = ExplicitConstruction::new(2, 2);
        let value = GF2Matrix::from_row_indices(2, vec![vec![0], vec![1]]).unwrap();
        let matrix = construction.make_matrix(&value).unwrap();
        assert_eq!(matrix.get(0, 0), true);
        assert_eq!(matrix.get(1, 1), true);
    }

    #[test]
    fn sample_random_is_full_rank() {
        let construction = ExplicitConstruction::new(3, 3);
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let matrix = construction.sample_random(0, &mut rng);
        assert!(full_row_rank(&matrix));
    }
}
