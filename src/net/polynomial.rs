//! Polynomial lattice construction: the generating value for a coordinate
//! is a polynomial over GF(2), represented as a bitmask where bit `i` is the
//! coefficient of `x^i`. The modulus polynomial `P(x)` (degree `C`) is fixed
//! for the whole net; a coordinate's matrix is the first `C` coefficients of
//! the Laurent expansion of `value(x) / P(x)` around `x = infinity`, one
//! expansion per starting shift `x^{-(row+1)}`.

use rand::{Rng, RngCore};

use crate::bitmatrix::GF2Matrix;
use crate::error::{Error, Result};
use crate::net::NetConstruction;

/// A polynomial over GF(2), bit `i` of `bits` is the coefficient of `x^i`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GF2Polynomial {
    pub bits: u64,
}

impl GF2Polynomial {
    pub fn new(bits: u64) -> Self {
        Self { bits }
    }

    pub fn degree(&self) -> Option<usize> {
        if self.bits == 0 {
            None
        } else {
            Some(63 - self.bits.leading_zeros() as usize)
        }
    }
}

pub struct PolynomialConstruction {
    modulus: GF2Polynomial,
    n_rows: usize,
    n_cols: usize,
}

impl PolynomialConstruction {
    /// `modulus` must have degree exactly `n_cols`.
    pub fn new(modulus: GF2Polynomial, n_rows: usize, n_cols: usize) -> Result<Self> {
        match modulus.degree() {
            Some(d) if d == n_cols => Ok(Self {
                modulus,
                n_rows,
                n_cols,
            }),
            Some(d) => Err(Error::Configuration(format!(
                "modulus polynomial has degree {d}, expected {n_cols}"
            ))),
            None => Err(Error::Configuration("modulus polynomial must be nonzero".into())),
        }
    }

    /// Long division of `x^{shift}` by the modulus, extracting `n_cols`
    /// Laurent coefficients starting just below `x^0`.
    fn shifted_expansion(&self, value: &GF2Polynomial, shift: usize) -> Vec<bool> {
        // Numerator is value(x) * x^shift, worked modulo the reduction rule
        // implied by the modulus: repeatedly fold the leading bit back in
        // whenever the running remainder reaches degree C.
        let c = self.n_cols;
        let mut remainder: u64 = value.bits << shift;
        let mut coeffs = vec![false; c];
        // Reduce remainder below degree `c + shift_window` isn't needed: we
        // only need the top `c` coefficients of the quotient, produced by
        // synthetic division one bit at a time, high-degree first.
        let top = remainder.leading_zeros();
        let deg = if remainder == 0 { None } else { Some(63 - top as usize) };
        let mut deg = deg.unwrap_or(0);
        for out_bit in coeffs.iter_mut() {
            if remainder == 0 {
                break;
            }
            while deg >= c && remainder != 0 {
                remainder ^= self.modulus.bits << (deg - c);
                deg = if remainder == 0 { 0 } else { 63 - remainder.leading_zeros() as usize };
            }
            if deg < c && (remainder >> deg) & 1 == 1 {
                *out_bit = true;
            }
            if remainder != 0 {
                remainder &= !(1 << deg);
                deg = if remainder == 0 { 0 } else { 63 - remainder.leading_zeros() as usize };
            }
        }
        coeffs
    }
}

impl NetConstruction for PolynomialConstruction {
    type Value = GF2Polynomial;

    fn n_rows(&self) -> usize {
        self.n_rows
    }

    fn n_cols(&self) -> usize {
        self.n_cols
    }

    fn check_value(&self, value: &Self::Value) -> Result<()> {
        match value.degree() {
            Some(d) if d < self.n_cols => Ok(()),
            Some(d) => Err(Error::Configuration(format!(
                "generating polynomial has degree {d}, must be below modulus degree {}",
                self.n_cols
            ))),
            None => Err(Error::Configuration("generating polynomial must be nonzero".into())),
        }
    }

    fn make_matrix(&self, value: &Self::Value) -> Result<GF2Matrix> {
        let mut rows = Vec::with_capacity(self.n_rows);
        for row in 0..self.n_rows {
            let coeffs = self.shifted_expansion(value, row + 1);
            rows.push(coeffs.iter().enumerate().filter(|(_, &b)| b).map(|(i, _)| i).collect());
        }
        GF2Matrix::from_row_indices(self.n_cols, rows)
    }

    fn value_space_for_coord(&self, _coord: usize) -> Vec<Self::Value> {
        let limit = 1u64 << self.n_cols;
        (1..limit).map(GF2Polynomial::new).collect()
    }

    fn sample_random(&self, _coord: usize, rng: &mut dyn RngCore) -> Self::Value {
        let limit = 1u64 << self.n_cols;
        GF2Polynomial::new(rng.gen_range(1..limit))
    }

    fn format(&self, value: &Self::Value) -> String {
        format!("0b{:b}", value.bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_modulus_of_wrong_degree() {
        let modulus = GF2Polynomial::new(0b111); // degree 2
        assert!(PolynomialConstruction::new(modulus, 3, 3).is_err());
    }

    #[test]
    fn accepts_matching_modulus_degree() {
        let modulus = GF2Polynomial::new(0b1011); // degree 3
        assert!(PolynomialConstruction::new(modulus, 3, 3).is_ok());
    }

    #[test]
    fn check_value_rejects_value_above_modulus_degree() {
        let modulus = GF2Polynomial::new(0b1011);
        let construction = PolynomialConstruction::new(modulus, 3, 3).unwrap();
        let too_big = GF2Polynomial::new(0b1000);
        assert!(construction.check_value(&too_big).is_err());
    }

    #[test]
    fn make_matrix_has_expected_shape() {
        let modulus = GF2Polynomial::new(0b1011);
        let construction = PolynomialConstruction::new(modulus, 3, 3).unwrap();
        let value = GF2Polynomial::new(0b1);
        let matrix = construction.make_matrix(&value).unwrap();
        assert_eq!(matrix.n_rows(), 3);
        assert_eq!(matrix.n_cols(), 3);
    }
}
