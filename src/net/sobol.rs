//! Sobol construction: the generating value for a coordinate is
//! `(direction_index, m)`, a choice of primitive polynomial (looked up by
//! `direction_index` in a small built-in table) together with the odd
//! initialization integers `m_1, ..., m_deg` (`m_j < 2^j`). The matrix
//! columns are the direction numbers produced by the standard Sobol
//! recurrence, expressed as bits.
//!
//! The built-in polynomial table only covers the first few coordinates.
//! A full Joe-Kuo-style table of primitive polynomials and initial
//! direction numbers for thousands of dimensions is exactly the kind of
//! large reference data set this crate treats as an external collaborator
//! (alongside weight files and CLI parsing, spec §1) rather than embedding
//! wholesale; callers needing more dimensions supply their own
//! `PrimitivePolynomial` table via [`SobolConstruction::with_polynomials`].

use rand::{Rng, RngCore};

use crate::bitmatrix::GF2Matrix;
use crate::error::{Error, Result};
use crate::net::NetConstruction;

/// A primitive polynomial over GF(2) of degree `degree`, given by the
/// coefficients `a_1, ..., a_{degree-1}` of its interior terms (the leading
/// and constant terms are implicitly 1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimitivePolynomial {
    pub degree: usize,
    pub interior_coeffs: Vec<bool>,
}

fn builtin_polynomials() -> Vec<PrimitivePolynomial> {
    vec![
        PrimitivePolynomial {
            degree: 0,
            interior_coeffs: vec![],
        },
        PrimitivePolynomial {
            degree: 1,
            interior_coeffs: vec![],
        },
        PrimitivePolynomial {
            degree: 2,
            interior_coeffs: vec![true],
        },
        PrimitivePolynomial {
            degree: 3,
            interior_coeffs: vec![true, false],
        },
    ]
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SobolValue {
    pub direction_index: usize,
    pub m: Vec<u32>,
}

pub struct SobolConstruction {
    n_bits: usize,
    polynomials: Vec<PrimitivePolynomial>,
}

impl SobolConstruction {
    pub fn new(n_bits: usize) -> Self {
        Self {
            n_bits,
            polynomials: builtin_polynomials(),
        }
    }

    pub fn with_polynomials(n_bits: usize, polynomials: Vec<PrimitivePolynomial>) -> Self {
        Self { n_bits, polynomials }
    }

    /// The default value for a coordinate: its built-in polynomial with
    /// every `m_j = 1`.
    pub fn default_value(&self, coord: usize) -> Result<SobolValue> {
        let poly = self.polynomials.get(coord).ok_or_else(|| {
            Error::Configuration(format!("no built-in primitive polynomial for coordinate {coord}"))
        })?;
        Ok(SobolValue {
            direction_index: coord,
            m: vec![1; poly.degree.max(1)],
        })
    }

    fn direction_numbers(&self, value: &SobolValue) -> Result<Vec<u32>> {
        let poly = self
            .polynomials
            .get(value.direction_index)
            .ok_or_else(|| Error::Configuration(format!("unknown direction index {}", value.direction_index)))?;
        let l = self.n_bits;
        let d = poly.degree;
        let mut v = vec![0u32; l + 1]; // 1-indexed

        if d == 0 {
            for j in 1..=l {
                v[j] = 1 << (l - j);
            }
            return Ok(v[1..=l].to_vec());
        }

        for j in 1..=d.min(l) {
            let m_j = *value.m.get(j - 1).unwrap_or(&1);
            v[j] = m_j << (l - j);
        }
        for j in (d + 1)..=l {
            let mut acc = v[j - d] ^ (v[j - d] >> d);
            for k in 1..d {
                if poly.interior_coeffs.get(k - 1).copied().unwrap_or(false) {
                    acc ^= v[j - k] << (d - k);
                }
            }
            v[j] = acc;
        }
        Ok(v[1..=l].to_vec())
    }
}

impl NetConstruction for SobolConstruction {
    type Value = SobolValue;

    fn n_rows(&self) -> usize {
        self.n_bits
    }

    fn n_cols(&self) -> usize {
        self.n_bits
    }

    fn check_value(&self, value: &Self::Value) -> Result<()> {
        let poly = self
            .polynomials
            .get(value.direction_index)
            .ok_or_else(|| Error::Configuration(format!("unknown direction index {}", value.direction_index)))?;
        for (j0, &m_j) in value.m.iter().enumerate() {
            let j = j0 + 1;
            if m_j % 2 == 0 {
                return Err(Error::Configuration(format!("m_{j} must be odd, got {m_j}")));
            }
            if j <= poly.degree && m_j >= (1 << j) {
                return Err(Error::Configuration(format!("m_{j} must be < 2^{j}, got {m_j}")));
            }
        }
        Ok(())
    }

    fn make_matrix(&self, value: &Self::Value) -> Result<GF2Matrix> {
        let v = self.direction_numbers(value)?;
        let mut rows = vec![Vec::new(); self.n_bits];
        for (col, &vj) in v.iter().enumerate() {
            for row in 0..self.n_bits {
                if (vj >> (self.n_bits - 1 - row)) & 1 == 1 {
                    rows[row].push(col);
                }
            }
        }
        GF2Matrix::from_row_indices(self.n_bits, rows)
    }

    fn value_space_for_coord(&self, coord: usize) -> Vec<Self::Value> {
        let Some(poly) = self.polynomials.get(coord) else {
            return Vec::new();
        };
        if poly.degree == 0 {
            return vec![SobolValue {
                direction_index: coord,
                m: vec![],
            }];
        }
        let ranges: Vec<Vec<u32>> = (1..=poly.degree).map(|j| (0..(1u32 << j)).filter(|m| m % 2 == 1).collect()).collect();
        let mut out = Vec::new();
        let mut acc = Vec::with_capacity(poly.degree);
        fn rec(ranges: &[Vec<u32>], acc: &mut Vec<u32>, out: &mut Vec<SobolValue>, coord: usize) {
            if acc.len() == ranges.len() {
                out.push(SobolValue {
                    direction_index: coord,
                    m: acc.clone(),
                });
                return;
            }
            for &m in &ranges[acc.len()] {
                acc.push(m);
                rec(ranges, acc, out, coord);
                acc.pop();
            }
        }
        rec(&ranges, &mut acc, &mut out, coord);
        out
    }

    fn sample_random(&self, coord: usize, rng: &mut dyn RngCore) -> Self::Value {
        let space = self.value_space_for_coord(coord);
        let idx = rng.gen_range(0..space.len().max(1));
        space.into_iter().nth(idx).unwrap_or(SobolValue {
            direction_index: coord,
            m: vec![1],
        })
    }

    fn format(&self, value: &Self::Value) -> String {
        format!("direction_index={} m={:?}", value.direction_index, value.m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degree_zero_is_identity() {
        let construction = SobolConstruction::new(4);
        let value = construction.default_value(0).unwrap();
        let matrix = construction.make_matrix(&value).unwrap();
        for r in 0..4 {
            assert_eq!(matrix.row_entries(r).collect::<Vec<_>>(), vec![r]);
        }
    }

    #[test]
    fn check_value_rejects_even_m() {
        let construction = SobolConstruction::new(4);
        let value = SobolValue {
            direction_index: 2,
            m: vec![1, 2],
        };
        assert!(construction.check_value(&value).is_err());
    }

    #[test]
    fn matrix_has_expected_shape() {
        let construction = SobolConstruction::new(4);
        let value = construction.default_value(2).unwrap();
        let matrix = construction.make_matrix(&value).unwrap();
        assert_eq!(matrix.n_rows(), 4);
        assert_eq!(matrix.n_cols(), 4);
    }
}
