//! Per-construction generators: turning a compact generating *value* into a
//! digital net's R x C bit matrices.
//!
//! [`NetConstruction`] is the capability set every construction exposes;
//! [`ConstructedNet`] is the net variant built up one coordinate at a time
//! from such values, sharing already-built matrices with its parent via
//! `Rc` so CBC search can retain prefix nets cheaply while it explores
//! extensions (see spec §4.5's ownership note). [`ExplicitNet`] is the
//! other variant: the matrices themselves, with no generating value
//! backing them.

pub mod explicit;
pub mod polynomial;
pub mod sobol;

use std::rc::Rc;

use rand::RngCore;

use crate::bitmatrix::GF2Matrix;
use crate::error::Result;

/// The capability set a net construction exposes: Sobol, Polynomial or
/// Explicit (spec §4.5). `Value` is the compact generating value for one
/// coordinate (direction numbers, a polynomial, or a matrix outright).
pub trait NetConstruction {
    type Value: Clone;

    /// Number of rows of a generated matrix.
    fn n_rows(&self) -> usize;
    /// Number of columns of a generated matrix.
    fn n_cols(&self) -> usize;

    /// Rejects a value outside this construction's domain (e.g. mⱼ even,
    /// or mⱼ ≥ 2^j for Sobol).
    fn check_value(&self, value: &Self::Value) -> Result<()>;

    /// Builds the R x C generating matrix for a value.
    fn make_matrix(&self, value: &Self::Value) -> Result<GF2Matrix>;

    /// The (possibly infinite, but here always enumerable) value space for
    /// a given coordinate index, used by exhaustive and CBC search.
    fn value_space_for_coord(&self, coord: usize) -> Vec<Self::Value>;

    /// Draws one value uniformly (subject to the construction's own
    /// rejection rule) from the value space for a coordinate.
    fn sample_random(&self, coord: usize, rng: &mut dyn RngCore) -> Self::Value;

    /// A short human-readable rendering of a value, for reports.
    fn format(&self, value: &Self::Value) -> String;
}

/// A net built up one coordinate at a time, sharing already-built matrices
/// with any net it was extended from.
#[derive(Clone)]
pub struct ConstructedNet<V> {
    values: Vec<V>,
    matrices: Vec<Rc<GF2Matrix>>,
}

impl<V: Clone> ConstructedNet<V> {
    pub fn empty() -> Self {
        Self {
            values: Vec::new(),
            matrices: Vec::new(),
        }
    }

    pub fn dimension(&self) -> usize {
        self.values.len()
    }

    pub fn values(&self) -> &[V] {
        &self.values
    }

    pub fn matrices(&self) -> &[Rc<GF2Matrix>] {
        &self.matrices
    }

    /// Returns a new net sharing this one's matrices and appending one more
    /// coordinate, built from `value` via `construction`.
    pub fn extend_dimension<C>(&self, construction: &C, value: V) -> Result<Self>
    where
        C: NetConstruction<Value = V>,
    {
        construction.check_value(&value)?;
        let matrix = construction.make_matrix(&value)?;
        let mut values = self.values.clone();
        let mut matrices = self.matrices.clone();
        values.push(value);
        matrices.push(Rc::new(matrix));
        Ok(Self { values, matrices })
    }

    /// The generating matrices for a subset of coordinates, in the order given.
    pub fn project(&self, coords: &[usize]) -> Vec<GF2Matrix> {
        coords.iter().map(|&c| (*self.matrices[c]).clone()).collect()
    }
}

/// A net that owns its matrices directly, with no generating value.
#[derive(Clone)]
pub struct ExplicitNet {
    matrices: Vec<GF2Matrix>,
}

impl ExplicitNet {
    pub fn new(matrices: Vec<GF2Matrix>) -> Self {
        Self { matrices }
    }

    pub fn dimension(&self) -> usize {
        self.matrices.len()
    }

    pub fn matrices(&self) -> &[GF2Matrix] {
        &self.matrices
    }

    pub fn project(&self, coords: &[usize]) -> Vec<GF2Matrix> {
        coords.iter().map(|&c| self.matrices[c].clone()).collect()
    }
}
