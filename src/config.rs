//! Tagged-union input types the core consumes from its external
//! collaborators (CLI parsing, weight-file readers — spec §6), and the
//! `SearchConfig` knob bundle those collaborators assemble.
//!
//! Follows `tomchaplin-lophat::options::LoPhatOptions`'s shape almost
//! verbatim: a plain struct of knobs with an explicit `Default` impl, no
//! builder macro. `serde` derives on every externally-visible type here so
//! a (not-implemented) config-file reader can deserialize them.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::merit::kernel::Kernel;
use crate::weights::Weights;

/// Construction tag for nets (`Explicit` is also used for the "Ordinary"
/// lattice construction tag of spec §6, since both mean "the generator is
/// given directly").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ConstructionTag {
    Sobol,
    Polynomial,
    Explicit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Embedding {
    Unilevel,
    Multilevel,
}

/// The construction's size parameter, one of three shapes depending on
/// `ConstructionTag`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SizeParameter {
    /// `n = 2^m` points.
    Bits(usize),
    /// Modulus polynomial, encoded as a bitmask (bit `i` = coefficient of `x^i`).
    Modulus(u64),
    /// Explicit `(R, C)` matrix shape.
    Shape { n_rows: usize, n_cols: usize },
}

/// Dimension and interlacing factor; effective dimension is `dimension * interlacing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DimensionSpec {
    pub dimension: usize,
    pub interlacing: usize,
}

impl DimensionSpec {
    pub fn effective_dimension(&self) -> usize {
        self.dimension * self.interlacing
    }
}

/// One of the four figure families of spec §4.6, plus the figure's own
/// smoothness exponent and norm exponent.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FigureTag {
    TValue,
    PAlpha { alpha: u32 },
    BAlpha { alpha: f64 },
    IAAlpha { alpha: f64 },
    CoordUniform { alpha: f64 },
}

impl FigureTag {
    /// The one-dimensional kernel a coordinate-uniform figure folds over;
    /// `None` for `TValue`, which has no kernel.
    pub fn kernel(&self) -> Option<Kernel> {
        match *self {
            FigureTag::TValue => None,
            FigureTag::PAlpha { alpha } => Some(Kernel::PAlpha(alpha)),
            FigureTag::BAlpha { alpha } => Some(Kernel::BAlpha(alpha)),
            FigureTag::IAAlpha { alpha } => Some(Kernel::IAAlpha(alpha)),
            FigureTag::CoordUniform { alpha } => Some(Kernel::PAlpha((2.0 * (alpha / 2.0).round()).max(2.0) as u32)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum StrategyTag {
    Exhaustive,
    Random { n_tries: usize, seed: u64 },
    Cbc,
    FastCbc,
}

/// The full set of knobs a search run is configured with.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SearchConfig {
    pub construction: ConstructionTag,
    pub embedding: Embedding,
    pub size: SizeParameter,
    pub dimension: DimensionSpec,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub weights: Option<Weights>,
    pub figure: FigureTag,
    pub norm_exponent: f64,
    pub strategy: StrategyTag,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            construction: ConstructionTag::Explicit,
            embedding: Embedding::Unilevel,
            size: SizeParameter::Shape { n_rows: 4, n_cols: 4 },
            dimension: DimensionSpec {
                dimension: 1,
                interlacing: 1,
            },
            weights: None,
            figure: FigureTag::TValue,
            norm_exponent: 2.0,
            strategy: StrategyTag::Exhaustive,
        }
    }
}
