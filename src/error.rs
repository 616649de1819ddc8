//! Error kinds surfaced across the crate.
//!
//! [`Error::ShapeMismatch`] and [`Error::OutOfBounds`] indicate a
//! programming error in a caller driving [`crate::bitmatrix::GF2Matrix`] or
//! [`crate::reducer::ProgressiveRowReducer`] directly; they are not expected
//! to occur when going through [`crate::search`].

use thiserror::Error;

/// Errors that can surface from the core search and linear-algebra engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// An impossible or unsupported combination of configuration was requested,
    /// e.g. a non-zero default weight on an order-dependent family, or
    /// fast-CBC paired with a figure that is not coordinate-uniform.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Two matrices or vectors that were expected to agree in shape did not.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// An index fell outside the bounds of the structure it indexed into.
    #[error("index {index} out of bounds (limit {limit})")]
    OutOfBounds {
        /// The offending index.
        index: usize,
        /// The exclusive upper bound that `index` violated.
        limit: usize,
    },

    /// A search exhausted its declared candidate space without ever
    /// producing a finite-merit net.
    #[error("search exhausted its candidate space without finding a finite-merit net")]
    NoCandidate,

    /// A cooperative abort signal propagated out of an evaluator.
    #[error("evaluation aborted")]
    Aborted,

    /// A kernel argument fell outside its mathematical domain, e.g. alpha <= 1
    /// for the IAalpha kernel.
    #[error("numeric domain error: {0}")]
    NumericDomain(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
