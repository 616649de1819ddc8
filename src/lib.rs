//! # netbuilder-core
//!
//! A search engine for high-quality low-discrepancy point sets: digital
//! nets in base 2 and rank-1 integration lattices, for quasi-Monte Carlo
//! integration. The core is two coupled subsystems:
//!
//! - the GF(2) t-value engine ([`bitmatrix`], [`reducer`], [`composition`],
//!   [`tvalue`]), an incremental linear-algebra engine that computes a
//!   net's quality parameter via an outer enumeration over compositions;
//! - the search driver ([`search`]), a generic exploration skeleton
//!   (exhaustive / random / component-by-component / fast-CBC) that
//!   enumerates candidate generators ([`net`]), scores them with a
//!   pluggable figure of merit ([`merit`], [`weights`]), and tracks the
//!   best result under an early-abortion contract.
//!
//! Command-line parsing, weight-file readers and output formatting beyond
//! [`report::SearchResult`]'s `Display`/machine-string forms are external
//! collaborators this crate exposes typed interfaces for but does not own.

pub mod bitmatrix;
pub mod composition;
pub mod config;
pub mod error;
pub mod filters;
pub mod merit;
pub mod net;
pub mod reducer;
pub mod report;
pub mod search;
pub mod tvalue;
pub mod weights;

pub use bitmatrix::GF2Matrix;
pub use composition::{CompositionDelta, CompositionMaker};
pub use error::{Error, Result};
pub use reducer::ProgressiveRowReducer;
pub use tvalue::{compute_t_value, single_net_t_value};
