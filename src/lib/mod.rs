//! cnvalign: count-matrix alignment and CNV table preparation
//!
//! The library prepares two inputs for downstream single-cell CNV analysis:
//! 1. A raw gene × cell count matrix, filtered by non-zero thresholds and
//!    restricted to the cells listed in curated metadata for one sample
//! 2. A gene × cell CNV table parsed from a CNV caller's text output
//!
//! # Modules
//!
//! - [`core`]: errors, I/O helpers, sparse-matrix operations
//! - [`pipeline`]: alignment, CNV parsing, writers and the end-to-end driver
//! - [`utils`]: flat re-exports of the helpers used by the binary

pub mod core;
pub mod pipeline;
pub mod utils;
