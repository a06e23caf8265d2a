//! Count-matrix alignment against curated cell metadata
//!
//! - [`tenx`]: Cell Ranger matrix directory reader
//! - [`count_matrix`]: the gene × cell [`CountMatrix`]
//! - [`filter`]: non-zero threshold filtering of genes and cells
//! - [`matcher`]: order-preserving identifier intersection
//! - [`metadata`]: tab-separated metadata tables and column schema
//! - [`qc`]: per-cell QC metrics and the mitochondrial filter
//! - [`aligner`]: the alignment workflow tying these together

pub mod aligner;
pub mod count_matrix;
pub mod filter;
pub mod matcher;
pub mod metadata;
pub mod qc;
pub mod tenx;

pub use aligner::{align, align_matrix, AlignParams, Alignment, AlignmentSummary};
pub use count_matrix::CountMatrix;
pub use filter::filter_matrix;
pub use matcher::intersect_preserving_order;
pub use metadata::{MetadataSchema, MetadataTable};
pub use qc::CellQc;
pub use tenx::{read_10x_mtx, GeneLabel};
