//! Alignment and CNV parsing pipelines
//!
//! - [`align`]: count-matrix filtering and metadata alignment
//! - [`cnv`]: CNV caller text parsing
//! - [`config`]: run configuration and validation
//! - [`output`]: tab-separated writers
//! - [`driver`]: runs both stages in sequence

pub mod align;
pub mod cnv;
pub mod config;
pub mod driver;
pub mod output;

pub mod prelude {
    pub use super::align::{
        align, align_matrix, filter_matrix, intersect_preserving_order, read_10x_mtx,
        AlignParams, Alignment, AlignmentSummary, CellQc, CountMatrix, GeneLabel, MetadataSchema,
        MetadataTable,
    };
    pub use super::cnv::{parse_cnv_file, parse_cnv_reader, CnvField, CnvTable};
    pub use super::config::PipelineConfig;
    pub use super::driver::{run_pipeline, PipelineOutput};
    pub use super::output::{write_cnv_table, write_count_matrix, OutputOptions};
}
