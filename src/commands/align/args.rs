use std::path::PathBuf;
use structopt::StructOpt;

use crate::commands::common::{AlignOpts, OutputOpts};

/// Arguments for the `align` command.
#[derive(Debug, Clone, StructOpt)]
#[structopt(
    name = "align",
    about = "Filter a count matrix and align it to curated cell metadata"
)]
pub struct AlignArgs {
    /// Cell Ranger matrix directory (matrix.mtx, features.tsv, barcodes.tsv).
    #[structopt(short, long, parse(from_os_str))]
    pub matrix_dir: PathBuf,

    /// Tab-separated metadata table, optionally gzipped.
    #[structopt(long, parse(from_os_str))]
    pub metadata: PathBuf,

    #[structopt(flatten)]
    pub align: AlignOpts,

    /// Output count matrix; `-` writes to stdout.
    #[structopt(short, long, parse(from_os_str), default_value = "raw_counts_matrix.tsv")]
    pub output: PathBuf,

    /// Also write per-cell QC metrics for the aligned cells to this path.
    #[structopt(long, parse(from_os_str))]
    pub qc: Option<PathBuf>,

    #[structopt(flatten)]
    pub output_opts: OutputOpts,
}
