use std::path::PathBuf;
use structopt::StructOpt;

use crate::commands::common::OutputOpts;

/// Arguments for the `cnv` command.
#[derive(Debug, Clone, StructOpt)]
#[structopt(name = "cnv", about = "Parse CNV caller output into a tab-separated matrix")]
pub struct CnvArgs {
    /// CNV caller text output (quoted header, one gene per line); may be gzipped.
    #[structopt(short, long, parse(from_os_str))]
    pub input: PathBuf,

    /// Output CNV matrix; `-` writes to stdout.
    #[structopt(short, long, parse(from_os_str), default_value = "-")]
    pub output: PathBuf,

    #[structopt(flatten)]
    pub output_opts: OutputOpts,
}
