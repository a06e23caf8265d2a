//! cnvalign - single-cell count matrix alignment and CNV table preparation
//!
//! # Tools
//!
//! - `align`: filter a Cell Ranger matrix and keep the cells listed in the metadata
//! - `cnv`: parse a CNV caller's text output into a tab-separated matrix
//! - `run`: both of the above into one output directory
//!
//! # Usage
//!
//! ```bash
//! # Align a raw matrix to the curated cells of one sample
//! cnvalign align --matrix-dir raw_feature_bc_matrix --metadata metadata.tsv.gz \
//!     --id-prefix DS1 --sample-id GSM1 --output raw_counts_matrix.tsv
//!
//! # Convert CNV caller output, writing to stdout
//! cnvalign cnv --input infercnv.observations.txt --output -
//!
//! # Full pipeline
//! cnvalign run --matrix-dir raw_feature_bc_matrix --metadata metadata.tsv.gz \
//!     --cnv infercnv.observations.txt --id-prefix DS1 --sample-id GSM1 --outdir prepared
//! ```

extern crate cnvalign_lib;
pub mod commands;
use anyhow::Result;
use env_logger::Env;
use log::*;
use cnvalign_lib::utils;
use structopt::StructOpt;

#[derive(StructOpt)]
#[structopt(rename_all = "kebab-case", author, about)]
/// Prepare single-cell count matrices and CNV tables for downstream analysis
struct Args {
    #[structopt(subcommand)]
    subcommand: Subcommand,
}

#[derive(StructOpt)]
enum Subcommand {
    /// Filter a count matrix and align it to curated cell metadata
    Align(commands::AlignArgs),
    /// Parse CNV caller output into a tab-separated matrix
    Cnv(commands::CnvArgs),
    /// Run alignment and CNV parsing end to end
    Run(commands::RunArgs),
}

impl Subcommand {
    fn run(self) -> Result<()> {
        match self {
            Subcommand::Align(args) => commands::run_align(args)?,
            Subcommand::Cnv(args) => commands::run_cnv(args)?,
            Subcommand::Run(args) => commands::run_pipeline(args)?,
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    if let Err(err) = Args::from_args().subcommand.run() {
        if utils::is_broken_pipe(&err) {
            std::process::exit(0);
        }
        error!("{}", err);
        std::process::exit(1);
    }
    Ok(())
}
