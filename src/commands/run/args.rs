use anyhow::Result;
use cnvalign_lib::pipeline::config::PipelineConfig;
use std::path::PathBuf;
use structopt::StructOpt;

use crate::commands::common::{AlignOpts, OutputOpts};

/// Arguments for the `run` command.
#[derive(Debug, Clone, StructOpt)]
#[structopt(name = "run", about = "Run count-matrix alignment and CNV parsing end to end")]
pub struct RunArgs {
    /// Cell Ranger matrix directory (matrix.mtx, features.tsv, barcodes.tsv).
    #[structopt(short, long, parse(from_os_str))]
    pub matrix_dir: PathBuf,

    /// Tab-separated metadata table, optionally gzipped.
    #[structopt(long, parse(from_os_str))]
    pub metadata: PathBuf,

    /// CNV caller text output; may be gzipped.
    #[structopt(long, parse(from_os_str))]
    pub cnv: PathBuf,

    /// Directory receiving raw_counts_matrix.tsv, cnv_matrix.tsv and cell_qc.tsv.
    #[structopt(long, parse(from_os_str), default_value = ".")]
    pub outdir: PathBuf,

    #[structopt(flatten)]
    pub align: AlignOpts,

    #[structopt(flatten)]
    pub output_opts: OutputOpts,

    /// Skip writing the per-cell QC table.
    #[structopt(long)]
    pub no_qc: bool,

    /// Validate inputs without processing.
    #[structopt(long)]
    pub dry_run: bool,
}

impl RunArgs {
    pub fn to_config(&self, threads: usize) -> PipelineConfig {
        let mut config = PipelineConfig::new(
            &self.matrix_dir,
            &self.metadata,
            &self.cnv,
            &self.outdir,
            self.align.to_params(),
        );
        config.output = self.output_opts.to_options(threads);
        config.write_qc = !self.no_qc;
        config
    }

    pub fn validate(&self) -> Result<()> {
        self.align.validate()?;
        self.to_config(self.output_opts.threads).validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn builds_pipeline_config() {
        let args = RunArgs::from_iter_safe(&[
            "run",
            "--matrix-dir",
            "m",
            "--metadata",
            "meta.tsv",
            "--cnv",
            "cnv.txt",
            "--id-prefix",
            "DS1",
            "--sample-id",
            "GSM1",
            "--min-genes",
            "2",
            "--gzip",
            "--no-qc",
        ])
        .unwrap();

        let config = args.to_config(4);
        assert_eq!(config.cnv, PathBuf::from("cnv.txt"));
        assert_eq!(config.output_dir, PathBuf::from("."));
        assert_eq!(config.align.min_genes, 2);
        assert_eq!(config.align.sample_id, "GSM1");
        assert_eq!(config.output.threads, 4);
        assert!(config.output.gzip);
        assert!(!config.write_qc);
    }
}
