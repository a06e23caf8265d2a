//! End-to-end driver: count-matrix alignment, then CNV parsing

use crate::core::error::Result;
use crate::pipeline::align::{align, AlignmentSummary, CellQc, CountMatrix};
use crate::pipeline::cnv::{parse_cnv_file, CnvTable};
use crate::pipeline::config::PipelineConfig;
use crate::pipeline::output::{write_cell_qc, write_cnv_table, write_count_matrix};
use log::info;
use std::fs;
use std::path::PathBuf;

pub const COUNTS_FILE: &str = "raw_counts_matrix.tsv";
pub const CNV_FILE: &str = "cnv_matrix.tsv";
pub const QC_FILE: &str = "cell_qc.tsv";

/// In-memory results of a run.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub counts: CountMatrix,
    pub cnv: CnvTable,
    pub qc: Vec<CellQc>,
    pub annotations: Option<Vec<String>>,
    pub summary: AlignmentSummary,
    /// Files written, in order.
    pub written: Vec<PathBuf>,
}

/// Run both stages and write their outputs under `config.output_dir`.
///
/// The first failure aborts the run and is returned unchanged.
pub fn run_pipeline(config: &PipelineConfig) -> Result<PipelineOutput> {
    fs::create_dir_all(&config.output_dir)?;
    let mut written = Vec::new();

    info!("Aligning count matrix {}", config.matrix_dir.display());
    let alignment = align(&config.matrix_dir, &config.metadata, &config.align)?;

    let counts_path = config
        .output_dir
        .join(config.output.file_name(COUNTS_FILE));
    write_count_matrix(&alignment.matrix, &Some(&counts_path), &config.output)?;
    written.push(counts_path);

    if config.write_qc {
        let qc_path = config.output_dir.join(config.output.file_name(QC_FILE));
        let annotations = match (&config.align.annotation_column, &alignment.annotations) {
            (Some(name), Some(values)) => Some((name.as_str(), values.as_slice())),
            _ => None,
        };
        write_cell_qc(&alignment.qc, annotations, &Some(&qc_path), &config.output)?;
        written.push(qc_path);
    }

    info!("Parsing CNV table {}", config.cnv.display());
    let cnv = parse_cnv_file(&config.cnv)?;

    let cnv_path = config.output_dir.join(config.output.file_name(CNV_FILE));
    write_cnv_table(&cnv, &Some(&cnv_path), &config.output)?;
    written.push(cnv_path);

    Ok(PipelineOutput {
        counts: alignment.matrix,
        cnv,
        qc: alignment.qc,
        annotations: alignment.annotations,
        summary: alignment.summary,
        written,
    })
}
