//! Tab-separated writers for the pipeline outputs

use crate::core::error::Result;
use crate::core::fs::make_parent_dirs;
use crate::core::io::get_writer;
use crate::pipeline::align::{CellQc, CountMatrix};
use crate::pipeline::cnv::{CnvField, CnvTable};
use log::info;
use std::path::Path;

/// Compression settings shared by all writers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputOptions {
    pub gzip: bool,
    pub threads: usize,
    pub compression_level: u32,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            gzip: false,
            threads: 1,
            compression_level: 6,
        }
    }
}

impl OutputOptions {
    /// File name with a `.gz` suffix when compression is on.
    pub fn file_name(&self, base: &str) -> String {
        if self.gzip {
            format!("{}.gz", base)
        } else {
            base.to_string()
        }
    }
}

fn prepare<P: AsRef<Path>>(path: &Option<P>) -> Result<()> {
    if let Some(path) = path {
        if path.as_ref() != Path::new("-") {
            make_parent_dirs(path)?;
        }
    }
    Ok(())
}

fn describe<P: AsRef<Path>>(path: &Option<P>) -> String {
    match path {
        Some(p) if p.as_ref() != Path::new("-") => p.as_ref().display().to_string(),
        _ => "stdout".to_string(),
    }
}

/// Write counts with both labels: an empty corner cell and the barcodes as
/// header, then one line per gene.
pub fn write_count_matrix<P: AsRef<Path>>(
    matrix: &CountMatrix,
    path: &Option<P>,
    options: &OutputOptions,
) -> Result<()> {
    prepare(path)?;
    let mut writer = get_writer(path, options.gzip, options.threads, options.compression_level)?;

    let mut header = Vec::with_capacity(matrix.n_cells() + 1);
    header.push("");
    header.extend(matrix.barcodes().iter().map(String::as_str));
    writer.write_record(&header)?;

    let mut record = Vec::with_capacity(matrix.n_cells() + 1);
    for (i, gene) in matrix.genes().iter().enumerate() {
        record.clear();
        record.push(gene.clone());
        record.extend(matrix.dense_row(i).into_iter().map(|v| v.to_string()));
        writer.write_record(&record)?;
    }
    writer.flush()?;

    info!(
        "Wrote {} × {} count matrix to {}",
        matrix.n_genes(),
        matrix.n_cells(),
        describe(path)
    );
    Ok(())
}

/// Write the CNV table without row labels; the gene names are the first column.
pub fn write_cnv_table<P: AsRef<Path>>(
    table: &CnvTable,
    path: &Option<P>,
    options: &OutputOptions,
) -> Result<()> {
    prepare(path)?;
    let mut writer = get_writer(path, options.gzip, options.threads, options.compression_level)?;
    writer.write_record(table.columns())?;

    let mut record: Vec<String> = Vec::with_capacity(table.shape().1);
    for i in 0..table.n_genes() {
        record.clear();
        record.extend(table.row(i).into_iter().map(|field| match field {
            CnvField::Gene(name) => name.to_string(),
            CnvField::Value(v) => format_value(v),
        }));
        writer.write_record(&record)?;
    }
    writer.flush()?;

    info!(
        "Wrote {} × {} CNV matrix to {}",
        table.shape().0,
        table.shape().1,
        describe(path)
    );
    Ok(())
}

/// Per-cell QC metrics, optionally followed by an annotation column.
pub fn write_cell_qc<P: AsRef<Path>>(
    qc: &[CellQc],
    annotations: Option<(&str, &[String])>,
    path: &Option<P>,
    options: &OutputOptions,
) -> Result<()> {
    prepare(path)?;
    let mut writer = get_writer(path, options.gzip, options.threads, options.compression_level)?;

    let mut header = vec!["barcode", "n_genes", "n_counts", "pct_mito"];
    if let Some((name, _)) = annotations {
        header.push(name);
    }
    writer.write_record(&header)?;

    for (i, cell) in qc.iter().enumerate() {
        let mut record = vec![
            cell.barcode.clone(),
            cell.n_genes.to_string(),
            cell.n_counts.to_string(),
            format_value(cell.pct_mito),
        ];
        if let Some((_, values)) = annotations {
            record.push(values.get(i).cloned().unwrap_or_default());
        }
        writer.write_record(&record)?;
    }
    writer.flush()?;

    info!("Wrote QC metrics for {} cells to {}", qc.len(), describe(path));
    Ok(())
}

/// Shortest decimal form that reads back to the same value, always with a
/// fractional part or exponent.
fn format_value(v: f64) -> String {
    format!("{:?}", v)
}
