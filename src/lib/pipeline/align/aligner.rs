//! Metadata-driven alignment of a count matrix to a curated cell set

use crate::core::error::{PrepError, Result};
use crate::core::sparse::SparseOps;
use crate::pipeline::align::count_matrix::CountMatrix;
use crate::pipeline::align::filter::filter_matrix;
use crate::pipeline::align::matcher::intersect_preserving_order;
use crate::pipeline::align::metadata::{MetadataSchema, MetadataTable};
use crate::pipeline::align::qc::{compute_cell_qc, filter_mito, CellQc, DEFAULT_MITO_PREFIX};
use crate::pipeline::align::tenx::{read_10x_mtx, GeneLabel};
use log::{info, warn};
use rustc_hash::FxHashMap;
use std::path::Path;

pub const DEFAULT_MIN_GENES: usize = 200;
pub const DEFAULT_MIN_CELLS: usize = 3;

/// Parameters for [`align`].
#[derive(Debug, Clone)]
pub struct AlignParams {
    /// Required start of the merged-barcode value.
    pub id_prefix: String,
    /// Required start of the sample-id value.
    pub sample_id: String,
    pub min_genes: usize,
    pub min_cells: usize,
    pub schema: MetadataSchema,
    pub gene_labels: GeneLabel,
    pub mito_prefix: String,
    /// Drop cells whose mitochondrial fraction is not below this value.
    pub max_mito_fraction: Option<f64>,
    /// Metadata column copied onto each surviving cell.
    pub annotation_column: Option<String>,
}

impl AlignParams {
    pub fn new(id_prefix: impl Into<String>, sample_id: impl Into<String>) -> Self {
        Self {
            id_prefix: id_prefix.into(),
            sample_id: sample_id.into(),
            min_genes: DEFAULT_MIN_GENES,
            min_cells: DEFAULT_MIN_CELLS,
            schema: MetadataSchema::default(),
            gene_labels: GeneLabel::default(),
            mito_prefix: DEFAULT_MITO_PREFIX.to_string(),
            max_mito_fraction: None,
            annotation_column: None,
        }
    }

    pub fn with_thresholds(mut self, min_genes: usize, min_cells: usize) -> Self {
        self.min_genes = min_genes;
        self.min_cells = min_cells;
        self
    }
}

/// Shapes observed along the way, for reporting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlignmentSummary {
    pub raw_shape: (usize, usize),
    pub filtered_shape: (usize, usize),
    pub metadata_rows: usize,
    pub selected_metadata_rows: usize,
    pub matched_cells: usize,
}

/// Result of [`align`].
#[derive(Debug, Clone)]
pub struct Alignment {
    pub matrix: CountMatrix,
    /// QC rows for the surviving cells, in matrix column order.
    pub qc: Vec<CellQc>,
    /// Annotation per surviving cell, when an annotation column was requested.
    pub annotations: Option<Vec<String>>,
    pub summary: AlignmentSummary,
}

/// Load, filter and restrict a count matrix to the cells listed in the
/// metadata for one sample.
pub fn align<P, Q>(matrix_dir: P, metadata_path: Q, params: &AlignParams) -> Result<Alignment>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let raw = read_10x_mtx(matrix_dir, params.gene_labels)?;
    align_matrix(&raw, || MetadataTable::from_path(metadata_path), params)
}

/// Alignment over an already loaded matrix.
///
/// The metadata is only loaded once the matrix has been filtered, so a bad
/// metadata file surfaces after any matrix problem.
pub fn align_matrix<F>(raw: &CountMatrix, load_metadata: F, params: &AlignParams) -> Result<Alignment>
where
    F: FnOnce() -> Result<MetadataTable>,
{
    let mut summary = AlignmentSummary {
        raw_shape: raw.shape(),
        ..Default::default()
    };
    let (density, nnz, _) = SparseOps::get_density_stats(raw.counts());
    info!(
        "Raw matrix: {} genes × {} cells, {} non-zero entries (density {:.4})",
        raw.n_genes(),
        raw.n_cells(),
        nnz,
        density
    );

    let qc_by_barcode: FxHashMap<String, CellQc> = compute_cell_qc(raw, &params.mito_prefix)
        .into_iter()
        .map(|qc| (qc.barcode.clone(), qc))
        .collect();

    let mut filtered = filter_matrix(raw, params.min_cells, params.min_genes)?;
    if let Some(max_fraction) = params.max_mito_fraction {
        filtered = filter_mito(&filtered, &params.mito_prefix, max_fraction)?;
    }
    summary.filtered_shape = filtered.shape();

    let metadata = load_metadata()?;
    summary.metadata_rows = metadata.len();
    let selected = metadata.select_sample(&params.schema, &params.id_prefix, &params.sample_id)?;
    summary.selected_metadata_rows = selected.len();

    let barcodes = selected.column(&params.schema.barcode_column)?;
    let matched = intersect_preserving_order(filtered.barcodes(), barcodes.iter());
    summary.matched_cells = matched.len();
    if matched.is_empty() {
        warn!(
            "No overlap between {} filtered cells and {} selected metadata barcodes",
            filtered.n_cells(),
            barcodes.len()
        );
    } else {
        info!(
            "{} of {} filtered cells matched the metadata",
            matched.len(),
            filtered.n_cells()
        );
    }

    let annotations = match &params.annotation_column {
        Some(column) => Some(annotate(&selected, &params.schema.barcode_column, column, &matched)?),
        None => None,
    };

    let matrix = filtered.select_barcodes(&matched)?;
    let qc = matrix
        .barcodes()
        .iter()
        .map(|bc| {
            qc_by_barcode.get(bc).cloned().ok_or_else(|| {
                PrepError::InvalidInput(format!("Missing QC metrics for barcode '{}'", bc))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    info!(
        "Aligned matrix: {} genes × {} cells",
        matrix.n_genes(),
        matrix.n_cells()
    );
    Ok(Alignment {
        matrix,
        qc,
        annotations,
        summary,
    })
}

/// Annotation value for each barcode; the first metadata row wins.
fn annotate(
    metadata: &MetadataTable,
    barcode_column: &str,
    annotation_column: &str,
    barcodes: &[String],
) -> Result<Vec<String>> {
    let keys = metadata.column(barcode_column)?;
    let values = metadata.column(annotation_column)?;
    let mut lookup: FxHashMap<&str, &str> = FxHashMap::default();
    for (key, value) in keys.into_iter().zip(values) {
        lookup.entry(key).or_insert(value);
    }
    Ok(barcodes
        .iter()
        .map(|bc| lookup.get(bc.as_str()).copied().unwrap_or("").to_string())
        .collect())
}
