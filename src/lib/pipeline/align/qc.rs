//! Per-cell quality-control metrics

use crate::core::error::Result;
use crate::core::sparse::SparseOps;
use crate::pipeline::align::count_matrix::CountMatrix;
use log::{info, warn};

pub const DEFAULT_MITO_PREFIX: &str = "MT-";

/// Summary counts for one cell.
#[derive(Debug, Clone, PartialEq)]
pub struct CellQc {
    pub barcode: String,
    /// Genes with a non-zero count.
    pub n_genes: usize,
    pub n_counts: u64,
    /// Fraction of counts from mitochondrial genes, 0 for an empty cell.
    pub pct_mito: f64,
}

/// QC metrics for every cell, in column order.
pub fn compute_cell_qc(matrix: &CountMatrix, mito_prefix: &str) -> Vec<CellQc> {
    let counts = matrix.counts();
    let n_genes = SparseOps::nonzero_per_col(counts);
    let n_counts = SparseOps::compute_col_sums(counts);

    let mut mito_counts = vec![0u64; matrix.n_cells()];
    for (gene_idx, gene) in matrix.genes().iter().enumerate() {
        if !gene.starts_with(mito_prefix) {
            continue;
        }
        let row = counts.row(gene_idx);
        for (&col, &val) in row.col_indices().iter().zip(row.values()) {
            mito_counts[col] += val as u64;
        }
    }

    matrix
        .barcodes()
        .iter()
        .enumerate()
        .map(|(i, barcode)| CellQc {
            barcode: barcode.clone(),
            n_genes: n_genes[i],
            n_counts: n_counts[i],
            pct_mito: if n_counts[i] > 0 {
                mito_counts[i] as f64 / n_counts[i] as f64
            } else {
                0.0
            },
        })
        .collect()
}

/// Drop cells whose mitochondrial fraction is not strictly below `max_fraction`.
pub fn filter_mito(matrix: &CountMatrix, mito_prefix: &str, max_fraction: f64) -> Result<CountMatrix> {
    let qc = compute_cell_qc(matrix, mito_prefix);
    let keep: Vec<usize> = qc
        .iter()
        .enumerate()
        .filter(|(_, cell)| cell.pct_mito < max_fraction)
        .map(|(i, _)| i)
        .collect();

    info!(
        "Mitochondrial filter (< {}) kept {}/{} cells",
        max_fraction,
        keep.len(),
        matrix.n_cells()
    );
    if keep.is_empty() && matrix.n_cells() > 0 {
        warn!("Every cell exceeds the mitochondrial fraction limit {}", max_fraction);
    }

    let rows: Vec<usize> = (0..matrix.n_genes()).collect();
    matrix.subset(&rows, &keep)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> CountMatrix {
        // MT-CO1: [5 0 1]
        // ACTB:   [5 2 0]
        CountMatrix::from_triplets(
            vec!["MT-CO1".into(), "ACTB".into()],
            vec!["A".into(), "B".into(), "C".into()],
            vec![(0, 0, 5), (0, 2, 1), (1, 0, 5), (1, 1, 2)],
        )
        .unwrap()
    }

    #[test]
    fn computes_counts_and_mito_fraction() {
        let qc = compute_cell_qc(&fixture(), DEFAULT_MITO_PREFIX);
        assert_eq!(qc.len(), 3);
        assert_eq!((qc[0].n_genes, qc[0].n_counts), (2, 10));
        assert!((qc[0].pct_mito - 0.5).abs() < 1e-12);
        assert_eq!(qc[1].pct_mito, 0.0);
        assert_eq!(qc[2].pct_mito, 1.0);
    }

    #[test]
    fn empty_cell_has_zero_fraction() {
        let m = CountMatrix::from_triplets(vec!["MT-X".into()], vec!["A".into()], vec![]).unwrap();
        let qc = compute_cell_qc(&m, DEFAULT_MITO_PREFIX);
        assert_eq!(qc[0].n_counts, 0);
        assert_eq!(qc[0].pct_mito, 0.0);
    }

    #[test]
    fn mito_filter_is_strict() {
        let out = filter_mito(&fixture(), DEFAULT_MITO_PREFIX, 0.5).unwrap();
        assert_eq!(out.barcodes(), ["B"]);
        assert_eq!(out.n_genes(), 2);
    }
}
