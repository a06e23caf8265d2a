//! Non-zero threshold filtering of genes and cells

use crate::core::error::Result;
use crate::core::sparse::SparseOps;
use crate::pipeline::align::count_matrix::CountMatrix;
use log::{info, warn};

/// Keep genes expressed in at least `min_cells` cells and cells expressing at
/// least `min_genes` genes.
///
/// Both selections are computed on the unfiltered input and applied together,
/// so dropping a cell never changes whether a gene survives (and vice versa).
/// An empty result is returned as-is.
pub fn filter_matrix(matrix: &CountMatrix, min_cells: usize, min_genes: usize) -> Result<CountMatrix> {
    let cells_per_gene = SparseOps::nonzero_per_row(matrix.counts());
    let genes_per_cell = SparseOps::nonzero_per_col(matrix.counts());

    let keep_genes: Vec<usize> = cells_per_gene
        .iter()
        .enumerate()
        .filter(|&(_, &n)| n >= min_cells)
        .map(|(i, _)| i)
        .collect();
    let keep_cells: Vec<usize> = genes_per_cell
        .iter()
        .enumerate()
        .filter(|&(_, &n)| n >= min_genes)
        .map(|(i, _)| i)
        .collect();

    info!(
        "Filtering with min_cells={} min_genes={}: kept {}/{} genes, {}/{} cells",
        min_cells,
        min_genes,
        keep_genes.len(),
        matrix.n_genes(),
        keep_cells.len(),
        matrix.n_cells()
    );
    if keep_genes.is_empty() {
        warn!("No genes pass min_cells={}; continuing with an empty matrix", min_cells);
    }
    if keep_cells.is_empty() {
        warn!("No cells pass min_genes={}; continuing with an empty matrix", min_genes);
    }

    matrix.subset(&keep_genes, &keep_cells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::align::count_matrix::tests::labels;

    // 4 genes x 4 cells
    // G1: [1 1 1 0]  -> 3 cells
    // G2: [1 0 0 0]  -> 1 cell
    // G3: [0 1 1 0]  -> 2 cells
    // G4: [0 0 0 0]  -> 0 cells
    // per cell: C1=2, C2=2, C3=2, C4=0
    fn fixture() -> CountMatrix {
        CountMatrix::from_triplets(
            labels("G", 4),
            labels("C", 4),
            vec![
                (0, 0, 1),
                (0, 1, 3),
                (0, 2, 1),
                (1, 0, 2),
                (2, 1, 1),
                (2, 2, 4),
            ],
        )
        .unwrap()
    }

    #[test]
    fn zero_thresholds_are_identity() {
        let m = fixture();
        let out = filter_matrix(&m, 0, 0).unwrap();
        assert_eq!(out.genes(), m.genes());
        assert_eq!(out.barcodes(), m.barcodes());
        for g in 0..m.n_genes() {
            assert_eq!(out.dense_row(g), m.dense_row(g));
        }
    }

    #[test]
    fn thresholds_apply_to_original_matrix() {
        let m = fixture();
        let out = filter_matrix(&m, 2, 2).unwrap();
        assert_eq!(out.genes(), ["G1", "G3"]);
        assert_eq!(out.barcodes(), ["C1", "C2", "C3"]);
        assert_eq!(out.dense_row(0), vec![1, 3, 1]);
    }

    #[test]
    fn gene_selection_ignores_dropped_cells() {
        // every cell has 2 genes, so min_genes=3 drops them all while G1
        // still counts its 3 cells from the original matrix
        let m = fixture();
        let out = filter_matrix(&m, 3, 3).unwrap();
        assert_eq!(out.genes(), ["G1"]);
        assert_eq!(out.n_cells(), 0);

        // The gene set is the same whatever the cell threshold.
        for min_genes in 0..5 {
            let out = filter_matrix(&m, 2, min_genes).unwrap();
            assert_eq!(out.genes(), ["G1", "G3"]);
        }
    }

    #[test]
    fn empty_result_is_not_an_error() {
        let m = fixture();
        let out = filter_matrix(&m, 10, 10).unwrap();
        assert_eq!(out.shape(), (0, 0));
        assert!(out.is_empty());
    }
}
