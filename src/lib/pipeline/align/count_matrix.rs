//! Gene × cell count matrix backed by a CSR sparse matrix

use crate::core::error::{PrepError, Result};
use crate::core::sparse::SparseOps;
use nalgebra_sparse::CsrMatrix;
use rustc_hash::{FxHashMap, FxHashSet};

/// Observed transcript counts, genes as rows and cell barcodes as columns.
///
/// Row and column labels are unique. Every subsetting operation returns a
/// new matrix; the original is never modified.
#[derive(Debug, Clone)]
pub struct CountMatrix {
    counts: CsrMatrix<u32>,
    genes: Vec<String>,
    barcodes: Vec<String>,
}

impl CountMatrix {
    pub fn new(counts: CsrMatrix<u32>, genes: Vec<String>, barcodes: Vec<String>) -> Result<Self> {
        if counts.nrows() != genes.len() || counts.ncols() != barcodes.len() {
            return Err(PrepError::DimensionMismatch {
                expected: format!("{} × {}", genes.len(), barcodes.len()),
                actual: format!("{} × {}", counts.nrows(), counts.ncols()),
            });
        }
        ensure_unique("gene", &genes)?;
        ensure_unique("barcode", &barcodes)?;
        Ok(Self {
            counts,
            genes,
            barcodes,
        })
    }

    /// Build a matrix from `(gene_idx, cell_idx, count)` triplets.
    pub fn from_triplets(
        genes: Vec<String>,
        barcodes: Vec<String>,
        triplets: Vec<(usize, usize, u32)>,
    ) -> Result<Self> {
        let counts = SparseOps::from_triplets_u32(genes.len(), barcodes.len(), triplets)?;
        Self::new(counts, genes, barcodes)
    }

    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.genes.len(), self.barcodes.len())
    }

    #[inline]
    pub fn n_genes(&self) -> usize {
        self.genes.len()
    }

    #[inline]
    pub fn n_cells(&self) -> usize {
        self.barcodes.len()
    }

    /// True when either axis has no labels.
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty() || self.barcodes.is_empty()
    }

    pub fn genes(&self) -> &[String] {
        &self.genes
    }

    pub fn barcodes(&self) -> &[String] {
        &self.barcodes
    }

    pub fn counts(&self) -> &CsrMatrix<u32> {
        &self.counts
    }

    /// Dense copy of one gene's counts across all cells.
    pub fn dense_row(&self, gene: usize) -> Vec<u32> {
        let mut dense = vec![0u32; self.n_cells()];
        let row = self.counts.row(gene);
        for (&col, &val) in row.col_indices().iter().zip(row.values()) {
            dense[col] = val;
        }
        dense
    }

    /// New matrix holding the given rows and columns, in the given order.
    pub fn subset(&self, rows: &[usize], cols: &[usize]) -> Result<Self> {
        let counts = SparseOps::select(&self.counts, rows, cols)?;
        let genes = rows.iter().map(|&r| self.genes[r].clone()).collect();
        let barcodes = cols.iter().map(|&c| self.barcodes[c].clone()).collect();
        Ok(Self {
            counts,
            genes,
            barcodes,
        })
    }

    /// New matrix restricted to the named cells, in the order they are given.
    ///
    /// Every requested barcode must be a column of this matrix.
    pub fn select_barcodes<S: AsRef<str>>(&self, barcodes: &[S]) -> Result<Self> {
        let index: FxHashMap<&str, usize> = self
            .barcodes
            .iter()
            .enumerate()
            .map(|(i, bc)| (bc.as_str(), i))
            .collect();
        let cols = barcodes
            .iter()
            .map(|bc| {
                index.get(bc.as_ref()).copied().ok_or_else(|| {
                    PrepError::InvalidInput(format!(
                        "Barcode '{}' is not a column of the count matrix",
                        bc.as_ref()
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let rows: Vec<usize> = (0..self.n_genes()).collect();
        self.subset(&rows, &cols)
    }
}

fn ensure_unique(kind: &str, labels: &[String]) -> Result<()> {
    let mut seen = FxHashSet::default();
    for label in labels {
        if !seen.insert(label.as_str()) {
            return Err(PrepError::InvalidInput(format!(
                "Duplicate {} identifier '{}'",
                kind, label
            )));
        }
    }
    Ok(())
}
