//! Gene × cell table of CNV measurements

use crate::core::error::{PrepError, Result};
use nalgebra::DMatrix;

/// Name of the leading ordinary column that repeats the row labels.
pub const GENE_COLUMN: &str = "Gene";

/// One cell of a [`CnvTable`] row as seen by writers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CnvField<'a> {
    Gene(&'a str),
    Value(f64),
}

/// CNV values with genes as row labels (file order, duplicates kept) and
/// cell identifiers as column labels.
///
/// The gene names double as the first ordinary column, [`GENE_COLUMN`], so
/// the table can be written by consumers that drop row labels.
#[derive(Debug, Clone, PartialEq)]
pub struct CnvTable {
    genes: Vec<String>,
    cells: Vec<String>,
    values: DMatrix<f64>,
}

impl CnvTable {
    pub fn new(genes: Vec<String>, cells: Vec<String>, rows: Vec<Vec<f64>>) -> Result<Self> {
        if genes.len() != rows.len() {
            return Err(PrepError::DimensionMismatch {
                expected: format!("{} rows", genes.len()),
                actual: format!("{} rows", rows.len()),
            });
        }
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != cells.len()) {
            return Err(PrepError::DimensionMismatch {
                expected: format!("{} values for gene '{}'", cells.len(), genes[i]),
                actual: format!("{} values", row.len()),
            });
        }
        let values = DMatrix::from_row_iterator(
            genes.len(),
            cells.len(),
            rows.into_iter().flatten(),
        );
        Ok(Self {
            genes,
            cells,
            values,
        })
    }

    /// `(rows, columns)` counting the gene-name column.
    pub fn shape(&self) -> (usize, usize) {
        (self.genes.len(), self.cells.len() + 1)
    }

    pub fn n_genes(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// Row labels.
    pub fn genes(&self) -> &[String] {
        &self.genes
    }

    /// Cell identifiers from the header, in file order.
    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    /// Column names, starting with [`GENE_COLUMN`].
    pub fn columns(&self) -> Vec<&str> {
        std::iter::once(GENE_COLUMN)
            .chain(self.cells.iter().map(String::as_str))
            .collect()
    }

    pub fn values(&self) -> &DMatrix<f64> {
        &self.values
    }

    pub fn value(&self, gene: usize, cell: usize) -> Option<f64> {
        self.values.get((gene, cell)).copied()
    }

    /// Full row `i`: the gene name followed by its values.
    pub fn row(&self, i: usize) -> Vec<CnvField<'_>> {
        std::iter::once(CnvField::Gene(self.genes[i].as_str()))
            .chain(self.values.row(i).iter().map(|&v| CnvField::Value(v)))
            .collect()
    }
}
