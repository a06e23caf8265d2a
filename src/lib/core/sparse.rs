//! Sparse count-matrix utilities shared across cnvalign

use crate::core::error::{PrepError, Result};
use itertools::Itertools;
use nalgebra_sparse::{CooMatrix, CsrMatrix};
use rayon::prelude::*;

pub struct SparseOps;

impl SparseOps {
    /// Create CSR matrix from COO format using nalgebra_sparse native conversion.
    ///
    /// Repeated coordinates are summed; a sum that overflows `u32` is an error.
    pub fn from_triplets_u32(
        nrows: usize,
        ncols: usize,
        mut triplets: Vec<(usize, usize, u32)>,
    ) -> Result<CsrMatrix<u32>> {
        if nrows == 0 || ncols == 0 || triplets.is_empty() {
            return Ok(CsrMatrix::zeros(nrows, ncols));
        }

        for &(row, col, _) in &triplets {
            if row >= nrows || col >= ncols {
                return Err(PrepError::InvalidInput(format!(
                    "Index ({}, {}) exceeds matrix dimensions ({}, {})",
                    row, col, nrows, ncols
                )));
            }
        }

        triplets.par_sort_unstable_by_key(|&(row, col, _)| (row, col));
        let mut merged: Vec<(usize, usize, u32)> = Vec::with_capacity(triplets.len());
        for (row, col, val) in triplets {
            match merged.last_mut() {
                Some(last) if last.0 == row && last.1 == col => {
                    last.2 = last.2.checked_add(val).ok_or_else(|| {
                        PrepError::SparseMatrix(format!(
                            "Count at ({}, {}) overflows u32",
                            row, col
                        ))
                    })?;
                }
                _ => merged.push((row, col, val)),
            }
        }

        let (row_indices, col_indices, values): (Vec<_>, Vec<_>, Vec<_>) =
            merged.into_iter().multiunzip();

        let coo = CooMatrix::try_from_triplets(nrows, ncols, row_indices, col_indices, values)
            .map_err(|e| PrepError::SparseMatrix(format!("COO creation failed: {:?}", e)))?;

        Ok(CsrMatrix::from(&coo))
    }

    /// Number of strictly positive entries in each row.
    pub fn nonzero_per_row(matrix: &CsrMatrix<u32>) -> Vec<usize> {
        (0..matrix.nrows())
            .into_par_iter()
            .map(|row_idx| {
                matrix
                    .row(row_idx)
                    .values()
                    .iter()
                    .filter(|&&v| v > 0)
                    .count()
            })
            .collect()
    }

    /// Number of strictly positive entries in each column.
    pub fn nonzero_per_col(matrix: &CsrMatrix<u32>) -> Vec<usize> {
        let ncols = matrix.ncols();
        let chunk_size = std::cmp::max(1, matrix.nrows() / rayon::current_num_threads());

        (0..matrix.nrows())
            .into_par_iter()
            .chunks(chunk_size)
            .map(|chunk| {
                let mut local = vec![0usize; ncols];
                for row_idx in chunk {
                    let row = matrix.row(row_idx);
                    for (&col_idx, &val) in row.col_indices().iter().zip(row.values()) {
                        if val > 0 {
                            local[col_idx] += 1;
                        }
                    }
                }
                local
            })
            .reduce(
                || vec![0usize; ncols],
                |mut acc, local| {
                    for (i, val) in local.into_iter().enumerate() {
                        acc[i] += val;
                    }
                    acc
                },
            )
    }

    /// Column sums using parallel reduction over CSR structure
    pub fn compute_col_sums(matrix: &CsrMatrix<u32>) -> Vec<u64> {
        let ncols = matrix.ncols();
        let chunk_size = std::cmp::max(1, matrix.nrows() / rayon::current_num_threads());

        (0..matrix.nrows())
            .into_par_iter()
            .chunks(chunk_size)
            .map(|chunk| {
                let mut local_sums = vec![0u64; ncols];
                for row_idx in chunk {
                    let row = matrix.row(row_idx);
                    for (&col_idx, &val) in row.col_indices().iter().zip(row.values()) {
                        local_sums[col_idx] = local_sums[col_idx].saturating_add(val as u64);
                    }
                }
                local_sums
            })
            .reduce(
                || vec![0u64; ncols],
                |mut acc, local| {
                    for (i, val) in local.into_iter().enumerate() {
                        acc[i] = acc[i].saturating_add(val);
                    }
                    acc
                },
            )
    }

    /// Select rows and columns by index, in the order given.
    ///
    /// Both index lists refer to the input matrix. The output has
    /// `rows.len()` rows and `cols.len()` columns; output column `j` is input
    /// column `cols[j]`, so a reordering selection is allowed.
    pub fn select(
        matrix: &CsrMatrix<u32>,
        rows: &[usize],
        cols: &[usize],
    ) -> Result<CsrMatrix<u32>> {
        let ncols = matrix.ncols();
        let mut col_map: Vec<Option<usize>> = vec![None; ncols];
        for (new_idx, &old_idx) in cols.iter().enumerate() {
            if old_idx >= ncols {
                return Err(PrepError::DimensionMismatch {
                    expected: format!("column index < {}", ncols),
                    actual: format!("column index {}", old_idx),
                });
            }
            if col_map[old_idx].replace(new_idx).is_some() {
                return Err(PrepError::InvalidInput(format!(
                    "Column {} selected more than once",
                    old_idx
                )));
            }
        }
        if let Some(&bad) = rows.iter().find(|&&r| r >= matrix.nrows()) {
            return Err(PrepError::DimensionMismatch {
                expected: format!("row index < {}", matrix.nrows()),
                actual: format!("row index {}", bad),
            });
        }

        let triplets: Vec<(usize, usize, u32)> = rows
            .par_iter()
            .enumerate()
            .flat_map_iter(|(new_row, &old_row)| {
                let row = matrix.row(old_row);
                row.col_indices()
                    .iter()
                    .zip(row.values())
                    .filter_map(|(&old_col, &val)| col_map[old_col].map(|c| (new_row, c, val)))
                    .collect::<Vec<_>>()
            })
            .collect();

        Self::from_triplets_u32(rows.len(), cols.len(), triplets)
    }

    /// Get matrix density statistics
    pub fn get_density_stats(matrix: &CsrMatrix<u32>) -> (f64, usize, usize) {
        let total_elements = matrix.nrows() * matrix.ncols();
        let nnz = matrix.nnz();
        let density = if total_elements > 0 {
            nnz as f64 / total_elements as f64
        } else {
            0.0
        };
        (density, nnz, total_elements)
    }
}
