//! Reader for Cell Ranger style matrix directories
//!
//! A directory holds `matrix.mtx[.gz]` (MatrixMarket coordinate format,
//! features × barcodes, 1-based), a feature table (`features.tsv[.gz]`, or
//! `genes.tsv` from older releases) and `barcodes.tsv[.gz]`.

use crate::core::error::{PrepError, Result};
use crate::core::io::open_text;
use crate::pipeline::align::count_matrix::CountMatrix;
use log::{debug, info};
use nalgebra_sparse::io::{load_coo_from_matrix_market_str, MatrixMarketScalar};
use nalgebra_sparse::CooMatrix;
use rustc_hash::{FxHashMap, FxHashSet};
use std::io::{BufRead, Read};
use std::panic;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const MATRIX_FILES: &[&str] = &["matrix.mtx.gz", "matrix.mtx"];
const FEATURE_FILES: &[&str] = &["features.tsv.gz", "features.tsv", "genes.tsv.gz", "genes.tsv"];
const BARCODE_FILES: &[&str] = &["barcodes.tsv.gz", "barcodes.tsv"];

/// Which feature-table column labels the matrix rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GeneLabel {
    #[default]
    Symbols,
    Ids,
}

impl FromStr for GeneLabel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gene_symbols" | "symbols" => Ok(GeneLabel::Symbols),
            "gene_ids" | "ids" => Ok(GeneLabel::Ids),
            _ => Err(format!(
                "Invalid gene label: {}. Valid labels: gene_symbols, gene_ids",
                s
            )),
        }
    }
}

impl GeneLabel {
    fn column(self) -> usize {
        match self {
            GeneLabel::Ids => 0,
            GeneLabel::Symbols => 1,
        }
    }
}

/// Load a count matrix from a Cell Ranger output directory.
///
/// Any missing file or structural inconsistency is reported as a load error.
pub fn read_10x_mtx<P: AsRef<Path>>(dir: P, labels: GeneLabel) -> Result<CountMatrix> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(PrepError::Load(format!(
            "Matrix directory not found: {}",
            dir.display()
        )));
    }

    let matrix_path = locate(dir, MATRIX_FILES)?;
    let features_path = locate(dir, FEATURE_FILES)?;
    let barcodes_path = locate(dir, BARCODE_FILES)?;

    info!("Reading count matrix from {}", matrix_path.display());
    let genes = make_unique(read_features(&features_path, labels)?);
    let barcodes = read_barcodes(&barcodes_path)?;
    let mtx = read_matrix_market(&matrix_path)?;

    if mtx.nrows != genes.len() || mtx.ncols != barcodes.len() {
        return Err(PrepError::Load(format!(
            "{} declares {} × {} but found {} features and {} barcodes",
            matrix_path.display(),
            mtx.nrows,
            mtx.ncols,
            genes.len(),
            barcodes.len()
        )));
    }

    let matrix = CountMatrix::from_triplets(genes, barcodes, mtx.triplets)
        .map_err(|e| PrepError::Load(format!("{}: {}", dir.display(), e)))?;
    info!(
        "Loaded count matrix with shape: {} genes × {} cells",
        matrix.n_genes(),
        matrix.n_cells()
    );
    Ok(matrix)
}

fn locate(dir: &Path, candidates: &[&str]) -> Result<PathBuf> {
    candidates
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
        .ok_or_else(|| {
            PrepError::Load(format!(
                "None of {:?} found in {}",
                candidates,
                dir.display()
            ))
        })
}

fn file_err(path: &Path, message: impl std::fmt::Display) -> PrepError {
    PrepError::Load(format!("{}: {}", path.display(), message))
}

fn load_err(path: &Path, line: usize, message: impl std::fmt::Display) -> PrepError {
    PrepError::Load(format!("{}:{}: {}", path.display(), line, message))
}

fn read_features(path: &Path, labels: GeneLabel) -> Result<Vec<String>> {
    let reader = open_text(path).map_err(|e| file_err(path, e))?;
    let column = labels.column();
    let mut genes = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| load_err(path, i + 1, e))?;
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }
        let label = line
            .split('\t')
            .nth(column)
            .ok_or_else(|| load_err(path, i + 1, format!("missing column {}", column + 1)))?;
        genes.push(label.to_string());
    }
    debug!("Read {} features from {}", genes.len(), path.display());
    Ok(genes)
}

fn read_barcodes(path: &Path) -> Result<Vec<String>> {
    let reader = open_text(path).map_err(|e| file_err(path, e))?;
    let mut barcodes = Vec::new();
    let mut seen = FxHashSet::default();

    for (i, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| load_err(path, i + 1, e))?;
        let barcode = line.trim();
        if barcode.is_empty() {
            continue;
        }
        if !seen.insert(barcode.to_string()) {
            return Err(load_err(path, i + 1, format!("duplicate barcode '{}'", barcode)));
        }
        barcodes.push(barcode.to_string());
    }
    debug!("Read {} barcodes from {}", barcodes.len(), path.display());
    Ok(barcodes)
}

struct MatrixMarket {
    nrows: usize,
    ncols: usize,
    triplets: Vec<(usize, usize, u32)>,
}

fn read_matrix_market(path: &Path) -> Result<MatrixMarket> {
    let mut text = String::new();
    open_text(path)
        .and_then(|mut reader| Ok(reader.read_to_string(&mut text)?))
        .map_err(|e| file_err(path, e))?;

    // real-valued files are accepted when every value is a whole count
    let is_real = text
        .lines()
        .find(|line| !line.trim().is_empty())
        .and_then(|banner| banner.split_whitespace().nth(3))
        .map_or(false, |field| field.eq_ignore_ascii_case("real"));

    let mtx = if is_real {
        let coo = load_coo::<f64>(&text).map_err(|msg| file_err(path, msg))?;
        let triplets = coo
            .triplet_iter()
            .map(|(r, c, &v)| to_count(v).map(|v| (r, c, v)))
            .collect::<std::result::Result<Vec<_>, String>>()
            .map_err(|msg| file_err(path, msg))?;
        MatrixMarket {
            nrows: coo.nrows(),
            ncols: coo.ncols(),
            triplets,
        }
    } else {
        let coo = load_coo::<u32>(&text).map_err(|msg| file_err(path, msg))?;
        MatrixMarket {
            nrows: coo.nrows(),
            ncols: coo.ncols(),
            triplets: coo.triplet_iter().map(|(r, c, &v)| (r, c, v)).collect(),
        }
    };
    debug!(
        "Read {} entries ({} × {}) from {}",
        mtx.triplets.len(),
        mtx.nrows,
        mtx.ncols,
        path.display()
    );
    Ok(mtx)
}

/// Parse MatrixMarket text into COO form.
///
/// The parser unwraps integers that do not fit `usize`; such a panic is
/// reported as a malformed file.
fn load_coo<T: MatrixMarketScalar>(text: &str) -> std::result::Result<CooMatrix<T>, String> {
    match panic::catch_unwind(|| load_coo_from_matrix_market_str::<T>(text)) {
        Ok(parsed) => parsed.map_err(|e| e.to_string()),
        Err(_) => Err("index or size out of range".to_string()),
    }
}

fn to_count(value: f64) -> std::result::Result<u32, String> {
    if !(0.0..=u32::MAX as f64).contains(&value) || value.fract() != 0.0 {
        return Err(format!("count '{}' is not a non-negative integer", value));
    }
    Ok(value as u32)
}

/// Append `-1`, `-2`, ... to repeated labels so every label is unique.
///
/// The first occurrence keeps its name; suffixes skip names already taken.
pub fn make_unique(labels: Vec<String>) -> Vec<String> {
    let mut taken: FxHashSet<String> = labels.iter().cloned().collect();
    if taken.len() == labels.len() {
        return labels;
    }

    let mut first_seen = FxHashSet::default();
    let mut counters: FxHashMap<String, usize> = FxHashMap::default();
    let mut renamed = 0usize;
    let out = labels
        .into_iter()
        .map(|label| {
            if first_seen.insert(label.clone()) {
                return label;
            }
            let counter = counters.entry(label.clone()).or_insert(0);
            loop {
                *counter += 1;
                let candidate = format!("{}-{}", label, counter);
                if taken.insert(candidate.clone()) {
                    renamed += 1;
                    return candidate;
                }
            }
        })
        .collect();
    debug!("Renamed {} duplicate gene labels", renamed);
    out
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    pub(crate) fn write_file(path: &Path, contents: &str, gzip: bool) {
        let file = File::create(path).unwrap();
        if gzip {
            let mut enc = GzEncoder::new(file, flate2::Compression::fast());
            enc.write_all(contents.as_bytes()).unwrap();
            enc.finish().unwrap();
        } else {
            let mut file = file;
            file.write_all(contents.as_bytes()).unwrap();
        }
    }

    /// Write a v3 (gzipped) directory for a dense genes × cells table.
    pub(crate) fn write_10x_dir(dir: &Path, genes: &[&str], barcodes: &[&str], dense: &[Vec<u32>]) {
        let features: String = genes
            .iter()
            .enumerate()
            .map(|(i, g)| format!("ENSG{:05}\t{}\tGene Expression\n", i, g))
            .collect();
        let bcs: String = barcodes.iter().map(|b| format!("{}\n", b)).collect();
        let mut entries = Vec::new();
        for (r, row) in dense.iter().enumerate() {
            for (c, &v) in row.iter().enumerate() {
                if v > 0 {
                    entries.push(format!("{} {} {}", r + 1, c + 1, v));
                }
            }
        }
        let mtx = format!(
            "%%MatrixMarket matrix coordinate integer general\n%metadata_json: {{}}\n{} {} {}\n{}\n",
            genes.len(),
            barcodes.len(),
            entries.len(),
            entries.join("\n")
        );
        write_file(&dir.join("features.tsv.gz"), &features, true);
        write_file(&dir.join("barcodes.tsv.gz"), &bcs, true);
        write_file(&dir.join("matrix.mtx.gz"), &mtx, true);
    }

    #[test]
    fn reads_v3_directory() {
        let dir = tempdir().unwrap();
        write_10x_dir(
            dir.path(),
            &["CD3E", "MT-CO1"],
            &["AAAC-1", "AAAG-1", "AATT-1"],
            &[vec![1, 0, 4], vec![0, 2, 0]],
        );
        let m = read_10x_mtx(dir.path(), GeneLabel::Symbols).unwrap();
        assert_eq!(m.shape(), (2, 3));
        assert_eq!(m.genes(), ["CD3E", "MT-CO1"]);
        assert_eq!(m.barcodes()[2], "AATT-1");
        assert_eq!(m.dense_row(0), vec![1, 0, 4]);

        let by_id = read_10x_mtx(dir.path(), GeneLabel::Ids).unwrap();
        assert_eq!(by_id.genes(), ["ENSG00000", "ENSG00001"]);
    }

    #[test]
    fn reads_v2_plain_directory() {
        let dir = tempdir().unwrap();
        write_file(&dir.path().join("genes.tsv"), "E1\tA\nE2\tB\n", false);
        write_file(&dir.path().join("barcodes.tsv"), "C1\nC2\n", false);
        write_file(
            &dir.path().join("matrix.mtx"),
            "%%MatrixMarket matrix coordinate real general\n2 2 2\n1 1 3.0\n2 2 1\n",
            false,
        );
        let m = read_10x_mtx(dir.path(), GeneLabel::Symbols).unwrap();
        assert_eq!(m.dense_row(0), vec![3, 0]);
        assert_eq!(m.dense_row(1), vec![0, 1]);
    }

    fn write_plain_dir(dir: &Path, mtx: &str) {
        write_file(&dir.join("features.tsv"), "E1\tA\n", false);
        write_file(&dir.join("barcodes.tsv"), "C1\n", false);
        write_file(&dir.join("matrix.mtx"), mtx, false);
    }

    #[test]
    fn declared_entry_count_is_not_trusted() {
        let dir = tempdir().unwrap();
        write_plain_dir(
            dir.path(),
            "%%MatrixMarket matrix coordinate integer general\n1 1 18446744073709551615\n1 1 5\n",
        );
        assert!(read_10x_mtx(dir.path(), GeneLabel::Symbols).unwrap_err().is_load());

        write_plain_dir(
            dir.path(),
            "%%MatrixMarket matrix coordinate integer general\n1 1 99999999999999999999999\n1 1 5\n",
        );
        assert!(read_10x_mtx(dir.path(), GeneLabel::Symbols).unwrap_err().is_load());
    }

    #[test]
    fn repeated_entries_are_summed() {
        let dir = tempdir().unwrap();
        write_plain_dir(
            dir.path(),
            "%%MatrixMarket matrix coordinate integer general\n1 1 2\n1 1 4\n1 1 3\n",
        );
        let m = read_10x_mtx(dir.path(), GeneLabel::Symbols).unwrap();
        assert_eq!(m.dense_row(0), vec![7]);
    }

    #[test]
    fn overflowing_repeated_entries_are_load_errors() {
        let dir = tempdir().unwrap();
        write_plain_dir(
            dir.path(),
            "%%MatrixMarket matrix coordinate integer general\n1 1 2\n1 1 4294967295\n1 1 1\n",
        );
        assert!(read_10x_mtx(dir.path(), GeneLabel::Symbols).unwrap_err().is_load());
    }

    #[test]
    fn negative_counts_are_load_errors() {
        let dir = tempdir().unwrap();
        write_plain_dir(
            dir.path(),
            "%%MatrixMarket matrix coordinate integer general\n1 1 1\n1 1 -3\n",
        );
        assert!(read_10x_mtx(dir.path(), GeneLabel::Symbols).unwrap_err().is_load());

        write_plain_dir(
            dir.path(),
            "%%MatrixMarket matrix coordinate real general\n1 1 1\n1 1 -3.0\n",
        );
        assert!(read_10x_mtx(dir.path(), GeneLabel::Symbols).unwrap_err().is_load());
    }

    #[test]
    fn duplicate_symbols_are_suffixed() {
        let dir = tempdir().unwrap();
        write_10x_dir(dir.path(), &["TBCE", "TBCE", "X", "TBCE"], &["C1"], &[vec![1], vec![1], vec![0], vec![1]]);
        let m = read_10x_mtx(dir.path(), GeneLabel::Symbols).unwrap();
        assert_eq!(m.genes(), ["TBCE", "TBCE-1", "X", "TBCE-2"]);
    }

    #[test]
    fn make_unique_skips_taken_names() {
        let out = make_unique(vec!["A".into(), "A-1".into(), "A".into()]);
        assert_eq!(out, ["A", "A-1", "A-2"]);
    }

    #[test]
    fn malformed_inputs_are_load_errors() {
        let missing = read_10x_mtx("/nonexistent/dir", GeneLabel::Symbols).unwrap_err();
        assert!(missing.is_load());

        let dir = tempdir().unwrap();
        write_file(&dir.path().join("features.tsv"), "E1\tA\n", false);
        write_file(&dir.path().join("barcodes.tsv"), "C1\n", false);
        write_file(
            &dir.path().join("matrix.mtx"),
            "%%MatrixMarket matrix coordinate integer general\n1 1 1\n2 1 5\n",
            false,
        );
        assert!(read_10x_mtx(dir.path(), GeneLabel::Symbols).unwrap_err().is_load());

        write_file(
            &dir.path().join("matrix.mtx"),
            "%%MatrixMarket matrix coordinate integer general\n1 1 2\n1 1 5\n",
            false,
        );
        assert!(read_10x_mtx(dir.path(), GeneLabel::Symbols).unwrap_err().is_load());

        write_file(
            &dir.path().join("matrix.mtx"),
            "%%MatrixMarket matrix coordinate real general\n1 1 1\n1 1 0.5\n",
            false,
        );
        assert!(read_10x_mtx(dir.path(), GeneLabel::Symbols).unwrap_err().is_load());
    }
}
