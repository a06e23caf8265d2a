//! Tab-separated cell metadata tables

use crate::core::error::{PrepError, Result};
use crate::core::io::get_reader;
use csv::StringRecord;
use log::{debug, info, warn};
use std::path::Path;

pub const SAMPLE_COLUMN: &str = "GEO.sample";
pub const MERGED_BARCODE_COLUMN: &str = "Merged_barcode";
pub const BARCODE_COLUMN: &str = "Barcode";

/// Names of the metadata columns the aligner relies on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataSchema {
    pub sample_column: String,
    pub merged_barcode_column: String,
    pub barcode_column: String,
}

impl Default for MetadataSchema {
    fn default() -> Self {
        Self {
            sample_column: SAMPLE_COLUMN.to_string(),
            merged_barcode_column: MERGED_BARCODE_COLUMN.to_string(),
            barcode_column: BARCODE_COLUMN.to_string(),
        }
    }
}

/// Row-oriented table read from a headed TSV file. Immutable; row filters
/// produce a new table.
#[derive(Debug, Clone)]
pub struct MetadataTable {
    source: String,
    headers: StringRecord,
    records: Vec<StringRecord>,
}

impl MetadataTable {
    pub fn new(source: impl Into<String>, headers: StringRecord, records: Vec<StringRecord>) -> Self {
        Self {
            source: source.into(),
            headers,
            records,
        }
    }

    /// Read a tab-separated table with a header row, gzip-aware.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(PrepError::NotFound(format!(
                "Metadata file not found: {}",
                path.display()
            )));
        }
        let table_err = |e: csv::Error| PrepError::InvalidInput(format!("{}: {}", path.display(), e));
        let mut reader = get_reader(path, true)?;
        let headers = reader.headers().map_err(table_err)?.clone();
        // short rows read as empty trailing fields
        let records = reader
            .records()
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(table_err)?;
        info!(
            "Loaded metadata table {} with {} rows and {} columns",
            path.display(),
            records.len(),
            headers.len()
        );
        Ok(Self::new(path.display().to_string(), headers, records))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn headers(&self) -> &StringRecord {
        &self.headers
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.headers.iter().any(|h| h == name)
    }

    /// Position of a column, or a schema error naming it.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| PrepError::schema(name, &format!("metadata table {}", self.source)))
    }

    /// All values of one column, in row order.
    pub fn column(&self, name: &str) -> Result<Vec<&str>> {
        let idx = self.column_index(name)?;
        Ok(self
            .records
            .iter()
            .map(|record| record.get(idx).unwrap_or(""))
            .collect())
    }

    /// New table holding the rows for which `keep` returns true.
    pub fn filter_rows<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(&StringRecord) -> bool,
    {
        Self {
            source: self.source.clone(),
            headers: self.headers.clone(),
            records: self.records.iter().filter(|r| keep(r)).cloned().collect(),
        }
    }

    /// Rows whose merged barcode starts with `id_prefix` and whose sample id
    /// starts with `sample_id`.
    ///
    /// The merged-barcode and sample columns are checked, in that order,
    /// before any row is examined.
    pub fn select_sample(&self, schema: &MetadataSchema, id_prefix: &str, sample_id: &str) -> Result<Self> {
        let merged_idx = self.column_index(&schema.merged_barcode_column)?;
        let sample_idx = self.column_index(&schema.sample_column)?;

        let selected = self.filter_rows(|record| {
            let merged = record.get(merged_idx).unwrap_or("");
            let sample = record.get(sample_idx).unwrap_or("");
            merged.starts_with(id_prefix) && sample.starts_with(sample_id)
        });

        debug!(
            "Metadata prefix filter '{}' / '{}' kept {} of {} rows",
            id_prefix,
            sample_id,
            selected.len(),
            self.len()
        );
        if selected.is_empty() {
            warn!(
                "No metadata rows match barcode prefix '{}' and sample '{}'",
                id_prefix, sample_id
            );
        }
        Ok(selected)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    pub(crate) fn table(rows: &[&[&str]]) -> MetadataTable {
        let headers = StringRecord::from(rows[0].to_vec());
        let records = rows[1..]
            .iter()
            .map(|r| StringRecord::from(r.to_vec()))
            .collect();
        MetadataTable::new("test", headers, records)
    }

    fn standard() -> MetadataTable {
        table(&[
            &["GEO.sample", "Merged_barcode", "Barcode"],
            &["GSM1_A", "DS1_AAAC", "AAAC"],
            &["GSM1_B", "DS1_AAAG", "AAAG"],
            &["GSM2_A", "DS1_AATT", "AATT"],
            &["GSM1_A", "DS2_CCCC", "CCCC"],
        ])
    }

    #[test]
    fn conjunctive_prefix_selection() {
        let t = standard();
        let sel = t.select_sample(&MetadataSchema::default(), "DS1", "GSM1").unwrap();
        assert_eq!(sel.column("Barcode").unwrap(), ["AAAC", "AAAG"]);
        assert_eq!(t.len(), 4);
    }

    #[test]
    fn prefix_match_is_case_sensitive() {
        let t = standard();
        let sel = t.select_sample(&MetadataSchema::default(), "ds1", "GSM1").unwrap();
        assert!(sel.is_empty());
    }

    #[test]
    fn missing_merged_barcode_column() {
        let t = table(&[&["GEO.sample", "Barcode"], &["GSM1", "AAAC"]]);
        let err = t
            .select_sample(&MetadataSchema::default(), "DS1", "GSM1")
            .unwrap_err();
        match err {
            PrepError::Schema { column, .. } => assert_eq!(column, "Merged_barcode"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_sample_column() {
        let t = table(&[&["Merged_barcode", "Barcode"], &["DS1_AAAC", "AAAC"]]);
        let err = t
            .select_sample(&MetadataSchema::default(), "DS1", "GSM1")
            .unwrap_err();
        match err {
            PrepError::Schema { column, .. } => assert_eq!(column, "GEO.sample"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn reads_tsv_from_disk() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "GEO.sample\tMerged_barcode\tBarcode").unwrap();
        writeln!(file, "GSM1\tDS1_AAAC\tAAAC").unwrap();
        file.flush().unwrap();

        let t = MetadataTable::from_path(file.path()).unwrap();
        assert_eq!(t.len(), 1);
        assert!(t.has_column("Barcode"));
        assert_eq!(t.column("Merged_barcode").unwrap(), ["DS1_AAAC"]);
    }

    #[test]
    fn short_rows_read_as_empty_fields() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "GEO.sample\tMerged_barcode\tBarcode").unwrap();
        writeln!(file, "GSM1\tDS1_AAAC\tAAAC").unwrap();
        writeln!(file, "GSM1\tDS1_AAAG").unwrap();
        file.flush().unwrap();

        let t = MetadataTable::from_path(file.path()).unwrap();
        assert_eq!(t.len(), 2);
        assert_eq!(t.column("Barcode").unwrap(), ["AAAC", ""]);
        let sel = t.select_sample(&MetadataSchema::default(), "DS1", "GSM1").unwrap();
        assert_eq!(sel.len(), 2);
    }

    #[test]
    fn unreadable_row_error_names_the_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "GEO.sample\tMerged_barcode\tBarcode").unwrap();
        file.write_all(b"GSM1\tDS1_\xff\tAAAC\n").unwrap();
        file.flush().unwrap();

        let err = MetadataTable::from_path(file.path()).unwrap_err();
        assert!(err.to_string().contains(&file.path().display().to_string()));
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = MetadataTable::from_path("/nonexistent/metadata.tsv").unwrap_err();
        assert!(err.is_not_found());
    }
}
