//! Parser for the quoted, whitespace-separated CNV caller text output
//!
//! ```text
//! "CELL_1" "CELL_2" "CELL_3"
//! "GENE_A" 1.02 0.98 1
//! "GENE_B" 0.87 1.10 0.95
//! ```
//!
//! The header lists cell identifiers wrapped in double quotes and separated by
//! single spaces. Each following line is a gene name and one value per cell.

use crate::core::error::{PrepError, Result};
use crate::core::io::open_text;
use crate::pipeline::cnv::table::CnvTable;
use log::{debug, info};
use std::io::{self, BufRead};
use std::path::Path;

const HEADER_DELIMITER: &str = "\" \"";
const QUOTE: char = '"';

/// Parse a CNV text file (optionally gzip-compressed).
pub fn parse_cnv_file<P: AsRef<Path>>(path: P) -> Result<CnvTable> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(PrepError::NotFound(format!(
            "CNV file not found: {}",
            path.display()
        )));
    }
    info!("Parsing CNV table from {}", path.display());
    let reader = open_text(path)?;
    parse_cnv_reader(reader, &path.display().to_string())
}

/// Parse CNV text from any buffered reader. `source` names the input in errors.
pub fn parse_cnv_reader<R: BufRead>(reader: R, source: &str) -> Result<CnvTable> {
    let mut cells: Option<Vec<String>> = None;
    let mut genes = Vec::new();
    let mut rows = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| match e.kind() {
            io::ErrorKind::InvalidData => PrepError::Format(format!(
                "{} line {} is not valid UTF-8 text",
                source,
                i + 1
            )),
            _ => PrepError::Io(e),
        })?;
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }
        match &cells {
            None => cells = Some(parse_header(line)?),
            Some(header) => {
                let (gene, values) = parse_data_line(line, i + 1, header.len())?;
                genes.push(gene);
                rows.push(values);
            }
        }
    }

    let cells = match cells {
        Some(cells) if !genes.is_empty() => cells,
        _ => {
            return Err(PrepError::Format(format!(
                "{} needs a header line and at least one data line",
                source
            )))
        }
    };

    debug!(
        "Parsed {} genes × {} cells from {}",
        genes.len(),
        cells.len(),
        source
    );
    CnvTable::new(genes, cells, rows)
}

/// Split the quoted header into cell identifiers.
pub fn parse_header(line: &str) -> Result<Vec<String>> {
    line.split(HEADER_DELIMITER)
        .enumerate()
        .map(|(i, token)| {
            let id = token.trim_matches(QUOTE);
            if id.is_empty() || id.contains(QUOTE) || id.contains(char::is_whitespace) {
                return Err(PrepError::Format(format!(
                    "header field {} ('{}') is not a quoted identifier without spaces",
                    i + 1,
                    token
                )));
            }
            Ok(id.to_string())
        })
        .collect()
}

fn parse_data_line(line: &str, lineno: usize, expected: usize) -> Result<(String, Vec<f64>)> {
    let mut tokens = line.split_whitespace();
    // the line is non-empty after trimming, so there is a first token
    let gene = tokens.next().unwrap_or_default().trim_matches(QUOTE).to_string();
    let raw: Vec<&str> = tokens.collect();

    if raw.len() != expected {
        return Err(PrepError::MalformedLine {
            line: lineno,
            gene,
            message: format!("expected {} values, found {}", expected, raw.len()),
        });
    }

    let mut values = Vec::with_capacity(expected);
    for (j, token) in raw.iter().enumerate() {
        match token.parse::<f64>() {
            Ok(v) => values.push(v),
            Err(_) => {
                return Err(PrepError::MalformedLine {
                    line: lineno,
                    gene,
                    message: format!("value {} ('{}') is not numeric", j + 1, token),
                })
            }
        }
    }
    Ok((gene, values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::cnv::table::CnvField;
    use std::io::{Cursor, Write};
    use tempfile::NamedTempFile;

    fn parse(text: &str) -> Result<CnvTable> {
        parse_cnv_reader(Cursor::new(text), "test")
    }

    #[test]
    fn parses_minimal_table() {
        let table = parse("\"C1\" \"C2\"\n\"G1\" 1.5 2.0\n").unwrap();
        assert_eq!(table.columns(), ["Gene", "C1", "C2"]);
        assert_eq!(table.shape(), (1, 3));
        assert_eq!(
            table.row(0),
            vec![CnvField::Gene("G1"), CnvField::Value(1.5), CnvField::Value(2.0)]
        );
        assert_eq!(table.genes(), ["G1"]);
    }

    #[test]
    fn keeps_file_order_and_duplicates() {
        let table = parse("\"a\" \"b\"\n\"Z\" 1 2\n\"A\" 3 4\n\"Z\" 5 6\n").unwrap();
        assert_eq!(table.genes(), ["Z", "A", "Z"]);
        assert_eq!(table.value(2, 1), Some(6.0));
    }

    #[test]
    fn accepts_runs_of_whitespace_and_unquoted_genes() {
        let table = parse("\"a\" \"b\"\r\nGENE\t 1e-3   -2\r\n").unwrap();
        assert_eq!(table.genes(), ["GENE"]);
        assert_eq!(table.value(0, 0), Some(0.001));
        assert_eq!(table.value(0, 1), Some(-2.0));
    }

    #[test]
    fn wrong_field_count_names_gene() {
        let err = parse("\"C1\" \"C2\"\n\"G1\" 1 2\n\"G2\" 1\n").unwrap_err();
        assert!(err.is_format());
        match err {
            PrepError::MalformedLine { line, gene, .. } => {
                assert_eq!(line, 3);
                assert_eq!(gene, "G2");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn non_numeric_value_names_gene() {
        let err = parse("\"C1\" \"C2\"\n\"G7\" 1 abc\n").unwrap_err();
        match err {
            PrepError::MalformedLine { gene, message, .. } => {
                assert_eq!(gene, "G7");
                assert!(message.contains("abc"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn too_short_inputs() {
        assert!(matches!(parse(""), Err(PrepError::Format(_))));
        assert!(matches!(parse("\"C1\" \"C2\"\n"), Err(PrepError::Format(_))));
        assert!(matches!(parse("\"C1\"\n\n\n"), Err(PrepError::Format(_))));
    }

    #[test]
    fn undecodable_line_is_a_format_error() {
        let err = parse_cnv_reader(Cursor::new(&b"\"C1\"\n\"G1\" \xff\xfe\n"[..]), "test")
            .unwrap_err();
        assert!(err.is_format());
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn header_with_embedded_space_is_rejected() {
        assert!(parse_header("\"C 1\" \"C2\"").unwrap_err().is_format());
        assert!(parse_header("C1 C2").unwrap_err().is_format());
        assert!(parse_header("\"C1\"  \"C2\"").unwrap_err().is_format());
        assert_eq!(parse_header("\"C1\"").unwrap(), ["C1"]);
    }

    #[test]
    fn reads_from_disk_and_reports_missing_files() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "\"C1\" \"C2\" \"C3\"").unwrap();
        writeln!(file, "\"G1\" 1 1 1").unwrap();
        writeln!(file, "\"G2\" 0.5 1 1.5").unwrap();
        file.flush().unwrap();

        let table = parse_cnv_file(file.path()).unwrap();
        assert_eq!(table.shape(), (2, 4));

        let err = parse_cnv_file("/nonexistent/cnv.txt").unwrap_err();
        assert!(err.is_not_found());
    }
}
