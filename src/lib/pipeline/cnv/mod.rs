//! CNV caller output parsing
//!
//! - [`parser`]: tokenizer for the quoted header / whitespace-separated rows format
//! - [`table`]: the resulting [`CnvTable`]

pub mod parser;
pub mod table;

pub use parser::{parse_cnv_file, parse_cnv_reader};
pub use table::{CnvField, CnvTable, GENE_COLUMN};
