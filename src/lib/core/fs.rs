use crate::core::error::Result;
use std::ffi::OsStr;
use std::fs;
use std::path::Path;

/// Create parent directories for a path when missing.
pub fn make_parent_dirs<P: AsRef<Path>>(path: P) -> Result<()> {
    if let Some(parent) = path.as_ref().parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Detect whether a path uses a gzip-compatible extension.
pub fn is_gzipped<P: AsRef<Path>>(path: P) -> bool {
    matches!(
        path.as_ref().extension().unwrap_or_else(|| OsStr::new("")),
        ext if ext == "gz" || ext == "gzip" || ext == "bgzf"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn detects_gzip_extensions() {
        assert!(is_gzipped("metadata.tsv.gz"));
        assert!(is_gzipped("positions.bgzf"));
        assert!(!is_gzipped("metadata.tsv"));
        assert!(!is_gzipped("matrix"));
    }

    #[test]
    fn creates_missing_parents() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("a").join("b").join("out.tsv");
        make_parent_dirs(&target).unwrap();
        assert!(dir.path().join("a").join("b").is_dir());
    }
}
