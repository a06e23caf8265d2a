//! Pipeline configuration and validation
//!
//! All run parameters are carried explicitly in [`PipelineConfig`]; nothing
//! is read from process-wide state.

use crate::core::error::{PrepError, Result};
use crate::pipeline::align::AlignParams;
use crate::pipeline::output::OutputOptions;
use std::path::PathBuf;

/// Inputs, parameters and output location for one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Cell Ranger style matrix directory.
    pub matrix_dir: PathBuf,
    /// Tab-separated metadata table (may be gzipped).
    pub metadata: PathBuf,
    /// CNV caller text output.
    pub cnv: PathBuf,
    pub output_dir: PathBuf,
    pub align: AlignParams,
    pub output: OutputOptions,
    /// Also write per-cell QC metrics for the aligned cells.
    pub write_qc: bool,
}

impl PipelineConfig {
    pub fn new(
        matrix_dir: impl Into<PathBuf>,
        metadata: impl Into<PathBuf>,
        cnv: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        align: AlignParams,
    ) -> Self {
        Self {
            matrix_dir: matrix_dir.into(),
            metadata: metadata.into(),
            cnv: cnv.into(),
            output_dir: output_dir.into(),
            align,
            output: OutputOptions::default(),
            write_qc: true,
        }
    }

    /// Check parameter ranges and the presence of the alignment inputs.
    ///
    /// The CNV file is not checked here; the parser reports it missing when
    /// its stage runs.
    pub fn validate(&self) -> Result<()> {
        if let Some(max_fraction) = self.align.max_mito_fraction {
            validate_threshold("max_mito_fraction", max_fraction, 0.0, 1.0)?;
        }

        if self.output.threads == 0 {
            return Err(PrepError::InvalidInput(
                "output threads must be greater than 0".to_string(),
            ));
        }

        if self.output.compression_level > 9 {
            return Err(PrepError::InvalidInput(format!(
                "compression_level must be between 0 and 9, got {}",
                self.output.compression_level
            )));
        }

        if !self.matrix_dir.is_dir() {
            return Err(PrepError::Load(format!(
                "Matrix directory not found: {}",
                self.matrix_dir.display()
            )));
        }

        if !self.metadata.is_file() {
            return Err(PrepError::NotFound(format!(
                "Metadata file not found: {}",
                self.metadata.display()
            )));
        }

        if self.output_dir.exists() && !self.output_dir.is_dir() {
            return Err(PrepError::Config(format!(
                "Output path {} exists and is not a directory",
                self.output_dir.display()
            )));
        }

        Ok(())
    }
}

/// A finite value within `[min, max]`.
pub fn validate_threshold(name: &str, value: f64, min: f64, max: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(PrepError::InvalidInput(format!(
            "{} must be a finite number",
            name
        )));
    }

    if value < min || value > max {
        return Err(PrepError::ThresholdValidation {
            field: name.to_string(),
            min,
            max,
            value,
        });
    }

    Ok(())
}
