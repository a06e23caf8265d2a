use anyhow::{anyhow, Result};
use cnvalign_lib::pipeline::align::{AlignParams, GeneLabel, MetadataSchema};
use cnvalign_lib::pipeline::config::validate_threshold;
use cnvalign_lib::pipeline::output::OutputOptions;
use cnvalign_lib::utils;
use once_cell::sync::OnceCell;
use rayon::ThreadPoolBuilder;
use std::path::{Path, PathBuf};
use structopt::StructOpt;

static GLOBAL_RAYON_THREADS: OnceCell<usize> = OnceCell::new();

/// Alignment options shared by `align` and `run`.
#[derive(Debug, Clone, StructOpt)]
pub struct AlignOpts {
    /// Required prefix of the merged-barcode column (dataset identifier).
    #[structopt(long)]
    pub id_prefix: String,

    /// Required prefix of the sample column (e.g. a GEO sample accession).
    #[structopt(long)]
    pub sample_id: String,

    /// Keep cells with at least this many expressed genes.
    #[structopt(long, default_value = "200")]
    pub min_genes: usize,

    /// Keep genes expressed in at least this many cells.
    #[structopt(long, default_value = "3")]
    pub min_cells: usize,

    /// Feature-table column used as gene label: gene_symbols or gene_ids.
    #[structopt(long, default_value = "gene_symbols")]
    pub gene_labels: GeneLabel,

    /// Gene-label prefix marking mitochondrial genes.
    #[structopt(long, default_value = "MT-")]
    pub mito_prefix: String,

    /// Drop cells whose mitochondrial count fraction is not below this value.
    #[structopt(long)]
    pub max_mito_fraction: Option<f64>,

    /// Metadata column copied onto each aligned cell in the QC table.
    #[structopt(long)]
    pub annotation_column: Option<String>,

    /// Metadata column holding the sample identifier.
    #[structopt(long, default_value = "GEO.sample")]
    pub sample_column: String,

    /// Metadata column holding the dataset-prefixed barcode.
    #[structopt(long, default_value = "Merged_barcode")]
    pub merged_barcode_column: String,

    /// Metadata column holding the plain cell barcode.
    #[structopt(long, default_value = "Barcode")]
    pub barcode_column: String,
}

impl AlignOpts {
    pub fn validate(&self) -> Result<()> {
        if let Some(max_fraction) = self.max_mito_fraction {
            validate_threshold("max-mito-fraction", max_fraction, 0.0, 1.0)?;
        }
        Ok(())
    }

    pub fn to_params(&self) -> AlignParams {
        let mut params = AlignParams::new(self.id_prefix.clone(), self.sample_id.clone())
            .with_thresholds(self.min_genes, self.min_cells);
        params.schema = MetadataSchema {
            sample_column: self.sample_column.clone(),
            merged_barcode_column: self.merged_barcode_column.clone(),
            barcode_column: self.barcode_column.clone(),
        };
        params.gene_labels = self.gene_labels;
        params.mito_prefix = self.mito_prefix.clone();
        params.max_mito_fraction = self.max_mito_fraction;
        params.annotation_column = self.annotation_column.clone();
        params
    }
}

/// Threading and compression options shared by every subcommand.
#[derive(Debug, Clone, StructOpt)]
pub struct OutputOpts {
    /// Number of threads for matrix reductions and compression.
    #[structopt(short, long, default_value = "1")]
    pub threads: usize,

    /// Gzip-compress the tab-separated outputs.
    #[structopt(long)]
    pub gzip: bool,

    /// Compression level used with --gzip (0-9).
    #[structopt(long, default_value = "6")]
    pub compression_level: u32,
}

impl OutputOpts {
    pub fn to_options(&self, threads: usize) -> OutputOptions {
        OutputOptions {
            gzip: self.gzip,
            threads,
            compression_level: self.compression_level,
        }
    }
}

/// Ensure an output path ends with a gzip-compatible extension.
///
/// `-` (stdout) is returned unchanged.
pub fn ensure_gz_path(path: &Path) -> PathBuf {
    if path == Path::new("-") || utils::is_gzipped(path) {
        return path.to_path_buf();
    }

    let mut adjusted = path.to_path_buf();
    if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
        adjusted.set_file_name(format!("{}.gz", name));
    } else {
        adjusted.set_extension("gz");
    }
    adjusted
}

/// Output path for a writer, adjusted for compression.
pub fn output_path(path: &Path, options: &OutputOptions) -> PathBuf {
    if options.gzip {
        ensure_gz_path(path)
    } else {
        path.to_path_buf()
    }
}

/// Configure the global Rayon thread pool exactly once, returning the active
/// worker count. Subsequent calls reuse the first configured pool and emit a
/// warning when the requested thread count differs from the established size.
pub fn configure_global_thread_pool(threads: usize) -> Result<usize> {
    let requested = utils::determine_allowed_cpus(threads)?;

    if let Some(active) = GLOBAL_RAYON_THREADS.get() {
        if *active != requested {
            log::warn!(
                "Rayon global thread pool already initialised with {} threads; ignoring request for {}",
                active,
                requested
            );
        }
        return Ok(*active);
    }

    match ThreadPoolBuilder::new().num_threads(requested).build_global() {
        Ok(_) => {
            GLOBAL_RAYON_THREADS
                .set(requested)
                .map_err(|_| anyhow!("Failed to record global Rayon thread count"))?;
            Ok(requested)
        }
        Err(err) => {
            log::debug!("Global Rayon thread pool initialisation skipped: {}", err);
            let fallback = rayon::current_num_threads();
            if fallback != requested {
                log::warn!(
                    "Using existing Rayon pool with {} threads instead of requested {}",
                    fallback,
                    requested
                );
            }
            GLOBAL_RAYON_THREADS.set(fallback).ok();
            Ok(fallback)
        }
    }
}
