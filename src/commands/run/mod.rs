mod args;

use anyhow::Result;
use log::{error, info};
use std::time::Instant;

use cnvalign_lib::pipeline::driver;

use crate::commands::common;

pub use args::RunArgs;

/// Entry point for the `run` command.
pub fn run_pipeline(args: RunArgs) -> Result<()> {
    let start_time = Instant::now();
    info!("Starting cnvalign pipeline");
    info!("Arguments: {:?}", args);

    args.validate()?;
    info!("Input validation passed");

    if args.dry_run {
        info!("Dry run completed successfully - all validations passed");
        return Ok(());
    }

    let threads = common::configure_global_thread_pool(args.output_opts.threads)?;
    info!("Rayon thread pool configured with {} threads", threads);

    let config = args.to_config(threads);
    match driver::run_pipeline(&config) {
        Ok(output) => {
            info!(
                "Aligned matrix: {} genes × {} cells; CNV table: {} genes × {} cells",
                output.counts.n_genes(),
                output.counts.n_cells(),
                output.cnv.n_genes(),
                output.cnv.cells().len()
            );
            for path in &output.written {
                info!("Output written to: {}", path.display());
            }
            info!("Pipeline finished in {:?}", start_time.elapsed());
            Ok(())
        }
        Err(err) => {
            error!("Pipeline failed: {}", err);
            Err(err.into())
        }
    }
}
