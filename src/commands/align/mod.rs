mod args;

use anyhow::Result;
use log::info;
use std::time::Instant;

use cnvalign_lib::pipeline::align::align;
use cnvalign_lib::pipeline::output::{write_cell_qc, write_count_matrix};

use crate::commands::common;

pub use args::AlignArgs;

/// Entry point for the `align` command.
pub fn run_align(args: AlignArgs) -> Result<()> {
    let start_time = Instant::now();
    info!("Aligning {:?} against {:?}", args.matrix_dir, args.metadata);

    args.align.validate()?;
    let threads = common::configure_global_thread_pool(args.output_opts.threads)?;
    let options = args.output_opts.to_options(threads);
    let params = args.align.to_params();

    let alignment = align(&args.matrix_dir, &args.metadata, &params)?;
    let summary = &alignment.summary;
    info!(
        "Raw {:?} -> filtered {:?} -> aligned {} cells ({} of {} metadata rows selected)",
        summary.raw_shape,
        summary.filtered_shape,
        summary.matched_cells,
        summary.selected_metadata_rows,
        summary.metadata_rows
    );

    let output = common::output_path(&args.output, &options);
    write_count_matrix(&alignment.matrix, &Some(&output), &options)?;

    if let Some(qc_path) = &args.qc {
        let qc_path = common::output_path(qc_path, &options);
        let annotations = match (&params.annotation_column, &alignment.annotations) {
            (Some(name), Some(values)) => Some((name.as_str(), values.as_slice())),
            _ => None,
        };
        write_cell_qc(&alignment.qc, annotations, &Some(&qc_path), &options)?;
    }

    info!("align finished in {:?}", start_time.elapsed());
    Ok(())
}
