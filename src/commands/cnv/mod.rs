mod args;

use anyhow::Result;
use log::info;

use cnvalign_lib::pipeline::cnv::parse_cnv_file;
use cnvalign_lib::pipeline::output::write_cnv_table;

use crate::commands::common;

pub use args::CnvArgs;

/// Entry point for the `cnv` command.
pub fn run_cnv(args: CnvArgs) -> Result<()> {
    info!("Parsing CNV table {:?}", args.input);
    let threads = common::configure_global_thread_pool(args.output_opts.threads)?;
    let options = args.output_opts.to_options(threads);

    let table = parse_cnv_file(&args.input)?;
    let (rows, cols) = table.shape();
    info!("Parsed CNV table with {} genes and {} columns", rows, cols);

    let output = common::output_path(&args.output, &options);
    write_cnv_table(&table, &Some(&output), &options)?;
    Ok(())
}
