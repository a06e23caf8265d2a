pub mod align;
pub mod cnv;
pub mod common;
pub mod run;

pub use align::{run_align, AlignArgs};
pub use cnv::{run_cnv, CnvArgs};
pub use run::{run_pipeline, RunArgs};
