use crate::core::error::PrepError;
use crate::core::io::is_broken_pipe_io;
use anyhow::Error;
use std::io;

/// Returns `true` if the error originated from a broken pipe.
#[inline]
pub fn is_broken_pipe(err: &Error) -> bool {
    let root = err.root_cause();
    if let Some(io_err) = root.downcast_ref::<io::Error>() {
        return is_broken_pipe_io(io_err);
    }
    match root.downcast_ref::<PrepError>() {
        Some(PrepError::Io(io_err)) => is_broken_pipe_io(io_err),
        _ => false,
    }
}
