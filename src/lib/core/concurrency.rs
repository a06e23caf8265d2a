use crate::core::error::{PrepError, Result};
use log::{error, warn};

/// Validate and normalize a requested CPU count.
pub fn determine_allowed_cpus(desired: usize) -> Result<usize> {
    if desired == 0 {
        error!("Must select > 0 threads");
        Err(PrepError::Config(
            "Too few threads selected. Min 1".to_string(),
        ))
    } else {
        if desired > num_cpus::get() {
            warn!(
                "Specified more threads ({}) than are available ({})",
                desired,
                num_cpus::get()
            );
        }
        Ok(desired)
    }
}
