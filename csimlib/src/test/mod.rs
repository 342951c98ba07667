mod config;
mod simulator;

use std::path::PathBuf;

/// Path of one of the sample traces shipped with the repository
pub(crate) fn sample_trace(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../traces").join(name)
}
