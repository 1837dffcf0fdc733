//! Run output plumbing: log destination and the output directory.

mod output;

pub use output::setup_output;

use std::fs;
use std::path::PathBuf;

use color_eyre::eyre::{Result, WrapErr};

use crate::config::Settings;

/// Create the parameter-stamped output directory for this run, cleaning any
/// leftovers from a previous run with the same parameters.
///
/// The name encodes lattice size and the amplitudes in zero-padded
/// thousandths, e.g. `output_s32_t01000_tp00500_U01000`.
pub fn prepare_output_dir(settings: &Settings) -> Result<PathBuf> {
    let dir = PathBuf::from(format!(
        "output_s{}_t{:05}_tp{:05}_U{:05}",
        settings.s,
        (settings.t * 1000.0) as i64,
        (settings.t_prime * 1000.0) as i64,
        (settings.u * 1000.0) as i64
    ));

    if dir.exists() {
        fs::remove_dir_all(&dir)
            .wrap_err_with(|| format!("unable to clean the output directory {}", dir.display()))?;
    }
    fs::create_dir_all(&dir)
        .wrap_err_with(|| format!("unable to create the output directory {}", dir.display()))?;

    Ok(dir)
}
