//! Result reporting: per-trial blocks, the final summary and the
//! machine-readable record.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use color_eyre::eyre::{Result, WrapErr};
use tracing::info;

use crate::config::Settings;
use crate::scc::SccResult;

/// Log the observables of a converged trial.
pub fn report_trial(id: usize, results: &SccResult) {
    info!("{}: calculation converged", id);
    info!(
        "{}: iterations_to_convergence = {}",
        id, results.iterations
    );
    info!("{}: Delta_n_up = {:.3e}", id, results.delta_n_up);
    info!("{}: Delta_n_down = {:.3e}", id, results.delta_n_down);
    info!("{}: energy = {:.6}", id, results.energy);
    info!("{}: gap = {:.6}", id, results.gap);
    info!("{}: m_z = {:.6}", id, results.m_z);
    info!("{}: filling = {:.6}", id, results.filling);
}

/// Log the final outcome of the whole sweep.
pub fn report_summary(best: Option<&SccResult>) {
    info!("all calculations finished");
    match best {
        Some(results) => {
            info!("best ground state estimate:");
            info!("iterations_to_convergence = {}", results.iterations);
            info!("Delta_n_up = {:.3e}", results.delta_n_up);
            info!("Delta_n_down = {:.3e}", results.delta_n_down);
            info!("energy = {:.6}", results.energy);
            info!("gap = {:.6}", results.gap);
            info!("m_z = {:.6}", results.m_z);
            info!("filling = {:.6}", results.filling);
        }
        None => info!("no trial converged, so there is no ground state estimate"),
    }
}

/// Write the single machine-readable record for the best candidate:
/// lattice size, the model amplitudes and the observables, one line.
pub fn write_results_log(settings: &Settings, results: &SccResult, dir: &Path) -> Result<()> {
    let path = dir.join("results.log");
    let mut results_log =
        File::create(&path).wrap_err_with(|| format!("unable to create {}", path.display()))?;
    writeln!(
        results_log,
        "{} {:+.16e} {:+.16e} {:+.16e} {:+.16e} {:+.16e} {:+.16e} {:+.16e}",
        settings.s,
        settings.t,
        settings.t_prime,
        settings.u,
        results.energy,
        results.gap,
        results.m_z,
        results.filling
    )?;
    Ok(())
}
