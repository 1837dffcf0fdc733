//! Concurrent trial execution and best-candidate tracking.

use std::path::Path;
use std::sync::Mutex;

use color_eyre::eyre::{eyre, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::{info, warn};

use crate::app::report;
use crate::config::{PlotMode, Settings};
use crate::plot;
use crate::scc::{run_scc, SccResult};

/// Lowest-energy converged result seen so far.
///
/// The energy comparison and the replacement sit under one lock, so two
/// trials finishing with similar energies cannot interleave and lose an
/// update.
pub struct GroundStateSearch {
    best: Mutex<Option<SccResult>>,
}

impl GroundStateSearch {
    pub fn new() -> Self {
        GroundStateSearch {
            best: Mutex::new(None),
        }
    }

    /// Offer a converged result; it is kept iff it beats the current best.
    /// Returns whether the candidate was accepted.
    pub fn propose(&self, candidate: SccResult) -> bool {
        let mut best = self.best.lock().unwrap();
        match best.as_ref() {
            Some(current) if candidate.energy >= current.energy => false,
            _ => {
                *best = Some(candidate);
                true
            }
        }
    }

    pub fn into_best(self) -> Option<SccResult> {
        self.best.into_inner().unwrap()
    }
}

impl Default for GroundStateSearch {
    fn default() -> Self {
        Self::new()
    }
}

/// Draw one independent seed per trial from a single master stream, before
/// anything launches. Trials never share a random stream, and a fixed master
/// seed reproduces the whole run.
pub fn trial_seeds(master_seed: Option<u64>, n_trials: usize) -> Vec<u64> {
    let mut seeder = match master_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    (0..n_trials).map(|_| seeder.gen()).collect()
}

/// Run all configured trials in parallel and return the best converged
/// result, if any trial converged.
///
/// A fatal trial error (unknown initialization, eigensolver failure) stops
/// the whole sweep: the error short-circuits the parallel loop and surfaces
/// to the caller, so no best-effort partial answer escapes.
pub fn run_trials(settings: &Settings, out_dir: &Path) -> Result<Option<SccResult>> {
    let search = GroundStateSearch::new();
    let seeds = trial_seeds(settings.seed, settings.n_trials);

    seeds
        .into_par_iter()
        .enumerate()
        .try_for_each(|(id, seed)| -> Result<()> {
            info!("{}: calculation started", id);
            let results =
                run_scc(settings, id, seed).map_err(|e| eyre!("{}: calculation failed: {}", id, e))?;
            info!("{}: calculation finished", id);

            if !results.converged {
                warn!("{}: calculation did not converge", id);
                return Ok(());
            }

            report::report_trial(id, &results);
            if search.propose(results.clone()) {
                info!("{}: best estimate of the ground state so far", id);
            }

            if settings.plot_mode == PlotMode::Everything {
                info!("{}: plotting started", id);
                plot::plot(settings, &results, out_dir, Some(id))?;
                info!("{}: plotting finished", id);
            }
            Ok(())
        })?;

    Ok(search.into_best())
}
