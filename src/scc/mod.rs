//! The self-consistency cycle.
//!
//! One trial owns a tight-binding matrix and a private random stream, and
//! iterates between rebuilding the two spin Hamiltonians from the current
//! mean-field densities and recomputing the densities from their
//! eigenvectors, until the densities stop moving or the iteration budget
//! runs out.

mod hamiltonian;
mod result;

pub use hamiltonian::tight_binding_hamiltonian;
pub use result::SccResult;

use nalgebra::{DMatrix, DVector};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tracing::debug;

use crate::config::Settings;
use crate::lattice::Lattice;

pub const INIT_UNIFORM_RANDOM: usize = 0;
pub const INIT_CHECKERBOARD: usize = 1;
pub const INIT_FERMI_SEED: usize = 2;

/// QR sweeps granted to the eigensolver, per matrix dimension.
const EIGEN_MAX_SWEEPS: usize = 30;

/// Fatal trial failures. Either one aborts the whole multi-trial run.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SccError {
    #[error("unknown initialization mode {0}")]
    UnknownInitialization(usize),
    #[error("eigen-decomposition did not converge")]
    Diagonalization,
}

/// Run one self-consistency cycle to completion.
///
/// The trial is a pure function of the settings and its seed; it shares no
/// state with other trials. Non-convergence within the iteration budget is
/// reported through [`SccResult::converged`], not as an error.
pub fn run_scc(settings: &Settings, id: usize, seed: u64) -> Result<SccResult, SccError> {
    let lattice = settings.lattice();
    let n = lattice.n_sites();
    debug_assert!(n % 2 == 0, "half filling needs an even number of sites");
    let occupied = n / 2; // half filling
    let u = settings.u;

    let mut rng = StdRng::seed_from_u64(seed);

    let (mut n_up, mut n_down) = initialize_densities(settings, &lattice, &mut rng)?;
    let h_tb = tight_binding_hamiltonian(&lattice, settings.t, settings.t_prime);

    let mut iterations = 0;
    let (epsilon_up, q_up, epsilon_down, q_down, delta_n_up, delta_n_down) = loop {
        iterations += 1;

        let h_up = &h_tb + DMatrix::from_diagonal(&(&n_down * u));
        let h_down = &h_tb + DMatrix::from_diagonal(&(&n_up * u));

        let (epsilon_up, q_up) = diagonalize(h_up)?;
        let (epsilon_down, q_down) = diagonalize(h_down)?;

        let n_up_old = n_up.clone();
        let n_down_old = n_down.clone();

        if iterations == 1 && settings.init == INIT_FERMI_SEED {
            // seed the occupation from the non-interacting spectrum
            let e_fermi = 0.5 * (epsilon_up[occupied - 1] + epsilon_down[occupied - 1]);
            let occ_up = sample_occupation(&epsilon_up, e_fermi, settings.kt, occupied, &mut rng);
            let occ_down =
                sample_occupation(&epsilon_down, e_fermi, settings.kt, occupied, &mut rng);
            n_up = occupied_density(&q_up, &occ_up);
            n_down = occupied_density(&q_down, &occ_down);
        } else {
            // one shared draw per iteration, applied to both channels
            let mix = 0.5 * uniform_pos(&mut rng);
            n_up = lowest_states_density(&q_up, occupied) * (0.25 + mix)
                + &n_up * (0.75 - mix);
            n_down = lowest_states_density(&q_down, occupied) * (0.25 + mix)
                + &n_down * (0.75 - mix);
        }

        let delta_n_up = (&n_up - &n_up_old).abs().max();
        let delta_n_down = (&n_down - &n_down_old).abs().max();
        debug!(
            "{}: iteration {}: delta_n_up = {:.3e}, delta_n_down = {:.3e}",
            id, iterations, delta_n_up, delta_n_down
        );

        let within_tolerance =
            delta_n_up <= settings.m_prec && delta_n_down <= settings.m_prec;
        if within_tolerance || iterations >= settings.max_iterations {
            break (epsilon_up, q_up, epsilon_down, q_down, delta_n_up, delta_n_down);
        }
    };

    let converged = delta_n_up < settings.m_prec && delta_n_down < settings.m_prec;

    let energy = epsilon_up.rows(0, occupied).sum() + epsilon_down.rows(0, occupied).sum();
    let gap_up = epsilon_up[occupied] - epsilon_up[occupied - 1];
    let gap_down = epsilon_down[occupied] - epsilon_down[occupied - 1];
    let m_z = n_up.sum() - n_down.sum();
    let filling = (n_up.sum() + n_down.sum()) / (2.0 * n as f64);

    Ok(SccResult {
        converged,
        iterations,
        delta_n_up,
        delta_n_down,
        energy,
        gap: gap_up.min(gap_down),
        m_z,
        filling,
        n_up,
        n_down,
        epsilon_up,
        epsilon_down,
        q_up,
        q_down,
    })
}

fn initialize_densities(
    settings: &Settings,
    lattice: &Lattice,
    rng: &mut StdRng,
) -> Result<(DVector<f64>, DVector<f64>), SccError> {
    let n = lattice.n_sites();
    match settings.init {
        INIT_UNIFORM_RANDOM => {
            let n_up = DVector::from_fn(n, |_, _| uniform_pos(rng));
            let n_down = DVector::from_fn(n, |_, _| uniform_pos(rng));
            Ok((n_up, n_down))
        }
        INIT_CHECKERBOARD => {
            let mut n_up = DVector::zeros(n);
            let mut n_down = DVector::zeros(n);
            for i in 0..n {
                if (lattice.site_x(i) + lattice.site_y(i)) % 2 == 0 {
                    n_up[i] = 1.0;
                } else {
                    n_down[i] = 1.0;
                }
            }
            Ok((n_up, n_down))
        }
        // true occupation comes from the Fermi-Dirac seed in iteration 1
        INIT_FERMI_SEED => Ok((
            DVector::from_element(n, 0.5),
            DVector::from_element(n, 0.5),
        )),
        mode => Err(SccError::UnknownInitialization(mode)),
    }
}

/// Symmetric eigen-decomposition with eigenpairs re-sorted ascending.
fn diagonalize(h: DMatrix<f64>) -> Result<(DVector<f64>, DMatrix<f64>), SccError> {
    let n = h.nrows();
    let eig = h
        .try_symmetric_eigen(f64::EPSILON, EIGEN_MAX_SWEEPS * n)
        .ok_or(SccError::Diagonalization)?;

    use std::cmp::Ordering;
    let mut indices: Vec<usize> = (0..n).collect();
    indices.sort_by(|&a, &b| {
        eig.eigenvalues[a]
            .partial_cmp(&eig.eigenvalues[b])
            .unwrap_or(Ordering::Equal)
    });
    let eigenvalues = DVector::from_fn(n, |i, _| eig.eigenvalues[indices[i]]);
    let eigenvectors = eig.eigenvectors.select_columns(&indices);

    Ok((eigenvalues, eigenvectors))
}

/// Fermi-Dirac occupation probability; a sharp step at `kt = 0`.
pub fn fermi_occupation(e: f64, e_fermi: f64, kt: f64) -> f64 {
    if kt == 0.0 {
        if e <= e_fermi {
            1.0
        } else {
            0.0
        }
    } else {
        1.0 / (((e - e_fermi) / kt).exp() + 1.0)
    }
}

/// Draw an occupation pattern with exactly `target` occupied states.
///
/// Each state is a fresh Bernoulli trial at its Fermi-Dirac probability, and
/// the whole pattern is redrawn until the occupied count matches `target`.
/// With `kt = 0` and a spectrum degenerate at the Fermi level no draw can
/// ever match, so callers pass `kt > 0` for such spectra.
pub(crate) fn sample_occupation(
    epsilon: &DVector<f64>,
    e_fermi: f64,
    kt: f64,
    target: usize,
    rng: &mut StdRng,
) -> Vec<bool> {
    let mut occupied = vec![false; epsilon.len()];
    loop {
        for (i, occ) in occupied.iter_mut().enumerate() {
            let p = fermi_occupation(epsilon[i], e_fermi, kt);
            *occ = p == 1.0 || rng.gen::<f64>() < p;
        }
        if occupied.iter().filter(|&&o| o).count() == target {
            return occupied;
        }
    }
}

/// Per-site density of an explicit set of occupied eigenstates.
fn occupied_density(q: &DMatrix<f64>, occupied: &[bool]) -> DVector<f64> {
    let mut density = DVector::zeros(q.nrows());
    for (state, &occ) in occupied.iter().enumerate() {
        if occ {
            let column = q.column(state);
            for i in 0..q.nrows() {
                density[i] += column[i] * column[i];
            }
        }
    }
    density
}

/// Per-site density of the `occupied` lowest eigenstates.
fn lowest_states_density(q: &DMatrix<f64>, occupied: usize) -> DVector<f64> {
    let mut density = DVector::zeros(q.nrows());
    for state in 0..occupied {
        let column = q.column(state);
        for i in 0..q.nrows() {
            density[i] += column[i] * column[i];
        }
    }
    density
}

/// Uniform draw from the half-open interval (0, 1].
fn uniform_pos(rng: &mut StdRng) -> f64 {
    1.0 - rng.gen::<f64>()
}
