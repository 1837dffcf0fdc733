//! Outcome of a single self-consistency cycle.

use nalgebra::{DMatrix, DVector};

/// Everything a finished trial hands back to the orchestrator. Built once at
/// termination and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct SccResult {
    /// Both spin channels' density changes dropped below the tolerance.
    pub converged: bool,
    /// Number of iterations performed.
    pub iterations: usize,
    /// Max |Δn| of the last iteration, per spin channel.
    pub delta_n_up: f64,
    pub delta_n_down: f64,

    /// Sum of the occupied single-particle energies of both channels.
    pub energy: f64,
    /// Smaller of the two channels' HOMO-LUMO gaps.
    pub gap: f64,
    /// Total magnetization, sum n_up - sum n_down.
    pub m_z: f64,
    /// Average occupation per site and spin.
    pub filling: f64,

    /// Final mean-field densities.
    pub n_up: DVector<f64>,
    pub n_down: DVector<f64>,

    /// Final eigenvalues, ascending.
    pub epsilon_up: DVector<f64>,
    pub epsilon_down: DVector<f64>,

    /// Final eigenvectors, one orthonormal column per state.
    pub q_up: DMatrix<f64>,
    pub q_down: DMatrix<f64>,
}
