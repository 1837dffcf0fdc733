//! Command-line argument parsing for the ground-state search.

use clap::Parser;

/// Mean-field Hubbard ground-state search with YAML configuration
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the YAML configuration file (built-in defaults when absent)
    #[arg(short, long)]
    pub config_file: Option<String>,

    /// Write the run log to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<String>,

    /// Override the lattice size
    #[arg(long)]
    pub lattice_size: Option<usize>,

    /// Override the nearest-neighbour hopping t
    #[arg(long)]
    pub t: Option<f64>,

    /// Override the diagonal hopping, as a fraction of t
    #[arg(long)]
    pub t_prime_ratio: Option<f64>,

    /// Override the on-site interaction, as a fraction of t
    #[arg(long)]
    pub u_ratio: Option<f64>,

    /// Override the number of independent trials
    #[arg(long)]
    pub trials: Option<usize>,

    /// Override the per-site density tolerance
    #[arg(long)]
    pub m_prec: Option<f64>,

    /// Override the iteration budget per trial
    #[arg(long)]
    pub max_iterations: Option<usize>,

    /// Override the initialization mode (0: random, 1: checkerboard, 2: FD seed)
    #[arg(long)]
    pub init: Option<usize>,

    /// Override the Fermi-Dirac seed temperature
    #[arg(long)]
    pub kt: Option<f64>,

    /// Override the plot mode (0: never, 1: best candidate only, 2: everything)
    #[arg(long)]
    pub plot_mode: Option<usize>,

    /// Master seed for the per-trial random streams (random when absent)
    #[arg(long)]
    pub seed: Option<u64>,
}
