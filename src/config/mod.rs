//! Configuration management for the ground-state search.
//!
//! A YAML file with optional fields, command-line overrides, and a resolved
//! immutable [`Settings`] value that every trial reads.

mod args;

pub use args::Args;

use color_eyre::eyre::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::lattice::Lattice;

const DEFAULT_SIZE: usize = 32;
const DEFAULT_T: f64 = 1.0;
const DEFAULT_T_PRIME_RATIO: f64 = 0.5;
const DEFAULT_U_RATIO: f64 = 1.0;
const DEFAULT_TRIALS: usize = 8;
const DEFAULT_M_PREC: f64 = 1e-5;
const DEFAULT_MAX_ITERATIONS: usize = 1000;
const DEFAULT_INIT: usize = 2;
const DEFAULT_KT: f64 = 0.25;
const DEFAULT_PLOT_MODE: usize = 2;

/// Main configuration structure, as read from the YAML file.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    pub model: Option<ModelParams>,
    pub scc: Option<SccParams>,
    pub output: Option<OutputParams>,
}

/// Physical parameters of the lattice model.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModelParams {
    pub size: Option<usize>,
    pub t: Option<f64>,
    pub t_prime_ratio: Option<f64>,
    pub u_ratio: Option<f64>,
}

impl Default for ModelParams {
    fn default() -> Self {
        ModelParams {
            size: Some(DEFAULT_SIZE),
            t: Some(DEFAULT_T),
            t_prime_ratio: Some(DEFAULT_T_PRIME_RATIO),
            u_ratio: Some(DEFAULT_U_RATIO),
        }
    }
}

impl ModelParams {
    /// Apply default values to any missing parameters
    pub fn with_defaults(mut self) -> Self {
        let defaults = Self::default();
        if self.size.is_none() {
            self.size = defaults.size;
        }
        if self.t.is_none() {
            self.t = defaults.t;
        }
        if self.t_prime_ratio.is_none() {
            self.t_prime_ratio = defaults.t_prime_ratio;
        }
        if self.u_ratio.is_none() {
            self.u_ratio = defaults.u_ratio;
        }
        self
    }
}

/// Numerical parameters of the self-consistency cycle.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SccParams {
    pub trials: Option<usize>,
    pub m_prec: Option<f64>,
    pub max_iterations: Option<usize>,
    pub init: Option<usize>,
    pub kt: Option<f64>,
}

impl Default for SccParams {
    fn default() -> Self {
        SccParams {
            trials: Some(DEFAULT_TRIALS),
            m_prec: Some(DEFAULT_M_PREC),
            max_iterations: Some(DEFAULT_MAX_ITERATIONS),
            init: Some(DEFAULT_INIT),
            kt: Some(DEFAULT_KT),
        }
    }
}

impl SccParams {
    /// Apply default values to any missing parameters
    pub fn with_defaults(mut self) -> Self {
        let defaults = Self::default();
        if self.trials.is_none() {
            self.trials = defaults.trials;
        }
        if self.m_prec.is_none() {
            self.m_prec = defaults.m_prec;
        }
        if self.max_iterations.is_none() {
            self.max_iterations = defaults.max_iterations;
        }
        if self.init.is_none() {
            self.init = defaults.init;
        }
        if self.kt.is_none() {
            self.kt = defaults.kt;
        }
        self
    }
}

/// Run output parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputParams {
    pub plot_mode: Option<usize>,
    pub seed: Option<u64>,
}

impl Default for OutputParams {
    fn default() -> Self {
        OutputParams {
            plot_mode: Some(DEFAULT_PLOT_MODE),
            seed: None,
        }
    }
}

impl OutputParams {
    /// Apply default values to any missing parameters
    pub fn with_defaults(mut self) -> Self {
        let defaults = Self::default();
        if self.plot_mode.is_none() {
            self.plot_mode = defaults.plot_mode;
        }
        self
    }
}

impl Config {
    /// Apply defaults to all configuration sections
    pub fn with_defaults(mut self) -> Self {
        self.model = Some(self.model.take().unwrap_or_default().with_defaults());
        self.scc = Some(self.scc.take().unwrap_or_default().with_defaults());
        self.output = Some(self.output.take().unwrap_or_default().with_defaults());
        self
    }

    /// Combine file values, command-line overrides and built-in defaults
    /// into the immutable settings every trial reads.
    pub fn resolve(&self, args: &Args) -> Result<Settings> {
        let model = self.model.clone().unwrap_or_default().with_defaults();
        let scc = self.scc.clone().unwrap_or_default().with_defaults();
        let output = self.output.clone().unwrap_or_default().with_defaults();

        let s = args.lattice_size.or(model.size).unwrap_or(DEFAULT_SIZE);
        if s < 1 {
            bail!("lattice size must be at least 1");
        }
        let n_sites = s * s;
        if n_sites % 2 != 0 {
            bail!(
                "half filling needs an even number of sites, but {}x{} has {}",
                s,
                s,
                n_sites
            );
        }

        let t = args.t.or(model.t).unwrap_or(DEFAULT_T);
        let t_prime = args
            .t_prime_ratio
            .or(model.t_prime_ratio)
            .unwrap_or(DEFAULT_T_PRIME_RATIO)
            * t;
        let u = args.u_ratio.or(model.u_ratio).unwrap_or(DEFAULT_U_RATIO) * t;

        // the configured tolerance is per site; trials compare against the
        // lattice total
        let m_prec = args.m_prec.or(scc.m_prec).unwrap_or(DEFAULT_M_PREC) * n_sites as f64;

        let plot_flag = args
            .plot_mode
            .or(output.plot_mode)
            .unwrap_or(DEFAULT_PLOT_MODE);
        let plot_mode = PlotMode::from_flag(plot_flag)?;

        Ok(Settings {
            s,
            t,
            t_prime,
            u,
            n_trials: args.trials.or(scc.trials).unwrap_or(DEFAULT_TRIALS),
            m_prec,
            max_iterations: args
                .max_iterations
                .or(scc.max_iterations)
                .unwrap_or(DEFAULT_MAX_ITERATIONS),
            init: args.init.or(scc.init).unwrap_or(DEFAULT_INIT),
            kt: args.kt.or(scc.kt).unwrap_or(DEFAULT_KT),
            plot_mode,
            seed: args.seed.or(output.seed),
        })
    }
}

/// What gets rendered at the end of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotMode {
    Never,
    BestOnly,
    Everything,
}

impl PlotMode {
    fn from_flag(flag: usize) -> Result<Self> {
        match flag {
            0 => Ok(PlotMode::Never),
            1 => Ok(PlotMode::BestOnly),
            2 => Ok(PlotMode::Everything),
            other => bail!("unknown plot mode {} (expected 0, 1 or 2)", other),
        }
    }
}

/// Resolved, immutable run parameters. Shared read-only by all trials.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Lattice size; the cell has `s * s` sites.
    pub s: usize,
    /// Nearest-neighbour hopping amplitude.
    pub t: f64,
    /// Diagonal hopping amplitude.
    pub t_prime: f64,
    /// On-site interaction.
    pub u: f64,
    /// Number of independent self-consistency cycles.
    pub n_trials: usize,
    /// Density convergence tolerance, already scaled by the site count.
    pub m_prec: f64,
    /// Iteration budget per trial.
    pub max_iterations: usize,
    /// Initialization mode, validated by the engine.
    pub init: usize,
    /// Temperature of the Fermi-Dirac seed.
    pub kt: f64,
    pub plot_mode: PlotMode,
    /// Master seed; a fresh entropy seed is drawn when absent.
    pub seed: Option<u64>,
}

impl Settings {
    pub fn lattice(&self) -> Lattice {
        Lattice::new(self.s)
    }

    pub fn n_sites(&self) -> usize {
        self.s * self.s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn no_args() -> Args {
        Args::parse_from(["hubbard_mf"])
    }

    #[test]
    fn empty_config_resolves_to_builtin_defaults() {
        let settings = Config::default().resolve(&no_args()).unwrap();
        assert_eq!(settings.s, 32);
        assert_eq!(settings.t, 1.0);
        assert_eq!(settings.t_prime, 0.5);
        assert_eq!(settings.u, 1.0);
        assert_eq!(settings.n_trials, 8);
        assert_eq!(settings.max_iterations, 1000);
        assert_eq!(settings.init, 2);
        assert_eq!(settings.kt, 0.25);
        assert_eq!(settings.plot_mode, PlotMode::Everything);
        assert_eq!(settings.seed, None);
    }

    #[test]
    fn tolerance_is_scaled_by_site_count() {
        let settings = Config::default().resolve(&no_args()).unwrap();
        assert!((settings.m_prec - 1e-5 * 1024.0).abs() < 1e-12);
    }

    #[test]
    fn ratios_scale_with_t() {
        let yaml = "model:\n  size: 4\n  t: 2.0\n  t_prime_ratio: 0.25\n  u_ratio: 3.0\n";
        let config: Config = serde_yml::from_str(yaml).unwrap();
        let settings = config.resolve(&no_args()).unwrap();
        assert_eq!(settings.t_prime, 0.5);
        assert_eq!(settings.u, 6.0);
    }

    #[test]
    fn cli_overrides_file_values() {
        let yaml = "model:\n  size: 8\nscc:\n  trials: 2\n";
        let config: Config = serde_yml::from_str(yaml).unwrap();
        let args = Args::parse_from(["hubbard_mf", "--lattice-size", "6", "--trials", "5"]);
        let settings = config.resolve(&args).unwrap();
        assert_eq!(settings.s, 6);
        assert_eq!(settings.n_trials, 5);
    }

    #[test]
    fn odd_site_count_is_rejected() {
        let args = Args::parse_from(["hubbard_mf", "--lattice-size", "3"]);
        assert!(Config::default().resolve(&args).is_err());
    }

    #[test]
    fn unknown_plot_mode_is_rejected() {
        let args = Args::parse_from(["hubbard_mf", "--plot-mode", "7"]);
        assert!(Config::default().resolve(&args).is_err());
    }
}
