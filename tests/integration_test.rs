//! End-to-end scenarios for the concurrent ground-state search.

use nalgebra::{DMatrix, DVector};

use hubbard_mf::app::{run_trials, trial_seeds, GroundStateSearch};
use hubbard_mf::config::{PlotMode, Settings};
use hubbard_mf::plot;
use hubbard_mf::scc::{run_scc, SccResult, INIT_CHECKERBOARD, INIT_UNIFORM_RANDOM};

fn noninteracting_settings() -> Settings {
    Settings {
        s: 4,
        t: 1.0,
        t_prime: 0.0,
        u: 0.0,
        n_trials: 4,
        m_prec: 1e-4,
        max_iterations: 500,
        init: INIT_UNIFORM_RANDOM,
        kt: 0.25,
        plot_mode: PlotMode::Never,
        seed: Some(7),
    }
}

#[test]
fn checkerboard_sweep_finds_the_band_energy() {
    let settings = Settings {
        init: INIT_CHECKERBOARD,
        m_prec: 0.8,
        max_iterations: 10,
        ..noninteracting_settings()
    };
    let dir = tempfile::tempdir().unwrap();

    let best = run_trials(&settings, dir.path()).unwrap();
    let best = best.expect("every checkerboard trial converges at U = 0");

    assert!(best.converged);
    assert_eq!(best.iterations, 1);
    assert!((best.energy + 24.0).abs() < 1e-8);
    assert!((best.filling - 0.5).abs() < 1e-12);
    assert!(best.m_z.abs() < 1e-12);
}

#[test]
fn single_trial_sweep_matches_a_direct_engine_call() {
    let settings = Settings {
        n_trials: 1,
        seed: Some(42),
        ..noninteracting_settings()
    };
    let dir = tempfile::tempdir().unwrap();

    let seeds = trial_seeds(settings.seed, 1);
    let direct = run_scc(&settings, 0, seeds[0]).unwrap();
    assert!(direct.converged);

    let best = run_trials(&settings, dir.path()).unwrap().unwrap();
    assert_eq!(best.energy, direct.energy);
    assert_eq!(best.iterations, direct.iterations);
    assert_eq!(best.n_up, direct.n_up);
    assert_eq!(best.n_down, direct.n_down);
}

#[test]
fn fatal_initialization_aborts_the_sweep() {
    let settings = Settings {
        init: 9,
        n_trials: 3,
        ..noninteracting_settings()
    };
    let dir = tempfile::tempdir().unwrap();

    assert!(run_trials(&settings, dir.path()).is_err());
}

#[test]
fn unconverged_trials_yield_no_candidate() {
    let settings = Settings {
        u: 8.0,
        m_prec: 1e-10,
        max_iterations: 1,
        n_trials: 3,
        ..noninteracting_settings()
    };
    let dir = tempfile::tempdir().unwrap();

    let best = run_trials(&settings, dir.path()).unwrap();
    assert!(best.is_none());
}

#[test]
fn best_candidate_selection_keeps_the_lowest_energy() {
    let search = GroundStateSearch::new();
    assert!(search.propose(stub_result(1.0)));
    assert!(search.propose(stub_result(-2.0)));
    assert!(!search.propose(stub_result(0.0)));

    let best = search.into_best().unwrap();
    assert_eq!(best.energy, -2.0);
}

#[test]
fn plotting_writes_the_site_occupations() {
    let settings = Settings {
        init: INIT_CHECKERBOARD,
        m_prec: 0.8,
        max_iterations: 10,
        ..noninteracting_settings()
    };
    let results = run_scc(&settings, 0, 1).unwrap();
    let dir = tempfile::tempdir().unwrap();

    plot::plot(&settings, &results, dir.path(), None).unwrap();
    let n_log = std::fs::read_to_string(dir.path().join("n.log")).unwrap();
    assert_eq!(n_log.lines().count(), settings.n_sites());
    assert!(dir.path().join("plot.gnu").exists());

    // per-trial results land in their own subdirectory
    plot::plot(&settings, &results, dir.path(), Some(3)).unwrap();
    assert!(dir.path().join("3").join("n.log").exists());
}

fn stub_result(energy: f64) -> SccResult {
    SccResult {
        converged: true,
        iterations: 1,
        delta_n_up: 0.0,
        delta_n_down: 0.0,
        energy,
        gap: 0.0,
        m_z: 0.0,
        filling: 0.5,
        n_up: DVector::zeros(4),
        n_down: DVector::zeros(4),
        epsilon_up: DVector::zeros(4),
        epsilon_down: DVector::zeros(4),
        q_up: DMatrix::zeros(4, 4),
        q_down: DMatrix::zeros(4, 4),
    }
}
