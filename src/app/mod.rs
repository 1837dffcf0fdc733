//! Application wiring: configuration, output setup, the trial sweep and the
//! final report.

mod report;
mod runner;

pub use report::write_results_log;
pub use runner::{run_trials, trial_seeds, GroundStateSearch};

use std::fs;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use tracing::info;

use crate::config::{Args, Config, PlotMode};
use crate::io::{prepare_output_dir, setup_output};
use crate::plot;

pub struct HubbardApplication {
    args: Args,
    config: Config,
}

impl HubbardApplication {
    pub fn from_cli() -> Result<Self> {
        let args = Args::parse();
        let config = load_config(&args)?;
        Ok(Self { args, config })
    }

    pub fn run(self) -> Result<()> {
        setup_output(self.args.output.as_ref());

        info!("hubbard model in mean-field approximation");
        let settings = self.config.resolve(&self.args)?;
        info!("settings: {:?}", settings);

        let out_dir = prepare_output_dir(&settings)?;

        let best = run_trials(&settings, &out_dir)?;
        report::report_summary(best.as_ref());

        if let Some(results) = best {
            info!("writing the machine-readable record to results.log ...");
            report::write_results_log(&settings, &results, &out_dir)?;

            if settings.plot_mode != PlotMode::Never {
                info!("plotting the ground state estimate ...");
                plot::plot(&settings, &results, &out_dir, None)?;
                info!("plotting finished");
            }
        }

        Ok(())
    }
}

fn load_config(args: &Args) -> Result<Config> {
    let config = match &args.config_file {
        Some(path) => {
            let config_content = fs::read_to_string(path)
                .wrap_err_with(|| format!("unable to read configuration file: {}", path))?;
            serde_yml::from_str::<Config>(&config_content)
                .wrap_err("failed to parse configuration file")?
        }
        None => Config::default(),
    };
    Ok(config.with_defaults())
}
