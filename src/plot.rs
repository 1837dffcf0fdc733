//! Density-map rendering for finished trials.
//!
//! Writes the per-site occupations to `n.log`, emits a gnuplot script next
//! to it and invokes gnuplot. A failing gnuplot is only a warning; failing
//! to write the files is an error.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::process::Command;

use color_eyre::eyre::{Result, WrapErr};
use tracing::warn;

use crate::config::Settings;
use crate::scc::SccResult;

/// Render the density maps of one result into `root_dir`, or into a
/// per-trial subdirectory when a trial id is given.
pub fn plot(
    settings: &Settings,
    results: &SccResult,
    root_dir: &Path,
    trial: Option<usize>,
) -> Result<()> {
    let dir = match trial {
        Some(id) => root_dir.join(id.to_string()),
        None => root_dir.to_path_buf(),
    };
    fs::create_dir_all(&dir)
        .wrap_err_with(|| format!("unable to create the plot directory {}", dir.display()))?;

    write_site_occupations(settings, results, &dir)?;
    write_gnuplot_script(settings, &dir)?;
    render(&dir);

    Ok(())
}

/// One line per site: index, position and both spin occupations.
fn write_site_occupations(settings: &Settings, results: &SccResult, dir: &Path) -> Result<()> {
    let lattice = settings.lattice();
    let path = dir.join("n.log");
    let mut n_log =
        File::create(&path).wrap_err_with(|| format!("unable to create {}", path.display()))?;

    for i in 0..lattice.n_sites() {
        writeln!(
            n_log,
            "{} {} {} {:+.16e} {:+.16e}",
            i,
            lattice.site_x(i),
            lattice.site_y(i),
            results.n_up[i],
            results.n_down[i]
        )?;
    }
    Ok(())
}

/// pm3d maps of m_z, n_up and n_down on the sheared periodic cell.
fn write_gnuplot_script(settings: &Settings, dir: &Path) -> Result<()> {
    let s = settings.s as f64;
    let path = dir.join("plot.gnu");
    let mut script =
        File::create(&path).wrap_err_with(|| format!("unable to create {}", path.display()))?;

    writeln!(script, "set terminal pngcairo size 1000,600")?;
    writeln!(script, "set size ratio 2/3")?;
    writeln!(script, "set xrange [0:{}]", 1.5 * (s - 1.0))?;
    writeln!(script, "set yrange [0:{}]", s - 1.0)?;
    writeln!(script, "set tics out")?;
    writeln!(script, "set cbtics in")?;
    writeln!(script, "set dgrid3d {},{},3", settings.s * 10, settings.s * 10)?;
    writeln!(script, "set pm3d map")?;
    writeln!(
        script,
        "set arrow from 0,0 to {},{} nohead front",
        0.5 * (s - 1.0),
        s - 1.0
    )?;
    writeln!(
        script,
        "set arrow from {},0 to {},{} nohead front",
        s - 1.0,
        1.5 * (s - 1.0),
        s - 1.0
    )?;
    writeln!(script, "set output 'm_plot.png'")?;
    writeln!(script, "set cblabel \"m_z\"")?;
    writeln!(script, "splot 'n.log' using ($2+0.5*$3):3:($4-$5) notitle")?;
    writeln!(script, "set output 'n_up_plot.png'")?;
    writeln!(script, "set cblabel \"n_up\"")?;
    writeln!(script, "splot 'n.log' using ($2+0.5*$3):3:4 notitle")?;
    writeln!(script, "set output 'n_down_plot.png'")?;
    writeln!(script, "set cblabel \"n_down\"")?;
    writeln!(script, "splot 'n.log' using ($2+0.5*$3):3:5 notitle")?;

    Ok(())
}

fn render(dir: &Path) {
    match Command::new("gnuplot")
        .arg("plot.gnu")
        .current_dir(dir)
        .status()
    {
        Ok(status) if status.success() => {}
        Ok(status) => warn!("gnuplot exited with {}", status),
        Err(e) => warn!("could not run gnuplot: {}", e),
    }
}
