use color_eyre::eyre::Result;

use hubbard_mf::app::HubbardApplication;

fn main() -> Result<()> {
    color_eyre::install()?;
    let app = HubbardApplication::from_cli()?;
    app.run()
}
