use clap::Parser;
use sunset_precip::cli::{run, Cli};
use sunset_precip::utils::init_logging;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_file.as_deref())?;
    run(cli)?;
    Ok(())
}
