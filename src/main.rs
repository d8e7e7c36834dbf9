use clap::Parser;
use switchyard::cli::{run_cli, Cli};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    switchyard::logging::init_logging(&cli.log_level)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_cli(cli, &mut out)
}
