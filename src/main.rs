use anyhow::{Context, Result};
use clap::Parser;
use grindopt::infrastructure::{logging, Cli};
use grindopt::GrindAnalysisService;

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(cli.log_filter());

    let settings = cli
        .into_settings()
        .context("failed to load configuration")?;

    let service = GrindAnalysisService::from_backend(settings.backend)?;
    tracing::info!(solver = service.solver_name(), "solver selected");

    let mut stdout = std::io::stdout().lock();
    service
        .run(&settings, &mut stdout)
        .context("expected-time analysis failed")?;

    Ok(())
}
