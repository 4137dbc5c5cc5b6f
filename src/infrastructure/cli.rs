use super::config::{ConfigFile, ConfigFileError};
use crate::application::{RunSettings, MAX_PRECISION};
use crate::domain::SolverBackend;
use clap::Parser;
use rust_decimal::Decimal;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "grindopt")]
#[command(about = "Expected time to clear a dice-roll grind with resets.")]
#[command(
    long_about = "Builds the expected-time recurrence over (deficit, rolls remaining) states, solves it in exact\nrational arithmetic and writes the expectation grid to out/{deficit}-deficit-{rolls}-rolls.xlsx."
)]
#[command(version)]
pub struct Cli {
    /// JSON file with run parameters; flags override its values
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Probability of reducing the deficit by 0, 1, 2, ... successes per roll
    ///
    /// Example: --probabilities 0.85,0.10,0.05
    #[arg(
        short = 'p',
        long = "probabilities",
        value_delimiter = ',',
        allow_negative_numbers = true
    )]
    pub probabilities: Option<Vec<Decimal>>,

    /// Time cost of a full reset-and-restart cycle
    #[arg(long, allow_negative_numbers = true)]
    pub reset_cost: Option<Decimal>,

    /// Time cost of one roll attempt
    #[arg(long, allow_negative_numbers = true)]
    pub attempt_cost: Option<Decimal>,

    /// Rolls available before a forced reset
    #[arg(short = 'r', long)]
    pub rolls: Option<u32>,

    /// Successes required to clear the grind
    #[arg(short = 'd', long)]
    pub deficit: Option<u32>,

    /// Solver backend: exact, lp or highs
    #[arg(short = 'b', long)]
    pub backend: Option<SolverBackend>,

    /// Directory the workbook is written to
    #[arg(short = 'o', long = "out-dir", value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Decimal places in console output (at most 64)
    #[arg(long, value_parser = clap::value_parser!(u16).range(0..=MAX_PRECISION as i64))]
    pub precision: Option<u16>,

    /// Print every equation before solving
    #[arg(long)]
    pub show_equations: bool,

    /// Only log warnings and errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Defaults, then the config file, then flags
    pub fn into_settings(self) -> Result<RunSettings, ConfigFileError> {
        let mut settings = RunSettings::default();
        if let Some(path) = &self.config {
            ConfigFile::load(path)?.apply(&mut settings)?;
        }
        settings.show_equations |= self.show_equations;
        self.overrides().apply(&mut settings)?;
        Ok(settings)
    }

    fn overrides(self) -> ConfigFile {
        ConfigFile {
            outcome_probabilities: self.probabilities,
            reset_cost: self.reset_cost,
            attempt_cost: self.attempt_cost,
            total_rolls: self.rolls,
            total_deficit: self.deficit,
            backend: self.backend,
            out_dir: self.out_dir,
            precision: self.precision,
        }
    }

    pub fn log_filter(&self) -> &'static str {
        if self.quiet {
            "grindopt=warn"
        } else {
            "grindopt=info"
        }
    }
}
