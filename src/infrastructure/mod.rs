// Infrastructure: command line, configuration file, logging

pub mod cli;
pub mod config;
pub mod logging;

pub use cli::Cli;
pub use config::{ConfigFile, ConfigFileError};
