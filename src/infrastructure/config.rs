// JSON configuration file, layered between built-in defaults and flags

use crate::application::{RunSettings, MAX_PRECISION};
use crate::domain::SolverBackend;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("precision {value} exceeds the maximum of {} decimal places", MAX_PRECISION)]
    PrecisionOutOfRange { value: u16 },
}

/// Every field is optional; missing ones keep their current value.
///
/// Decimal fields accept JSON strings (`"0.85"`) or numbers; strings are
/// read exactly.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub outcome_probabilities: Option<Vec<Decimal>>,
    pub reset_cost: Option<Decimal>,
    pub attempt_cost: Option<Decimal>,
    pub total_rolls: Option<u32>,
    pub total_deficit: Option<u32>,
    pub backend: Option<SolverBackend>,
    pub out_dir: Option<PathBuf>,
    pub precision: Option<u16>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self, ConfigFileError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigFileError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_str(&text).map_err(|source| ConfigFileError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    pub fn apply(self, settings: &mut RunSettings) -> Result<(), ConfigFileError> {
        if let Some(value) = self.precision.filter(|p| *p > MAX_PRECISION) {
            return Err(ConfigFileError::PrecisionOutOfRange { value });
        }

        let params = &mut settings.parameters;
        if let Some(probabilities) = self.outcome_probabilities {
            params.outcome_probabilities = probabilities;
        }
        if let Some(cost) = self.reset_cost {
            params.reset_cost = cost;
        }
        if let Some(cost) = self.attempt_cost {
            params.attempt_cost = cost;
        }
        if let Some(rolls) = self.total_rolls {
            params.total_rolls = rolls;
        }
        if let Some(deficit) = self.total_deficit {
            params.total_deficit = deficit;
        }
        if let Some(backend) = self.backend {
            settings.backend = backend;
        }
        if let Some(dir) = self.out_dir {
            settings.out_dir = dir;
        }
        if let Some(precision) = self.precision {
            settings.precision = usize::from(precision);
        }
        Ok(())
    }
}
