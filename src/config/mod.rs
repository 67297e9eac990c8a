mod cli_args;
mod file_config;

pub use cli_args::ConfigArgs;
pub use file_config::FileConfig;

use crate::analysis::{AnalysisSettings, DEFAULT_FREEZE_THRESHOLD_DEG};
use crate::landmarks::BodySide;
use crate::server::RequestsLoggingLevel;
use crate::store::StoreBackend;
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_MAX_FRAMES_PER_REQUEST: usize = 18_000;

/// CLI arguments that can be used for config resolution.
/// TOML values override these where present.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub data_dir: Option<PathBuf>,
    pub store_backend: StoreBackend,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub body_side: BodySide,
    pub freeze_threshold_deg: f64,
    pub max_frames_per_request: usize,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            store_backend: StoreBackend::default(),
            port: DEFAULT_PORT,
            logging_level: RequestsLoggingLevel::default(),
            body_side: BodySide::default(),
            freeze_threshold_deg: DEFAULT_FREEZE_THRESHOLD_DEG,
            max_frames_per_request: DEFAULT_MAX_FRAMES_PER_REQUEST,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub store_backend: StoreBackend,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub body_side: BodySide,
    pub freeze_threshold_deg: f64,
    pub max_frames_per_request: usize,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let data_dir = file
            .data_dir
            .map(PathBuf::from)
            .or_else(|| cli.data_dir.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("data_dir must be specified via --data-dir or in config file")
            })?;

        if !data_dir.exists() {
            bail!("Data directory does not exist: {:?}", data_dir);
        }
        if !data_dir.is_dir() {
            bail!("data_dir is not a directory: {:?}", data_dir);
        }

        let store_backend = match file.store_backend {
            Some(value) => parse_value_enum::<StoreBackend>("store_backend", &value)?,
            None => cli.store_backend,
        };

        let port = file.port.unwrap_or(cli.port);

        let logging_level = match file.logging_level {
            Some(value) => parse_value_enum::<RequestsLoggingLevel>("logging_level", &value)?,
            None => cli.logging_level.clone(),
        };

        let body_side = match file.body_side {
            Some(value) => parse_value_enum::<BodySide>("body_side", &value)?,
            None => cli.body_side,
        };

        let freeze_threshold_deg = file
            .freeze_threshold_deg
            .unwrap_or(cli.freeze_threshold_deg);
        if !(freeze_threshold_deg.is_finite() && (0.0..=180.0).contains(&freeze_threshold_deg)) {
            bail!(
                "freeze_threshold_deg must be between 0 and 180, got {}",
                freeze_threshold_deg
            );
        }

        let max_frames_per_request = file
            .max_frames_per_request
            .unwrap_or(cli.max_frames_per_request);
        if max_frames_per_request == 0 {
            bail!("max_frames_per_request must be greater than 0");
        }

        Ok(Self {
            data_dir,
            store_backend,
            port,
            logging_level,
            body_side,
            freeze_threshold_deg,
            max_frames_per_request,
        })
    }

    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join(self.store_backend.file_name())
    }

    pub fn analysis_settings(&self) -> AnalysisSettings {
        AnalysisSettings {
            side: self.body_side,
            freeze_threshold_deg: self.freeze_threshold_deg,
        }
    }
}

/// Case-insensitive parse of a TOML string through clap's ValueEnum.
fn parse_value_enum<T: ValueEnum>(key: &str, value: &str) -> Result<T> {
    match T::from_str(value, true) {
        Ok(parsed) => Ok(parsed),
        Err(_) => bail!("Invalid value for {}: {:?}", key, value),
    }
}
