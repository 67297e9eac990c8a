use super::{AppConfig, CliConfig, FileConfig, DEFAULT_MAX_FRAMES_PER_REQUEST, DEFAULT_PORT};
use crate::analysis::DEFAULT_FREEZE_THRESHOLD_DEG;
use crate::landmarks::BodySide;
use crate::server::RequestsLoggingLevel;
use crate::store::StoreBackend;
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

/// Arguments shared by every binary that opens the result store.
#[derive(clap::Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Path to a TOML config file. Its values override command line flags.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Directory holding the result store.
    #[clap(long, value_parser = parse_path)]
    pub data_dir: Option<PathBuf>,

    /// Result store backend.
    #[clap(long, default_value_t = StoreBackend::default())]
    pub store_backend: StoreBackend,

    /// The port to listen on.
    #[clap(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Body side whose joints are measured.
    #[clap(long, default_value_t = BodySide::default())]
    pub body_side: BodySide,

    /// Angle in degrees under which a joint counts as frozen.
    #[clap(long, default_value_t = DEFAULT_FREEZE_THRESHOLD_DEG)]
    pub freeze_threshold_deg: f64,

    /// Largest landmark stream accepted in one request.
    #[clap(long, default_value_t = DEFAULT_MAX_FRAMES_PER_REQUEST)]
    pub max_frames_per_request: usize,
}

impl ConfigArgs {
    pub fn cli_config(&self) -> CliConfig {
        CliConfig {
            data_dir: self.data_dir.clone(),
            store_backend: self.store_backend,
            port: self.port,
            logging_level: self.logging_level.clone(),
            body_side: self.body_side,
            freeze_threshold_deg: self.freeze_threshold_deg,
            max_frames_per_request: self.max_frames_per_request,
        }
    }

    /// Loads the optional TOML file and resolves it against the flags.
    pub fn resolve(&self) -> Result<AppConfig> {
        let file_config = match &self.config {
            Some(path) => {
                info!("Loading config from {:?}", path);
                Some(FileConfig::load(path)?)
            }
            None => None,
        };
        AppConfig::resolve(&self.cli_config(), file_config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;
    use tempfile::TempDir;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: ConfigArgs,
    }

    #[test]
    fn flags_have_defaults() {
        let cli = TestCli::parse_from(["test"]);
        assert_eq!(cli.args.store_backend, StoreBackend::Csv);
        assert_eq!(cli.args.port, DEFAULT_PORT);
        assert_eq!(cli.args.body_side, BodySide::Right);
        assert_eq!(cli.args.logging_level, RequestsLoggingLevel::Path);
    }

    #[test]
    fn config_file_overrides_flags() {
        let data_dir = TempDir::new().unwrap();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "data_dir = {:?}\nstore_backend = \"sqlite\"\nport = 8080",
            data_dir.path().to_string_lossy()
        )
        .unwrap();

        let cli = TestCli::parse_from([
            "test",
            "--port",
            "9000",
            "--body-side",
            "left",
            "--config",
            file.path().to_str().unwrap(),
        ]);
        let config = cli.args.resolve().unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.store_backend, StoreBackend::Sqlite);
        assert_eq!(config.body_side, BodySide::Left);
    }
}
