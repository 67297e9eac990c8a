use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    pub data_dir: Option<String>,
    pub store_backend: Option<String>,
    pub port: Option<u16>,
    pub logging_level: Option<String>,

    // Analysis settings
    pub body_side: Option<String>,
    pub freeze_threshold_deg: Option<f64>,
    pub max_frames_per_request: Option<usize>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "data_dir = \"/srv/rowing\"\nstore_backend = \"sqlite\"\nfreeze_threshold_deg = 7.5").unwrap();

        let config = FileConfig::load(file.path()).unwrap();
        assert_eq!(config.data_dir.as_deref(), Some("/srv/rowing"));
        assert_eq!(config.store_backend.as_deref(), Some("sqlite"));
        assert_eq!(config.freeze_threshold_deg, Some(7.5));
        assert_eq!(config.port, None);
    }

    #[test]
    fn reports_parse_errors_with_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = \"not a number\"").unwrap();

        let err = FileConfig::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
