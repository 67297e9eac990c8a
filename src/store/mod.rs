mod csv_store;
mod schema;
mod sqlite_store;
mod trait_def;

pub use csv_store::{write_csv, CsvResultStore, CSV_HEADER};
pub use sqlite_store::SqliteResultStore;
pub use trait_def::ResultStore;

#[cfg(any(test, feature = "mock"))]
pub use trait_def::MockResultStore;

use anyhow::Result;
use serde::Deserialize;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

pub const CSV_STORE_FILE_NAME: &str = "results.csv";
pub const SQLITE_STORE_FILE_NAME: &str = "results.db";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Csv,
    Sqlite,
}

impl std::fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreBackend::Csv => write!(f, "csv"),
            StoreBackend::Sqlite => write!(f, "sqlite"),
        }
    }
}

impl StoreBackend {
    pub fn file_name(self) -> &'static str {
        match self {
            StoreBackend::Csv => CSV_STORE_FILE_NAME,
            StoreBackend::Sqlite => SQLITE_STORE_FILE_NAME,
        }
    }
}

/// Opens the store for `backend` inside `data_dir`.
pub fn open_store(backend: StoreBackend, data_dir: &Path) -> Result<Arc<dyn ResultStore>> {
    let path = data_dir.join(backend.file_name());
    info!("Opening {} result store at {:?}", backend, path);
    let store: Arc<dyn ResultStore> = match backend {
        StoreBackend::Csv => Arc::new(CsvResultStore::new(path)),
        StoreBackend::Sqlite => Arc::new(SqliteResultStore::new(path)?),
    };
    Ok(store)
}

/// Writes every stored summary to `writer` in the CSV layout and returns
/// how many were written.
pub fn export_csv<W: Write>(store: &dyn ResultStore, writer: W) -> Result<usize> {
    let summaries = store.list_all()?;
    write_csv(&summaries, writer)?;
    Ok(summaries.len())
}
