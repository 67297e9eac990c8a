//! SQLite-backed result store.

use super::schema::RESULTS_VERSIONED_SCHEMAS;
use super::trait_def::ResultStore;
use crate::analysis::AnalysisSummary;
use crate::sqlite_persistence::BASE_DB_VERSION;
use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

const SELECT_COLUMNS: &str = "timestamp, input_id, output_id, subject_label, \
     stroke_cycle_time, pelvis_angle, knee_angle, ankle_angle";

pub struct SqliteResultStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteResultStore {
    /// Opens an existing database or creates a new one with the current schema.
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = if db_path.as_ref().exists() {
            Connection::open(&db_path)?
        } else {
            let conn = Connection::open(&db_path)?;
            RESULTS_VERSIONED_SCHEMAS
                .last()
                .context("No schemas defined")?
                .create(&conn)?;
            info!("Created new results database at {:?}", db_path.as_ref());
            conn
        };

        let db_version = conn
            .query_row("PRAGMA user_version;", [], |row| row.get::<usize, i64>(0))
            .context("Failed to read database version")?
            - BASE_DB_VERSION as i64;

        if db_version < 0 {
            bail!(
                "Results database version {} is too old, does not contain base db version {}",
                db_version,
                BASE_DB_VERSION
            );
        }
        let version = db_version as usize;

        let schema_count = RESULTS_VERSIONED_SCHEMAS.len();
        if version >= schema_count {
            bail!(
                "Results database version {} is too new (max supported: {})",
                version,
                schema_count - 1
            );
        }

        RESULTS_VERSIONED_SCHEMAS
            .get(version)
            .context("Failed to get schema")?
            .validate(&conn)?;

        Self::migrate_if_needed(&conn, version)?;

        Ok(SqliteResultStore {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    #[cfg(test)]
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        RESULTS_VERSIONED_SCHEMAS
            .last()
            .context("No schemas defined")?
            .create(&conn)?;
        Ok(SqliteResultStore {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn migrate_if_needed(conn: &Connection, current_version: usize) -> Result<()> {
        let target_version = RESULTS_VERSIONED_SCHEMAS.len() - 1;
        if current_version >= target_version {
            return Ok(());
        }

        info!(
            "Migrating results database from version {} to {}",
            current_version, target_version
        );
        for schema in RESULTS_VERSIONED_SCHEMAS.iter().skip(current_version + 1) {
            if let Some(migration_fn) = schema.migration {
                migration_fn(conn)?;
            }
        }
        conn.execute(
            &format!("PRAGMA user_version = {}", BASE_DB_VERSION + target_version),
            [],
        )?;
        Ok(())
    }

    fn connection(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("Results database lock poisoned"))
    }

    fn row_to_summary(row: &rusqlite::Row) -> rusqlite::Result<(String, AnalysisSummary)> {
        let timestamp: String = row.get("timestamp")?;
        Ok((
            timestamp,
            AnalysisSummary {
                timestamp: DateTime::<Utc>::MIN_UTC,
                input_id: row.get("input_id")?,
                output_id: row.get("output_id")?,
                subject_label: row.get("subject_label")?,
                stroke_cycle_time: row.get("stroke_cycle_time")?,
                pelvis_angle: row.get("pelvis_angle")?,
                knee_angle: row.get("knee_angle")?,
                ankle_angle: row.get("ankle_angle")?,
            },
        ))
    }

    fn with_timestamp((timestamp, mut summary): (String, AnalysisSummary)) -> Result<AnalysisSummary> {
        summary.timestamp = DateTime::parse_from_rfc3339(&timestamp)
            .with_context(|| format!("Invalid stored timestamp: {}", timestamp))?
            .with_timezone(&Utc);
        Ok(summary)
    }
}

impl ResultStore for SqliteResultStore {
    fn append(&self, summary: &AnalysisSummary) -> Result<()> {
        let conn = self.connection()?;
        conn.execute(
            "INSERT INTO analysis_summaries (timestamp, output_id, input_id, subject_label, \
             stroke_cycle_time, pelvis_angle, knee_angle, ankle_angle) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                summary.timestamp.to_rfc3339_opts(SecondsFormat::Micros, true),
                summary.output_id,
                summary.input_id,
                summary.subject_label,
                summary.stroke_cycle_time,
                summary.pelvis_angle,
                summary.knee_angle,
                summary.ankle_angle,
            ],
        )
        .context("Failed to insert analysis summary")?;
        Ok(())
    }

    fn find_by_output_id(&self, output_id: &str) -> Result<Option<AnalysisSummary>> {
        let conn = self.connection()?;
        let row = conn
            .query_row(
                &format!(
                    "SELECT {} FROM analysis_summaries WHERE output_id = ?1 ORDER BY seq ASC LIMIT 1",
                    SELECT_COLUMNS
                ),
                params![output_id],
                Self::row_to_summary,
            )
            .optional()?;
        row.map(Self::with_timestamp).transpose()
    }

    fn list_all(&self) -> Result<Vec<AnalysisSummary>> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM analysis_summaries ORDER BY seq ASC",
            SELECT_COLUMNS
        ))?;
        let rows = stmt
            .query_map([], Self::row_to_summary)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(Self::with_timestamp).collect()
    }
}
