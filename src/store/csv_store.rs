//! CSV-backed result store.
//!
//! The first seven columns are a compatibility contract with tools reading
//! the file directly: timestamp, output file name, player, stroke cycle time,
//! pelvis angle, knee angle, ankle angle. The input file name trails them and
//! may be missing in files written by older versions.

use super::trait_def::ResultStore;
use crate::analysis::AnalysisSummary;
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{info, warn};

pub const CSV_HEADER: [&str; 8] = [
    "timestamp",
    "filename",
    "player",
    "stroke_cycle_time",
    "pelvis_angle",
    "knee_angle",
    "ankle_angle",
    "input_filename",
];

#[derive(Debug, Serialize, Deserialize)]
struct CsvRecord {
    timestamp: String,
    filename: String,
    player: String,
    stroke_cycle_time: f64,
    pelvis_angle: f64,
    knee_angle: f64,
    ankle_angle: f64,
    input_filename: String,
}

/// Fields per row in files written before the input file name was stored.
const LEGACY_FIELD_COUNT: usize = 7;

impl From<&AnalysisSummary> for CsvRecord {
    fn from(summary: &AnalysisSummary) -> Self {
        CsvRecord {
            timestamp: summary
                .timestamp
                .to_rfc3339_opts(SecondsFormat::Micros, true),
            filename: summary.output_id.clone(),
            player: summary.subject_label.clone(),
            stroke_cycle_time: summary.stroke_cycle_time,
            pelvis_angle: summary.pelvis_angle,
            knee_angle: summary.knee_angle,
            ankle_angle: summary.ankle_angle,
            input_filename: summary.input_id.clone(),
        }
    }
}

/// Accepts RFC 3339 and the offset-less ISO 8601 form older files carry,
/// the latter read as UTC.
fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Ok(timestamp.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .with_context(|| format!("Invalid timestamp: {}", value))?;
    Ok(naive.and_utc())
}

impl TryFrom<CsvRecord> for AnalysisSummary {
    type Error = anyhow::Error;

    fn try_from(record: CsvRecord) -> Result<Self> {
        Ok(AnalysisSummary {
            timestamp: parse_timestamp(&record.timestamp)?,
            input_id: record.input_filename,
            output_id: record.filename,
            subject_label: record.player,
            stroke_cycle_time: record.stroke_cycle_time,
            pelvis_angle: record.pelvis_angle,
            knee_angle: record.knee_angle,
            ankle_angle: record.ankle_angle,
        })
    }
}

/// Decodes a row by position, so rows appended under a legacy header keep
/// their trailing input file name.
fn decode_row(mut row: csv::StringRecord) -> Result<AnalysisSummary> {
    if row.len() == LEGACY_FIELD_COUNT {
        row.push_field("");
    }
    let record: CsvRecord = row.deserialize(None)?;
    AnalysisSummary::try_from(record)
}

/// Whether `row` is one complete record rather than the remains of an
/// interrupted append.
fn is_complete_row(row: &[u8]) -> bool {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(row);
    let mut records = reader.records();
    match (records.next(), records.next()) {
        (Some(Ok(record)), None) => decode_row(record).is_ok(),
        _ => false,
    }
}

/// Makes sure the file ends with a line break so the next append starts on
/// its own line. An unterminated final row is kept when it still decodes and
/// truncated otherwise. Returns the resulting file length.
fn terminate_last_row(file: &mut File, path: &Path) -> Result<u64> {
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(0);
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    if last[0] == b'\n' {
        return Ok(len);
    }

    let mut content = Vec::new();
    file.seek(SeekFrom::Start(0))?;
    file.read_to_end(&mut content)?;
    let keep = content
        .iter()
        .rposition(|&b| b == b'\n')
        .map_or(0, |i| i + 1);
    if keep > 0 && is_complete_row(&content[keep..]) {
        file.write_all(b"\n")?;
        return Ok(len + 1);
    }

    warn!(
        "Dropping {} bytes of an incomplete record at the end of {:?}",
        content.len() - keep,
        path
    );
    file.set_len(keep as u64)
        .with_context(|| format!("Failed to truncate result store {:?}", path))?;
    Ok(keep as u64)
}

/// Writes `summaries` to `writer` in the store's CSV layout, header first.
pub fn write_csv<W: Write>(summaries: &[AnalysisSummary], writer: W) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv_writer.write_record(CSV_HEADER)?;
    for summary in summaries {
        csv_writer.serialize(CsvRecord::from(summary))?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub struct CsvResultStore {
    path: PathBuf,
    // Serializes appends against each other and against reads.
    lock: Mutex<()>,
}

impl CsvResultStore {
    /// The file is created lazily by the first append.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn encode(summary: &AnalysisSummary, with_header: bool) -> Result<Vec<u8>> {
        let mut csv_writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        if with_header {
            csv_writer.write_record(CSV_HEADER)?;
        }
        csv_writer.serialize(CsvRecord::from(summary))?;
        csv_writer
            .into_inner()
            .map_err(|e| anyhow!("Failed to encode summary: {}", e))
    }

    /// Streams records oldest first, stopping when `visit` returns `true`.
    fn scan<F>(&self, mut visit: F) -> Result<()>
    where
        F: FnMut(AnalysisSummary) -> bool,
    {
        let mut content = String::new();
        match File::open(&self.path) {
            Ok(mut file) => {
                file.read_to_string(&mut content)
                    .with_context(|| format!("Failed to read result store {:?}", self.path))?;
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to open result store {:?}", self.path))
            }
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(content.as_bytes());
        let mut rows = reader.records().enumerate().peekable();
        while let Some((row_index, row)) = rows.next() {
            let is_last = rows.peek().is_none();
            let summary = match row.map_err(anyhow::Error::from).and_then(decode_row) {
                Ok(summary) => summary,
                Err(e) if is_last => {
                    warn!("Skipping unreadable final record in {:?}: {:#}", self.path, e);
                    break;
                }
                Err(e) => {
                    return Err(e.context(format!("Malformed result record at row {}", row_index + 1)))
                }
            };
            if visit(summary) {
                break;
            }
        }
        Ok(())
    }
}

impl ResultStore for CsvResultStore {
    fn append(&self, summary: &AnalysisSummary) -> Result<()> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| anyhow!("Result store lock poisoned"))?;

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open result store {:?}", self.path))?;
        let is_empty = terminate_last_row(&mut file, &self.path)? == 0;
        if is_empty {
            info!("Creating result store at {:?}", self.path);
        }

        // One write per record keeps concurrent appenders from interleaving rows.
        let bytes = Self::encode(summary, is_empty)?;
        file.write_all(&bytes)?;
        file.sync_all()
            .with_context(|| format!("Failed to sync result store {:?}", self.path))?;
        Ok(())
    }

    fn find_by_output_id(&self, output_id: &str) -> Result<Option<AnalysisSummary>> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| anyhow!("Result store lock poisoned"))?;
        let mut found = None;
        self.scan(|summary| {
            if summary.output_id == output_id {
                found = Some(summary);
                true
            } else {
                false
            }
        })?;
        Ok(found)
    }

    fn list_all(&self) -> Result<Vec<AnalysisSummary>> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| anyhow!("Result store lock poisoned"))?;
        let mut summaries = Vec::new();
        self.scan(|summary| {
            summaries.push(summary);
            false
        })?;
        Ok(summaries)
    }
}
