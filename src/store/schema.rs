//! Database schema for results.db.

use crate::sqlite_column;
use crate::sqlite_persistence::{Column, SqlType, Table, VersionedSchema};

/// One row per appended summary. `seq` orders rows by append time.
const ANALYSIS_SUMMARIES_TABLE_V0: Table = Table {
    name: "analysis_summaries",
    columns: &[
        sqlite_column!("seq", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("timestamp", &SqlType::Text, non_null = true),
        sqlite_column!("output_id", &SqlType::Text, non_null = true),
        sqlite_column!("input_id", &SqlType::Text, non_null = true),
        sqlite_column!("subject_label", &SqlType::Text, non_null = true),
        sqlite_column!("stroke_cycle_time", &SqlType::Real, non_null = true),
        sqlite_column!("pelvis_angle", &SqlType::Real, non_null = true),
        sqlite_column!("knee_angle", &SqlType::Real, non_null = true),
        sqlite_column!("ankle_angle", &SqlType::Real, non_null = true),
    ],
    // Not unique: duplicate output identifiers are kept.
    indices: &[("idx_summaries_output_id", "output_id")],
};

pub const RESULTS_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[ANALYSIS_SUMMARIES_TABLE_V0],
    migration: None,
}];
