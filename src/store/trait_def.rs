//! Result store trait definition.

use crate::analysis::AnalysisSummary;
use anyhow::Result;

/// Append-only store of run summaries, keyed by output identifier.
///
/// Output identifiers are unique by convention only. Appending the same
/// identifier twice keeps both records, and lookups return the oldest one.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
pub trait ResultStore: Send + Sync {
    /// Durably appends one summary. Visible to lookups once this returns.
    fn append(&self, summary: &AnalysisSummary) -> Result<()>;

    /// Oldest summary whose output identifier equals `output_id`.
    fn find_by_output_id(&self, output_id: &str) -> Result<Option<AnalysisSummary>>;

    /// Every stored summary, oldest first.
    fn list_all(&self) -> Result<Vec<AnalysisSummary>>;
}
