// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The application layer loads issues through `RecordSource`
// so it never sees CSV details. A different input format only
// needs a new implementation of this trait.

use anyhow::Result;

use crate::domain::issue::IssueRecord;

// ─── RecordSource ─────────────────────────────────────────────────────────────
/// Any component that can produce raw issue records.
///
/// Implementations:
///   - CsvIssueLoader → reads the configured text/label columns of a CSV
pub trait RecordSource {
    /// Load every record, in source order.
    fn load_all(&self) -> Result<Vec<IssueRecord>>;
}
