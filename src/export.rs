use std::path::Path;

use anyhow::{Context, Result};

use crate::models::LibraryUsageRecord;

/// Write usage records as CSV with columns `project, file, date_start, date_end, library`.
pub fn write_usage_csv(path: &Path, records: &[LibraryUsageRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    if records.is_empty() {
        writer.write_record(["project", "file", "date_start", "date_end", "library"])?;
    }
    for record in records {
        writer.serialize(record)?;
    }

    writer
        .flush()
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Read usage records back from an export.
///
/// Columns are matched by header name, so extra columns (such as a leading
/// index column) are ignored.
pub fn read_usage_csv(path: &Path) -> Result<Vec<LibraryUsageRecord>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    reader
        .deserialize()
        .enumerate()
        .map(|(i, row)| {
            row.with_context(|| format!("{}: invalid row {}", path.display(), i + 2))
        })
        .collect()
}

/// Distinct library names in first-appearance order.
pub fn distinct_libraries(records: &[LibraryUsageRecord]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    records
        .iter()
        .filter(|r| seen.insert(r.library.as_str()))
        .map(|r| r.library.clone())
        .collect()
}
