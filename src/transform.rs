use crate::models::{ImportRecord, LibraryUsageRecord};

/// Flatten one file record into one usage record per import statement.
///
/// Statements without a parseable library token are dropped.
pub fn transform_record(record: &ImportRecord) -> Vec<LibraryUsageRecord> {
    record
        .imports
        .iter()
        .filter_map(|statement| extract_library_name(statement))
        .map(|library| LibraryUsageRecord {
            repository: record.repository.clone(),
            file: record.file.clone(),
            first_seen: record.first_seen,
            last_modified: record.last_modified,
            library,
        })
        .collect()
}

/// Flatten a sequence of file records, preserving order.
pub fn transform_records<'a>(
    records: impl IntoIterator<Item = &'a ImportRecord>,
) -> Vec<LibraryUsageRecord> {
    records.into_iter().flat_map(transform_record).collect()
}

/// Pull the normalized library name out of an `import x` / `from x import y` statement.
pub fn extract_library_name(statement: &str) -> Option<String> {
    let mut tokens = statement.split_whitespace();
    let token = match tokens.next()? {
        "import" | "from" => tokens.next()?,
        _ => return None,
    };
    let library = normalize_library_name(token);
    if library.is_empty() {
        None
    } else {
        Some(library)
    }
}

/// Collapse a dotted or versioned reference to its top-level name.
///
/// `pandas.core` → `pandas`, `requests[socks]` → `requests`. Idempotent.
pub fn normalize_library_name(name: &str) -> String {
    name.split('.')
        .next()
        .unwrap_or_default()
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}
