use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Timestamp layout used in the tabular export, e.g. `Tue, 05 Mar 2024 14:02:11 GMT`.
pub const EXPORT_TIME_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// The three file kinds the walker picks up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// `*.py`
    Script,
    /// `*.ipynb`
    Notebook,
    /// `requirements.txt`
    DependencyList,
}

impl std::fmt::Display for FileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileKind::Script => write!(f, "script"),
            FileKind::Notebook => write!(f, "notebook"),
            FileKind::DependencyList => write!(f, "dependency list"),
        }
    }
}

/// One scanned file and the raw import statements found in it.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportRecord {
    pub repository: String,
    pub file: String,
    /// Authorship date of the oldest commit touching the path; `None` when the
    /// path has no commits.
    pub first_seen: Option<DateTime<Utc>>,
    pub last_modified: DateTime<Utc>,
    pub imports: Vec<String>,
}

/// One (file, library) pair; a row of the tabular export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryUsageRecord {
    #[serde(rename = "project")]
    pub repository: String,
    pub file: String,
    #[serde(rename = "date_start", with = "export_time::option")]
    pub first_seen: Option<DateTime<Utc>>,
    #[serde(rename = "date_end", with = "export_time")]
    pub last_modified: DateTime<Utc>,
    pub library: String,
}

/// Result of scanning one repository.
#[derive(Debug)]
pub enum RepoOutcome {
    Scanned {
        repository: String,
        records: Vec<ImportRecord>,
        /// `(path, reason)` for files that could not be decoded.
        skipped_files: Vec<(String, String)>,
    },
    Skipped {
        repository: String,
        reason: String,
    },
}

impl RepoOutcome {
    pub fn repository(&self) -> &str {
        match self {
            RepoOutcome::Scanned { repository, .. } | RepoOutcome::Skipped { repository, .. } => {
                repository
            }
        }
    }
}

/// Everything one scan produced, in repository order.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub outcomes: Vec<RepoOutcome>,
}

impl RunSummary {
    pub fn records(&self) -> impl Iterator<Item = &ImportRecord> {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                RepoOutcome::Scanned { records, .. } => Some(records),
                RepoOutcome::Skipped { .. } => None,
            })
            .flatten()
    }

    pub fn skipped_repositories(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, RepoOutcome::Skipped { .. }))
            .count()
    }
}

/// Format a timestamp the way the export stores it.
pub fn format_export_time(at: &DateTime<Utc>) -> String {
    at.format(EXPORT_TIME_FORMAT).to_string()
}

/// Parse an export timestamp.
///
/// Besides [`EXPORT_TIME_FORMAT`], accepts `YYYY-MM-DD HH:MM:SS` (older exports
/// written through a dataframe) and RFC 3339.
pub fn parse_export_time(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, EXPORT_TIME_FORMAT) {
        return Some(naive.and_utc());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

mod export_time {
    use chrono::{DateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(at: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::format_export_time(at))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_export_time(&raw)
            .ok_or_else(|| de::Error::custom(format!("invalid timestamp {raw:?}")))
    }

    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{de, Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            at: &Option<DateTime<Utc>>,
            s: S,
        ) -> Result<S::Ok, S::Error> {
            match at {
                Some(at) => s.serialize_str(&super::super::format_export_time(at)),
                None => s.serialize_str(""),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            d: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            let raw: Option<String> = Option::deserialize(d)?;
            match raw.as_deref().map(str::trim) {
                None | Some("") => Ok(None),
                Some(value) => super::super::parse_export_time(value)
                    .map(Some)
                    .ok_or_else(|| de::Error::custom(format!("invalid timestamp {value:?}"))),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_export_time_format() {
        let at = Utc.with_ymd_and_hms(2024, 3, 5, 14, 2, 11).unwrap();
        assert_eq!(format_export_time(&at), "Tue, 05 Mar 2024 14:02:11 GMT");
        assert_eq!(parse_export_time("Tue, 05 Mar 2024 14:02:11 GMT"), Some(at));
    }

    #[test]
    fn test_parse_legacy_time() {
        let at = Utc.with_ymd_and_hms(2021, 11, 30, 8, 0, 0).unwrap();
        assert_eq!(parse_export_time("2021-11-30 08:00:00"), Some(at));
        assert_eq!(parse_export_time("yesterday"), None);
    }

    #[test]
    fn test_summary_skips_failed_repositories() {
        let at = Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap();
        let summary = RunSummary {
            outcomes: vec![
                RepoOutcome::Skipped {
                    repository: "broken".into(),
                    reason: "HTTP 500".into(),
                },
                RepoOutcome::Scanned {
                    repository: "ok".into(),
                    records: vec![ImportRecord {
                        repository: "ok".into(),
                        file: "main.py".into(),
                        first_seen: None,
                        last_modified: at,
                        imports: vec!["import os".into()],
                    }],
                    skipped_files: Vec::new(),
                },
            ],
        };
        assert_eq!(summary.records().count(), 1);
        assert_eq!(summary.skipped_repositories(), 1);
        assert_eq!(summary.outcomes[0].repository(), "broken");
    }
}
