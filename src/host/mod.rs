//! Access to the source-control hosting account being scanned.
//!
//! [`RepoHost`] is the seam the walker talks to; [`github`] implements it over
//! the GitHub REST API. Every method returns [`FetchError`] on transport or API
//! failure.

use chrono::{DateTime, Utc};

use crate::error::FetchError;

pub mod github;

/// A repository owned by the scanned account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    pub owner: String,
    pub name: String,
}

/// Kind of a directory listing entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
    Other,
}

/// One entry of a repository directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEntry {
    pub kind: EntryKind,
    pub name: String,
    /// Path relative to the repository root.
    pub path: String,
    pub download_url: Option<String>,
}

/// Authorship dates of the oldest and newest commits touching a path.
///
/// Both are `None` when the path has no commits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitSpan {
    pub first: Option<DateTime<Utc>>,
    pub last: Option<DateTime<Utc>>,
}

#[allow(async_fn_in_trait)]
pub trait RepoHost {
    async fn list_repositories(&self, owner: &str) -> Result<Vec<Repository>, FetchError>;

    /// List one directory; `path` is `""` for the repository root.
    async fn list_directory(
        &self,
        repo: &Repository,
        path: &str,
    ) -> Result<Vec<RemoteEntry>, FetchError>;

    /// Download the raw text of a file entry.
    async fn fetch_content(&self, entry: &RemoteEntry) -> Result<String, FetchError>;

    async fn commit_span(&self, repo: &Repository, path: &str) -> Result<CommitSpan, FetchError>;

    /// Last-modified date from the file's current metadata, when the host provides one.
    async fn last_modified(
        &self,
        repo: &Repository,
        path: &str,
    ) -> Result<Option<DateTime<Utc>>, FetchError>;
}
