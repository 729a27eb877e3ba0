//! Repository walker: lists an account's repositories, recurses through each
//! one, and turns every recognized file into an [`ImportRecord`].
//!
//! Processing is sequential. A [`FetchError`] abandons the current repository;
//! a [`crate::error::DecodeError`] or a file without any modification date
//! skips only the current file.

use crate::detector::detect_file_kind;
use crate::error::{FetchError, FileError};
use crate::extractor::extract_imports;
use crate::host::{EntryKind, RemoteEntry, RepoHost, Repository};
use crate::models::{FileKind, ImportRecord, RepoOutcome, RunSummary};

pub struct Walker<'a, H> {
    host: &'a H,
}

impl<'a, H: RepoHost> Walker<'a, H> {
    pub fn new(host: &'a H) -> Self {
        Self { host }
    }

    /// Scan every repository of `owner`.
    ///
    /// `observe` is called once per repository as soon as its outcome is known,
    /// with the total number of repositories. Only a failure to list the
    /// repositories themselves is returned as an error.
    pub async fn scan_account(
        &self,
        owner: &str,
        mut observe: impl FnMut(usize, &RepoOutcome),
    ) -> Result<RunSummary, FetchError> {
        let repos = self.host.list_repositories(owner).await?;
        let mut summary = RunSummary::default();

        for repo in &repos {
            let outcome = self.scan_repository(repo).await;
            observe(repos.len(), &outcome);
            summary.outcomes.push(outcome);
        }

        Ok(summary)
    }

    /// Scan one repository, isolating its failures from the rest of the run.
    pub async fn scan_repository(&self, repo: &Repository) -> RepoOutcome {
        let skipped = |reason: String| RepoOutcome::Skipped {
            repository: repo.name.clone(),
            reason,
        };

        let mut files = Vec::new();
        if let Err(e) = self.collect_files(repo, "", &mut files).await {
            return skipped(e.to_string());
        }

        let mut records = Vec::new();
        let mut skipped_files = Vec::new();

        for (entry, kind) in &files {
            match self.scan_file(repo, entry, *kind).await {
                Ok(record) => records.push(record),
                Err(FileError::Fetch(e)) => return skipped(e.to_string()),
                Err(e) => skipped_files.push((entry.path.clone(), e.to_string())),
            }
        }

        RepoOutcome::Scanned {
            repository: repo.name.clone(),
            records,
            skipped_files,
        }
    }

    /// Depth-first listing of recognized files, in directory-listing order.
    async fn collect_files(
        &self,
        repo: &Repository,
        path: &str,
        out: &mut Vec<(RemoteEntry, FileKind)>,
    ) -> Result<(), FetchError> {
        for entry in self.host.list_directory(repo, path).await? {
            match entry.kind {
                EntryKind::Dir => Box::pin(self.collect_files(repo, &entry.path, out)).await?,
                EntryKind::File => {
                    if let Some(kind) = detect_file_kind(&entry.name) {
                        out.push((entry, kind));
                    }
                }
                EntryKind::Other => {}
            }
        }
        Ok(())
    }

    /// Fetch, extract, and date a single file.
    pub async fn scan_file(
        &self,
        repo: &Repository,
        entry: &RemoteEntry,
        kind: FileKind,
    ) -> Result<ImportRecord, FileError> {
        let content = self.host.fetch_content(entry).await?;
        let imports = extract_imports(kind, &entry.name, &content)?;

        let span = self.host.commit_span(repo, &entry.path).await?;
        let last_modified = self
            .host
            .last_modified(repo, &entry.path)
            .await?
            .or(span.last)
            .ok_or_else(|| FileError::MissingTimestamp {
                path: entry.path.clone(),
            })?;

        Ok(ImportRecord {
            repository: repo.name.clone(),
            file: entry.name.clone(),
            first_seen: span.first,
            last_modified,
            imports,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::{DateTime, TimeZone, Utc};

    use super::*;
    use crate::host::CommitSpan;

    /// In-memory host: directories keyed by `repo:path`, contents by download URL.
    #[derive(Default)]
    struct FakeHost {
        repos: Vec<&'static str>,
        dirs: HashMap<String, Vec<RemoteEntry>>,
        contents: HashMap<String, String>,
        commits: HashMap<String, CommitSpan>,
        failing_repos: Vec<&'static str>,
        /// Paths whose metadata carries no `Last-Modified` date.
        undated: Vec<&'static str>,
    }

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 1, day, 0, 0, 0).unwrap()
    }

    fn file(repo: &str, path: &str) -> RemoteEntry {
        RemoteEntry {
            kind: EntryKind::File,
            name: path.rsplit('/').next().unwrap().to_string(),
            path: path.to_string(),
            download_url: Some(format!("raw://{repo}/{path}")),
        }
    }

    fn dir(path: &str) -> RemoteEntry {
        RemoteEntry {
            kind: EntryKind::Dir,
            name: path.rsplit('/').next().unwrap().to_string(),
            path: path.to_string(),
            download_url: None,
        }
    }

    impl FakeHost {
        fn with_file(mut self, repo: &str, dir_path: &str, path: &str, content: &str) -> Self {
            let entry = file(repo, path);
            self.contents
                .insert(entry.download_url.clone().unwrap(), content.to_string());
            self.dirs
                .entry(format!("{repo}:{dir_path}"))
                .or_default()
                .push(entry);
            self
        }

        fn with_dir(mut self, repo: &str, parent: &str, path: &str) -> Self {
            self.dirs
                .entry(format!("{repo}:{parent}"))
                .or_default()
                .push(dir(path));
            self.dirs.entry(format!("{repo}:{path}")).or_default();
            self
        }
    }

    fn unavailable(url: &str) -> FetchError {
        FetchError::Malformed {
            url: url.to_string(),
            message: "unavailable".to_string(),
        }
    }

    impl RepoHost for FakeHost {
        async fn list_repositories(&self, owner: &str) -> Result<Vec<Repository>, FetchError> {
            Ok(self
                .repos
                .iter()
                .map(|name| Repository {
                    owner: owner.to_string(),
                    name: name.to_string(),
                })
                .collect())
        }

        async fn list_directory(
            &self,
            repo: &Repository,
            path: &str,
        ) -> Result<Vec<RemoteEntry>, FetchError> {
            if self.failing_repos.contains(&repo.name.as_str()) {
                return Err(unavailable(&repo.name));
            }
            Ok(self
                .dirs
                .get(&format!("{}:{}", repo.name, path))
                .cloned()
                .unwrap_or_default())
        }

        async fn fetch_content(&self, entry: &RemoteEntry) -> Result<String, FetchError> {
            let url = entry.download_url.clone().unwrap_or_default();
            self.contents
                .get(&url)
                .cloned()
                .ok_or_else(|| unavailable(&url))
        }

        async fn commit_span(
            &self,
            repo: &Repository,
            path: &str,
        ) -> Result<CommitSpan, FetchError> {
            Ok(self
                .commits
                .get(&format!("{}:{}", repo.name, path))
                .copied()
                .unwrap_or_default())
        }

        async fn last_modified(
            &self,
            _repo: &Repository,
            path: &str,
        ) -> Result<Option<DateTime<Utc>>, FetchError> {
            if self.undated.contains(&path) {
                return Ok(None);
            }
            Ok(Some(at(20)))
        }
    }

    #[tokio::test]
    async fn test_recurses_and_filters_files() {
        let host = FakeHost {
            repos: vec!["ml"],
            ..Default::default()
        }
        .with_file("ml", "", "README.md", "import nothing")
        .with_file("ml", "", "requirements.txt", "torch==2.1\n")
        .with_dir("ml", "", "src")
        .with_file("ml", "src", "src/train.py", "import numpy\nfrom torch import nn\n");

        let summary = Walker::new(&host)
            .scan_account("octo", |_, _| {})
            .await
            .unwrap();

        let records: Vec<_> = summary.records().collect();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].file, "requirements.txt");
        assert_eq!(records[0].imports, vec!["import torch"]);
        assert_eq!(records[1].file, "train.py");
        assert_eq!(records[1].imports, vec!["import numpy", "from torch import nn"]);
        assert_eq!(records[1].last_modified, at(20));
    }

    #[tokio::test]
    async fn test_zero_commits_leaves_first_seen_empty() {
        let mut host = FakeHost {
            repos: vec!["app"],
            ..Default::default()
        }
        .with_file("app", "", "old.py", "import os\n")
        .with_file("app", "", "new.py", "import re\n");
        host.commits.insert(
            "app:new.py".into(),
            CommitSpan {
                first: Some(at(2)),
                last: Some(at(9)),
            },
        );

        let summary = Walker::new(&host).scan_account("octo", |_, _| {}).await.unwrap();
        let records: Vec<_> = summary.records().collect();
        assert_eq!(records[0].first_seen, None);
        assert_eq!(records[1].first_seen, Some(at(2)));
    }

    #[tokio::test]
    async fn test_undated_file_skips_only_that_file() {
        let mut host = FakeHost {
            repos: vec!["app"],
            undated: vec!["renamed.py", "moved.py"],
            ..Default::default()
        }
        .with_file("app", "", "a.py", "import attrs\n")
        .with_file("app", "", "renamed.py", "import click\n")
        .with_file("app", "", "moved.py", "import rich\n");
        host.commits.insert(
            "app:moved.py".into(),
            CommitSpan {
                first: Some(at(3)),
                last: Some(at(7)),
            },
        );

        let summary = Walker::new(&host).scan_account("octo", |_, _| {}).await.unwrap();
        match &summary.outcomes[0] {
            RepoOutcome::Scanned {
                records,
                skipped_files,
                ..
            } => {
                let files: Vec<_> = records.iter().map(|r| r.file.as_str()).collect();
                assert_eq!(files, vec!["a.py", "moved.py"]);
                // No header: the newest commit date stands in.
                assert_eq!(records[1].last_modified, at(7));
                assert_eq!(skipped_files.len(), 1);
                assert_eq!(skipped_files[0].0, "renamed.py");
                assert!(skipped_files[0].1.contains("no modification date"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(summary.skipped_repositories(), 0);
    }

    #[tokio::test]
    async fn test_failing_repository_is_isolated() {
        let host = FakeHost {
            repos: vec!["broken", "fine"],
            failing_repos: vec!["broken"],
            ..Default::default()
        }
        .with_file("fine", "", "a.py", "import yaml\n");

        let mut seen = Vec::new();
        let summary = Walker::new(&host)
            .scan_account("octo", |total, outcome| {
                seen.push((total, outcome.repository().to_string()))
            })
            .await
            .unwrap();

        assert_eq!(seen, vec![(2, "broken".to_string()), (2, "fine".to_string())]);
        assert!(matches!(summary.outcomes[0], RepoOutcome::Skipped { .. }));
        assert_eq!(summary.skipped_repositories(), 1);
        assert_eq!(summary.records().count(), 1);
    }

    #[tokio::test]
    async fn test_bad_notebook_skips_only_that_file() {
        let host = FakeHost {
            repos: vec!["nb"],
            ..Default::default()
        }
        .with_file("nb", "", "broken.ipynb", "{ not json")
        .with_file("nb", "", "ok.py", "import scipy\n");

        let summary = Walker::new(&host).scan_account("octo", |_, _| {}).await.unwrap();
        match &summary.outcomes[0] {
            RepoOutcome::Scanned {
                records,
                skipped_files,
                ..
            } => {
                assert_eq!(records.len(), 1);
                assert_eq!(skipped_files.len(), 1);
                assert_eq!(skipped_files[0].0, "broken.ipynb");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_failure_abandons_repository() {
        let mut host = FakeHost {
            repos: vec!["partial"],
            ..Default::default()
        }
        .with_file("partial", "", "a.py", "import os\n");
        host.dirs
            .get_mut("partial:")
            .unwrap()
            .push(file("partial", "gone.py"));

        let summary = Walker::new(&host).scan_account("octo", |_, _| {}).await.unwrap();
        assert!(matches!(
            &summary.outcomes[0],
            RepoOutcome::Skipped { reason, .. } if reason.contains("gone.py")
        ));
    }
}
