use std::sync::LazyLock;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, LAST_MODIFIED, LINK, USER_AGENT};
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::{CommitSpan, EntryKind, RemoteEntry, RepoHost, Repository};
use crate::error::FetchError;

const PER_PAGE: usize = 100;

static LAST_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<([^>]+)>;\s*rel="last""#).expect("valid regex"));

/// [`RepoHost`] over the GitHub REST API (v3).
pub struct GitHubClient {
    client: Client,
    api_url: String,
}

#[derive(Debug, Deserialize)]
struct ApiRepo {
    name: String,
    owner: ApiOwner,
}

#[derive(Debug, Deserialize)]
struct ApiOwner {
    login: String,
}

#[derive(Debug, Deserialize)]
struct ApiEntry {
    #[serde(rename = "type")]
    kind: String,
    name: String,
    path: String,
    download_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiCommit {
    commit: ApiCommitDetail,
}

#[derive(Debug, Deserialize)]
struct ApiCommitDetail {
    author: Option<ApiSignature>,
}

#[derive(Debug, Deserialize)]
struct ApiSignature {
    date: DateTime<Utc>,
}

impl ApiCommit {
    fn date(&self) -> Option<DateTime<Utc>> {
        self.commit.author.as_ref().map(|a| a.date)
    }
}

impl GitHubClient {
    /// Build an authenticated client. `api_url` is usually `https://api.github.com`.
    pub fn new(api_url: &str, token: &str, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("import-timeline/", env!("CARGO_PKG_VERSION"))),
        );
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        if !token.is_empty() {
            let mut auth = HeaderValue::from_str(&format!("Bearer {}", token.trim()))
                .context("Access token contains invalid characters")?;
            auth.set_sensitive(true);
            headers.insert(AUTHORIZATION, auth);
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }

    /// `<api_url>/<segments...>` with each segment percent-encoded.
    fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Result<Url, FetchError> {
        let malformed = |message: String| FetchError::Malformed {
            url: self.api_url.clone(),
            message,
        };
        let mut url = Url::parse(&self.api_url).map_err(|e| malformed(e.to_string()))?;
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| malformed("URL cannot carry a path".to_string()))?;
            path.pop_if_empty()
                .extend(segments.into_iter().filter(|s| !s.is_empty()));
        }
        Ok(url)
    }

    fn contents_url(&self, repo: &Repository, path: &str) -> Result<Url, FetchError> {
        let base = ["repos", repo.owner.as_str(), repo.name.as_str(), "contents"];
        self.endpoint(base.into_iter().chain(path.split('/')))
    }

    async fn get(&self, url: Url) -> Result<Response, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| FetchError::Http {
                url: url.to_string(),
                source,
            })?;
        check_status(response)
    }

    async fn json<T: DeserializeOwned>(response: Response) -> Result<T, FetchError> {
        let url = response.url().to_string();
        response
            .json::<T>()
            .await
            .map_err(|source| FetchError::Http { url, source })
    }
}

fn check_status(response: Response) -> Result<Response, FetchError> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(FetchError::Status {
            url: response.url().to_string(),
            status: response.status(),
        })
    }
}

/// Page to request after `page`, or `None` once a short page marks the end.
fn next_page(page: usize, batch_len: usize) -> Option<usize> {
    (batch_len >= PER_PAGE).then_some(page + 1)
}

/// Commit span from the newest-first first page and, when the history spans
/// several pages, the `rel="last"` page holding the oldest commits.
fn span_from_pages(newest_first: &[ApiCommit], oldest_page: Option<&[ApiCommit]>) -> CommitSpan {
    let last = newest_first.first().and_then(ApiCommit::date);
    let first = oldest_page
        .unwrap_or(newest_first)
        .last()
        .and_then(ApiCommit::date);
    CommitSpan { first, last }
}

/// URL of the `rel="last"` page in a `Link` header, if present.
fn parse_last_link(header: &str) -> Option<String> {
    LAST_LINK_RE
        .captures(header)
        .map(|caps| caps[1].to_string())
}

impl RepoHost for GitHubClient {
    async fn list_repositories(&self, owner: &str) -> Result<Vec<Repository>, FetchError> {
        let mut repos = Vec::new();
        let mut page = 1usize;

        loop {
            let mut url = self.endpoint(["users", owner, "repos"])?;
            url.query_pairs_mut()
                .append_pair("per_page", &PER_PAGE.to_string())
                .append_pair("page", &page.to_string());

            let batch: Vec<ApiRepo> = Self::json(self.get(url).await?).await?;
            let next = next_page(page, batch.len());
            repos.extend(batch.into_iter().map(|r| Repository {
                owner: r.owner.login,
                name: r.name,
            }));

            match next {
                Some(n) => page = n,
                None => break,
            }
        }

        Ok(repos)
    }

    async fn list_directory(
        &self,
        repo: &Repository,
        path: &str,
    ) -> Result<Vec<RemoteEntry>, FetchError> {
        let url = self.contents_url(repo, path)?;
        let entries: Vec<ApiEntry> = Self::json(self.get(url).await?).await?;

        Ok(entries
            .into_iter()
            .map(|e| RemoteEntry {
                kind: match e.kind.as_str() {
                    "file" => EntryKind::File,
                    "dir" => EntryKind::Dir,
                    _ => EntryKind::Other,
                },
                name: e.name,
                path: e.path,
                download_url: e.download_url,
            })
            .collect())
    }

    async fn fetch_content(&self, entry: &RemoteEntry) -> Result<String, FetchError> {
        let raw = entry
            .download_url
            .as_deref()
            .ok_or_else(|| FetchError::MissingDownloadUrl {
                path: entry.path.clone(),
            })?;
        let url = Url::parse(raw).map_err(|e| FetchError::Malformed {
            url: raw.to_string(),
            message: e.to_string(),
        })?;

        let response = self.get(url).await?;
        response.text().await.map_err(|source| FetchError::Http {
            url: raw.to_string(),
            source,
        })
    }

    async fn commit_span(&self, repo: &Repository, path: &str) -> Result<CommitSpan, FetchError> {
        let mut url = self.endpoint(["repos", repo.owner.as_str(), repo.name.as_str(), "commits"])?;
        url.query_pairs_mut()
            .append_pair("path", path)
            .append_pair("per_page", &PER_PAGE.to_string());

        let response = self.get(url).await?;
        let last_page = response
            .headers()
            .get(LINK)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_last_link);
        let newest_first: Vec<ApiCommit> = Self::json(response).await?;

        let oldest_page: Option<Vec<ApiCommit>> = match last_page {
            Some(raw) => {
                let url = Url::parse(&raw).map_err(|e| FetchError::Malformed {
                    url: raw.clone(),
                    message: e.to_string(),
                })?;
                Some(Self::json(self.get(url).await?).await?)
            }
            None => None,
        };

        Ok(span_from_pages(&newest_first, oldest_page.as_deref()))
    }

    async fn last_modified(
        &self,
        repo: &Repository,
        path: &str,
    ) -> Result<Option<DateTime<Utc>>, FetchError> {
        let url = self.contents_url(repo, path)?;
        let response = self
            .client
            .head(url.clone())
            .send()
            .await
            .map_err(|source| FetchError::Http {
                url: url.to_string(),
                source,
            })?;
        let response = check_status(response)?;

        Ok(response
            .headers()
            .get(LAST_MODIFIED)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| DateTime::parse_from_rfc2822(v).ok())
            .map(|dt| dt.with_timezone(&Utc)))
    }
}
