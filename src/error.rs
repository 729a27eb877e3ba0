//! Error types for the scan pipeline.
//!
//! A [`FetchError`] abandons the repository being scanned; a [`DecodeError`] or
//! an undated file only skips the file it came from. Both are reported in the
//! run summary.

/// Network or API failure while listing repositories, directories, commits,
/// or fetching file content.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The request could not be sent or its body could not be read.
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("{url} returned HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    /// A listed file has no raw download URL (submodules, symlinks).
    #[error("{path} has no download URL")]
    MissingDownloadUrl { path: String },

    /// The response carried data that could not be interpreted.
    #[error("unexpected response from {url}: {message}")]
    Malformed { url: String, message: String },
}

/// A structured document (notebook) that could not be decoded.
#[derive(Debug, thiserror::Error)]
#[error("could not decode {file}: {source}")]
pub struct DecodeError {
    pub file: String,
    #[source]
    pub source: serde_json::Error,
}

/// Failure while processing a single file.
#[derive(Debug, thiserror::Error)]
pub enum FileError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Neither the file metadata nor the commit history carry a modification date.
    #[error("no modification date available for {path}")]
    MissingTimestamp { path: String },
}
