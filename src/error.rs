use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while computing a media fingerprint.
#[derive(Debug, Error)]
pub enum FingerprintError {
    /// The file is smaller than one chunk window.
    #[error("file is too small to fingerprint ({size} bytes, need at least {minimum})")]
    TooSmall { size: u64, minimum: u64 },

    /// A positional read did not fill the chunk window.
    #[error("short read at offset {offset}: expected {expected} bytes, got {actual}")]
    ShortRead {
        offset: u64,
        expected: usize,
        actual: usize,
    },

    #[error("failed to read media file")]
    Io(#[from] std::io::Error),
}

/// Errors raised by the catalog search.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The HTTP exchange could not be completed.
    #[error("request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The catalog answered with a non-success status.
    #[error("catalog answered {url} with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("could not decode catalog response from {url}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// Both the hash attempt and the query attempt came back empty.
    #[error("no subtitles found for \"{query}\"")]
    NotFound { query: String },
}

impl SearchError {
    /// True for failures of the HTTP exchange itself.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Status { .. })
    }
}

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("download from {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("download server answered {url} with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("failed to write subtitle to {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Everything that can go wrong while processing a single media file.
///
/// These never escape the batch loop: each one is reported against its file
/// and the batch moves on.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("failed to open {path}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Fingerprint(#[from] FingerprintError),

    #[error(transparent)]
    Search(#[from] SearchError),

    /// Subtitles saved before the failing download are still listed.
    #[error("download failed after saving {} subtitle/s", .saved.len())]
    Download {
        saved: Vec<PathBuf>,
        #[source]
        source: DownloadError,
    },
}
