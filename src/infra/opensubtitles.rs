use anyhow::{bail, Context, Result};
use reqwest::blocking::Client;
use reqwest::Url;
use serde::Deserialize;
use std::path::Path;
use tempfile::NamedTempFile;

use crate::error::{DownloadError, SearchError};
use crate::workflows::download::Downloader;
use crate::workflows::search::{Catalog, CatalogRecord, LookupRequest};

pub const DEFAULT_API_BASE: &str = "https://rest.opensubtitles.org/search";
pub const DEFAULT_USER_AGENT: &str = "TemporaryUserAgent";

/// Only the fields we map; the catalog sends several dozen more.
#[derive(Debug, Deserialize)]
struct SubtitleRecord {
    #[serde(rename = "SubFileName", default)]
    sub_file_name: String,
    #[serde(rename = "SubDownloadLink", default)]
    sub_download_link: String,
    #[serde(rename = "LanguageName", default)]
    language_name: String,
    #[serde(rename = "SubFormat", default)]
    sub_format: String,
}

impl From<SubtitleRecord> for CatalogRecord {
    fn from(record: SubtitleRecord) -> Self {
        Self {
            file_name: record.sub_file_name,
            download_url: record.sub_download_link,
            language_name: record.language_name,
            format: record.sub_format,
        }
    }
}

/// Blocking client for the OpenSubtitles REST search API.
#[derive(Debug, Clone)]
pub struct OpenSubtitlesClient {
    http: Client,
    base: Url,
}

impl OpenSubtitlesClient {
    pub fn new(api_base: &str, user_agent: &str) -> Result<Self> {
        let base = Url::parse(api_base)
            .with_context(|| format!("Invalid API base URL: {api_base}"))?;
        if base.cannot_be_a_base() {
            bail!("API base URL cannot carry path segments: {api_base}");
        }

        let http = Client::builder()
            .user_agent(user_agent)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { http, base })
    }

    fn request_url(&self, request: &LookupRequest) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty();
            for segment in path_segments(request) {
                segments.push(&segment);
            }
        }
        url
    }
}

fn path_segments(request: &LookupRequest) -> Vec<String> {
    match request {
        LookupRequest::ByHash {
            size,
            hash_hex,
            language,
        } => vec![
            format!("moviebytesize-{size}"),
            format!("moviehash-{hash_hex}"),
            format!("sublanguageid-{language}"),
        ],
        LookupRequest::ByQuery {
            query,
            season,
            episode,
            language,
        } => {
            let mut segments = Vec::new();
            if !query.is_empty() {
                segments.push(format!("query-{query}"));
            }
            if let Some(season) = season {
                segments.push(format!("season-{season}"));
            }
            if let Some(episode) = episode {
                segments.push(format!("episode-{episode}"));
            }
            segments.push(format!("sublanguageid-{language}"));
            segments
        }
    }
}

fn parse_records(url: &str, body: &str) -> Result<Vec<CatalogRecord>, SearchError> {
    let records: Vec<SubtitleRecord> =
        serde_json::from_str(body).map_err(|source| SearchError::Decode {
            url: url.to_string(),
            source,
        })?;
    Ok(records.into_iter().map(CatalogRecord::from).collect())
}

impl Catalog for OpenSubtitlesClient {
    fn lookup_url(&self, request: &LookupRequest) -> String {
        self.request_url(request).to_string()
    }

    fn lookup(&self, request: &LookupRequest) -> Result<Vec<CatalogRecord>, SearchError> {
        let url = self.request_url(request);
        let url_str = url.to_string();

        let response = self
            .http
            .get(url)
            .send()
            .map_err(|source| SearchError::Transport {
                url: url_str.clone(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(SearchError::Status {
                url: url_str,
                status: response.status().as_u16(),
            });
        }

        let body = response.text().map_err(|source| SearchError::Transport {
            url: url_str.clone(),
            source,
        })?;
        parse_records(&url_str, &body)
    }
}

impl Downloader for OpenSubtitlesClient {
    fn download(&self, url: &str, target: &Path) -> Result<(), DownloadError> {
        let mut response = self
            .http
            .get(url)
            .send()
            .map_err(|source| DownloadError::Transport {
                url: url.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(DownloadError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        // Stream into a sibling temp file so a broken transfer never leaves a
        // truncated subtitle at the final name.
        let directory = target
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let io_error = |source: std::io::Error| DownloadError::Io {
            path: target.to_path_buf(),
            source,
        };
        let mut partial = NamedTempFile::new_in(directory).map_err(io_error)?;
        response
            .copy_to(partial.as_file_mut())
            .map_err(|source| DownloadError::Transport {
                url: url.to_string(),
                source,
            })?;
        partial.persist(target).map_err(|e| io_error(e.error))?;
        Ok(())
    }
}
