use std::path::{Path, PathBuf};

use crate::domain::models::SubtitleCandidate;
use crate::error::DownloadError;

pub trait Downloader {
    /// Fetches `url` and writes the body to `target`.
    fn download(&self, url: &str, target: &Path) -> Result<(), DownloadError>;
}

/// `<dir>/<video stem>.<language>.<format>`, unique within the directory.
/// Gzipped downloads keep a trailing `.gz` since they are saved as received.
pub fn target_path(video_path: &Path, candidate: &SubtitleCandidate) -> PathBuf {
    let directory = video_path.parent().unwrap_or(Path::new("."));
    let stem = video_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "subtitle".to_string());

    let language = match sanitize_component(&candidate.language_name.to_lowercase()) {
        l if l.is_empty() => "und".to_string(),
        l => l,
    };
    let format = match sanitize_component(&candidate.format.to_lowercase()) {
        f if f.is_empty() => "srt".to_string(),
        f => f,
    };

    let suffix = if is_gzip_link(&candidate.download_url) {
        format!("{language}.{format}.gz")
    } else {
        format!("{language}.{format}")
    };

    find_unique_filename(directory, &stem, &suffix)
}

fn is_gzip_link(url: &str) -> bool {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.to_ascii_lowercase().ends_with(".gz")
}

fn sanitize_component(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | ' ' => '-',
            c => c,
        })
        .collect::<String>()
        .trim_matches(|c| c == '-' || c == '.')
        .to_string()
}

fn find_unique_filename(directory: &Path, stem: &str, suffix: &str) -> PathBuf {
    let mut path = directory.join(format!("{stem}.{suffix}"));
    let mut counter = 1;

    while path.exists() {
        path = directory.join(format!("{stem} [copy {counter}].{suffix}"));
        counter += 1;
    }

    path
}
