use log::info;
use std::fs::File;
use std::path::{Path, PathBuf};

use super::download::{target_path, Downloader};
use super::query::{build_query, QueryOverrides};
use super::search::{search, Catalog};
use crate::domain::language::LanguageTable;
use crate::domain::models::SubtitleCandidate;
use crate::error::ProcessError;
use crate::media::fingerprint::fingerprint;

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub language: String,
    pub overrides: QueryOverrides,
    pub max_downloads: usize,
    pub dry_run: bool,
}

#[derive(Debug)]
pub struct FileOutcome {
    pub candidates: Vec<SubtitleCandidate>,
    pub downloaded: Vec<PathBuf>,
}

#[derive(Debug)]
pub struct FileReport {
    pub path: PathBuf,
    pub result: Result<FileOutcome, ProcessError>,
}

/// Fingerprints, searches and downloads subtitles for a single video.
pub fn process_file<C, D>(
    path: &Path,
    options: &BatchOptions,
    languages: &LanguageTable,
    catalog: &C,
    downloader: &D,
) -> Result<FileOutcome, ProcessError>
where
    C: Catalog + ?Sized,
    D: Downloader + ?Sized,
{
    let file = File::open(path).map_err(|source| ProcessError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let fingerprint = fingerprint(&file)?;

    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut query = build_query(&filename, &options.language, &options.overrides, languages);
    query.fingerprint = Some(fingerprint);

    let candidates = search(catalog, &query)?;

    let mut downloaded = Vec::new();
    if !options.dry_run {
        for candidate in candidates.iter().take(options.max_downloads) {
            let target = target_path(path, candidate);
            info!("Downloading {} to {}", candidate.title, target.display());
            if let Err(source) = downloader.download(&candidate.download_url, &target) {
                return Err(ProcessError::Download {
                    saved: downloaded,
                    source,
                });
            }
            downloaded.push(target);
        }
    }

    Ok(FileOutcome {
        candidates,
        downloaded,
    })
}

/// Processes every file in order. A failure is recorded against its file and
/// never stops the rest of the batch. `on_report` sees each report as soon as
/// its file is done.
pub fn process_batch<C, D, F>(
    files: &[PathBuf],
    options: &BatchOptions,
    languages: &LanguageTable,
    catalog: &C,
    downloader: &D,
    mut on_report: F,
) -> Vec<FileReport>
where
    C: Catalog + ?Sized,
    D: Downloader + ?Sized,
    F: FnMut(&FileReport),
{
    let mut reports = Vec::with_capacity(files.len());
    for path in files {
        info!("Searching for: {}", path.display());
        let report = FileReport {
            path: path.clone(),
            result: process_file(path, options, languages, catalog, downloader),
        };
        on_report(&report);
        reports.push(report);
    }
    reports
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DownloadError, FingerprintError, SearchError};
    use crate::media::fingerprint::CHUNK_SIZE;
    use crate::workflows::search::{CatalogRecord, LookupRequest};
    use std::cell::RefCell;
    use tempfile::TempDir;

    /// Answers hash lookups with two records per file, keyed by file size.
    /// Query lookups always come back empty.
    struct SizeCatalog {
        failing_size: Option<u64>,
        empty_size: Option<u64>,
    }

    impl Catalog for SizeCatalog {
        fn lookup_url(&self, request: &LookupRequest) -> String {
            format!("mock://{request:?}")
        }

        fn lookup(&self, request: &LookupRequest) -> Result<Vec<CatalogRecord>, SearchError> {
            let size = match request {
                LookupRequest::ByHash { size, .. } => *size,
                LookupRequest::ByQuery { .. } => return Ok(Vec::new()),
            };
            if Some(size) == self.failing_size {
                return Err(SearchError::Status {
                    url: self.lookup_url(request),
                    status: 500,
                });
            }
            if Some(size) == self.empty_size {
                return Ok(Vec::new());
            }
            Ok(["srt", "sub"]
                .iter()
                .map(|format| CatalogRecord {
                    file_name: format!("{size}.{format}"),
                    download_url: format!("https://dl.example/{size}/{format}"),
                    language_name: "English".to_string(),
                    format: format.to_string(),
                })
                .collect())
        }
    }

    #[derive(Default)]
    struct RecordingDownloader {
        calls: RefCell<Vec<(String, PathBuf)>>,
        fail_after: Option<usize>,
    }

    impl Downloader for RecordingDownloader {
        fn download(&self, url: &str, target: &Path) -> Result<(), DownloadError> {
            let mut calls = self.calls.borrow_mut();
            if Some(calls.len()) == self.fail_after {
                return Err(DownloadError::Status {
                    url: url.to_string(),
                    status: 410,
                });
            }
            calls.push((url.to_string(), target.to_path_buf()));
            Ok(())
        }
    }

    fn options() -> BatchOptions {
        BatchOptions {
            language: "english".to_string(),
            overrides: QueryOverrides::default(),
            max_downloads: 1,
            dry_run: false,
        }
    }

    fn write_file(dir: &TempDir, name: &str, len: usize) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, vec![7u8; len]).unwrap();
        path
    }

    #[test]
    fn test_failed_file_does_not_stop_the_batch() {
        let dir = TempDir::new().unwrap();
        let files = vec![
            write_file(&dir, "one.mkv", CHUNK_SIZE + 10),
            write_file(&dir, "two.mkv", 100),
            write_file(&dir, "three.mkv", CHUNK_SIZE * 2),
        ];
        let catalog = SizeCatalog {
            failing_size: None,
            empty_size: None,
        };
        let downloader = RecordingDownloader::default();

        let mut seen = Vec::new();
        let reports = process_batch(
            &files,
            &options(),
            &LanguageTable::builtin(),
            &catalog,
            &downloader,
            |report| seen.push(report.path.clone()),
        );

        assert_eq!(seen, files);
        assert_eq!(reports.len(), 3);
        assert!(reports[0].result.is_ok());
        assert!(matches!(
            reports[1].result,
            Err(ProcessError::Fingerprint(FingerprintError::TooSmall { size: 100, .. }))
        ));
        let third = reports[2].result.as_ref().unwrap();
        assert_eq!(third.candidates.len(), 2);
        assert_eq!(third.downloaded, [dir.path().join("three.english.srt")]);

        let calls = downloader.calls.borrow();
        assert_eq!(calls.len(), 2);
        assert_eq!(
            calls[0].0,
            format!("https://dl.example/{}/srt", CHUNK_SIZE + 10)
        );
        assert_eq!(calls[1].1, dir.path().join("three.english.srt"));
    }

    #[test]
    fn test_transport_and_not_found_are_per_file() {
        let dir = TempDir::new().unwrap();
        let files = vec![
            write_file(&dir, "broken.mkv", CHUNK_SIZE + 1),
            write_file(&dir, "unknown.mkv", CHUNK_SIZE + 2),
            write_file(&dir, "fine.mkv", CHUNK_SIZE + 3),
        ];
        let catalog = SizeCatalog {
            failing_size: Some((CHUNK_SIZE + 1) as u64),
            empty_size: Some((CHUNK_SIZE + 2) as u64),
        };
        let downloader = RecordingDownloader::default();

        let reports = process_batch(
            &files,
            &options(),
            &LanguageTable::builtin(),
            &catalog,
            &downloader,
            |_| {},
        );

        assert!(matches!(
            &reports[0].result,
            Err(ProcessError::Search(err)) if err.is_transport()
        ));
        assert!(matches!(
            reports[1].result,
            Err(ProcessError::Search(SearchError::NotFound { .. }))
        ));
        assert_eq!(reports[2].result.as_ref().unwrap().downloaded.len(), 1);
    }

    #[test]
    fn test_missing_file_is_reported() {
        let dir = TempDir::new().unwrap();
        let catalog = SizeCatalog {
            failing_size: None,
            empty_size: None,
        };
        let result = process_file(
            &dir.path().join("gone.mkv"),
            &options(),
            &LanguageTable::builtin(),
            &catalog,
            &RecordingDownloader::default(),
        );
        assert!(matches!(result, Err(ProcessError::Open { .. })));
    }

    #[test]
    fn test_dry_run_and_download_limit() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "movie.mkv", CHUNK_SIZE);
        let catalog = SizeCatalog {
            failing_size: None,
            empty_size: None,
        };

        let downloader = RecordingDownloader::default();
        let dry = BatchOptions {
            dry_run: true,
            ..options()
        };
        let outcome =
            process_file(&path, &dry, &LanguageTable::builtin(), &catalog, &downloader).unwrap();
        assert_eq!(outcome.candidates.len(), 2);
        assert!(outcome.downloaded.is_empty());
        assert!(downloader.calls.borrow().is_empty());

        let all = BatchOptions {
            max_downloads: 5,
            ..options()
        };
        let outcome =
            process_file(&path, &all, &LanguageTable::builtin(), &catalog, &downloader).unwrap();
        assert_eq!(
            outcome.downloaded,
            [
                dir.path().join("movie.english.srt"),
                dir.path().join("movie.english.sub"),
            ]
        );
    }

    #[test]
    fn test_failed_download_keeps_saved_subtitles() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "movie.mkv", CHUNK_SIZE);
        let catalog = SizeCatalog {
            failing_size: None,
            empty_size: None,
        };
        let downloader = RecordingDownloader {
            fail_after: Some(1),
            ..Default::default()
        };
        let options = BatchOptions {
            max_downloads: 2,
            ..options()
        };

        let result = process_file(
            &path,
            &options,
            &LanguageTable::builtin(),
            &catalog,
            &downloader,
        );
        match result {
            Err(ProcessError::Download { saved, source }) => {
                assert_eq!(saved, [dir.path().join("movie.english.srt")]);
                assert!(matches!(source, DownloadError::Status { status: 410, .. }));
            }
            other => panic!("expected a download error, got {other:?}"),
        }
    }
}
