mod cli;
mod config;
mod domain;
mod error;
mod infra;
mod media;
mod workflows;

use anyhow::Result;
use clap::Parser;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use cli::Cli;
use config::Settings;
use domain::language::LanguageTable;
use error::{FingerprintError, ProcessError, SearchError};
use infra::opensubtitles::OpenSubtitlesClient;
use workflows::batch::{self, BatchOptions, FileReport};
use workflows::query::QueryOverrides;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let settings = Settings::load()?;
    let languages = LanguageTable::builtin().with_extra(settings.languages.clone());
    let client = OpenSubtitlesClient::new(&settings.api_base, &settings.user_agent)?;

    let extensions = if cli.extensions.is_empty() {
        settings.extensions.clone()
    } else {
        cli.extensions.clone()
    };

    let cwd = env::current_dir()?;
    let inputs = if cli.inputs.is_empty() {
        vec![cwd.clone()]
    } else {
        cli.inputs.iter().map(|input| cwd.join(input)).collect()
    };

    let mut files = Vec::new();
    for input_path in &inputs {
        if !input_path.exists() {
            eprintln!("Error: Input path does not exist: {input_path:?}");
            continue;
        }

        if input_path.is_dir() {
            println!("Checking directory: {}", display_name(input_path));
            match collect_video_files(input_path, &extensions, cli.recursive) {
                Ok(found) => files.extend(found),
                Err(e) => eprintln!("Error scanning {input_path:?}: {e}"),
            }
        } else {
            println!("Checking file: {}", display_name(input_path));
            files.push(input_path.clone());
        }
    }

    println!("Found {} video file(s) to process", files.len());

    let options = BatchOptions {
        language: cli.language.unwrap_or_else(|| settings.language.clone()),
        overrides: QueryOverrides {
            free_text: cli.query,
            season: cli.season,
            episode: cli.episode,
        },
        max_downloads: cli.max_downloads.unwrap_or(settings.max_downloads),
        dry_run: cli.dry_run,
    };

    let reports = batch::process_batch(
        &files,
        &options,
        &languages,
        &client,
        &client,
        print_report,
    );

    let failed = reports.iter().filter(|r| is_failure(r)).count();
    if failed > 0 {
        println!("{failed} of {} file(s) failed", reports.len());
    }

    Ok(())
}

fn print_report(report: &FileReport) {
    let name = display_name(&report.path);

    match &report.result {
        Ok(outcome) => {
            println!("{name}: Found {} subtitle/s.", outcome.candidates.len());
            for candidate in &outcome.candidates {
                println!(
                    "  {} [{}, {}]",
                    candidate.title, candidate.language_name, candidate.format
                );
            }
            for path in &outcome.downloaded {
                println!("Saved {}", display_name(path));
            }
        }
        Err(ProcessError::Search(SearchError::NotFound { .. })) => {
            println!("{name}: Found 0 subtitle/s.");
        }
        Err(ProcessError::Fingerprint(e @ FingerprintError::TooSmall { .. })) => {
            println!("{name}: Skipping, {e}");
        }
        Err(e) => {
            if let ProcessError::Download { saved, .. } = e {
                for path in saved {
                    println!("Saved {}", display_name(path));
                }
            }
            eprintln!("Error processing {:?}: {e}", report.path);
            let mut source = std::error::Error::source(e);
            while let Some(cause) = source {
                eprintln!("  caused by: {cause}");
                source = cause.source();
            }
            if matches!(e, ProcessError::Search(err) if err.is_transport()) {
                eprintln!("  check the network connection or the configured api_base");
            }
        }
    }

    println!(); // Blank line between files
}

// Not-found and too-small files are expected outcomes, not failures.
fn is_failure(report: &FileReport) -> bool {
    !matches!(
        report.result,
        Ok(_)
            | Err(ProcessError::Search(SearchError::NotFound { .. }))
            | Err(ProcessError::Fingerprint(FingerprintError::TooSmall { .. }))
    )
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn collect_video_files(
    dir_path: &Path,
    extensions: &[String],
    recurse: bool,
) -> Result<Vec<PathBuf>> {
    let mut video_files = Vec::new();
    collect_video_files_helper(dir_path, extensions, recurse, &mut video_files)?;
    video_files.sort();
    Ok(video_files)
}

fn collect_video_files_helper(
    dir_path: &Path,
    extensions: &[String],
    recurse: bool,
    video_files: &mut Vec<PathBuf>,
) -> Result<()> {
    let entries = fs::read_dir(dir_path)?;

    for entry in entries {
        let entry = entry?;
        let path = entry.path();

        if path.is_file() {
            if has_video_extension(&path, extensions) {
                video_files.push(path);
            }
        } else if path.is_dir() && recurse {
            collect_video_files_helper(&path, extensions, recurse, video_files)?;
        }
    }

    Ok(())
}

fn has_video_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| {
            extensions
                .iter()
                .any(|wanted| wanted.trim_start_matches('.').eq_ignore_ascii_case(ext))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    #[test]
    fn test_collect_video_files() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir(root.join("season1")).unwrap();
        for name in ["b.mkv", "a.MKV", "notes.txt", "c.mp4", "season1/d.mkv"] {
            File::create(root.join(name)).unwrap();
        }
        let extensions = vec!["mkv".to_string(), ".mp4".to_string()];

        let flat = collect_video_files(root, &extensions, false).unwrap();
        assert_eq!(
            flat,
            [root.join("a.MKV"), root.join("b.mkv"), root.join("c.mp4")]
        );

        let deep = collect_video_files(root, &extensions, true).unwrap();
        assert_eq!(deep.len(), 4);
        assert!(deep.contains(&root.join("season1").join("d.mkv")));
    }

    #[test]
    fn test_expected_outcomes_are_not_failures() {
        let path = PathBuf::from("x.mkv");
        let not_found = FileReport {
            path: path.clone(),
            result: Err(ProcessError::Search(SearchError::NotFound {
                query: "x".to_string(),
            })),
        };
        let too_small = FileReport {
            path: path.clone(),
            result: Err(ProcessError::Fingerprint(FingerprintError::TooSmall {
                size: 1,
                minimum: 65536,
            })),
        };
        let short = FileReport {
            path,
            result: Err(ProcessError::Fingerprint(FingerprintError::ShortRead {
                offset: 0,
                expected: 65536,
                actual: 12,
            })),
        };
        assert!(!is_failure(&not_found));
        assert!(!is_failure(&too_small));
        assert!(is_failure(&short));
    }
}
