use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "subtitle-fetcher")]
#[command(about = "Find and download subtitles for video files using their OpenSubtitles hash")]
pub struct Cli {
    /// Input files or directories to process (defaults to the current directory)
    pub inputs: Vec<PathBuf>,

    /// Subtitle language name, e.g. "english"
    #[arg(short = 'l', long)]
    pub language: Option<String>,

    /// Free-text query used when the hash lookup finds nothing (defaults to the file name)
    #[arg(long)]
    pub query: Option<String>,

    /// Season number, overrides the one found in the file name
    #[arg(long, default_value_t = 0)]
    pub season: u32,

    /// Episode number, overrides the one found in the file name
    #[arg(long, default_value_t = 0)]
    pub episode: u32,

    /// Recursively scan directories for video files
    #[arg(short = 'r', long = "recursive")]
    pub recursive: bool,

    /// Video file extensions to pick up in directories (repeatable)
    #[arg(long = "ext")]
    pub extensions: Vec<String>,

    /// Maximum number of subtitles downloaded per video
    #[arg(long)]
    pub max_downloads: Option<usize>,

    /// List candidates without downloading anything
    #[arg(long)]
    pub dry_run: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["subtitle-fetcher"]);
        assert!(cli.inputs.is_empty());
        assert!(cli.language.is_none());
        assert_eq!((cli.season, cli.episode), (0, 0));
        assert!(cli.extensions.is_empty());
        assert!(!cli.dry_run);
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::parse_from([
            "subtitle-fetcher",
            "-l",
            "arabic",
            "--season",
            "9",
            "--ext",
            "mp4",
            "--ext",
            "avi",
            "-r",
            "a.mkv",
            "shows",
        ]);
        assert_eq!(cli.language.as_deref(), Some("arabic"));
        assert_eq!(cli.season, 9);
        assert_eq!(cli.episode, 0);
        assert_eq!(cli.extensions, ["mp4", "avi"]);
        assert!(cli.recursive);
        assert_eq!(cli.inputs, [PathBuf::from("a.mkv"), PathBuf::from("shows")]);
    }
}
