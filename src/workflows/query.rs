use regex::Regex;
use std::sync::LazyLock;

use crate::domain::language::LanguageTable;
use crate::domain::models::SearchQuery;

static SXXEXX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[sS]([0-9]+)[eE]([0-9]+)").expect("valid SxxExx pattern"));

/// Values supplied by the user that take precedence over anything inferred
/// from the filename. Zero means "not supplied".
#[derive(Debug, Clone, Default)]
pub struct QueryOverrides {
    pub free_text: Option<String>,
    pub season: u32,
    pub episode: u32,
}

pub fn build_query(
    filename: &str,
    language_name: &str,
    overrides: &QueryOverrides,
    languages: &LanguageTable,
) -> SearchQuery {
    let free_text = match overrides.free_text.as_deref() {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => filename.to_string(),
    };

    let mut season = overrides.season;
    let mut episode = overrides.episode;
    if let Some((found_season, found_episode)) = parse_sxxexx(filename) {
        if season == 0 {
            season = found_season;
        }
        if episode == 0 {
            episode = found_episode;
        }
    }

    SearchQuery {
        filename: filename.to_string(),
        free_text,
        season,
        episode,
        language_code: languages.code_for(language_name).to_string(),
        fingerprint: None,
    }
}

// First SxxExx occurrence; a run too long for u32 counts as unset.
fn parse_sxxexx(filename: &str) -> Option<(u32, u32)> {
    let caps = SXXEXX.captures(filename)?;
    let season = caps[1].parse().unwrap_or(0);
    let episode = caps[2].parse().unwrap_or(0);
    Some((season, episode))
}
