use anyhow::{Context, Result};
use log::debug;
use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::PathBuf;

use crate::infra::opensubtitles::{DEFAULT_API_BASE, DEFAULT_USER_AGENT};

const USER_AGENT_ENV: &str = "SUBTITLE_FETCHER_USER_AGENT";
const API_BASE_ENV: &str = "SUBTITLE_FETCHER_API_BASE";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub user_agent: String,
    pub api_base: String,
    /// Language name used when `--language` is not given.
    pub language: String,
    /// File extensions picked up when scanning directories.
    pub extensions: Vec<String>,
    pub max_downloads: usize,
    /// Extra language name -> catalog id entries, appended to the built-ins.
    pub languages: HashMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            language: "english".to_string(),
            extensions: vec!["mkv".to_string()],
            max_downloads: 1,
            languages: HashMap::new(),
        }
    }
}

impl Settings {
    /// Config file first, then environment overrides on top.
    pub fn load() -> Result<Self> {
        let config_path = get_config_path();
        let mut settings = if config_path.exists() {
            debug!("Loading config from {}", config_path.display());
            let config_content = fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read {}", config_path.display()))?;
            Self::from_toml(&config_content)
                .with_context(|| format!("Invalid config file {}", config_path.display()))?
        } else {
            Self::default()
        };

        if let Ok(agent) = env::var(USER_AGENT_ENV) {
            settings.user_agent = agent;
        }
        if let Ok(base) = env::var(API_BASE_ENV) {
            settings.api_base = base;
        }

        Ok(settings)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

fn get_config_dir_path() -> PathBuf {
    xdir::config()
        .map(|path| path.join("subtitle-fetcher"))
        // If the standard path could not be found (e.g.`$HOME` is not set),
        // default to the current directory.
        .unwrap_or_default()
}

fn get_config_path() -> PathBuf {
    get_config_dir_path().join("config.toml")
}
