use anyhow::Context;
use serde::Deserialize;
use std::path::PathBuf;

use crate::domain::platform::PlatformPolicy;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub version: u32,
    pub storage: StorageConfig,
    #[serde(default)]
    pub site: SiteConfig,
    pub http: HttpConfig,
}

impl Config {
    pub fn load(path: &str) -> anyhow::Result<Config> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {path}"))?;
        toml::from_str(&contents).with_context(|| "Failed to parse config TOML")
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub bind_addr: String,
    pub port: u16,
}

/// Where the track document, the covers and the static assets live.
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub document: PathBuf,
    pub covers_dir: PathBuf,
    #[serde(default = "default_assets_dir")]
    pub assets_dir: PathBuf,
}

fn default_assets_dir() -> PathBuf {
    PathBuf::from("static")
}

#[derive(Debug, Deserialize, Clone)]
pub struct SiteConfig {
    #[serde(default = "default_artist")]
    pub default_artist: String,
    #[serde(default = "default_placeholder")]
    pub placeholder_cover_url: String,
    #[serde(default)]
    pub platform_policy: PlatformPolicy,
    /// Hide disabled tracks on the home page.
    /// When unset, follows the platform policy (hidden under `strict` only).
    #[serde(default)]
    pub filter_disabled_in_list: Option<bool>,
}

impl SiteConfig {
    pub fn filter_disabled_in_list(&self) -> bool {
        self.filter_disabled_in_list
            .unwrap_or(self.platform_policy == PlatformPolicy::Strict)
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            default_artist: default_artist(),
            placeholder_cover_url: default_placeholder(),
            platform_policy: PlatformPolicy::default(),
            filter_disabled_in_list: None,
        }
    }
}

fn default_artist() -> String {
    "meowthpxnk".to_string()
}

fn default_placeholder() -> String {
    "https://via.placeholder.com/500x500".to_string()
}
