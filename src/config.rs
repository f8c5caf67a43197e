use crate::constants;
use crate::services::titles::TitlePreference;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub mapping: MappingConfig,

    pub anidb: AniDbConfig,

    pub tvdb: TvDbConfig,

    pub anilist: AniListConfig,

    pub metadata: MetadataConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Root of the on-disk cache.
    pub data_dir: String,

    pub log_level: String,

    /// `pretty` or `json`.
    pub log_format: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            worker_threads: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingConfig {
    /// Where `anime-list.xml` is downloaded from.
    pub url: String,

    pub max_age_hours: u64,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            url: constants::urls::ANIME_LIST.to_string(),
            max_age_hours: constants::cache::MAPPING_LIST_MAX_AGE_HOURS,
        }
    }
}

impl MappingConfig {
    #[must_use]
    pub const fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_hours * 3600)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AniDbConfig {
    pub base_url: String,

    /// Registered AniDB HTTP client name.
    pub client_name: String,

    pub client_version: u32,

    /// Minimum interval between two AniDB requests.
    pub rate_limit_ms: u64,

    pub max_age_hours: u64,
}

impl Default for AniDbConfig {
    fn default() -> Self {
        Self {
            base_url: constants::urls::ANIDB_API.to_string(),
            client_name: "animeta".to_string(),
            client_version: 1,
            rate_limit_ms: constants::limits::ANIDB_RATE_LIMIT_MS,
            max_age_hours: constants::cache::ANIDB_MAX_AGE_HOURS,
        }
    }
}

impl AniDbConfig {
    #[must_use]
    pub const fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_hours * 3600)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TvDbConfig {
    pub base_url: String,

    /// Without a key every TvDB lookup is skipped and series stay AniDB-only.
    pub api_key: Option<String>,

    pub language: String,

    pub max_age_hours: u64,
}

impl Default for TvDbConfig {
    fn default() -> Self {
        Self {
            base_url: constants::urls::TVDB_API.to_string(),
            api_key: None,
            language: "en".to_string(),
            max_age_hours: constants::cache::TVDB_MAX_AGE_HOURS,
        }
    }
}

impl TvDbConfig {
    #[must_use]
    pub const fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_hours * 3600)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AniListConfig {
    pub enabled: bool,

    pub base_url: String,
}

impl Default for AniListConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: constants::urls::ANILIST_API.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataConfig {
    /// `localized`, `japanese` or `romaji`.
    pub title_preference: String,

    /// Language used by the `localized` preference.
    pub title_language: String,

    /// AniDB tags weigh 0..=600; lighter tags are not reported as genres.
    pub min_genre_weight: i32,

    pub max_genres: usize,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            title_preference: "localized".to_string(),
            title_language: "en".to_string(),
            min_genre_weight: 400,
            max_genres: 10,
        }
    }
}

impl MetadataConfig {
    /// Unknown values fall back to the localized preference.
    #[must_use]
    pub fn title_preference(&self) -> TitlePreference {
        match self.title_preference.to_ascii_lowercase().as_str() {
            "japanese" => TitlePreference::Japanese,
            "romaji" | "japanese_romaji" => TitlePreference::JapaneseRomaji,
            _ => TitlePreference::Localized(self.title_language.clone()),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let paths = Self::config_paths();

        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![];

        paths.push(PathBuf::from("config.toml"));

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("animeta").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".animeta").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            let config = Self::default();
            config.save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (name, url) in [
            ("mapping.url", &self.mapping.url),
            ("anidb.base_url", &self.anidb.base_url),
            ("tvdb.base_url", &self.tvdb.base_url),
            ("anilist.base_url", &self.anilist.base_url),
        ] {
            if url.trim().is_empty() {
                anyhow::bail!("{name} cannot be empty");
            }
            url::Url::parse(url).with_context(|| format!("{name} is not a valid URL: {url}"))?;
        }

        if self.anidb.rate_limit_ms == 0 {
            anyhow::bail!("anidb.rate_limit_ms must be > 0");
        }

        if self.anidb.client_name.trim().is_empty() {
            anyhow::bail!("anidb.client_name cannot be empty");
        }

        Ok(())
    }

    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.general.data_dir)
    }
}
