use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub bot_token: String,
    #[serde(alias = "YoutubeKey")]
    pub youtube_api_key: String,
    #[serde(alias = "SpotifyClientID")]
    pub spotify_client_id: String,
    #[serde(alias = "SpotifySecretKey")]
    pub spotify_client_secret: String,
    #[serde(default)]
    pub commands: CommandsConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

/// Chat triggers the bot reacts to.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CommandsConfig {
    #[serde(default = "default_music_prefix")]
    pub music_prefix: String,
    #[serde(default = "default_list_trigger")]
    pub list_trigger: String,
    #[serde(default = "default_list_reply")]
    pub list_reply: String,
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            music_prefix: default_music_prefix(),
            list_trigger: default_list_trigger(),
            list_reply: default_list_reply(),
        }
    }
}

/// Outbound HTTP settings. The URLs only need overriding when pointing the
/// bot at a proxy or a local mock.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_youtube_base_url")]
    pub youtube_base_url: String,
    #[serde(default = "default_spotify_auth_url")]
    pub spotify_auth_url: String,
    #[serde(default = "default_spotify_api_base_url")]
    pub spotify_api_base_url: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            youtube_base_url: default_youtube_base_url(),
            spotify_auth_url: default_spotify_auth_url(),
            spotify_api_base_url: default_spotify_api_base_url(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_music_prefix() -> String {
    "!music".to_string()
}

fn default_list_trigger() -> String {
    "!list".to_string()
}

fn default_list_reply() -> String {
    "ALLEZ, QUOI !".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_youtube_base_url() -> String {
    "https://www.googleapis.com/youtube/v3".to_string()
}

fn default_spotify_auth_url() -> String {
    "https://accounts.spotify.com/api/token".to_string()
}

fn default_spotify_api_base_url() -> String {
    "https://api.spotify.com/v1".to_string()
}

impl Config {
    /// Load the config from a TOML file, or from JSON when the path ends in `.json`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let config: Config = if is_json {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))?
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display()))?
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let required = [
            ("bot_token", &self.bot_token),
            ("youtube_api_key", &self.youtube_api_key),
            ("spotify_client_id", &self.spotify_client_id),
            ("spotify_client_secret", &self.spotify_client_secret),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                anyhow::bail!("Config field '{}' must not be empty", name);
            }
        }

        if self.commands.music_prefix.is_empty() || self.commands.list_trigger.is_empty() {
            anyhow::bail!("Command triggers must not be empty");
        }
        if self.commands.list_reply.trim().is_empty() {
            anyhow::bail!("commands.list_reply must not be empty");
        }
        if self.http.timeout_secs == 0 {
            anyhow::bail!("http.timeout_secs must be greater than zero");
        }
        Ok(())
    }
}
