use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::transcript::resolver::DEFAULT_LANGUAGES;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Caption lookup settings
    pub transcript: TranscriptConfig,

    /// Clip download settings
    pub download: DownloadConfig,

    /// External tools
    pub tools: ToolsConfig,

    /// HTTP boundary settings
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptConfig {
    /// Caption languages, tried in order
    pub languages: Vec<String>,

    /// Upper bound for one whole transcript lookup from the HTTP boundary
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Where extracted clips are written
    pub directory: PathBuf,

    /// Upper bound for one clip extraction
    pub clip_timeout_secs: u64,

    /// Upper bound for one metadata lookup
    pub metadata_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    pub yt_dlp_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            transcript: TranscriptConfig {
                languages: DEFAULT_LANGUAGES.iter().map(|lang| lang.to_string()).collect(),
                request_timeout_secs: 30,
            },
            download: DownloadConfig {
                directory: default_download_dir(),
                clip_timeout_secs: 300,
                metadata_timeout_secs: 30,
            },
            tools: ToolsConfig {
                yt_dlp_path: "yt-dlp".to_string(),
            },
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 5001,
            },
        }
    }
}

fn default_download_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join("Downloads").join("youtube_clips"))
        .unwrap_or_else(|| PathBuf::from("youtube_clips"))
}

impl Config {
    /// Load configuration from file or create default
    pub async fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Self::default();
            config.save_to(&config_path)?;
            tracing::info!("Wrote default configuration to {}", config_path.display());
            Ok(config)
        }
    }

    /// Load configuration from file, falling back to defaults without writing one
    pub fn load_or_default() -> Result<Self> {
        let config_path = Self::config_path()?;
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load and validate a configuration file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs_err::read_to_string(path)
            .context("Failed to read config file")?;

        let config: Config = serde_yaml::from_str(&content)
            .context("Failed to parse config file")?;

        config.validate()?;
        Ok(config)
    }

    fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self)
            .context("Failed to serialize config")?;

        fs_err::write(config_path, content)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Get configuration file path
    pub fn config_path() -> Result<PathBuf> {
        // First try current directory for easy testing
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?;

        Ok(config_dir.join("clipscribe").join("config.yaml"))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.transcript.languages.is_empty() {
            anyhow::bail!("At least one transcript language must be configured");
        }

        if let Some(blank) = self.transcript.languages.iter().position(|lang| lang.trim().is_empty()) {
            anyhow::bail!("Transcript language #{} is blank", blank + 1);
        }

        if self.transcript.request_timeout_secs == 0
            || self.download.clip_timeout_secs == 0
            || self.download.metadata_timeout_secs == 0
        {
            anyhow::bail!("Timeouts must be greater than zero");
        }

        if self.server.port == 0 {
            anyhow::bail!("Server port must be greater than zero");
        }

        if self.tools.yt_dlp_path.trim().is_empty() {
            anyhow::bail!("yt-dlp path must not be empty");
        }

        Ok(())
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!("  Languages: {}", self.transcript.languages.join(", "));
        println!("  Transcript Timeout: {}s", self.transcript.request_timeout_secs);
        println!("  Download Folder: {}", self.download.directory.display());
        println!("  Clip Timeout: {}s", self.download.clip_timeout_secs);
        println!("  yt-dlp: {}", self.tools.yt_dlp_path);
        println!("  Server: {}", self.server_addr());
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.transcript.request_timeout_secs)
    }

    pub fn clip_timeout(&self) -> Duration {
        Duration::from_secs(self.download.clip_timeout_secs)
    }

    pub fn metadata_timeout(&self) -> Duration {
        Duration::from_secs(self.download.metadata_timeout_secs)
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(
            config.transcript.languages,
            vec!["en", "ko", "ja", "zh-Hans", "es", "fr", "de"]
        );
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.server_addr(), "127.0.0.1:5001");
    }

    #[test]
    fn test_round_trip_through_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.yaml");

        let mut config = Config::default();
        config.transcript.languages = vec!["ko".to_string(), "en".to_string()];
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.transcript.languages, vec!["ko", "en"]);
    }

    #[test]
    fn test_validation_failures() {
        let mut config = Config::default();
        config.transcript.languages.clear();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.transcript.languages.push("  ".to_string());
        assert!(config.validate().unwrap_err().to_string().contains("#8"));

        let mut config = Config::default();
        config.download.clip_timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs_err::write(&path, "transcript: [not, a, map]").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
