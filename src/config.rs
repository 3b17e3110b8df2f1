//! Server configuration
//!
//! Settings come from an optional `catalog.yml` / `catalog.yaml` file,
//! discovered by walking up from the working directory, with command-line
//! flags (and their environment variables) taking precedence.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

pub const DEFAULT_BIND: &str = "127.0.0.1:8000";
pub const DEFAULT_DATABASE_URL: &str = "sqlite://catalog.db?mode=rwc";
pub const DEFAULT_MEDIA_ROOT: &str = "media";
pub const DEFAULT_MEDIA_URL: &str = "/media/";
pub const DEFAULT_LOG_LEVEL: &str = "info";

const CONFIG_FILE_NAMES: &[&str] = &["catalog.yml", "catalog.yaml"];

/// Configuration file format
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub bind: Option<String>,
    pub database_url: Option<String>,
    pub jwt_secret: Option<String>,
    pub media_root: Option<PathBuf>,
    pub media_url: Option<String>,
    pub cors_origins: Vec<String>,
    pub log_level: Option<String>,
    /// Access token lifetime in minutes
    pub access_token_minutes: Option<i64>,
    /// Refresh token lifetime in days
    pub refresh_token_days: Option<i64>,
}

impl FileConfig {
    /// Find a config file starting from the current directory
    pub fn discover() -> Result<Option<(PathBuf, Self)>> {
        let current_dir = std::env::current_dir()?;
        Self::discover_from(&current_dir)
    }

    /// Walk up from `start_dir` to the filesystem root
    pub fn discover_from(start_dir: &Path) -> Result<Option<(PathBuf, Self)>> {
        let mut current = start_dir.to_path_buf();

        loop {
            for name in CONFIG_FILE_NAMES {
                let path = current.join(name);
                if path.exists() {
                    let config = Self::load(&path)?;
                    return Ok(Some((path, config)));
                }
            }

            if !current.pop() {
                break;
            }
        }

        Ok(None)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        Self::parse(&content).with_context(|| format!("Invalid config file: {:?}", path))
    }

    /// Parse YAML after expanding `${VAR}` references
    pub fn parse(content: &str) -> Result<Self> {
        let expanded = expand_env_vars(content)?;
        let config: FileConfig =
            serde_yaml::from_str(&expanded).context("Failed to parse YAML config")?;

        if let Some(minutes) = config.access_token_minutes {
            anyhow::ensure!(minutes > 0, "access_token_minutes must be positive");
        }
        if let Some(days) = config.refresh_token_days {
            anyhow::ensure!(days > 0, "refresh_token_days must be positive");
        }

        Ok(config)
    }
}

/// Expand `${VAR}` references; unset variables become empty strings
pub fn expand_env_vars(input: &str) -> Result<String> {
    let re = regex_lite::Regex::new(r"\$\{([^}]+)\}").context("Invalid env var pattern")?;

    let expanded = re.replace_all(input, |caps: &regex_lite::Captures<'_>| {
        std::env::var(&caps[1]).unwrap_or_default()
    });

    Ok(expanded.into_owned())
}

/// Values given on the command line; `None` falls through to the file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub bind: Option<String>,
    pub database_url: Option<String>,
    pub jwt_secret: Option<String>,
    pub media_root: Option<PathBuf>,
    pub media_url: Option<String>,
    pub cors_origins: Vec<String>,
    pub log_level: Option<String>,
}

/// Effective settings after merging file and flags
#[derive(Debug, Clone)]
pub struct Settings {
    pub bind_addr: SocketAddr,
    pub database_url: String,
    pub jwt_secret: Option<String>,
    pub media_root: PathBuf,
    pub media_url: String,
    pub cors_origins: Vec<String>,
    pub log_level: String,
    pub access_ttl: chrono::Duration,
    pub refresh_ttl: chrono::Duration,
}

impl Settings {
    pub fn resolve(file: FileConfig, overrides: Overrides) -> Result<Self> {
        let bind = overrides
            .bind
            .or(file.bind)
            .unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind_addr = bind
            .parse()
            .with_context(|| format!("Invalid bind address: {}", bind))?;

        let cors_origins = if overrides.cors_origins.is_empty() {
            file.cors_origins
        } else {
            overrides.cors_origins
        };

        Ok(Self {
            bind_addr,
            database_url: overrides
                .database_url
                .or(file.database_url)
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            jwt_secret: overrides
                .jwt_secret
                .or(file.jwt_secret)
                .filter(|s| !s.trim().is_empty()),
            media_root: overrides
                .media_root
                .or(file.media_root)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MEDIA_ROOT)),
            media_url: overrides
                .media_url
                .or(file.media_url)
                .unwrap_or_else(|| DEFAULT_MEDIA_URL.to_string()),
            cors_origins,
            log_level: overrides
                .log_level
                .or(file.log_level)
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            access_ttl: chrono::Duration::minutes(file.access_token_minutes.unwrap_or(30)),
            refresh_ttl: chrono::Duration::days(file.refresh_token_days.unwrap_or(7)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
bind: "0.0.0.0:9000"
database_url: "postgres://catalog@localhost/catalog"
jwt_secret: "s3cret"
media_root: /srv/media
media_url: "https://cdn.example.com/"
cors_origins:
  - "https://shop.example.com"
log_level: debug
access_token_minutes: 15
refresh_token_days: 1
"#;
        let config = FileConfig::parse(yaml).unwrap();

        assert_eq!(config.bind.as_deref(), Some("0.0.0.0:9000"));
        assert_eq!(config.media_root, Some(PathBuf::from("/srv/media")));
        assert_eq!(config.cors_origins, vec!["https://shop.example.com"]);
        assert_eq!(config.access_token_minutes, Some(15));
    }

    #[test]
    fn test_unknown_keys_and_bad_lifetimes_are_rejected() {
        assert!(FileConfig::parse("bnid: 1.2.3.4:80").is_err());
        assert!(FileConfig::parse("access_token_minutes: 0").is_err());
    }

    #[test]
    fn test_expand_env_vars() {
        std::env::set_var("CATALOG_TEST_SECRET", "from-env");

        assert_eq!(
            expand_env_vars("jwt_secret: ${CATALOG_TEST_SECRET}").unwrap(),
            "jwt_secret: from-env"
        );
        assert_eq!(expand_env_vars("${CATALOG_TEST_UNSET_VAR}").unwrap(), "");
        assert_eq!(expand_env_vars("no_vars").unwrap(), "no_vars");

        let config = FileConfig::parse("jwt_secret: \"${CATALOG_TEST_SECRET}\"").unwrap();
        assert_eq!(config.jwt_secret.as_deref(), Some("from-env"));

        std::env::remove_var("CATALOG_TEST_SECRET");
    }

    #[test]
    fn test_flags_override_file() {
        let file = FileConfig {
            bind: Some("0.0.0.0:9000".to_string()),
            jwt_secret: Some("file-secret".to_string()),
            cors_origins: vec!["https://a.example.com".to_string()],
            refresh_token_days: Some(2),
            ..Default::default()
        };
        let overrides = Overrides {
            bind: Some("127.0.0.1:7000".to_string()),
            cors_origins: vec!["https://b.example.com".to_string()],
            ..Default::default()
        };

        let settings = Settings::resolve(file, overrides).unwrap();
        assert_eq!(settings.bind_addr.port(), 7000);
        assert_eq!(settings.jwt_secret.as_deref(), Some("file-secret"));
        assert_eq!(settings.cors_origins, vec!["https://b.example.com"]);
        assert_eq!(settings.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(settings.access_ttl, chrono::Duration::minutes(30));
        assert_eq!(settings.refresh_ttl, chrono::Duration::days(2));
    }

    #[test]
    fn test_blank_secret_counts_as_missing() {
        let overrides = Overrides {
            jwt_secret: Some("  ".to_string()),
            ..Default::default()
        };
        let settings = Settings::resolve(FileConfig::default(), overrides).unwrap();
        assert!(settings.jwt_secret.is_none());
    }

    #[test]
    fn test_discover_walks_up() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a/b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(temp_dir.path().join("catalog.yaml"), "log_level: warn\n").unwrap();

        let (path, config) = FileConfig::discover_from(&nested).unwrap().unwrap();
        assert_eq!(path, temp_dir.path().join("catalog.yaml"));
        assert_eq!(config.log_level.as_deref(), Some("warn"));
    }

    #[test]
    fn test_discover_prefers_yml() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("catalog.yml"), "log_level: debug\n").unwrap();
        std::fs::write(temp_dir.path().join("catalog.yaml"), "log_level: warn\n").unwrap();

        let (path, _) = FileConfig::discover_from(temp_dir.path()).unwrap().unwrap();
        assert!(path.ends_with("catalog.yml"));
    }
}
