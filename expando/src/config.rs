use std::path::{Path, PathBuf};

use expando_parse::ParseOptions;
use expando_server::ServerConfig;
use serde::Deserialize;
use thiserror::Error;
use tokio::fs::read_to_string;
use tracing::debug;

pub const CONFIG_FILE_NAME: &str = "expando.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config file not found at: {0}")]
    NotFound(PathBuf),

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub parser: ParseOptions,
}

impl Config {
    /// Loads an explicitly named config file, or a directory's
    /// `expando.toml`.
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let path = resolve(path);
        if !path.exists() {
            return Err(ConfigError::NotFound(path));
        }
        Self::load_file(&path).await
    }

    /// Loads `expando.toml` from `dir`, with defaults when there is none.
    pub async fn load_or_default(dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(CONFIG_FILE_NAME);
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        Self::load_file(&path).await
    }

    async fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let string = read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_owned(),
                source,
            })?;
        let config = toml::from_str(&string).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })?;
        debug!(path = %path.display(), ?config, "Loaded config");
        Ok(config)
    }
}

fn resolve(path: &Path) -> PathBuf {
    if path.is_dir() {
        path.join(CONFIG_FILE_NAME)
    } else {
        path.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("expando-config-{name}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn parse_full_config() {
        let config: Config = toml::from_str(
            r#"
[server]
program = "rust-analyzer"
args = ["proc-macro"]
timeout_secs = 30

[server.env]
RUST_LOG = "warn"

[parser]
collapse_single_group = false
"#,
        )
        .unwrap();

        assert_eq!(config.server.program, "rust-analyzer");
        assert_eq!(config.server.args, vec!["proc-macro".to_string()]);
        assert_eq!(config.server.timeout(), Some(Duration::from_secs(30)));
        assert_eq!(
            config.server.env.get("RUST_LOG").map(String::as_str),
            Some("warn")
        );
        assert!(!config.parser.collapse_single_group);
    }

    #[test]
    fn empty_config_is_default() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert!(config.parser.collapse_single_group);
        assert_eq!(config.server.program, "rustup");
    }

    #[test]
    fn partial_server_section_keeps_defaults() {
        let config: Config = toml::from_str("[server]\ntimeout_secs = 5\n").unwrap();
        assert_eq!(config.server.program, "rustup");
        assert_eq!(config.server.timeout_secs, Some(5));
    }

    #[tokio::test]
    async fn load_from_directory() {
        let dir = scratch_dir("dir");
        tokio::fs::write(
            dir.join(CONFIG_FILE_NAME),
            "[parser]\ncollapse_single_group = false\n",
        )
        .await
        .unwrap();

        let config = Config::load(&dir).await.unwrap();
        assert!(!config.parser.collapse_single_group);

        let config = Config::load_or_default(&dir).await.unwrap();
        assert!(!config.parser.collapse_single_group);
    }

    #[tokio::test]
    async fn missing_files() {
        let dir = scratch_dir("missing");
        let config = Config::load_or_default(&dir).await.unwrap();
        assert_eq!(config, Config::default());

        let error = Config::load(&dir.join("nope.toml")).await.unwrap_err();
        assert!(matches!(error, ConfigError::NotFound(_)));
    }

    #[tokio::test]
    async fn invalid_file_names_path() {
        let dir = scratch_dir("invalid");
        let path = dir.join("bad.toml");
        tokio::fs::write(&path, "[server\n").await.unwrap();

        let error = Config::load(&path).await.unwrap_err();
        match error {
            ConfigError::Parse { path: error_path, .. } => assert_eq!(error_path, path),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
