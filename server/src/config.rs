use std::collections::BTreeMap;
use std::time::Duration;

use expando_cmd::Command;
use serde::{Deserialize, Serialize};

/// How to launch the expansion server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub program: String,
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
    /// Limit on a single request/response exchange. Unbounded when unset.
    pub timeout_secs: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            program: "rustup".into(),
            args: vec![
                "run".into(),
                "nightly".into(),
                "rust-analyzer".into(),
                "proc-macro".into(),
            ],
            env: BTreeMap::new(),
            timeout_secs: None,
        }
    }
}

impl ServerConfig {
    pub fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args).envs(&self.env);
        command
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_command() {
        let config = ServerConfig::default();
        assert_eq!(
            config.command().to_string(),
            "rustup run nightly rust-analyzer proc-macro"
        );
        assert_eq!(config.timeout(), None);
    }

    #[test]
    fn timeout_in_seconds() {
        let config = ServerConfig {
            timeout_secs: Some(3),
            ..Default::default()
        };
        assert_eq!(config.timeout(), Some(Duration::from_secs(3)));
    }
}
