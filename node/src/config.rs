//! Bot configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use joinvote_types::{ChatId, GroupPolicy};

use crate::NodeError;

/// Moderation log channel settings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogChannelConfig {
    /// Whether resolutions are logged to a channel at all.
    #[serde(default)]
    pub enable: bool,

    /// Channel that receives the log entries.
    #[serde(default)]
    pub channel_id: Option<i64>,

    /// Forum topic inside the channel; 0 or absent means none.
    #[serde(default)]
    pub message_thread_id: Option<i64>,
}

impl LogChannelConfig {
    /// The channel to log to, if logging is enabled and a channel is set.
    pub fn target(&self) -> Option<(ChatId, Option<i64>)> {
        if !self.enable {
            return None;
        }
        self.channel_id
            .map(|id| (ChatId(id), self.message_thread_id.filter(|t| *t != 0)))
    }
}

/// Configuration for the bot.
///
/// Can be loaded from a TOML file via [`NodeConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Bot API token.
    #[serde(default)]
    pub bot_token: String,

    /// Bot API server, for self-hosted API servers.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// The bot's username. Looked up with `getMe` when absent.
    #[serde(default)]
    pub bot_username: Option<String>,

    /// Data directory for the LMDB store.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// LMDB map size in MiB.
    #[serde(default = "default_map_size_mb")]
    pub map_size_mb: usize,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Seconds between a timed-out vote's resolution and deleting its ballot.
    #[serde(default = "default_cleanup_delay_secs")]
    pub cleanup_delay_secs: u64,

    /// Server-side long-poll timeout for `getUpdates`.
    #[serde(default = "default_poll_timeout_secs")]
    pub poll_timeout_secs: u64,

    /// Drop updates queued while the bot was offline.
    #[serde(default = "default_true")]
    pub skip_pending_updates: bool,

    #[serde(default)]
    pub log_channel: LogChannelConfig,

    /// Policy given to groups that have none stored yet.
    #[serde(default)]
    pub default_policy: GroupPolicy,

    /// Whether to enable Prometheus metrics endpoint.
    #[serde(default)]
    pub enable_metrics: bool,

    /// Metrics port (if enabled).
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_api_url() -> String {
    "https://api.telegram.org".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./joinvote_data")
}

fn default_map_size_mb() -> usize {
    256
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_cleanup_delay_secs() -> u64 {
    60
}

fn default_poll_timeout_secs() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

fn default_metrics_port() -> u16 {
    9184
}

// ── Impl ───────────────────────────────────────────────────────────────

impl NodeConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, NodeError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| NodeError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, NodeError> {
        let config: Self = toml::from_str(s).map_err(|e| NodeError::Config(e.to_string()))?;
        Ok(config.normalized())
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, NodeError> {
        toml::to_string_pretty(self).map_err(|e| NodeError::Config(e.to_string()))
    }

    /// Check the settings the bot cannot start without.
    pub fn validate(&self) -> Result<(), NodeError> {
        if self.bot_token.trim().is_empty() {
            return Err(NodeError::Config("bot_token is required".into()));
        }
        if self.map_size_mb == 0 {
            return Err(NodeError::Config("map_size_mb must be positive".into()));
        }
        Ok(())
    }

    /// LMDB map size in bytes.
    pub fn map_size_bytes(&self) -> usize {
        self.map_size_mb.saturating_mul(1024 * 1024)
    }

    fn normalized(mut self) -> Self {
        self.default_policy = self.default_policy.normalized();
        self
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            api_url: default_api_url(),
            bot_username: None,
            data_dir: default_data_dir(),
            map_size_mb: default_map_size_mb(),
            log_format: default_log_format(),
            log_level: default_log_level(),
            cleanup_delay_secs: default_cleanup_delay_secs(),
            poll_timeout_secs: default_poll_timeout_secs(),
            skip_pending_updates: default_true(),
            log_channel: LogChannelConfig::default(),
            default_policy: GroupPolicy::default(),
            enable_metrics: false,
            metrics_port: default_metrics_port(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = NodeConfig::default();
        let toml_str = config.to_toml_string().expect("should serialize");
        let parsed = NodeConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed.metrics_port, config.metrics_port);
        assert_eq!(parsed.default_policy, config.default_policy);
        assert_eq!(parsed.cleanup_delay_secs, 60);
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = NodeConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.api_url, "https://api.telegram.org");
        assert_eq!(config.poll_timeout_secs, 30);
        assert_eq!(config.log_format, "human");
        assert_eq!(config.default_policy.vote_time, 600);
        assert_eq!(config.default_policy.mini_voters, 3);
        assert!(config.log_channel.target().is_none());
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            bot_token = "123:abc"
            cleanup_delay_secs = 5

            [log_channel]
            enable = true
            channel_id = -1001
            message_thread_id = 0

            [default_policy]
            vote_time = 10
            advanced_vote = true
        "#;
        let config = NodeConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.cleanup_delay_secs, 5);
        assert_eq!(config.log_channel.target(), Some((ChatId(-1001), None)));
        // Clamped into the allowed range.
        assert_eq!(config.default_policy.vote_time, 30);
        assert!(config.default_policy.advanced_vote);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_token_fails_validation() {
        let err = NodeConfig::default().validate().unwrap_err();
        assert!(matches!(err, NodeError::Config(_)));
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("joinvote.toml");
        std::fs::write(&path, "bot_token = \"123:abc\"\nmetrics_port = 9000\n").unwrap();
        let config = NodeConfig::from_toml_file(&path).unwrap();
        assert_eq!(config.bot_token, "123:abc");
        assert_eq!(config.metrics_port, 9000);
    }

    #[test]
    fn missing_file_returns_config_error() {
        let result = NodeConfig::from_toml_file("/nonexistent/joinvote.toml");
        assert!(matches!(result, Err(NodeError::Config(_))));
    }
}
