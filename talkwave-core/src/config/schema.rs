//! Configuration schema definitions

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Root configuration for talkwave
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Chat client configuration
    #[serde(default)]
    pub client: ClientConfig,
    /// Relay broker configuration
    #[serde(default)]
    pub broker: BrokerConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// How a submitted message leaves the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ChatMode {
    /// Send through the broker; replies come from other clients
    #[default]
    Relay,
    /// Stay offline and answer every message from the canned catalog
    AutoReply,
}

impl fmt::Display for ChatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatMode::Relay => write!(f, "relay"),
            ChatMode::AutoReply => write!(f, "auto-reply"),
        }
    }
}

impl FromStr for ChatMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "relay" => Ok(ChatMode::Relay),
            "auto-reply" | "auto_reply" | "bot" => Ok(ChatMode::AutoReply),
            other => Err(format!(
                "unknown chat mode '{}', expected 'relay' or 'auto-reply'",
                other
            )),
        }
    }
}

/// Chat client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Broker WebSocket endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub mode: ChatMode,
    /// Name sent with every outgoing message
    #[serde(default = "default_display_name")]
    pub display_name: String,
    /// Directory holding the conversation snapshot
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// Canned-reply catalog; the bundled catalog is used when unset
    #[serde(default)]
    pub responses_path: Option<String>,
}

fn default_endpoint() -> String {
    "ws://localhost:19006/ws".to_string()
}

fn default_display_name() -> String {
    "Moi".to_string()
}

fn default_data_dir() -> String {
    "~/.talkwave/data".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            mode: ChatMode::default(),
            display_name: default_display_name(),
            data_dir: default_data_dir(),
            responses_path: None,
        }
    }
}

/// Relay broker configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory served for every non-WebSocket path
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    19006
}

fn default_static_dir() -> String {
    "public".to_string()
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (text, json)
    #[serde(default = "default_log_format")]
    pub format: String,
    /// Directory for log files
    #[serde(default = "default_log_dir")]
    pub dir: String,
    /// Module-specific overrides
    #[serde(default)]
    pub overrides: HashMap<String, String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            dir: default_log_dir(),
            overrides: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_relay_setup() {
        let config = Config::default();
        assert_eq!(config.client.mode, ChatMode::Relay);
        assert_eq!(config.client.display_name, "Moi");
        assert_eq!(config.broker.port, 19006);
        assert!(config.client.endpoint.ends_with(":19006/ws"));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"client": {"mode": "auto-reply"}}"#).unwrap();
        assert_eq!(config.client.mode, ChatMode::AutoReply);
        assert_eq!(config.client.display_name, "Moi");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_chat_mode_from_str() {
        assert_eq!("relay".parse::<ChatMode>().unwrap(), ChatMode::Relay);
        assert_eq!("Auto-Reply".parse::<ChatMode>().unwrap(), ChatMode::AutoReply);
        assert_eq!("bot".parse::<ChatMode>().unwrap(), ChatMode::AutoReply);
        assert!("broadcast".parse::<ChatMode>().is_err());
        assert_eq!(ChatMode::AutoReply.to_string(), "auto-reply");
    }
}
