//! Configuration management for Redraft
//!
//! Supports environment variables, config files, and runtime overrides.
//!
//! Config file location: ~/.config/redraft/config.toml

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

use crate::core::error::{RedraftError, Result};

/// Main configuration for Redraft
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Whether to print debug output
    #[serde(default)]
    pub debug: bool,
    /// Ollama configuration
    pub ollama: OllamaConfig,
    /// Model configuration
    pub models: ModelConfig,
    /// Refinement chat configuration
    pub chat: ChatConfig,
    /// Assistant (tool-calling) mode configuration
    #[serde(default)]
    pub assistant: AssistantConfig,
    /// Web search plugin configuration
    #[serde(default)]
    pub search: SearchConfig,
    /// Demo database configuration
    #[serde(default)]
    pub database: DatabaseConfig,
}

/// Ollama server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// Host address (default: localhost)
    pub host: String,
    /// Port number (default: 11434)
    pub port: u16,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model used for agent turns
    pub chat: String,
    /// Model used for model-backed selection/termination policies
    /// Defaults to the chat model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<String>,
}

/// How the selection and termination decisions are realized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    /// Deterministic rule table (two-agent alternation, token match)
    #[default]
    Rules,
    /// Natural-language prompt evaluated by the policy model
    Model,
}

/// Refinement chat behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Unconditional cap on agent turns per submission
    /// Default: 10
    pub max_iterations: usize,
    /// Number of most recent messages presented to the policies
    /// Default: 2
    pub evaluation_window: usize,
    /// Token the reviewer uses to approve the content
    /// Default: "yes"
    pub termination_token: String,
    /// Policy realization (rules or model)
    #[serde(default)]
    pub policy: PolicyKind,
    /// Maximum transcript length kept in memory
    /// Default: 1000
    pub max_history: usize,
}

/// Assistant mode configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// Maximum tool-dispatch rounds for a single reply
    /// Default: 10
    pub max_tool_turns: usize,
    /// Whether to stream reply tokens to the console
    pub streaming: bool,
}

/// Web search plugin configuration
///
/// The subscription key is only ever read from the environment
/// (`REDRAFT_SEARCH_KEY`), never stored in the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Search API endpoint
    pub endpoint: String,
    /// Custom configuration id passed through to the endpoint
    pub custom_config_id: String,
}

/// Demo database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite path; ":memory:" seeds a throwaway demo database
    pub path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debug: env::var("REDRAFT_DEBUG")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            ollama: OllamaConfig::default(),
            models: ModelConfig::default(),
            chat: ChatConfig::default(),
            assistant: AssistantConfig::default(),
            search: SearchConfig::default(),
            database: DatabaseConfig::default(),
        }
    }
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: env::var("OLLAMA_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: env::var("OLLAMA_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(11434),
            timeout_secs: 120,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            chat: env::var("REDRAFT_CHAT_MODEL").unwrap_or_else(|_| "qwen3:8b".to_string()),
            policy: env::var("REDRAFT_POLICY_MODEL").ok(),
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            evaluation_window: 2,
            termination_token: "yes".to_string(),
            policy: PolicyKind::default(),
            max_history: 1000,
        }
    }
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            max_tool_turns: 10,
            streaming: env::var("REDRAFT_STREAMING")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(true),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: env::var("REDRAFT_SEARCH_ENDPOINT")
                .unwrap_or_else(|_| "https://api.bing.microsoft.com/v7.0/custom/search".to_string()),
            custom_config_id: env::var("REDRAFT_SEARCH_CONFIG").unwrap_or_default(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: env::var("REDRAFT_DB_PATH").unwrap_or_else(|_| ":memory:".to_string()),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("redraft")
    }

    /// Get the config file path
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load configuration from file, environment, and defaults
    /// Priority: CLI args > env vars > config file > defaults
    pub fn load() -> Self {
        // Try to load .env file if it exists
        let _ = dotenvy::dotenv();

        // Try to load from config file
        if let Ok(config) = Self::load_from_file() {
            return config;
        }

        // Fall back to defaults (which respect env vars)
        Self::default()
    }

    /// Load configuration from file only
    pub fn load_from_file() -> Result<Self> {
        let config_path = Self::config_file();

        if !config_path.exists() {
            return Err(RedraftError::config("Config file not found"));
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|e| RedraftError::config(format!("Failed to read config: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| RedraftError::config(format!("Failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_dir = Self::config_dir();
        let config_path = Self::config_file();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .map_err(|e| RedraftError::config(format!("Failed to create config dir: {}", e)))?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| RedraftError::config(format!("Failed to serialize config: {}", e)))?;

        fs::write(&config_path, content)
            .map_err(|e| RedraftError::config(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Get the full Ollama API URL
    pub fn ollama_url(&self) -> String {
        format!("http://{}:{}", self.ollama.host, self.ollama.port)
    }

    /// Model used for model-backed policies
    pub fn policy_model(&self) -> &str {
        self.models.policy.as_deref().unwrap_or(&self.models.chat)
    }

    /// Search subscription key, from the environment only
    pub fn search_key() -> Option<String> {
        env::var("REDRAFT_SEARCH_KEY").ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.ollama.port, 11434);
        assert_eq!(config.chat.max_iterations, 10);
        assert_eq!(config.chat.evaluation_window, 2);
        assert_eq!(config.chat.termination_token, "yes");
        assert_eq!(config.chat.policy, PolicyKind::Rules);
        assert_eq!(config.assistant.max_tool_turns, 10);
    }

    #[test]
    fn test_ollama_url() {
        let config = Config::default();
        assert!(config.ollama_url().starts_with("http://"));
    }

    #[test]
    fn test_policy_model_falls_back_to_chat_model() {
        let mut config = Config::default();
        config.models.policy = None;
        assert_eq!(config.policy_model(), config.models.chat);

        config.models.policy = Some("gemma3:4b".to_string());
        assert_eq!(config.policy_model(), "gemma3:4b");
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("max_iterations"));
        assert!(toml_str.contains("termination_token"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.chat.max_iterations, config.chat.max_iterations);
    }
}
