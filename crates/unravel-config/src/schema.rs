//! Configuration schema definitions.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub oracle: OracleConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Deobfuscation engine defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Default wall-clock budget for one request.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Default for requests that omit `useASTOptimization`.
    #[serde(default = "default_true")]
    pub use_ast_optimization: bool,

    /// Upper bound on optimizer iterations.
    #[serde(default = "default_optimizer_iterations")]
    pub optimizer_iterations: usize,

    /// Identifiers with at most this many uses are inlined.
    #[serde(default = "default_inline_threshold")]
    pub inline_threshold: usize,

    /// Characters of source sent to the oracle for control-flow unflattening.
    #[serde(default = "default_oracle_snippet_limit")]
    pub oracle_snippet_limit: usize,

    /// Run the final oracle cleanup stage when an oracle is available.
    #[serde(default = "default_true")]
    pub llm_cleanup: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            use_ast_optimization: true,
            optimizer_iterations: default_optimizer_iterations(),
            inline_threshold: default_inline_threshold(),
            oracle_snippet_limit: default_oracle_snippet_limit(),
            llm_cleanup: true,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_timeout_ms() -> u64 {
    60_000
}

fn default_optimizer_iterations() -> usize {
    3
}

fn default_inline_threshold() -> usize {
    3
}

fn default_oracle_snippet_limit() -> usize {
    2000
}

/// LLM oracle backend (any OpenAI-compatible chat completions endpoint).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: default_base_url(),
            api_key: None,
            model: default_model(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

/// MCP server identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_name")]
    pub name: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: default_server_name(),
        }
    }
}

fn default_server_name() -> String {
    "unravel".to_string()
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,

    /// Directory for daily rolling log files; console-only when unset.
    #[serde(default)]
    pub dir: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            dir: None,
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
