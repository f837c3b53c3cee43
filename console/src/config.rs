//! Console configuration with TOML file support.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for the FIR console.
///
/// Can be loaded from a TOML file via [`ConsoleConfig::from_toml_file`] or
/// built from CLI flags; flags and env vars override file values.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConsoleConfig {
    /// Ledger node JSON-RPC endpoint.
    #[serde(default = "default_rpc_url")]
    pub ledger_rpc_url: String,

    /// Ledger node WebSocket notification endpoint.
    #[serde(default = "default_ws_url")]
    pub ledger_ws_url: String,

    /// Authentication service base URL.
    #[serde(default = "default_auth_url")]
    pub auth_url: String,

    /// Relay base URL for fee-less case submission. Direct submission when
    /// unset.
    #[serde(default)]
    pub relay_url: Option<String>,

    /// Evidence store base URL.
    #[serde(default)]
    pub evidence_url: Option<String>,

    /// Evidence store api key.
    #[serde(default)]
    pub evidence_api_key: String,

    /// Evidence store api secret.
    #[serde(default)]
    pub evidence_api_secret: String,

    /// Chain id the ledger lives on.
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,

    /// Path to the 32-byte hex seed for the console's signing key.
    #[serde(default = "default_key_file")]
    pub key_file: PathBuf,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ConsoleConfig {
    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        toml::from_str("").expect("empty config must deserialize from defaults")
    }
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_rpc_url() -> String {
    "http://127.0.0.1:9550".to_string()
}

fn default_ws_url() -> String {
    "ws://127.0.0.1:9551/ws".to_string()
}

fn default_auth_url() -> String {
    "http://127.0.0.1:3000/api".to_string()
}

fn default_chain_id() -> u64 {
    80002
}

fn default_key_file() -> PathBuf {
    PathBuf::from("./fir_console_key")
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}
