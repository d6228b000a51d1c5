use anyhow::Result;
use serde::Deserialize;
use std::path::PathBuf;

/// Returns the inkline base directory: `~/.inkline`, fallback `/tmp/inkline`.
pub fn inkline_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".inkline"))
        .unwrap_or_else(|| PathBuf::from("/tmp/inkline"))
}

fn default_config_path() -> PathBuf {
    inkline_dir().join("completion.toml")
}

// ---------------------------------------------------------------------------
// Completion config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct CompletionConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Provider strategy name, e.g. "single-line" or "multi-line".
    #[serde(default = "default_strategy")]
    pub strategy: String,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Parallel requests per cycle; first non-empty result wins.
    #[serde(default = "default_n")]
    pub default_n: usize,
    /// Upper bound on concurrent remote calls across all sessions.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_requests: usize,
    #[serde(default)]
    pub endpoint: EndpointConfig,
    #[serde(default)]
    pub budget: BudgetConfig,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            strategy: default_strategy(),
            debounce_ms: default_debounce_ms(),
            default_n: default_n(),
            max_concurrent_requests: default_max_concurrent(),
            endpoint: EndpointConfig::default(),
            budget: BudgetConfig::default(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_strategy() -> String {
    "single-line".to_string()
}

fn default_debounce_ms() -> u64 {
    20
}

fn default_n() -> usize {
    2
}

fn default_max_concurrent() -> usize {
    2
}

#[derive(Debug, Clone, Deserialize)]
pub struct EndpointConfig {
    #[serde(default = "default_backend_type")]
    pub backend_type: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
    /// Shell command whose stdout is the API key. Takes precedence over
    /// `api_key` when both are set.
    #[serde(default)]
    pub api_key_cmd: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            backend_type: default_backend_type(),
            model: default_model(),
            api_key: None,
            api_key_cmd: None,
            base_url: None,
        }
    }
}

fn default_backend_type() -> String {
    "anthropic".to_string()
}

fn default_model() -> String {
    "claude-3-5-haiku-20241022".to_string()
}

/// Token budgets. Character allowances derive from these via
/// `CHARS_PER_TOKEN`.
#[derive(Debug, Clone, Deserialize)]
pub struct BudgetConfig {
    #[serde(default = "default_prefix_tokens")]
    pub prefix_tokens: usize,
    #[serde(default = "default_suffix_tokens")]
    pub suffix_tokens: usize,
    /// Total prompt allowance: prefix, suffix and reference snippets
    /// combined.
    #[serde(default = "default_prompt_tokens")]
    pub prompt_tokens: usize,
    #[serde(default = "default_response_tokens")]
    pub response_tokens: usize,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            prefix_tokens: default_prefix_tokens(),
            suffix_tokens: default_suffix_tokens(),
            prompt_tokens: default_prompt_tokens(),
            response_tokens: default_response_tokens(),
        }
    }
}

/// Rough chars-per-token estimate used to turn token budgets into
/// character budgets.
pub const CHARS_PER_TOKEN: usize = 4;

impl BudgetConfig {
    pub fn max_prefix_chars(&self) -> usize {
        self.prefix_tokens * CHARS_PER_TOKEN
    }

    pub fn max_suffix_chars(&self) -> usize {
        self.suffix_tokens * CHARS_PER_TOKEN
    }

    pub fn max_prompt_chars(&self) -> usize {
        self.prompt_tokens * CHARS_PER_TOKEN
    }
}

fn default_prefix_tokens() -> usize {
    256
}

fn default_suffix_tokens() -> usize {
    64
}

fn default_prompt_tokens() -> usize {
    640
}

fn default_response_tokens() -> usize {
    128
}

// ---------------------------------------------------------------------------
// Config source
// ---------------------------------------------------------------------------

/// Configuration is consulted at the start of every completion cycle and
/// never cached across cycles, so settings edits take effect on the next
/// keystroke.
pub trait ConfigSource: Send + Sync {
    fn load(&self) -> Result<CompletionConfig>;
}

/// Reads `completion.toml` on every load. Missing file means defaults.
pub struct FileConfigSource {
    path: PathBuf,
}

impl FileConfigSource {
    pub fn new() -> Self {
        let path = std::env::var("INKLINE_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_config_path());
        Self { path }
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }
}

impl Default for FileConfigSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigSource for FileConfigSource {
    fn load(&self) -> Result<CompletionConfig> {
        if self.path.exists() {
            let contents = std::fs::read_to_string(&self.path)?;
            Ok(toml::from_str(&contents)?)
        } else {
            tracing::debug!("no config file at {}, using defaults", self.path.display());
            Ok(CompletionConfig::default())
        }
    }
}
