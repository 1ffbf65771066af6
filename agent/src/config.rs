//! Configuration loading
//!
//! Settings are resolved once per process, in increasing priority:
//! built-in defaults, `.axiom.toml`, environment variables (a `.env` file
//! is loaded into the environment first), then CLI flags applied by `main`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Name of the optional settings file
pub const SETTINGS_FILE: &str = ".axiom.toml";

/// Name of the MCP server config file looked up when no path is configured
pub const MCP_CONFIG_FILE: &str = ".mcp.json";

/// Find a config file by walking up the directory tree, then checking global config.
///
/// Search order:
/// 1. Current directory and parent directories (walking up to root)
/// 2. Global config at ~/.config/axiom/
fn find_config_file(filename: &str) -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let candidate = current.join(filename);
        if candidate.exists() {
            return Some(candidate);
        }

        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => break,
        }
    }

    if let Some(config_dir) = dirs::config_dir() {
        let global_path = config_dir.join("axiom").join(filename);
        if global_path.exists() {
            return Some(global_path);
        }
    }

    None
}

/// Errors raised while resolving settings
#[derive(Error, Debug)]
pub enum SettingsError {
    /// No API key in the environment or settings file
    #[error("no API key configured - set AXIOM_API_KEY (or GOOGLE_API_KEY)")]
    MissingApiKey,

    /// A value could not be parsed
    #[error("invalid value for {key}: '{value}' ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },

    /// The settings file could not be read
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The settings file is not valid TOML for this schema
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

// ============================================================================
// Settings file (.axiom.toml)
// ============================================================================

/// Top-level settings file layout
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub llm: LlmSection,
    #[serde(default)]
    pub agent: AgentSection,
    #[serde(default)]
    pub mcp: McpSection,
}

/// `[llm]` section
#[derive(Debug, Default, Deserialize)]
pub struct LlmSection {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub default_model: Option<String>,
    pub ask_model: Option<String>,
    pub available_models: Option<Vec<String>>,
    pub max_response_tokens: Option<u32>,
}

/// `[agent]` section
#[derive(Debug, Default, Deserialize)]
pub struct AgentSection {
    pub name: Option<String>,
    pub tracing: Option<bool>,
    pub max_docs_tokens: Option<u32>,
}

/// `[mcp]` section
#[derive(Debug, Default, Deserialize)]
pub struct McpSection {
    pub config: Option<PathBuf>,
    pub docs_server: Option<String>,
    pub startup_timeout_secs: Option<u64>,
}

impl FileConfig {
    /// Load `.axiom.toml` from the directory tree or the global config dir,
    /// falling back to an empty config.
    pub fn load() -> Result<Self, SettingsError> {
        if let Some(path) = find_config_file(SETTINGS_FILE) {
            tracing::debug!("Loading settings from: {}", path.display());
            return Self::load_from_path(&path);
        }

        tracing::debug!("No {} found, using defaults", SETTINGS_FILE);
        Ok(Self::default())
    }

    /// Load from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

// ============================================================================
// Settings
// ============================================================================

// Default value functions
fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta/openai/".to_string()
}

fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_ask_model() -> String {
    "gemini-2.0-flash-lite".to_string()
}

fn default_available_models() -> Vec<String> {
    [
        "gemini-2.0-flash",
        "gemini-2.0-flash-lite",
        "gemini-2.0-flash-thinking-exp-1219",
        "gemini-2.5-pro-exp-03-25",
        "gemini-2.5-flash-preview-04-17",
    ]
    .iter()
    .map(|m| m.to_string())
    .collect()
}

fn default_agent_name() -> String {
    "Axiom".to_string()
}

fn default_docs_server() -> String {
    "context7".to_string()
}

const DEFAULT_MAX_DOCS_TOKENS: u32 = 20_000;
const DEFAULT_STARTUP_TIMEOUT_SECS: u64 = 30;

/// Process-wide settings, immutable once resolved
#[derive(Debug, Clone)]
pub struct Settings {
    /// API key for the chat completions endpoint
    pub api_key: Option<String>,
    /// Base URL of the OpenAI-compatible endpoint
    pub base_url: String,
    /// Model used in build mode
    pub default_model: String,
    /// Model used in ask mode
    pub ask_model: String,
    /// Models shown by `models` / `/models`
    pub available_models: Vec<String>,
    /// Agent display name
    pub agent_name: String,
    /// Path of the MCP server config file
    pub mcp_config_path: PathBuf,
    /// Tool server exposed in ask mode
    pub docs_server: String,
    /// Log every agent run step at info level
    pub tracing_enabled: bool,
    /// Upper bound of tokens the agent may pull from documentation tools
    pub max_docs_tokens: u32,
    /// Per-request completion token ceiling
    pub max_response_tokens: Option<u32>,
    /// Bound on spawning and initializing one tool server
    pub startup_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            default_model: default_model(),
            ask_model: default_ask_model(),
            available_models: default_available_models(),
            agent_name: default_agent_name(),
            mcp_config_path: PathBuf::from(MCP_CONFIG_FILE),
            docs_server: default_docs_server(),
            tracing_enabled: false,
            max_docs_tokens: DEFAULT_MAX_DOCS_TOKENS,
            max_response_tokens: None,
            startup_timeout: Duration::from_secs(DEFAULT_STARTUP_TIMEOUT_SECS),
        }
    }
}

impl Settings {
    /// Resolve settings from `.env`, `.axiom.toml` and the process environment
    pub fn load() -> Result<Self, SettingsError> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!("Loaded environment from {}", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => tracing::warn!("Ignoring unreadable .env file: {}", e),
        }

        let file = FileConfig::load()?;
        let env = |key: &str| std::env::var(key).ok();
        let configured = mcp_config_configured(&file, env);
        let mut settings = Self::resolve(file, env)?;

        if !configured {
            settings.mcp_config_path =
                discover_mcp_config(settings.mcp_config_path, |name| find_config_file(name));
        }

        Ok(settings)
    }

    /// Merge defaults, a settings file and an environment lookup
    pub fn resolve<F>(file: FileConfig, env: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let env = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let api_key = env("AXIOM_API_KEY")
            .or_else(|| env("GOOGLE_API_KEY"))
            .or(file.llm.api_key);

        let base_url = env("AXIOM_BASE_URL")
            .or(file.llm.base_url)
            .unwrap_or(defaults.base_url);
        if let Err(e) = url::Url::parse(&base_url) {
            return Err(SettingsError::InvalidValue {
                key: "AXIOM_BASE_URL",
                value: base_url,
                reason: e.to_string(),
            });
        }

        let tracing_enabled = match env("AXIOM_TRACING") {
            Some(raw) => parse_bool("AXIOM_TRACING", &raw)?,
            None => file.agent.tracing.unwrap_or(defaults.tracing_enabled),
        };

        let max_docs_tokens = match env("AXIOM_MAX_DOCS_TOKENS") {
            Some(raw) => parse_number("AXIOM_MAX_DOCS_TOKENS", &raw)?,
            None => file.agent.max_docs_tokens.unwrap_or(defaults.max_docs_tokens),
        };

        let max_response_tokens = match env("AXIOM_MAX_RESPONSE_TOKENS") {
            Some(raw) => Some(parse_number("AXIOM_MAX_RESPONSE_TOKENS", &raw)?),
            None => file.llm.max_response_tokens,
        };

        let startup_timeout = match env("AXIOM_MCP_STARTUP_TIMEOUT") {
            Some(raw) => Duration::from_secs(parse_number("AXIOM_MCP_STARTUP_TIMEOUT", &raw)?),
            None => file
                .mcp
                .startup_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.startup_timeout),
        };

        Ok(Self {
            api_key,
            base_url,
            default_model: env("AXIOM_DEFAULT_MODEL")
                .or(file.llm.default_model)
                .unwrap_or(defaults.default_model),
            ask_model: env("AXIOM_ASK_MODEL")
                .or(file.llm.ask_model)
                .unwrap_or(defaults.ask_model),
            available_models: file.llm.available_models.unwrap_or(defaults.available_models),
            agent_name: env("AXIOM_AGENT_NAME")
                .or(file.agent.name)
                .unwrap_or(defaults.agent_name),
            mcp_config_path: env("AXIOM_MCP_CONFIG")
                .map(PathBuf::from)
                .or(file.mcp.config)
                .unwrap_or(defaults.mcp_config_path),
            docs_server: env("AXIOM_DOCS_SERVER")
                .or(file.mcp.docs_server)
                .unwrap_or(defaults.docs_server),
            tracing_enabled,
            max_docs_tokens,
            max_response_tokens,
            startup_timeout,
        })
    }

    /// The API key, or an error for commands that talk to the model
    pub fn require_api_key(&self) -> Result<&str, SettingsError> {
        self.api_key.as_deref().ok_or(SettingsError::MissingApiKey)
    }
}

/// Whether the settings file or environment names an MCP config path
fn mcp_config_configured<F>(file: &FileConfig, env: F) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    file.mcp.config.is_some() || env("AXIOM_MCP_CONFIG").is_some_and(|v| !v.trim().is_empty())
}

/// Fall back to a `.mcp.json` further up the tree or in the global config
/// dir when the default path does not exist here
fn discover_mcp_config<F>(default_path: PathBuf, find: F) -> PathBuf
where
    F: Fn(&str) -> Option<PathBuf>,
{
    if default_path.is_absolute() || default_path.exists() {
        return default_path;
    }
    find(MCP_CONFIG_FILE).unwrap_or(default_path)
}

fn parse_bool(key: &'static str, raw: &str) -> Result<bool, SettingsError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(SettingsError::InvalidValue {
            key,
            value: raw.to_string(),
            reason: "expected true or false".to_string(),
        }),
    }
}

fn parse_number<T>(key: &'static str, raw: &str) -> Result<T, SettingsError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e: T::Err| SettingsError::InvalidValue {
            key,
            value: raw.to_string(),
            reason: e.to_string(),
        })
}
