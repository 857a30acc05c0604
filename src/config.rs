//! Configuration loading with env-var overrides.
//!
//! Reads `config/default.toml` relative to the current working directory
//! (or an explicit `-f` path), then applies `TUTOR_WORK_DIR` and
//! `TUTOR_LOG_LEVEL` env overrides. When no file is given and the default
//! file is missing, a hardcoded default is used.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::error::AppError;

/// HTTP listener configuration.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Socket address to bind the server to.
    pub bind: String,
}

/// OpenAI / OpenAI-compatible provider configuration.
/// Populated from `[llm.openai]` in the TOML.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Full chat completions endpoint URL.
    pub api_base_url: String,
    /// Model name passed in the request body.
    pub model: String,
    /// Upper bound on generated tokens per request.
    pub max_tokens: u32,
    /// Sampling temperature (ignored for models that forbid it).
    pub temperature: f32,
    /// Per-request HTTP timeout in seconds.
    pub timeout_seconds: u64,
}

/// LLM configuration.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Which provider is active (`"dummy"`, `"openai"`).
    /// Maps to `default` in `[llm]`.
    pub provider: String,
    pub openai: OpenAiConfig,
}

/// Markdown rendering options.
#[derive(Debug, Clone, Default)]
pub struct RenderConfig {
    /// Escape raw HTML found in generated documents instead of passing it through.
    pub escape_html: bool,
}

/// Fully-resolved configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub app_name: String,
    /// Working directory for the SQLite database (already expanded, no `~`).
    pub work_dir: PathBuf,
    pub log_level: String,
    pub http: HttpConfig,
    pub llm: LlmConfig,
    /// Optional directory holding `syllabus.txt` / `content.txt` prompt overrides.
    pub prompts_dir: Option<PathBuf>,
    pub render: RenderConfig,
    /// API key from `LLM_API_KEY` (or `OPENAI_KEY`). Never sourced from TOML.
    pub llm_api_key: Option<String>,
}

/// Raw TOML shape: `serde` target before resolution.
#[derive(Deserialize)]
struct RawConfig {
    server: RawServer,
    #[serde(default)]
    http: RawHttp,
    #[serde(default)]
    llm: RawLlm,
    #[serde(default)]
    prompts: RawPrompts,
    #[serde(default)]
    render: RawRender,
}

#[derive(Deserialize)]
struct RawServer {
    #[serde(default = "default_app_name")]
    app_name: String,
    work_dir: String,
    #[serde(default = "default_log_level")]
    log_level: String,
}

#[derive(Deserialize)]
struct RawHttp {
    #[serde(default = "default_http_bind")]
    bind: String,
}

impl Default for RawHttp {
    fn default() -> Self {
        Self { bind: default_http_bind() }
    }
}

#[derive(Deserialize)]
struct RawLlm {
    #[serde(rename = "default", default = "default_llm_provider")]
    provider: String,
    #[serde(default)]
    openai: RawOpenAiConfig,
}

impl Default for RawLlm {
    fn default() -> Self {
        Self { provider: default_llm_provider(), openai: RawOpenAiConfig::default() }
    }
}

#[derive(Deserialize)]
struct RawOpenAiConfig {
    #[serde(default = "default_openai_api_base_url")]
    api_base_url: String,
    #[serde(default = "default_openai_model")]
    model: String,
    #[serde(default = "default_max_tokens")]
    max_tokens: u32,
    #[serde(default = "default_openai_temperature")]
    temperature: f32,
    #[serde(default = "default_openai_timeout_seconds")]
    timeout_seconds: u64,
}

impl Default for RawOpenAiConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_openai_api_base_url(),
            model: default_openai_model(),
            max_tokens: default_max_tokens(),
            temperature: default_openai_temperature(),
            timeout_seconds: default_openai_timeout_seconds(),
        }
    }
}

#[derive(Deserialize, Default)]
struct RawPrompts {
    dir: Option<String>,
}

#[derive(Deserialize, Default)]
struct RawRender {
    #[serde(default)]
    escape_html: bool,
}

fn default_app_name() -> String { "tutor-bot".to_string() }
fn default_log_level() -> String { "info".to_string() }
fn default_http_bind() -> String { "127.0.0.1:8080".to_string() }
fn default_llm_provider() -> String { "dummy".to_string() }
fn default_openai_api_base_url() -> String { "https://api.openai.com/v1/chat/completions".to_string() }
fn default_openai_model() -> String { "gpt-4o-mini".to_string() }
fn default_max_tokens() -> u32 { 512 }
fn default_openai_temperature() -> f32 { 0.7 }
fn default_openai_timeout_seconds() -> u64 { 60 }

/// Load config from the given path, or `config/default.toml`, then apply env overrides.
pub fn load(config_path: Option<&str>) -> Result<Config, AppError> {
    let work_dir_override = env::var("TUTOR_WORK_DIR").ok();
    let log_level_override = env::var("TUTOR_LOG_LEVEL").ok();

    if let Some(path) = config_path {
        return load_from(
            Path::new(path),
            work_dir_override.as_deref(),
            log_level_override.as_deref(),
        );
    }

    let default_path = Path::new("config/default.toml");
    if default_path.exists() {
        return load_from(
            default_path,
            work_dir_override.as_deref(),
            log_level_override.as_deref(),
        );
    }

    let work_dir = expand_home(work_dir_override.as_deref().unwrap_or("~/.tutor-bot"));
    let log_level = log_level_override.unwrap_or_else(default_log_level);
    let llm = RawLlm::default();

    Ok(Config {
        app_name: default_app_name(),
        work_dir,
        log_level,
        http: HttpConfig { bind: default_http_bind() },
        llm: resolve_llm(llm),
        prompts_dir: None,
        render: RenderConfig::default(),
        llm_api_key: api_key_from_env(),
    })
}

/// Internal loader: accepts an explicit path and optional overrides.
/// Tests pass overrides directly instead of mutating env vars.
pub fn load_from(
    path: &Path,
    work_dir_override: Option<&str>,
    log_level_override: Option<&str>,
) -> Result<Config, AppError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;

    let parsed: RawConfig = toml::from_str(&raw)
        .map_err(|e| AppError::Config(format!("parse error in {}: {e}", path.display())))?;

    let s = parsed.server;
    let work_dir = expand_home(work_dir_override.unwrap_or(&s.work_dir));
    let log_level = log_level_override.unwrap_or(&s.log_level).to_string();

    // Relative prompt dirs resolve against the config file's directory.
    let prompts_dir = parsed.prompts.dir.map(|dir| {
        let p = expand_home(&dir);
        if p.is_absolute() {
            p
        } else {
            path.parent().unwrap_or(Path::new(".")).join(p)
        }
    });

    Ok(Config {
        app_name: s.app_name,
        work_dir,
        log_level,
        http: HttpConfig { bind: parsed.http.bind },
        llm: resolve_llm(parsed.llm),
        prompts_dir,
        render: RenderConfig { escape_html: parsed.render.escape_html },
        llm_api_key: api_key_from_env(),
    })
}

fn resolve_llm(raw: RawLlm) -> LlmConfig {
    LlmConfig {
        provider: raw.provider,
        openai: OpenAiConfig {
            api_base_url: raw.openai.api_base_url,
            model: raw.openai.model,
            max_tokens: raw.openai.max_tokens,
            temperature: raw.openai.temperature,
            timeout_seconds: raw.openai.timeout_seconds,
        },
    }
}

fn api_key_from_env() -> Option<String> {
    env::var("LLM_API_KEY")
        .or_else(|_| env::var("OPENAI_KEY"))
        .ok()
        .filter(|k| !k.trim().is_empty())
}

/// Expand a leading `~` to the user's home directory.
/// Absolute or relative paths without `~` are returned unchanged.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

// ── test helpers ──────────────────────────────────────────────────────────────

/// Safe `Config` for unit tests: dummy LLM, no API keys, no external calls.
#[cfg(test)]
impl Config {
    pub fn test_default(work_dir: &Path) -> Self {
        Self {
            app_name: "test".into(),
            work_dir: work_dir.to_path_buf(),
            log_level: "info".into(),
            http: HttpConfig { bind: "127.0.0.1:0".into() },
            llm: LlmConfig {
                provider: "dummy".into(),
                openai: OpenAiConfig {
                    api_base_url: "http://localhost:0/v1/chat/completions".into(),
                    model: "test-model".into(),
                    max_tokens: 512,
                    temperature: 0.0,
                    timeout_seconds: 1,
                },
            },
            prompts_dir: None,
            render: RenderConfig::default(),
            llm_api_key: None,
        }
    }
}
