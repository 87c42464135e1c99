//! Server configuration, loaded from environment variables at startup.

use std::time::Duration;

use triage_core::llm::{GeminiConfig, DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS};

/// Runtime configuration for triage-server.
///
/// Every field has a default so the server starts without any environment
/// variables set. A missing API key is not an error: the pipeline then runs
/// in degraded mode for every ticket.
#[derive(Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:8000"`).
    pub bind_address: String,

    /// sqlx SQLite URL (default: `"sqlite://data/tickets.db"`). The file and
    /// its parent directory are created when missing.
    pub database_url: String,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,

    /// Serve Swagger UI at `/swagger-ui`.
    pub enable_swagger: bool,

    /// Comma-separated CORS allow list; empty allows any origin.
    pub cors_allowed_origins: String,

    /// Credential for the generation endpoint (`GOOGLE_API_KEY`).
    pub api_key: Option<String>,

    pub llm_model: String,
    pub llm_base_url: String,
    /// Never zero; `0` or garbage in `TRIAGE_LLM_TIMEOUT_SECS` keeps the default.
    pub llm_timeout: Duration,
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build [`Config`] from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let env_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_owned());
        let timeout_secs = parse_or(lookup("TRIAGE_LLM_TIMEOUT_SECS"), DEFAULT_TIMEOUT_SECS);

        Self {
            bind_address: env_or("TRIAGE_BIND", "0.0.0.0:8000"),
            database_url: env_or("TRIAGE_DATABASE_URL", "sqlite://data/tickets.db"),
            log_level: env_or("TRIAGE_LOG", "info"),
            log_json: flag_or(lookup("TRIAGE_LOG_JSON"), false),
            enable_swagger: flag_or(lookup("TRIAGE_ENABLE_SWAGGER"), true),
            cors_allowed_origins: env_or(
                "TRIAGE_CORS_ORIGINS",
                "http://localhost:5173,http://127.0.0.1:5173",
            ),
            api_key: lookup("GOOGLE_API_KEY"),
            llm_model: env_or("TRIAGE_LLM_MODEL", DEFAULT_MODEL),
            llm_base_url: env_or("TRIAGE_LLM_BASE_URL", DEFAULT_BASE_URL),
            llm_timeout: Duration::from_secs(if timeout_secs == 0 {
                DEFAULT_TIMEOUT_SECS
            } else {
                timeout_secs
            }),
        }
    }

    pub fn gemini(&self) -> GeminiConfig {
        GeminiConfig::new(self.api_key.clone())
            .with_model(self.llm_model.clone())
            .with_base_url(self.llm_base_url.clone())
            .with_timeout(self.llm_timeout)
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("bind_address", &self.bind_address)
            .field("database_url", &self.database_url)
            .field("log_level", &self.log_level)
            .field("log_json", &self.log_json)
            .field("enable_swagger", &self.enable_swagger)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("llm_model", &self.llm_model)
            .field("llm_base_url", &self.llm_base_url)
            .field("llm_timeout", &self.llm_timeout)
            .finish()
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn flag_or(value: Option<String>, default: bool) -> bool {
    value
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(default)
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_without_environment() {
        let cfg = config(&[]);
        assert_eq!(cfg.bind_address, "0.0.0.0:8000");
        assert_eq!(cfg.database_url, "sqlite://data/tickets.db");
        assert!(!cfg.log_json);
        assert!(cfg.enable_swagger);
        assert_eq!(
            cfg.cors_allowed_origins,
            "http://localhost:5173,http://127.0.0.1:5173"
        );
        assert!(cfg.api_key.is_none());
        assert_eq!(cfg.llm_timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn flags_accept_one_and_any_case_true() {
        assert!(config(&[("TRIAGE_LOG_JSON", "TRUE")]).log_json);
        assert!(config(&[("TRIAGE_LOG_JSON", "1")]).log_json);
        assert!(!config(&[("TRIAGE_LOG_JSON", "yes")]).log_json);
        assert!(!config(&[("TRIAGE_ENABLE_SWAGGER", "false")]).enable_swagger);
    }

    #[test]
    fn unusable_timeouts_keep_default() {
        let default = Duration::from_secs(DEFAULT_TIMEOUT_SECS);
        assert_eq!(config(&[("TRIAGE_LLM_TIMEOUT_SECS", "soon")]).llm_timeout, default);
        assert_eq!(config(&[("TRIAGE_LLM_TIMEOUT_SECS", "0")]).llm_timeout, default);
        assert_eq!(
            config(&[("TRIAGE_LLM_TIMEOUT_SECS", " 5 ")]).llm_timeout,
            Duration::from_secs(5)
        );
    }

    #[test]
    fn gemini_config_carries_overrides() {
        let cfg = config(&[
            ("GOOGLE_API_KEY", "secret"),
            ("TRIAGE_LLM_MODEL", "gemini-pro"),
            ("TRIAGE_LLM_TIMEOUT_SECS", "7"),
        ]);
        let gemini = cfg.gemini();
        assert_eq!(gemini.model, "gemini-pro");
        assert_eq!(gemini.request_timeout, Duration::from_secs(7));
        assert!(!format!("{cfg:?}").contains("secret"));
    }
}
