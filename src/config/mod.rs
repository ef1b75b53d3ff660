use std::env;
use std::time::Duration;

const DEFAULT_GEMINI_MODEL: &str = "gemini-3-flash-preview";
const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 15;

/// Startup configuration for every upstream provider. Loaded once in `main`
/// and handed to `AppState::from_config`; nothing reads the environment after
/// startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase: SupabaseConfig,
    pub gemini: GeminiConfig,
    pub weather_api_key: String,
    pub news_api_key: String,
    /// Bound applied to every upstream call so a stalled provider cannot hold
    /// a request open indefinitely.
    pub upstream_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    pub url: String,
    pub anon_key: String,
    /// Elevated key. When present, signup attempts a best-effort
    /// auto-confirmation of new accounts.
    pub service_role_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variables: {0}")]
    MissingVars(String),
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let required = [
            "SUPABASE_URL",
            "SUPABASE_KEY",
            "GEMINI_API_KEY",
            "WEATHER_API_KEY",
            "NEWS_API_KEY",
        ];
        let missing: Vec<&str> = required
            .iter()
            .copied()
            .filter(|name| !has_var(name))
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::MissingVars(missing.join(", ")));
        }

        let timeout_secs = env::var("UPSTREAM_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_UPSTREAM_TIMEOUT_SECS);

        Ok(Self {
            supabase: SupabaseConfig {
                url: env::var("SUPABASE_URL").unwrap_or_default(),
                anon_key: env::var("SUPABASE_KEY").unwrap_or_default(),
                service_role_key: env::var("SUPABASE_SERVICE_ROLE_KEY")
                    .ok()
                    .filter(|v| !v.trim().is_empty()),
            },
            gemini: GeminiConfig {
                api_key: env::var("GEMINI_API_KEY").unwrap_or_default(),
                model: env::var("GEMINI_MODEL")
                    .ok()
                    .filter(|v| !v.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            },
            weather_api_key: env::var("WEATHER_API_KEY").unwrap_or_default(),
            news_api_key: env::var("NEWS_API_KEY").unwrap_or_default(),
            upstream_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn has_var(name: &str) -> bool {
    env::var(name).map(|v| !v.trim().is_empty()).unwrap_or(false)
}
