//! Application configuration.
//!
//! Values come from the environment (and an optional `.env` file loaded at
//! startup). The anon key is meant to be shipped with the client, but the
//! session file holds refresh tokens and should be kept private.

use anyhow::{Context, bail};
use chrono::NaiveDate;
use chrono_tz::Tz;
use envconfig::Envconfig;
use std::sync::OnceLock;

#[derive(Envconfig, Clone, Debug)]
pub struct AppConfig {
    /// Environment name (NON-SENSITIVE)
    /// Values: "local", "dev", "prod"
    #[envconfig(from = "CHIPDOG_ENV", default = "local")]
    pub env: String,

    /// Base url of the backend project (NON-SENSITIVE)
    /// Example: "https://abcd.supabase.co"
    #[envconfig(from = "SUPABASE_URL")]
    pub supabase_url: Option<String>,

    /// Anon key of the backend project (SEMI-SENSITIVE)
    /// Row level security is what protects the data, not this key
    #[envconfig(from = "SUPABASE_ANON_KEY")]
    pub supabase_anon_key: Option<String>,

    /// 🔒 SENSITIVE PATH: file holding the persisted auth session
    #[envconfig(from = "CHIPDOG_SESSION_PATH", default = ".chipdog-session.json")]
    pub session_path: String,

    /// Log file, stdout is used by the terminal front end
    #[envconfig(from = "CHIPDOG_LOG_PATH", default = "chipdog.log")]
    pub log_path: String,

    /// Timezone used to decide what "today" is
    #[envconfig(from = "CHIPDOG_TIMEZONE", default = "America/Santiago")]
    pub timezone: String,

    /// 🔒 SENSITIVE: logfire write token, spans are only exported when set
    #[envconfig(from = "LOGFIRE_TOKEN")]
    pub logfire_token: Option<String>,
}

impl AppConfig {
    /// Backend base url without trailing slash
    pub fn backend_url(&self) -> anyhow::Result<String> {
        match self.supabase_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => Ok(url.trim_end_matches('/').to_string()),
            _ => bail!("missing SUPABASE_URL or SUPABASE_ANON_KEY"),
        }
    }

    pub fn anon_key(&self) -> anyhow::Result<String> {
        match self.supabase_anon_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => Ok(key.to_string()),
            _ => bail!("missing SUPABASE_URL or SUPABASE_ANON_KEY"),
        }
    }

    pub fn tz(&self) -> anyhow::Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| anyhow::anyhow!("invalid CHIPDOG_TIMEZONE {}: {}", self.timezone, e))
    }

    /// Current date in the configured timezone, falls back to UTC
    pub fn today(&self) -> NaiveDate {
        let now = chrono::Utc::now();
        match self.tz() {
            Ok(tz) => now.with_timezone(&tz).date_naive(),
            Err(_) => now.date_naive(),
        }
    }
}

/// Global application configuration, set once by [`init_config`]
pub static APP_CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// Today in the configured timezone, UTC before the configuration is loaded
pub fn today() -> NaiveDate {
    APP_CONFIG
        .get()
        .map(AppConfig::today)
        .unwrap_or_else(|| chrono::Utc::now().date_naive())
}

/// Loads `.env` (if any) and the environment into [`APP_CONFIG`]
pub fn init_config() -> anyhow::Result<&'static AppConfig> {
    let _ = dotenvy::dotenv();

    let app_config = AppConfig::init_from_env().context("failed to read configuration")?;
    app_config.backend_url()?;
    app_config.anon_key()?;
    app_config.tz()?;

    Ok(APP_CONFIG.get_or_init(|| app_config))
}
