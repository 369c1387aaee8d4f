use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

const DEFAULT_CONFIG_FILES: &[&str] = &[
    "hostpanel.toml",
    "config/hostpanel.toml",
    "crates/config/hostpanel.toml",
    "../hostpanel.toml",
    "../config/hostpanel.toml",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub session: SessionConfig,
}

/// Where the dashboard's authentication API lives.
///
/// ```
/// use hostpanel_config::ApiConfig;
///
/// let api = ApiConfig::default();
/// assert_eq!(api.base_url, "http://127.0.0.1:8080/api");
/// assert_eq!(api.request_timeout().as_secs(), 30);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "ApiConfig::default_base_url")]
    pub base_url: String,
    #[serde(default = "ApiConfig::default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl ApiConfig {
    fn default_base_url() -> String {
        "http://127.0.0.1:8080/api".to_string()
    }

    const fn default_request_timeout() -> u64 {
        30
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: Self::default_base_url(),
            request_timeout_seconds: Self::default_request_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// File backing the persistent ("remember me") token scope.
    #[serde(default = "SessionConfig::default_token_store_path")]
    pub token_store_path: PathBuf,
    /// Pause between clearing the session and redirecting to the login page.
    #[serde(default = "SessionConfig::default_logout_redirect_delay")]
    pub logout_redirect_delay_ms: u64,
}

impl SessionConfig {
    fn default_token_store_path() -> PathBuf {
        PathBuf::from("hostpanel-session.json")
    }

    const fn default_logout_redirect_delay() -> u64 {
        100
    }

    pub fn logout_redirect_delay(&self) -> Duration {
        Duration::from_millis(self.logout_redirect_delay_ms)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            token_store_path: Self::default_token_store_path(),
            logout_redirect_delay_ms: Self::default_logout_redirect_delay(),
        }
    }
}

/// Load the application configuration by combining defaults, files, and environment overrides.
///
/// ```
/// use hostpanel_config::load;
///
/// std::env::remove_var("HOSTPANEL_CONFIG");
///
/// let config = load().expect("configuration should load with defaults");
/// assert!(!config.api.base_url.is_empty());
/// ```
pub fn load() -> anyhow::Result<AppConfig> {
    let defaults = AppConfig::default();

    let timeout = i64::try_from(defaults.api.request_timeout_seconds).unwrap_or(i64::MAX);
    let logout_delay = i64::try_from(defaults.session.logout_redirect_delay_ms).unwrap_or(i64::MAX);

    let mut builder = config::Config::builder()
        .set_default("api.base_url", defaults.api.base_url.clone())
        .context("invalid default for api.base_url")?
        .set_default("api.request_timeout_seconds", timeout)
        .context("invalid default for api.request_timeout_seconds")?
        .set_default(
            "session.token_store_path",
            defaults.session.token_store_path.display().to_string(),
        )
        .context("invalid default for session.token_store_path")?
        .set_default("session.logout_redirect_delay_ms", logout_delay)
        .context("invalid default for session.logout_redirect_delay_ms")?;

    let environment_overrides = config::Environment::with_prefix("HOSTPANEL").separator("__");

    let mut config_file_attached = false;

    if let Ok(path) = std::env::var("HOSTPANEL_CONFIG") {
        builder = builder.add_source(config::File::from(PathBuf::from(&path)));
        config_file_attached = true;
        debug!(path, "loading configuration via HOSTPANEL_CONFIG");
    } else if let Ok(cwd) = std::env::current_dir() {
        let fallback = DEFAULT_CONFIG_FILES
            .iter()
            .map(|candidate| cwd.join(candidate))
            .find(|path| path.exists());

        if let Some(path) = fallback {
            debug!(path = %path.display(), "loading configuration file");
            builder = builder.add_source(config::File::from(path));
            config_file_attached = true;
        }
    }

    if !config_file_attached {
        debug!("no configuration file found, relying on defaults and environment overrides");
    }

    builder = builder.add_source(environment_overrides);

    let cfg = builder.build().context("unable to build configuration")?;

    let mut config = cfg
        .try_deserialize::<AppConfig>()
        .context("invalid configuration")?;

    let trimmed = config.api.base_url.trim_end_matches('/').to_string();
    config.api.base_url = trimmed;

    if config.api.base_url.is_empty() {
        anyhow::bail!("api.base_url must not be empty");
    }

    debug!(?config, "loaded dashboard configuration");
    Ok(config)
}
