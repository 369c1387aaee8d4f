use std::sync::Arc;

use anyhow::{Context, Result};
use hostpanel_auth::{
    FileStore, HttpAuthApi, MemoryStore, Navigator, Notifier, SessionManager, TokenStore,
};
use hostpanel_config::AppConfig;
use tracing::info;

pub mod telemetry {
    use anyhow::Result;
    use tracing::Level;
    use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

    pub fn init_tracing() -> Result<()> {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let subscriber = SubscriberBuilder::default()
            .with_max_level(Level::DEBUG)
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .map_err(|error| anyhow::anyhow!("failed to set tracing subscriber: {error}"))
    }
}

/// Persistent scope on disk at the configured path, ephemeral scope in memory.
pub fn token_store(config: &AppConfig) -> TokenStore {
    TokenStore::new(
        Arc::new(FileStore::new(config.session.token_store_path.clone())),
        Arc::new(MemoryStore::new()),
    )
}

pub struct DashboardServices {
    pub config: AppConfig,
    pub session: SessionManager<HttpAuthApi>,
}

impl DashboardServices {
    pub fn initialise(
        config: AppConfig,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let api = HttpAuthApi::new(&config.api).context("failed to build auth api client")?;

        let session = SessionManager::new(api, token_store(&config), navigator, notifier)
            .with_logout_redirect_delay(config.session.logout_redirect_delay());

        info!(
            api = %config.api.base_url,
            token_store = %config.session.token_store_path.display(),
            "session manager ready"
        );

        Ok(Self { config, session })
    }
}
