use std::fs;
use std::sync::Arc;

use anyhow::Result;
use hostpanel_auth::{
    AuthState, RecordingNavigator, RecordingNotifier, TokenScope, AUTH_TOKEN_KEY,
};
use hostpanel_config::AppConfig;
use hostpanel_runtime::{token_store, DashboardServices};
use tempfile::TempDir;

fn build_config(temp_dir: &TempDir) -> AppConfig {
    let mut config = AppConfig::default();
    // nothing listens on the discard port
    config.api.base_url = "http://127.0.0.1:9/api".to_string();
    config.api.request_timeout_seconds = 2;
    config.session.token_store_path = temp_dir.path().join("state/session.json");
    config.session.logout_redirect_delay_ms = 0;
    config
}

fn initialise(config: AppConfig) -> Result<(DashboardServices, Arc<RecordingNavigator>)> {
    let navigator = Arc::new(RecordingNavigator::new());
    let services = DashboardServices::initialise(
        config,
        navigator.clone(),
        Arc::new(RecordingNotifier::new()),
    )?;
    Ok((services, navigator))
}

#[test]
fn token_store_persists_remembered_tokens_to_configured_file() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config = build_config(&temp_dir);

    token_store(&config).store("T1", TokenScope::Persistent)?;

    let contents = fs::read_to_string(&config.session.token_store_path)?;
    let document: serde_json::Value = serde_json::from_str(&contents)?;
    assert_eq!(document[AUTH_TOKEN_KEY], "T1");

    let reopened = token_store(&config);
    assert_eq!(reopened.peek(TokenScope::Persistent)?.as_deref(), Some("T1"));
    assert_eq!(reopened.peek(TokenScope::Ephemeral)?, None);
    Ok(())
}

#[test]
fn ephemeral_tokens_never_reach_disk() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config = build_config(&temp_dir);

    token_store(&config).store("T2", TokenScope::Ephemeral)?;

    assert!(!config.session.token_store_path.exists());
    assert_eq!(token_store(&config).load()?, None);
    Ok(())
}

#[tokio::test]
async fn initialise_starts_unresolved_and_bootstraps_offline() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let (services, navigator) = initialise(build_config(&temp_dir))?;

    assert!(services.session.is_loading());
    assert_eq!(services.session.bootstrap().await, AuthState::Anonymous);
    assert!(navigator.visited().is_empty());
    Ok(())
}

#[tokio::test]
async fn unreachable_api_at_bootstrap_clears_stored_token() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config = build_config(&temp_dir);
    token_store(&config).store("stale", TokenScope::Persistent)?;

    let (services, _) = initialise(config.clone())?;
    let state = services.session.bootstrap().await;

    assert_eq!(state, AuthState::Anonymous);
    assert_eq!(token_store(&config).load()?, None);
    Ok(())
}
