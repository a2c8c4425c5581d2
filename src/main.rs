use ecell_portal::app;
use ecell_portal::config::PortalConfig;

/// Main entry point for the portal web server
///
/// Logging follows `RUST_LOG` and defaults to `info`. All other settings come
/// from `PORTAL_*` environment variables, see [`PortalConfig`].
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = PortalConfig::from_env();
    log::info!(
        "Starting E-Cell portal v{} on {} ({:?} auth)",
        env!("CARGO_PKG_VERSION"),
        config.http_addr,
        config.auth_mode
    );

    app::run(config).await
}
