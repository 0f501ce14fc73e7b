use infodocs_export::convert::Capabilities;
use infodocs_server::config::ServerConfig;
use infodocs_server::state::AppState;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let config = ServerConfig::load()?;
    tracing::info!(
        records_dir = %config.records_dir.display(),
        media_dir = %config.render.asset_roots.primary.dir.display(),
        static_dir = %config.render.static_dir.display(),
        base_url = %config.render.base_url(),
        "configuration loaded"
    );

    let capabilities = Capabilities::detect(&config.render);
    let state = AppState::new(&config, capabilities);
    let app = infodocs_server::app(state, &config.render);

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    tracing::info!(bind = %config.bind, "listening");
    axum::serve(listener, app)
        .await
        .map_err(|e| eyre::eyre!("server error: {e}"))
}
