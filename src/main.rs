use farmhub::{
    app::{build_app, serve},
    config::AppConfig,
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "farmhub=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let config = AppConfig::from_env()?;
    if config.is_production() && config.static_dir.is_none() {
        tracing::warn!("APP_ENV=production but STATIC_DIR is unset; dashboard will not be served");
    }
    let (host, port) = (config.host.clone(), config.port);

    let state = AppState::init(config).await?;
    tracing::info!("connected to database");

    serve(build_app(state), &host, port).await
}
