use faq_rag::api::{create_router, AppState};
use faq_rag::infrastructure::{init_tracing, AppConfig, Pipeline};
use std::net::SocketAddr;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;
    init_tracing(&config.config.log);
    config.log_missing_files();

    let addr = SocketAddr::new(
        config.config.server.host.parse()?,
        config.config.server.port,
    );

    let pipeline = Pipeline::bootstrap(config).await?;
    let app = create_router(AppState::from(pipeline));

    info!("API server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
