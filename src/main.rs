use std::env;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use resume_analyzer::{create_router, AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    init_tracing();

    // Load configuration
    let config = Config::from_env()?;

    tracing::info!("Starting AI Resume Analyzer backend");
    tracing::info!("Max file size: {}MB", config.max_file_size_mb);

    // Determine port from environment (PaaS compatibility)
    let port = env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(config.server_port);
    let addr = format!("{}:{}", config.server_host, port);

    let state = AppState::from_config(config).await?;
    let app = create_router(state);

    tracing::info!("Server listening on {}", addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "resume_analyzer=debug,tower_http=debug,axum::rejection=trace".into());

    let json = env::var("LOG_FORMAT").map(|v| v.eq_ignore_ascii_case("json")).unwrap_or(false);
    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .init();
    }
}
