use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;

use parley_api::auth::AppStateInner;
use parley_gateway::dispatcher::Dispatcher;
use parley_server::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "parley_server=debug,parley_api=debug,parley_gateway=debug,parley_db=info,tower_http=debug"
                    .into()
            }),
        )
        .init();

    let config = Config::from_env()?;

    let db = Arc::new(parley_db::Database::open(&config.db_path)?);
    let dispatcher = Dispatcher::new();
    let state = Arc::new(AppStateInner {
        db,
        dispatcher,
        jwt_secret: config.jwt_secret.clone(),
    });

    let app = parley_server::app(state, &config.static_dir);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Parley server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
