use std::sync::Arc;

use tokio::sync::broadcast;

use frontoffice::api::router::create_router;
use frontoffice::api::ws_types::WsMessage;
use frontoffice::config::AppConfig;
use frontoffice::services::throttle::Throttle;
use frontoffice::{db, metrics, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    let addr = format!("{}:{}", config.host, config.port);

    tracing::info!("Connecting to database...");
    let db = db::init_pool(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&db).await?;
    tracing::info!("Database connected");

    let metrics_handle = metrics::init_metrics();

    let throttle = match &config.redis_url {
        Some(url) => Some(Arc::new(Throttle::new(
            url,
            config.throttle_max_requests,
            config.throttle_window_secs,
        )?)),
        None => {
            tracing::info!("REDIS_URL not set — request throttling disabled");
            None
        }
    };

    // Trade lifecycle events fan out to connected dashboard clients.
    let (ws_tx, _) = broadcast::channel::<WsMessage>(256);

    let state = AppState {
        db,
        config,
        ws_tx,
        metrics_handle,
        throttle,
    };
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {addr}");
    axum::serve(listener, router).await?;

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();
}
