use motor_core::scheduler::{self, ScheduleConfig};
use server::config::ServerConfig;
use server::flush::PgFlushSink;
use server::ingest::Ingestor;
use server::{AppState, build_router, db, feed};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = ServerConfig::from_env().expect("server configuration should be valid");

    let pool = db::create_pool(&config.database_url).await;
    db::run_migrations(&pool).await;

    let state = AppState::new(pool.clone());

    let (change_tx, change_rx) = mpsc::channel(256);
    tokio::spawn(scheduler::run_write_scheduler(
        change_rx,
        state.reconciler.clone(),
        PgFlushSink::new(pool),
        ScheduleConfig::default(),
    ));

    let ingestor = Ingestor::new(state.reconciler.clone(), change_tx);
    tokio::spawn(feed::run_feed(config.broker, ingestor));

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("bind address should be available");
    info!(addr = %config.bind_addr, "http server listening");
    axum::serve(listener, app)
        .await
        .expect("http server should not fail to start");
}
