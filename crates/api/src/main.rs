use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use moonglade_events::{AuditSink, EventBus};
use moonglade_pingback::{
    client, HttpPingbackTransport, HttpSourceInspector, PgPingbackStore, PingbackSender,
    ReceivePingHandler,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use moonglade_api::config::ServerConfig;
use moonglade_api::router::build_app_router;
use moonglade_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "moonglade_api=debug,moonglade_pingback=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = %config.port,
        canonical_prefix = %config.canonical_prefix,
        receive_enabled = config.pingback.receive_enabled,
        send_enabled = config.pingback.send_enabled,
        trust_proxy_headers = config.trust_proxy_headers,
        "Loaded server configuration"
    );

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = moonglade_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    moonglade_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    moonglade_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Event bus ---
    let event_bus = Arc::new(EventBus::default());
    let audit_handle = tokio::spawn(AuditSink::run(pool.clone(), event_bus.subscribe()));
    tracing::info!("Event bus and audit sink started");

    // --- Pingback services ---
    let http_client = client::build_client(Duration::from_secs(config.pingback.timeout_secs))
        .expect("Failed to build HTTP client");
    let receiver = ReceivePingHandler::new(
        Arc::new(HttpSourceInspector::with_client(http_client.clone())),
        Arc::new(PgPingbackStore::new(pool.clone())),
    );
    let sender = PingbackSender::new(Arc::new(HttpPingbackTransport::with_client(http_client)));

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        event_bus: Arc::clone(&event_bus),
        pingback_receiver: Arc::new(receiver),
        pingback_sender: sender,
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    // Peer addresses feed the `ClientIp` extractor.
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    // Dropping the last sender closes the channel and ends the audit sink.
    drop(event_bus);
    let _ = tokio::time::timeout(Duration::from_secs(5), audit_handle).await;
    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT or SIGTERM to initiate graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
