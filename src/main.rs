use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use tokio::{signal, sync::mpsc};
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;

use ev_sales_api as api;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = api::config::load_config().context("failed to load configuration")?;
    api::config::init_tracing(cfg.log_level(), cfg.log_json);

    let db = api::db::establish_connection(&cfg)
        .await
        .context("failed to connect to database")?;
    if cfg.auto_migrate {
        api::db::run_migrations(&db)
            .await
            .context("failed to run migrations")?;
    }
    let db = Arc::new(db);

    let (event_tx, event_rx) = mpsc::channel(1024);
    let event_sender = api::events::EventSender::new(event_tx);
    tokio::spawn(api::events::process_events(event_rx));

    let services = api::services::AppServices::new(db.clone(), event_sender.clone());
    let state = api::AppState {
        db,
        config: cfg.clone(),
        event_sender,
        services,
    };

    let app = api::app_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(
            cfg.request_timeout_secs,
        )))
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("{}:{}", cfg.host, cfg.port)
        .parse()
        .context("invalid host/port configuration")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(%addr, environment = %cfg.environment, "ev-sales-api listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
