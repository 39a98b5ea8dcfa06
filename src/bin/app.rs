use adapter::database::connect_database_with;
use anyhow::{Context, Result};
use api::route::{
    book::build_book_routers, health::build_health_check_routers,
    reservation::build_reservation_routers,
};
use axum::Router;
use chrono::Utc;
use kernel::model::reservation::event::ReleaseReservation;
use registry::AppRegistry;
use shared::config::AppConfig;
use shared::env::{which, Environment};
use std::{
    net::{Ipv4Addr, SocketAddr},
    time::Duration,
};
use tokio::net::TcpListener;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tower_http::LatencyUnit;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

// 期限切れ予約を自動で解除する間隔
const EXPIRY_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<()> {
    init_logger()?;
    bootstrap().await
}

fn init_logger() -> Result<()> {
    let log_level = match which() {
        Environment::Development => "debug",
        Environment::Production => "info",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| log_level.into());

    let subscriber = tracing_subscriber::fmt::layer()
        .with_file(true)
        .with_line_number(true)
        .with_target(false);

    tracing_subscriber::registry()
        .with(subscriber)
        .with(env_filter)
        .try_init()?;

    Ok(())
}

async fn bootstrap() -> Result<()> {
    let app_config = AppConfig::new()?;
    let pool = connect_database_with(&app_config.database);

    let registry = AppRegistry::new(pool);

    {
        let registry = registry.clone();
        tokio::spawn(async move {
            expired_reservation_loop(registry).await;
        });
    }

    let app = Router::new()
        .merge(build_health_check_routers())
        .merge(build_book_routers())
        .merge(build_reservation_routers())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .latency_unit(LatencyUnit::Millis),
                ),
        )
        .with_state(registry);

    let addr = SocketAddr::new(Ipv4Addr::LOCALHOST.into(), 8080);
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", addr);
    axum::serve(listener, app)
        .await
        .context("Unexpected error happened in server")
        .inspect_err(|e| {
            tracing::error!(
                error.cause_chain = ?e, error.message = %e, "Unexpected error"
            )
        })
}

// 期限切れの予約を定期的に解除するループ。
// 解除は通常の予約解除と同じ経路を通るため、在庫カウンタも一緒に戻る。
// 失敗してもループ自体は止めず、次の周回で再試行する
async fn expired_reservation_loop(registry: AppRegistry) {
    let mut interval = tokio::time::interval(EXPIRY_SWEEP_INTERVAL);

    loop {
        interval.tick().await;

        let expired = match registry
            .reservation_repository()
            .find_expired(Utc::now())
            .await
        {
            Ok(expired) => expired,
            Err(e) => {
                tracing::warn!(
                    error.cause_chain = ?e,
                    "Failed to list expired reservations"
                );
                continue;
            }
        };

        for state in expired {
            let event = ReleaseReservation::new(state.book_id, state.reserved_by);
            match registry.reservation_repository().release(event).await {
                Ok(()) => {
                    tracing::info!(
                        reservation_id = %state.reservation_id,
                        book_id = %state.book_id,
                        "Released an expired reservation"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        error.cause_chain = ?e,
                        reservation_id = %state.reservation_id,
                        "Failed to release an expired reservation"
                    );
                }
            }
        }
    }
}
