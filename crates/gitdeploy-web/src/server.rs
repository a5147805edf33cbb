//! axum router and server loop.
//!
//! Routes:
//! - `POST /bitbucket-post-hook?key=...`        - Bitbucket push webhook
//! - `GET|POST /manual-update?key=...&id=...`   - update one repository
//!
//! Every response is HTTP 200 with an [`Outcome`] body; the `code` field
//! tells success from failure.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use gitdeploy_core::{Deploy, Outcome};
use tokio::signal;

use crate::error::{Error, Result};
use crate::process::{process_manual_update, process_webhook};
use crate::types::{KeyQuery, ManualUpdateQuery};

/// Webhook route.
pub const WEBHOOK_PATH: &str = "/bitbucket-post-hook";
/// Manual update route.
pub const MANUAL_UPDATE_PATH: &str = "/manual-update";

/// Build the router around a shared deployer.
pub fn create_router<D: Deploy + 'static>(deployer: Arc<D>) -> Router {
    Router::new()
        .route(WEBHOOK_PATH, post(handle_webhook::<D>))
        .route(
            MANUAL_UPDATE_PATH,
            get(handle_manual_update::<D>).post(handle_manual_update::<D>),
        )
        .with_state(deployer)
}

/// Serve until SIGINT or SIGTERM.
///
/// # Errors
/// Returns error if the address can't be bound or the server fails.
pub async fn serve<D: Deploy + 'static>(deployer: Arc<D>, addr: SocketAddr) -> Result<()> {
    let app = create_router(deployer);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| Error::Bind { addr, source })?;
    let local = listener.local_addr().unwrap_or(addr);
    tracing::info!(%local, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(Error::Serve)?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

async fn handle_webhook<D: Deploy + 'static>(
    State(deployer): State<Arc<D>>,
    query: std::result::Result<Query<KeyQuery>, QueryRejection>,
    body: Bytes,
) -> Json<Outcome> {
    let query = query_or_default(query);
    Json(
        run_blocking(move || process_webhook(deployer.as_ref(), query.key.as_deref(), &body))
            .await,
    )
}

async fn handle_manual_update<D: Deploy + 'static>(
    State(deployer): State<Arc<D>>,
    query: std::result::Result<Query<ManualUpdateQuery>, QueryRejection>,
) -> Json<Outcome> {
    let query = query_or_default(query);
    Json(
        run_blocking(move || {
            process_manual_update(deployer.as_ref(), query.key.as_deref(), query.id.as_deref())
        })
        .await,
    )
}

/// A query string that doesn't parse carries no usable key, so it is
/// answered like a missing key instead of with a plain-text 400.
fn query_or_default<T: Default>(query: std::result::Result<Query<T>, QueryRejection>) -> T {
    match query {
        Ok(Query(query)) => query,
        Err(rejection) => {
            tracing::info!(error = %rejection, "unreadable query string");
            T::default()
        }
    }
}

/// Deployments block on child processes, so they run off the async workers.
async fn run_blocking<F>(f: F) -> Outcome
where
    F: FnOnce() -> Outcome + Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(outcome) => outcome,
        Err(e) => {
            let err = Error::Task(e);
            tracing::error!(error = %err, "request processing aborted");
            Outcome::failure(format!("Exception! {err}"))
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received SIGINT"),
        () = terminate => tracing::info!("received SIGTERM"),
    }
}
