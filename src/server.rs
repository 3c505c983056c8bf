//! The two HTTP servers: browsing on one port, downloads on the other.

use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{
    extract::{rejection::QueryRejection, Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use maud::Markup;
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::ListError;
use crate::listing::{list_directory, DirectoryReader, LocalFs};
use crate::render;

/// How long in-flight requests may run after a shutdown signal.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

// --- State ---
pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub config: Config,
    pub reader: Arc<dyn DirectoryReader>,
}

impl AppState {
    pub fn new(config: Config, reader: Arc<dyn DirectoryReader>) -> SharedState {
        Arc::new(Self { config, reader })
    }
}

// --- Request Payloads ---
#[derive(Deserialize, Debug)]
struct BrowseQuery {
    path: Option<String>,
}

// --- Routers ---

pub fn browse_router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(browse_handler))
        .route("/healthz", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves files under `root`. Hidden paths are answered with 404, the same
/// entries the listing leaves out.
pub fn download_router(root: &Path) -> Router {
    Router::new()
        .fallback_service(ServeDir::new(root))
        .layer(middleware::from_fn(reject_hidden))
        .layer(TraceLayer::new_for_http())
}

// --- Handlers ---

async fn browse_handler(
    State(state): State<SharedState>,
    query: Result<Query<BrowseQuery>, QueryRejection>,
) -> Result<Markup, Response> {
    let Query(query) = query.map_err(|rejection| {
        warn!("Bad browse query: {}", rejection);
        error_response(StatusCode::BAD_REQUEST, "Invalid path query.")
    })?;
    let requested = query.path.unwrap_or_default();

    let worker = Arc::clone(&state);
    let listed = tokio::task::spawn_blocking(move || {
        list_directory(worker.reader.as_ref(), &worker.config.root, &requested)
    })
    .await;

    match listed {
        Ok(Ok(listing)) => Ok(render::listing_page(&state.config, &listing)),
        Ok(Err(e)) => Err(list_error_response(&e)),
        Err(e) => {
            error!("Listing task failed: {}", e);
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error reading directory contents.",
            ))
        }
    }
}

async fn health_handler() -> &'static str {
    "ok"
}

async fn reject_hidden(request: Request, next: Next) -> Response {
    let raw = request.uri().path();
    let decoded = urlencoding::decode(raw).map_or_else(|_| raw.into(), |p| p.into_owned());
    if is_hidden_path(&decoded) {
        info!("Refusing hidden download path: {}", raw);
        return error_response(StatusCode::NOT_FOUND, "Path not found.");
    }
    next.run(request).await
}

fn is_hidden_path(path: &str) -> bool {
    path.split('/').any(|segment| segment.starts_with('.'))
}

// --- Utility Functions ---

fn error_response(status_code: StatusCode, message: &str) -> Response {
    (status_code, render::error_page(message)).into_response()
}

/// Maps a listing failure to the status and page the client sees.
fn list_error_response(err: &ListError) -> Response {
    match err {
        ListError::Escape { .. } => {
            warn!("Rejected request: {}", err);
            error_response(StatusCode::FORBIDDEN, "Access denied.")
        }
        ListError::Filesystem { source, .. } => match source.kind() {
            io::ErrorKind::NotFound => {
                info!("{}", err);
                error_response(StatusCode::NOT_FOUND, "Path not found.")
            }
            io::ErrorKind::PermissionDenied => {
                warn!("{}", err);
                error_response(StatusCode::FORBIDDEN, "Access denied.")
            }
            _ => {
                error!("{}", err);
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Error reading directory contents.",
                )
            }
        },
    }
}

// --- Lifecycle ---

/// Binds both ports and serves until a shutdown signal arrives, then gives
/// in-flight requests [`SHUTDOWN_GRACE`] to finish.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let browse_listener = TcpListener::bind(config.browse_addr)
        .await
        .with_context(|| format!("failed to bind browse address {}", config.browse_addr))?;
    let download_listener = TcpListener::bind(config.download_addr)
        .await
        .with_context(|| format!("failed to bind download address {}", config.download_addr))?;

    info!("Serving files from: {}", config.root.display());
    info!("Browse on {} as {}", config.browse_addr, config.base_url);
    info!("Download on {} as {}", config.download_addr, config.download_url);

    let download_app = download_router(&config.root);
    let state = AppState::new(config, Arc::new(LocalFs));
    let browse_app = browse_router(state);

    let token = CancellationToken::new();
    let mut browse = tokio::spawn(serve("browse", browse_listener, browse_app, token.clone()));
    let mut download = tokio::spawn(serve(
        "download",
        download_listener,
        download_app,
        token.clone(),
    ));

    tokio::select! {
        signal = shutdown_signal() => match signal {
            Ok(name) => info!("Received {}, shutting down server ...", name),
            Err(e) => error!("Failed to listen for shutdown signals: {}", e),
        },
        _ = token.cancelled() => warn!("A server stopped unexpectedly, shutting down ..."),
    }
    token.cancel();

    let drain = async {
        let (browse_done, download_done) = tokio::join!(&mut browse, &mut download);
        report_exit("browse", browse_done);
        report_exit("download", download_done);
    };
    let drained = tokio::time::timeout(SHUTDOWN_GRACE, drain).await;
    if drained.is_err() {
        warn!(
            "In-flight requests still running after {:?}, forcing shutdown",
            SHUTDOWN_GRACE
        );
        browse.abort();
        download.abort();
    }

    info!("Server exiting");
    Ok(())
}

/// Logs a server task that panicked or was cancelled. Returns whether it
/// exited cleanly.
fn report_exit(name: &str, result: Result<(), JoinError>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            error!("{} server task failed: {}", name, e);
            false
        }
    }
}

async fn serve(name: &'static str, listener: TcpListener, app: Router, token: CancellationToken) {
    let stop = token.clone();
    let result = axum::serve(listener, app)
        .with_graceful_shutdown(async move { stop.cancelled().await })
        .await;
    if let Err(e) = result {
        error!("{} server error: {}", name, e);
        token.cancel();
    }
}

#[cfg(unix)]
async fn shutdown_signal() -> io::Result<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;
    let mut hangup = signal(SignalKind::hangup())?;
    let mut quit = signal(SignalKind::quit())?;

    let name = tokio::select! {
        _ = interrupt.recv() => "SIGINT",
        _ = terminate.recv() => "SIGTERM",
        _ = hangup.recv() => "SIGHUP",
        _ = quit.recv() => "SIGQUIT",
    };
    Ok(name)
}

#[cfg(not(unix))]
async fn shutdown_signal() -> io::Result<&'static str> {
    tokio::signal::ctrl_c().await?;
    Ok("Ctrl+C")
}
