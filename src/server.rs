//! Development HTTP facade: static hosting plus the regeneration endpoint.

use std::path::Path;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tracing::{info, warn};

use crate::config::ServerSettings;
use crate::update::Updater;
use crate::watcher;
use crate::watcher::debounce::DebouncedTrigger;
use crate::watcher::event::WatchEvent;

type AppState = Arc<Updater>;

/// Build the dev-server router: the update endpoint plus static fallback.
pub fn router(updater: AppState, site_root: &Path) -> Router {
    Router::new()
        .route("/api/update-weeks", get(update_weeks))
        .fallback_service(ServeDir::new(site_root))
        .with_state(updater)
}

/// Response body for the update endpoint.
#[derive(Debug, Serialize)]
struct UpdateResponse {
    success: bool,
    message: String,
    details: String,
}

/// `GET /api/update-weeks` — run the regeneration script and wait for it.
///
/// Each request spawns its own child process; nothing serializes concurrent
/// requests against each other or against a watcher-triggered run, so two
/// children can race on the derived artifact. That matches how the dashboard
/// has always behaved and is deliberately left alone.
async fn update_weeks(State(updater): State<AppState>) -> impl IntoResponse {
    let invocation = updater.run().await;

    if invocation.success() {
        (
            StatusCode::OK,
            Json(UpdateResponse {
                success: true,
                message: "Week data updated successfully".to_string(),
                details: invocation.stdout,
            }),
        )
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(UpdateResponse {
                success: false,
                message: "Failed to update week data".to_string(),
                details: invocation.stderr,
            }),
        )
    }
}

/// Run the dev server until ctrl-c: watcher, debounced trigger, HTTP facade.
pub async fn serve(settings: ServerSettings) -> anyhow::Result<()> {
    let updater = Arc::new(Updater::new(settings.update_script));

    if !updater.script().exists() {
        warn!(
            script = %updater.script().display(),
            "regeneration script not found; invocations will fail until it exists"
        );
    }

    // A watch failure (say, a missing data directory) disables automatic
    // regeneration but never takes the server down.
    let _watcher = match watcher::start_watcher(&settings.data_dir) {
        Ok((handle, mut events)) => {
            info!(dir = %settings.data_dir.display(), "watching weekly data directory");

            let trigger = {
                let updater = updater.clone();
                DebouncedTrigger::spawn(settings.quiet, move || {
                    let updater = updater.clone();
                    async move {
                        // Outcome is logged by the updater; a failed run must
                        // not stop the watch loop.
                        let _ = updater.run().await;
                    }
                })
            };

            tokio::spawn(async move {
                while let Some(event) = events.recv().await {
                    match &event {
                        WatchEvent::Changed(path) => {
                            info!(path = %path.display(), "weekly data changed");
                        }
                        WatchEvent::Removed(path) => {
                            info!(path = %path.display(), "weekly data removed");
                        }
                    }
                    trigger.notify();
                }
            });

            Some(handle)
        }
        Err(err) => {
            warn!(
                %err,
                dir = %settings.data_dir.display(),
                "cannot watch data directory; automatic regeneration disabled"
            );
            None
        }
    };

    let app = router(updater, &settings.site_root);
    let listener = TcpListener::bind(("0.0.0.0", settings.port)).await?;
    info!(
        port = settings.port,
        root = %settings.site_root.display(),
        "dev server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(%err, "failed to install ctrl-c handler");
    }
}
