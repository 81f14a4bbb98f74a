//! GSI listener.
//!
//! | Method | Path | Behavior |
//! |--------|------|----------|
//! | POST | `/` | Authenticate, flatten and feed the game state pipeline |
//! | GET | `/` | Liveness check |
//!
//! Every request answers 200. Malformed or unauthenticated posts are dropped
//! without touching the pipeline.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use serde_json::Value;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::dispatch::GameStateHandler;
use crate::error::{GlowError, Result};
use crate::gamestate::{authenticate, flatten};

/// State shared by all request handlers.
#[derive(Clone)]
pub struct ListenerState {
    handler: Arc<Mutex<GameStateHandler>>,
    token: Arc<str>,
}

impl ListenerState {
    pub fn new(handler: GameStateHandler, token: &str) -> Self {
        Self {
            handler: Arc::new(Mutex::new(handler)),
            token: Arc::from(token),
        }
    }

    /// Runs `f` with the pipeline locked.
    pub fn with_handler<R>(&self, f: impl FnOnce(&mut GameStateHandler) -> R) -> R {
        let mut handler = self.handler.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut handler)
    }
}

/// Builds the listener routes.
pub fn router(state: ListenerState) -> Router {
    Router::new()
        .route("/", get(alive).post(receive))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds `listen` and serves until `shutdown` resolves.
pub async fn serve(
    listen: &str,
    state: ListenerState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let failed = |reason: String| GlowError::ListenerFailed {
        addr: listen.to_string(),
        reason,
    };
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| failed(e.to_string()))?;
    let local = listener.local_addr().map_err(|e| failed(e.to_string()))?;
    info!(addr = %local, "Listening for game state");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| failed(e.to_string()))?;

    info!("Listener stopped");
    Ok(())
}

async fn alive() -> StatusCode {
    StatusCode::OK
}

async fn receive(State(state): State<ListenerState>, body: Bytes) -> StatusCode {
    let payload: Value = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(err) => {
            warn!(error = %err, "Dropping malformed game state");
            return StatusCode::OK;
        }
    };
    let Some(snapshot) = authenticate(payload, &state.token) else {
        warn!("Dropping game state with a bad auth token");
        return StatusCode::OK;
    };

    let accepted = state.with_handler(|handler| handler.on_snapshot(flatten(&snapshot)));
    if accepted > 0 {
        debug!(accepted, "Animations queued");
    }
    StatusCode::OK
}
