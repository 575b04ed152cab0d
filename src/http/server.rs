//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the sniff and capture handlers
//! - Wire up middleware (tracing)
//! - Bind server to listener and stop on shutdown
//!
//! # Routes
//! - `POST /d_sniff`: evaluate a forwarded request, answer 200 (accept) or 501 (skip)
//! - `/d_capture[/*]`: terminal 403 for accepted requests

use axum::{
    body::Bytes,
    extract::State,
    http::Uri,
    response::Response,
    routing::{any, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::bouncer::{RequestEvaluator, Verdict};
use crate::http::request::SniffRequest;
use crate::http::response::{forbidden, sniff_response};
use crate::lifecycle::ShutdownSignal;

pub const SNIFF_PATH: &str = "/d_sniff";
pub const CAPTURE_PATH: &str = "/d_capture";

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub evaluator: RequestEvaluator,
    pub proxied_behind_edge_cdn: bool,
}

/// HTTP server for the host's plugin callbacks.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(state: AppState) -> Self {
        Self {
            router: Self::build_router(state),
        }
    }

    fn build_router(state: AppState) -> Router {
        Router::new()
            .route(SNIFF_PATH, post(sniff_handler))
            .route(CAPTURE_PATH, any(capture_handler))
            .route("/d_capture/{*path}", any(capture_handler))
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    /// The configured router, for driving requests without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: ShutdownSignal,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.recv().await;
                tracing::info!("HTTP server received shutdown signal");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Decide whether the host should hand this request to the capture stage.
async fn sniff_handler(State(state): State<AppState>, body: Bytes) -> Response {
    let request: SniffRequest = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!(error = %e, "Malformed sniff request, skipping");
            return sniff_response(Verdict::Skip);
        }
    };

    let ctx = request.into_context(state.proxied_behind_edge_cdn);
    let verdict = state.evaluator.evaluate(&ctx).await;
    sniff_response(verdict)
}

/// Answer a request the sniff stage accepted.
async fn capture_handler(uri: Uri) -> Response {
    tracing::info!(uri = %uri, "Request blocked");
    forbidden()
}
