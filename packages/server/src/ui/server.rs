//! Server execution logic.

use std::{path::PathBuf, sync::Arc};

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use super::{
    handler::{
        create_room, get_room_detail, get_room_devices, get_rooms, health_check,
        websocket_handler,
    },
    signal::shutdown_signal,
    state::AppState,
};

/// Signaling server
///
/// # Example
///
/// ```ignore
/// let server = Server::new(AppState::new(repository, clock))
///     .with_allow_origin("https://example.com")
///     .with_static_dir(Some("./web/dist".into()));
/// server.run("0.0.0.0".to_string(), 11100).await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
    /// `*` or one exact origin
    allow_origin: String,
    /// SPA build served for every unmatched path
    static_dir: Option<PathBuf>,
}

impl Server {
    pub fn new(state: AppState) -> Self {
        Self {
            state: Arc::new(state),
            allow_origin: "*".to_string(),
            static_dir: None,
        }
    }

    pub fn with_allow_origin(mut self, allow_origin: impl Into<String>) -> Self {
        self.allow_origin = allow_origin.into();
        self
    }

    pub fn with_static_dir(mut self, static_dir: Option<PathBuf>) -> Self {
        self.static_dir = static_dir;
        self
    }

    /// Build the application router.
    pub fn router(&self) -> Router {
        let app = Router::new()
            // WebSocket エンドポイント
            .route("/ws/{room_id}", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/room", post(create_room))
            .route("/api/rooms", get(get_rooms))
            .route("/api/rooms/{room_id}", get(get_room_detail))
            .route("/api/rooms/{room_id}/devices", get(get_room_devices))
            .layer(cors_layer(&self.allow_origin))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone());

        match &self.static_dir {
            Some(dir) => {
                tracing::info!("Serving static files from {:?}", dir);
                app.fallback_service(
                    ServeDir::new(dir).fallback(ServeFile::new(dir.join("index.html"))),
                )
            }
            None => app,
        }
    }

    /// Serve on an already bound listener until a shutdown signal arrives.
    pub async fn serve(self, listener: TcpListener) -> Result<(), Box<dyn std::error::Error>> {
        let app = self.router();

        tracing::info!(
            "Signaling server listening on {}",
            listener.local_addr()?
        );
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }

    /// Run the signaling server
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr).await?;
        tracing::info!("Connect devices to: ws://{}/ws/{{roomId}}", bind_addr);
        self.serve(listener).await
    }
}

/// `*` allows any origin without credentials; anything else is matched
/// exactly and allows credentials.
fn cors_layer(allow_origin: &str) -> CorsLayer {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];

    if allow_origin == "*" {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any);
    }

    match HeaderValue::from_str(allow_origin) {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            .allow_credentials(true),
        Err(e) => {
            tracing::warn!(
                "Invalid allow-origin '{}' ({}), allowing any origin",
                allow_origin,
                e
            );
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(methods)
                .allow_headers(Any)
        }
    }
}
