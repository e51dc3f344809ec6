//! HTTP server wiring for Notemark (API, handlers, and shared state).

/// Password hashing and session-cookie authentication.
pub mod auth;
/// HTTP error mapping for API handlers.
pub mod error;
/// HTTP handlers for auth, note, and view endpoints.
pub mod handlers;
/// Per-user in-memory note stores shared across requests.
pub mod stores;

pub use auth::SESSION_COOKIE;
pub use notemark_core::{config, db, models, slug, AppError, Config, Database, DEFAULT_PORT};
pub use stores::{SessionStores, StoreAccessError, UserStore};

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{delete, get, post, put},
    Router,
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

const CONTENT_SECURITY_POLICY: &str = "default-src 'self'; script-src 'self' 'unsafe-inline'; style-src 'self' 'unsafe-inline'; img-src 'self' data:; font-src 'self'; connect-src 'self'; frame-ancestors 'none'; base-uri 'self'; form-action 'self'";

const API_METHODS: [Method; 4] = [Method::GET, Method::POST, Method::PUT, Method::DELETE];

/// Shared state passed to HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub config: Arc<Config>,
    pub sessions: Arc<SessionStores>,
}

impl AppState {
    /// Build state with a fresh per-user store registry.
    pub fn new(config: Config, db: Database) -> Self {
        Self::with_stores(config, db, Arc::new(SessionStores::default()))
    }

    /// Build state around an existing store registry, for callers that keep
    /// their own handle to it.
    pub fn with_stores(config: Config, db: Database, sessions: Arc<SessionStores>) -> Self {
        Self {
            db: Arc::new(db),
            config: Arc::new(config),
            sessions,
        }
    }
}

/// Build the application router with all routes and middleware attached.
///
/// CORS origins are derived from the configured port; when binding to an
/// ephemeral port, prefer [`serve_router`], which reads the real one.
///
/// # Panics
/// Panics if a static header value or local CORS origin fails to parse.
pub fn create_app(state: AppState, allow_public_access: bool) -> Router {
    let cors_port = state.config.port;
    create_app_with_cors_port(state, allow_public_access, cors_port)
}

/// Resolve the listener address from the `BIND` override and security policy.
///
/// Without `allow_public_access`, non-loopback requests are downgraded to
/// `127.0.0.1` on the requested port.
pub fn resolve_bind_address(config: &Config, allow_public_access: bool) -> SocketAddr {
    let loopback = SocketAddr::from(([127, 0, 0, 1], config.port));
    let requested = std::env::var("BIND")
        .ok()
        .and_then(|raw| match raw.trim().parse::<SocketAddr>() {
            Ok(addr) => Some(addr),
            Err(err) => {
                tracing::warn!("Ignoring unparseable BIND='{}' ({}); using {}", raw, err, loopback);
                None
            }
        })
        .unwrap_or(loopback);

    if requested.ip().is_loopback() || allow_public_access {
        requested
    } else {
        tracing::warn!(
            "Refusing non-loopback bind {} without ALLOW_PUBLIC_ACCESS=1; binding 127.0.0.1:{}",
            requested,
            requested.port()
        );
        SocketAddr::from(([127, 0, 0, 1], requested.port()))
    }
}

fn create_app_with_cors_port(state: AppState, allow_public_access: bool, cors_port: u16) -> Router {
    let middleware = tower::ServiceBuilder::new()
        .layer(DefaultBodyLimit::max(state.config.max_note_size))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors_layer(allow_public_access, cors_port))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            HeaderValue::from_static(CONTENT_SECURITY_POLICY),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ));

    Router::new()
        .route("/api/create", post(handlers::note::create_note))
        .route("/api/notes", get(handlers::views::list_notes))
        .route("/api/notes/:slug", get(handlers::note::get_note))
        .route("/api/notes/:slug", put(handlers::note::update_note))
        .route("/api/notes/:slug", delete(handlers::note::delete_note))
        .route("/api/sidebar", get(handlers::views::sidebar))
        .route("/api/search", get(handlers::views::search_notes))
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/logout", post(handlers::auth::logout))
        .route("/api/auth/me", get(handlers::auth::me))
        .with_state(state)
        .layer(middleware)
}

fn cors_layer(allow_public_access: bool, port: u16) -> CorsLayer {
    if allow_public_access {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(API_METHODS)
            .allow_headers(Any);
    }

    // Credentialed CORS rejects wildcards, so the local origins are listed.
    let local_origins = ["localhost", "127.0.0.1"]
        .map(|host| HeaderValue::try_from(format!("http://{host}:{port}")).unwrap());
    CorsLayer::new()
        .allow_origin(local_origins)
        .allow_methods(API_METHODS)
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true)
}

fn listener_cors_port(listener: &tokio::net::TcpListener, fallback_port: u16) -> u16 {
    match listener.local_addr() {
        Ok(addr) => addr.port(),
        Err(_) => fallback_port,
    }
}

/// Serve the API on `listener` until `shutdown_signal` resolves.
///
/// CORS origins use the port the listener actually bound, so ephemeral
/// ports (`:0`) get correct origins.
///
/// # Errors
/// Returns any I/O error produced by `axum::serve`.
pub async fn serve_router(
    listener: tokio::net::TcpListener,
    state: AppState,
    allow_public_access: bool,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<(), std::io::Error> {
    let cors_port = listener_cors_port(&listener, state.config.port);
    let app = create_app_with_cors_port(state, allow_public_access, cors_port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
}
