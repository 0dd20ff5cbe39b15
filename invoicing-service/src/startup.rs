//! Application startup and lifecycle management.

use crate::actions::InvoiceActions;
use crate::config::{SessionSettings, Settings};
use crate::handlers::{
    auth::{login_handler, logout_handler},
    health_check,
    invoices::{create_invoice, dashboard_home, delete_invoice, list_invoices, update_invoice},
    metrics,
};
use crate::middleware::require_session;
use crate::services::{ensure_bootstrap_user, CredentialsProvider, Database, MemoryPageCache};
use crate::AppState;
use axum::{
    body::Body,
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use secrecy::ExposeSecret;
use service_core::error::AppError;
use service_core::middleware::{
    make_request_span, request_id_middleware, security_headers_middleware,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

/// Build the HTTP router around an already-wired `AppState`.
pub fn build_router(state: AppState, session: &SessionSettings) -> Router {
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(session.secure_cookie)
        .with_expiry(Expiry::OnInactivity(time::Duration::hours(
            session.inactivity_hours,
        )));

    let dashboard = Router::new()
        .route("/dashboard", get(dashboard_home))
        .route(
            "/dashboard/invoices",
            get(list_invoices).post(create_invoice),
        )
        .route("/dashboard/invoices/:id", post(update_invoice))
        .route("/dashboard/invoices/:id/delete", post(delete_invoice))
        .route_layer(from_fn(require_session));

    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .route("/login", post(login_handler))
        .route("/logout", post(logout_handler))
        .merge(dashboard)
        .layer(session_layer)
        .layer(from_fn(security_headers_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span::<Body>))
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Connect to PostgreSQL, wire the collaborators and bind the listener.
    pub async fn build(settings: Settings) -> Result<Self, AppError> {
        let database = Database::new(
            settings.database.url.expose_secret(),
            settings.database.max_connections,
            settings.database.min_connections,
        )
        .await?;

        if settings.database.run_migrations {
            database.run_migrations().await?;
        }

        if let Some(user) = &settings.bootstrap_user {
            ensure_bootstrap_user(&database, user).await?;
        }

        let actions = InvoiceActions::new(
            Arc::new(database.clone()),
            Arc::new(MemoryPageCache::new()),
            Arc::new(CredentialsProvider::new(Arc::new(database))),
        );

        let router = build_router(AppState::new(actions), &settings.session);

        let address = format!("{}:{}", settings.server.host, settings.server.port);
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", address, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("invoicing-service listening on port {}", port);

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router).await
    }
}
