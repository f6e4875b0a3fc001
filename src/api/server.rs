use std::sync::Arc;

use axum::Router;
use axum::routing::{get, patch, post};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::{auth, cases};
use crate::config::Config;
use crate::store::Store;
use crate::store::sqlite::SqliteStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
}

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/session", get(auth::session))
        .route("/api/catalog", get(cases::catalog))
        .route("/api/cases", get(cases::list).post(cases::create))
        .route(
            "/api/cases/{id}",
            get(cases::detail).patch(cases::update).delete(cases::remove),
        )
        .route("/api/cases/{id}/products", post(cases::add_product))
        .route(
            "/api/cases/{id}/products/{line_id}",
            patch(cases::update_product).delete(cases::remove_product),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// Trace every write-through so the persisted-state history is visible
// at debug level.
fn spawn_store_observer(store: &dyn Store) {
    let mut changes = store.subscribe();
    tokio::spawn(async move {
        loop {
            match changes.recv().await {
                Ok(key) => tracing::debug!(%key, "record persisted"),
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}

pub async fn start_server(config: Config) {
    let store = SqliteStore::connect(&config.database_url)
        .await
        .expect("Failed to open store");
    let store: Arc<dyn Store> = Arc::new(store);

    crate::auth::bootstrap(store.as_ref())
        .await
        .expect("Failed to bootstrap accounts");
    spawn_store_observer(store.as_ref());

    let state = Arc::new(AppState { store });
    let app = app(state);

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind address");

    tracing::info!("Server running on http://{}", config.bind_addr);

    axum::serve(listener, app).await.expect("Server failed");
}
