//! HTTP server and routes.

mod handlers;
mod state;

pub use state::AppState;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let book_routes = Router::new()
        .route("/upload", post(handlers::book_upload))
        .route("/create", post(handlers::book_create))
        .route("/update", post(handlers::book_update))
        .route("/get", get(handlers::book_get))
        .route("/delete", get(handlers::book_delete))
        .route("/list", get(handlers::book_list))
        .route("/clear", get(handlers::book_clear))
        .route("/category", get(handlers::book_category))
        .route("/home", get(handlers::book_home))
        .route("/area", get(handlers::stats_area))
        .route("/c_info", get(handlers::stats_daily));

    let user_routes = Router::new().route("/login", post(handlers::user_login));

    Router::new()
        .nest("/book", book_routes)
        .nest("/user", user_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
