use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers::{
    create_redirect_handler, delete_redirect_handler, get_redirect_handler, health_handler,
    list_redirects_handler, redirect_handler,
};
use crate::state::AppState;

pub struct App {}

impl App {
    pub fn router(state: AppState) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .route(
                "/api/redirects",
                get(list_redirects_handler).post(create_redirect_handler),
            )
            .route(
                "/api/redirects/{id}",
                get(get_redirect_handler).delete(delete_redirect_handler),
            )
            .route("/{slug}", get(redirect_handler))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }
}
