use axum::{Router, http::Method, routing::get};
use tower_http::cors::{Any, CorsLayer};

use super::handler;
use crate::handler::AppState;

pub fn routes() -> Router<AppState> {
    // the bookmarklet posts from whatever page the user is on
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST])
        .allow_headers(Any);

    Router::new()
        .route(
            "/me/bookmarks",
            get(handler::list_bookmarks).post(handler::save_bookmark),
        )
        .layer(cors)
        .route("/bookmarks", get(handler::list_all_bookmarks))
}
