use crate::api::{ApiResponse, ErrorResponse};
use crate::handler::AppState;
use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use std::error::Error;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod bookmarks;
pub mod config;
pub mod db;
pub mod error;
pub mod handler;
pub mod identity;
pub mod model;
pub mod validate;

pub fn success<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(ApiResponse { data })).into_response()
}

pub fn server_error(msg: &str) -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse::new(msg))).into_response()
}

pub fn bad_request(msg: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(msg))).into_response()
}

pub fn unpack_error(err: &dyn Error) -> String {
    let mut parts = Vec::new();
    parts.push(err.to_string());
    let mut current = err.source();
    while let Some(source) = current {
        parts.push(source.to_string());
        current = source.source();
    }
    parts.join(": ")
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(handler::welcome))
        .merge(bookmarks::routes())
        .route("/me/lists", get(handler::list_my_lists))
        .route("/me/lists/:list_id", get(handler::get_my_list))
        .route("/me/tags", get(handler::list_my_tags))
        .route("/lists", get(handler::list_lists))
        .route("/tags", get(handler::list_tags))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
