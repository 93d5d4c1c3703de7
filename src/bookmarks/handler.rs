use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
    http::{HeaderValue, StatusCode, header::ACCESS_CONTROL_ALLOW_METHODS},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use super::Bookmarks;
use crate::api::{ListMeta, ListParams, ListResponse};
use crate::handler::AppState;
use crate::identity::CurrentUser;
use crate::model::{Bookmark, UserBookmarkView};
use crate::{bad_request, server_error, success, unpack_error};

#[derive(Debug, Deserialize)]
pub struct SaveBookmark {
    pub url: String,
    #[serde(default)]
    pub note: Option<String>,
}

pub async fn list_bookmarks(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Query(params): Query<ListParams>,
) -> Response {
    let cursor = params.into_cursor();
    let lib = Bookmarks::new(&state.db);

    match lib.list_user_bookmarks(user_id, cursor.last_id, cursor.limit).await {
        Ok(page) => {
            tracing::debug!(user_id, count = page.items.len(), has_more = page.has_more, "listed bookmarks");
            let response = ListResponse {
                data: page.items,
                meta: ListMeta {
                    last_id: cursor.last_id,
                    next_id: page.next_id,
                    limit: cursor.limit,
                    has_more: page.has_more,
                },
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            tracing::error!(error = %unpack_error(&e), "failed to query user bookmarks");
            server_error("Internal server error")
        }
    }
}

/// Saves a URL for the caller, creating the shared bookmark on first sight
/// and attaching or refreshing the caller's note.
pub async fn save_bookmark(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    payload: Result<Json<SaveBookmark>, JsonRejection>,
) -> Response {
    let mut response = save(&state, user_id, payload).await;
    // the CORS layer only advertises methods on preflight
    response
        .headers_mut()
        .insert(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static("POST"));
    response
}

async fn save(state: &AppState, user_id: i64, payload: Result<Json<SaveBookmark>, JsonRejection>) -> Response {
    let payload = match payload {
        Ok(Json(payload)) => payload,
        Err(rejection) => return bad_request(&rejection.body_text()),
    };
    let note = payload.note.unwrap_or_default();
    let lib = Bookmarks::new(&state.db);

    let bookmark = match lib.find_or_create_bookmark(&payload.url).await {
        Ok(saved) => {
            tracing::info!(bookmark_id = saved.get().id, outcome = saved.label(), "bookmark resolved");
            saved.into_inner()
        }
        Err(e) if e.is_validation() => return bad_request(&e.to_string()),
        Err(e) => {
            tracing::error!(error = %unpack_error(&e), "failed to find or create bookmark");
            return server_error("Failed to create bookmark");
        }
    };

    let user_bookmark = match lib.upsert_user_bookmark(user_id, bookmark.id, &note).await {
        Ok(saved) => {
            tracing::info!(
                user_bookmark_id = saved.get().id,
                outcome = saved.label(),
                "user bookmark saved"
            );
            saved.into_inner()
        }
        Err(e) => {
            tracing::error!(error = %unpack_error(&e), "failed to save user bookmark");
            return server_error("Failed to save user bookmark");
        }
    };

    (StatusCode::OK, Json(UserBookmarkView::new(&bookmark, &user_bookmark))).into_response()
}

/// Global bookmark listing. Not built yet.
pub async fn list_all_bookmarks() -> Response {
    success(Vec::<Bookmark>::new())
}
