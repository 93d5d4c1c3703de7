use std::sync::Arc;

use axum::{extract::Path, response::Response};

use crate::db::Database;
use crate::identity::{CurrentUser, IdentityResolver};
use crate::model::{List, Tag, UserBookmarkView};
use crate::success;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub identity: Arc<dyn IdentityResolver>,
}

pub async fn welcome() -> &'static str {
    tracing::debug!("got welcome request");
    "Welcome to the Bookmark API"
}

// Lists and tags only exist as schema so far; these answer with empty data.

pub async fn list_my_lists(CurrentUser(user_id): CurrentUser) -> Response {
    tracing::debug!(user_id, "list listing not implemented");
    success(Vec::<List>::new())
}

pub async fn get_my_list(CurrentUser(user_id): CurrentUser, Path(list_id): Path<i64>) -> Response {
    tracing::debug!(user_id, list_id, "list contents not implemented");
    success(Vec::<UserBookmarkView>::new())
}

pub async fn list_my_tags(CurrentUser(user_id): CurrentUser) -> Response {
    tracing::debug!(user_id, "tag listing not implemented");
    success(Vec::<Tag>::new())
}

pub async fn list_lists() -> Response {
    success(Vec::<List>::new())
}

pub async fn list_tags() -> Response {
    success(Vec::<Tag>::new())
}
