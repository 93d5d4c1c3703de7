use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Shared across users, one row per distinct URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: i64,
    pub url: String,
    // populated only once a scraper exists
    pub title: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A user's annotation on a shared bookmark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserBookmark {
    pub id: i64,
    pub user_id: i64,
    pub bookmark_id: i64,
    pub note: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Flattened bookmark + annotation, as returned by the API. Timestamps are the
/// annotation's.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserBookmarkView {
    pub bookmark_id: i64,
    pub user_bookmark_id: i64,
    pub user_id: i64,
    pub url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub note: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserBookmarkView {
    pub fn new(bookmark: &Bookmark, user_bookmark: &UserBookmark) -> Self {
        UserBookmarkView {
            bookmark_id: bookmark.id,
            user_bookmark_id: user_bookmark.id,
            user_id: user_bookmark.user_id,
            url: bookmark.url.clone(),
            title: bookmark.title.clone(),
            description: bookmark.description.clone(),
            note: user_bookmark.note.clone(),
            created_at: user_bookmark.created_at,
            updated_at: user_bookmark.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct List {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
}
