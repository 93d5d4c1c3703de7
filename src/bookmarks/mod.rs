//! Bookmarks Module
//!
//! Saving and listing a user's bookmarks. A bookmark (the URL) is shared by
//! every user; each user keeps their own annotation on it.
//!
//! # Usage
//!
//! ```rust,ignore
//! use bookmarks::bookmarks;
//!
//! let app = Router::new()
//!     .merge(bookmarks::routes())
//!     .with_state(app_state);
//!
//! let lib = bookmarks::Bookmarks::new(&db);
//! let bookmark = lib.find_or_create_bookmark("https://example.com").await?.into_inner();
//! lib.upsert_user_bookmark(user_id, bookmark.id, "read later").await?;
//! ```

mod handler;
mod lib;
mod routes;

pub use lib::*;

pub use routes::routes;
