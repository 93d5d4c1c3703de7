use anyhow::Result;
use libsql::Connection;

use crate::db::{self, Database};
use crate::error::BookmarkError;
use crate::model::{Bookmark, UserBookmark, UserBookmarkView};
use crate::validate::validate_url;

/// Outcome of a find-or-create style write, carrying the resulting row.
#[derive(Debug, Clone, PartialEq)]
pub enum Saved<T> {
    Created(T),
    Updated(T),
    Unchanged(T),
}

impl<T> Saved<T> {
    pub fn get(&self) -> &T {
        match self {
            Saved::Created(v) | Saved::Updated(v) | Saved::Unchanged(v) => v,
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            Saved::Created(v) | Saved::Updated(v) | Saved::Unchanged(v) => v,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, Saved::Created(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            Saved::Created(_) => "created",
            Saved::Updated(_) => "updated",
            Saved::Unchanged(_) => "unchanged",
        }
    }
}

/// One page of a user's bookmarks, ordered by annotation id.
#[derive(Debug, Clone)]
pub struct Page {
    pub items: Vec<UserBookmarkView>,
    pub next_id: i64,
    pub has_more: bool,
}

pub struct Bookmarks<'a> {
    db: &'a Database,
}

impl<'a> Bookmarks<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    fn conn(&self) -> &Connection {
        self.db.connection()
    }

    async fn commit_or_rollback<T>(&self, result: Result<T>) -> Result<T, BookmarkError> {
        match result {
            Ok(value) => match self.conn().execute("COMMIT", ()).await {
                Ok(_) => Ok(value),
                Err(e) => {
                    // a failed COMMIT leaves the transaction open on the shared connection
                    let _ = self.conn().execute("ROLLBACK", ()).await;
                    Err(e.into())
                }
            },
            Err(e) => {
                let _ = self.conn().execute("ROLLBACK", ()).await;
                Err(e.into())
            }
        }
    }

    /// Returns the live bookmark for `url`, creating it when absent.
    ///
    /// Lookup is byte-exact on the submitted string. An existing row is
    /// returned untouched.
    pub async fn find_or_create_bookmark(&self, url: &str) -> Result<Saved<Bookmark>, BookmarkError> {
        validate_url(url)?;

        let _guard = self.db.write_lock().await;
        self.conn().execute("BEGIN TRANSACTION", ()).await?;

        let result = self.find_or_create_bookmark_internal(url).await;
        self.commit_or_rollback(result).await
    }

    async fn find_or_create_bookmark_internal(&self, url: &str) -> Result<Saved<Bookmark>> {
        if let Some(bookmark) = self.find_bookmark_by_url(url).await? {
            return Ok(Saved::Unchanged(bookmark));
        }

        let query = r#"
            INSERT INTO bookmarks (url, created_at, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(url) DO NOTHING
            RETURNING id, url, title, description, created_at, updated_at
        "#;

        let stamp = db::now();
        let mut rows = self
            .conn()
            .query(query, libsql::params![url, stamp.clone(), stamp])
            .await?;

        if let Some(row) = rows.next().await? {
            return Ok(Saved::Created(Self::row_to_bookmark(&row)?));
        }

        // lost a race with another writer
        match self.find_bookmark_by_url(url).await? {
            Some(bookmark) => Ok(Saved::Unchanged(bookmark)),
            None => anyhow::bail!("bookmark for {url} exists but is deleted"),
        }
    }

    pub async fn find_bookmark_by_url(&self, url: &str) -> Result<Option<Bookmark>> {
        let query = r#"
            SELECT id, url, title, description, created_at, updated_at
            FROM bookmarks
            WHERE url = ? AND deleted_at IS NULL
            LIMIT 1
        "#;

        let mut rows = self.conn().query(query, libsql::params![url]).await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(Self::row_to_bookmark(&row)?))
        } else {
            Ok(None)
        }
    }

    /// Finds, creates or updates the caller's annotation on a bookmark.
    ///
    /// An existing note is only overwritten by a non-empty, different note;
    /// anything else leaves the row as it was.
    pub async fn upsert_user_bookmark(
        &self,
        user_id: i64,
        bookmark_id: i64,
        note: &str,
    ) -> Result<Saved<UserBookmark>, BookmarkError> {
        let _guard = self.db.write_lock().await;
        self.conn().execute("BEGIN TRANSACTION", ()).await?;

        let result = self.upsert_user_bookmark_internal(user_id, bookmark_id, note).await;
        self.commit_or_rollback(result).await
    }

    async fn upsert_user_bookmark_internal(
        &self,
        user_id: i64,
        bookmark_id: i64,
        note: &str,
    ) -> Result<Saved<UserBookmark>> {
        let Some(existing) = self.find_user_bookmark(user_id, bookmark_id).await? else {
            let created = self.create_user_bookmark(user_id, bookmark_id, note).await?;
            return Ok(Saved::Created(created));
        };

        if note.is_empty() || existing.note == note {
            return Ok(Saved::Unchanged(existing));
        }

        let query = r#"
            UPDATE user_bookmarks SET note = ?, updated_at = ?
            WHERE id = ?
            RETURNING id, user_id, bookmark_id, note, created_at, updated_at
        "#;

        let mut rows = self
            .conn()
            .query(query, libsql::params![note, db::now(), existing.id])
            .await?;

        if let Some(row) = rows.next().await? {
            Ok(Saved::Updated(Self::row_to_user_bookmark(&row)?))
        } else {
            anyhow::bail!("Failed to update user bookmark {}", existing.id)
        }
    }

    pub async fn find_user_bookmark(&self, user_id: i64, bookmark_id: i64) -> Result<Option<UserBookmark>> {
        let query = r#"
            SELECT id, user_id, bookmark_id, note, created_at, updated_at
            FROM user_bookmarks
            WHERE user_id = ? AND bookmark_id = ? AND deleted_at IS NULL
            ORDER BY id ASC
            LIMIT 1
        "#;

        let mut rows = self
            .conn()
            .query(query, libsql::params![user_id, bookmark_id])
            .await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(Self::row_to_user_bookmark(&row)?))
        } else {
            Ok(None)
        }
    }

    async fn create_user_bookmark(&self, user_id: i64, bookmark_id: i64, note: &str) -> Result<UserBookmark> {
        let query = r#"
            INSERT INTO user_bookmarks (user_id, bookmark_id, note, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id, user_id, bookmark_id, note, created_at, updated_at
        "#;

        let stamp = db::now();
        let mut rows = self
            .conn()
            .query(
                query,
                libsql::params![user_id, bookmark_id, note, stamp.clone(), stamp],
            )
            .await?;

        if let Some(row) = rows.next().await? {
            Ok(Self::row_to_user_bookmark(&row)?)
        } else {
            anyhow::bail!("Failed to create user bookmark")
        }
    }

    /// Lists the user's bookmarks with an id strictly greater than `last_id`.
    ///
    /// Fetches one extra row to tell whether another page exists.
    pub async fn list_user_bookmarks(&self, user_id: i64, last_id: i64, limit: i64) -> Result<Page, BookmarkError> {
        let query = r#"
            SELECT
                user_bookmarks.id,
                user_bookmarks.user_id,
                user_bookmarks.bookmark_id,
                user_bookmarks.note,
                user_bookmarks.created_at,
                user_bookmarks.updated_at,
                bookmarks.url,
                bookmarks.title,
                bookmarks.description
            FROM user_bookmarks
            JOIN bookmarks ON bookmarks.id = user_bookmarks.bookmark_id
            WHERE user_bookmarks.user_id = ?
                AND user_bookmarks.id > ?
                AND user_bookmarks.deleted_at IS NULL
                AND bookmarks.deleted_at IS NULL
            ORDER BY user_bookmarks.id ASC
            LIMIT ?
        "#;

        let mut rows = self
            .conn()
            .query(query, libsql::params![user_id, last_id, limit.saturating_add(1)])
            .await?;

        let mut items = Vec::new();
        while let Some(row) = rows.next().await? {
            items.push(Self::row_to_view(&row)?);
        }

        let has_more = items.len() as i64 > limit;
        if has_more {
            items.truncate(limit as usize);
        }

        let next_id = items.last().map(|item| item.user_bookmark_id).unwrap_or(0);

        Ok(Page {
            items,
            next_id,
            has_more,
        })
    }

    fn row_to_bookmark(row: &libsql::Row) -> Result<Bookmark> {
        Ok(Bookmark {
            id: row.get(0)?,
            url: row.get(1)?,
            title: row.get(2)?,
            description: row.get(3)?,
            created_at: db::parse_timestamp(&row.get::<String>(4)?)?,
            updated_at: db::parse_timestamp(&row.get::<String>(5)?)?,
        })
    }

    fn row_to_user_bookmark(row: &libsql::Row) -> Result<UserBookmark> {
        Ok(UserBookmark {
            id: row.get(0)?,
            user_id: row.get(1)?,
            bookmark_id: row.get(2)?,
            note: row.get(3)?,
            created_at: db::parse_timestamp(&row.get::<String>(4)?)?,
            updated_at: db::parse_timestamp(&row.get::<String>(5)?)?,
        })
    }

    fn row_to_view(row: &libsql::Row) -> Result<UserBookmarkView> {
        Ok(UserBookmarkView {
            user_bookmark_id: row.get(0)?,
            user_id: row.get(1)?,
            bookmark_id: row.get(2)?,
            note: row.get(3)?,
            created_at: db::parse_timestamp(&row.get::<String>(4)?)?,
            updated_at: db::parse_timestamp(&row.get::<String>(5)?)?,
            url: row.get(6)?,
            title: row.get(7)?,
            description: row.get(8)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use std::time::Duration;
    use tempfile::TempDir;

    async fn test_db() -> (TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(&dir.path().join("bookmarks.db")).await.unwrap();
        (dir, db)
    }

    async fn count(db: &Database, table: &str) -> i64 {
        let mut rows = db
            .connection()
            .query(&format!("SELECT COUNT(*) FROM {table}"), ())
            .await
            .unwrap();
        rows.next().await.unwrap().unwrap().get(0).unwrap()
    }

    #[tokio::test]
    async fn invalid_urls_write_nothing() {
        let (_dir, db) = test_db().await;
        let lib = Bookmarks::new(&db);

        for url in [
            "not-a-url",
            "",
            "mailto:a@b.c",
            "http:example.com",
            "https:///example.com",
            "https:\\\\example.com",
            " https://example.com",
            "https://exa\nmple.com",
        ] {
            let err = lib.find_or_create_bookmark(url).await.unwrap_err();
            assert!(matches!(err, BookmarkError::Validation(ValidationError::InvalidUrl)), "{url:?}");
        }
        let err = lib.find_or_create_bookmark("ftp://example.com/file").await.unwrap_err();
        assert!(matches!(err, BookmarkError::Validation(ValidationError::UnsupportedScheme)));

        assert_eq!(count(&db, "bookmarks").await, 0);
    }

    #[tokio::test]
    async fn same_url_creates_once() {
        let (_dir, db) = test_db().await;
        let lib = Bookmarks::new(&db);

        let first = lib.find_or_create_bookmark("https://example.com").await.unwrap();
        let second = lib.find_or_create_bookmark("https://example.com").await.unwrap();

        assert!(first.is_created());
        assert!(matches!(second, Saved::Unchanged(_)));
        assert_eq!(first.get().id, second.get().id);
        assert_eq!(first.get().url, "https://example.com");
        assert_eq!(first.get().title, None);
        assert_eq!(first.get().description, None);
        assert_eq!(count(&db, "bookmarks").await, 1);
    }

    #[tokio::test]
    async fn url_match_is_byte_exact() {
        let (_dir, db) = test_db().await;
        let lib = Bookmarks::new(&db);

        let bare = lib.find_or_create_bookmark("https://example.com").await.unwrap();
        let slash = lib.find_or_create_bookmark("https://example.com/").await.unwrap();
        let upper = lib.find_or_create_bookmark("https://EXAMPLE.com").await.unwrap();

        assert!(slash.is_created());
        assert!(upper.is_created());
        assert_ne!(bare.get().id, slash.get().id);
        assert_ne!(bare.get().id, upper.get().id);
        assert_eq!(count(&db, "bookmarks").await, 3);
    }

    #[tokio::test]
    async fn empty_note_never_blanks_existing_note() {
        let (_dir, db) = test_db().await;
        let lib = Bookmarks::new(&db);
        let bookmark = lib.find_or_create_bookmark("https://example.com").await.unwrap().into_inner();

        let created = lib.upsert_user_bookmark(1, bookmark.id, "read later").await.unwrap();
        assert!(created.is_created());

        let again = lib.upsert_user_bookmark(1, bookmark.id, "").await.unwrap();
        assert!(matches!(again, Saved::Unchanged(_)));
        assert_eq!(again.get().note, "read later");
        assert_eq!(again.get().updated_at, created.get().updated_at);

        let same = lib.upsert_user_bookmark(1, bookmark.id, "read later").await.unwrap();
        assert!(matches!(same, Saved::Unchanged(_)));
        assert_eq!(count(&db, "user_bookmarks").await, 1);
    }

    #[tokio::test]
    async fn new_note_updates_row_and_timestamp() {
        let (_dir, db) = test_db().await;
        let lib = Bookmarks::new(&db);
        let bookmark = lib.find_or_create_bookmark("https://example.com").await.unwrap().into_inner();

        let created = lib.upsert_user_bookmark(1, bookmark.id, "read later").await.unwrap().into_inner();
        tokio::time::sleep(Duration::from_millis(5)).await;
        let updated = lib.upsert_user_bookmark(1, bookmark.id, "done").await.unwrap();

        assert_eq!(updated.label(), "updated");
        let updated = updated.into_inner();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.note, "done");
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at > created.updated_at);
    }

    #[tokio::test]
    async fn empty_note_is_allowed_on_create() {
        let (_dir, db) = test_db().await;
        let lib = Bookmarks::new(&db);
        let bookmark = lib.find_or_create_bookmark("https://example.com").await.unwrap().into_inner();

        let created = lib.upsert_user_bookmark(1, bookmark.id, "").await.unwrap();
        assert!(created.is_created());
        assert_eq!(created.get().note, "");

        let filled = lib.upsert_user_bookmark(1, bookmark.id, "now with a note").await.unwrap();
        assert_eq!(filled.label(), "updated");
    }

    #[tokio::test]
    async fn failed_commit_leaves_connection_usable() {
        let (_dir, db) = test_db().await;
        let lib = Bookmarks::new(&db);
        let bookmark = lib.find_or_create_bookmark("https://example.com").await.unwrap().into_inner();

        // checked at COMMIT, so the insert succeeds and the commit fails
        db.connection().execute("PRAGMA foreign_keys = ON", ()).await.unwrap();
        db.connection().execute("PRAGMA defer_foreign_keys = ON", ()).await.unwrap();
        let err = lib.upsert_user_bookmark(999, bookmark.id, "orphan").await.unwrap_err();
        assert!(!err.is_validation());

        let next = lib.find_or_create_bookmark("https://example.org").await.unwrap();
        assert!(next.is_created());
        let saved = lib.upsert_user_bookmark(1, bookmark.id, "mine").await.unwrap();
        assert!(saved.is_created());
        assert_eq!(count(&db, "user_bookmarks").await, 1);
    }

    #[tokio::test]
    async fn listing_pages_by_id_cursor() {
        let (_dir, db) = test_db().await;
        db.connection()
            .execute("INSERT INTO users (username) VALUES ('other')", ())
            .await
            .unwrap();
        let lib = Bookmarks::new(&db);

        let mut ids = Vec::new();
        for i in 0..5 {
            let b = lib
                .find_or_create_bookmark(&format!("https://example.com/{i}"))
                .await
                .unwrap()
                .into_inner();
            ids.push(lib.upsert_user_bookmark(1, b.id, "").await.unwrap().into_inner().id);
            lib.upsert_user_bookmark(2, b.id, "theirs").await.unwrap();
        }

        let page = lib.list_user_bookmarks(1, 0, 2).await.unwrap();
        assert_eq!(page.items.len(), 2);
        assert!(page.has_more);
        assert_eq!(page.next_id, ids[1]);
        assert!(page.items.iter().all(|item| item.user_id == 1));
        assert_eq!(page.items[0].url, "https://example.com/0");

        let page = lib.list_user_bookmarks(1, page.next_id, 2).await.unwrap();
        assert_eq!(
            page.items.iter().map(|i| i.user_bookmark_id).collect::<Vec<_>>(),
            vec![ids[2], ids[3]]
        );
        assert!(page.has_more);

        let page = lib.list_user_bookmarks(1, page.next_id, 2).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert!(!page.has_more);
        assert_eq!(page.next_id, ids[4]);

        let page = lib.list_user_bookmarks(1, page.next_id, 2).await.unwrap();
        assert!(page.items.is_empty());
        assert!(!page.has_more);
        assert_eq!(page.next_id, 0);
    }

    #[tokio::test]
    async fn exact_fit_has_no_more() {
        let (_dir, db) = test_db().await;
        let lib = Bookmarks::new(&db);
        for i in 0..3 {
            let b = lib
                .find_or_create_bookmark(&format!("https://example.com/{i}"))
                .await
                .unwrap()
                .into_inner();
            lib.upsert_user_bookmark(1, b.id, "").await.unwrap();
        }

        let page = lib.list_user_bookmarks(1, 0, 3).await.unwrap();
        assert_eq!(page.items.len(), 3);
        assert!(!page.has_more);
    }
}
