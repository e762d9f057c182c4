use rusqlite::{OptionalExtension, params};

use super::categories::{CategoryLink, link_categories};
use super::{SHORT_USER_COLUMNS, short_user_at};
use crate::models::{NewPost, PostFilter, PostRow, PostSummaryRow, PostUpdate};
use crate::{Database, DbResult};

impl Database {
    /// Inserts the post and its category links in one transaction.
    pub fn create_post(&self, post: &NewPost<'_>, category_ids: &[i64]) -> DbResult<i64> {
        self.with_conn(|conn| {
            let tx = conn.unchecked_transaction()?;
            tx.execute(
                "INSERT INTO posts (owner_id, title, body, image_url) VALUES (?1, ?2, ?3, ?4)",
                params![post.owner_id, post.title, post.body, post.image_url],
            )?;
            let id = tx.last_insert_rowid();
            link_categories(&tx, CategoryLink::Post, &id, category_ids)?;
            tx.commit()?;
            Ok(id)
        })
    }

    pub fn get_post(&self, id: i64) -> DbResult<Option<PostRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    &format!(
                        "SELECT p.id, p.title, p.body, p.image_url, p.created_at, p.updated_at,
                                {SHORT_USER_COLUMNS}
                         FROM posts p
                         JOIN users u ON u.id = p.owner_id
                         WHERE p.id = ?1"
                    ),
                    [id],
                    |row| {
                        Ok(PostRow {
                            id: row.get(0)?,
                            title: row.get(1)?,
                            body: row.get(2)?,
                            image_url: row.get(3)?,
                            created_at: row.get(4)?,
                            updated_at: row.get(5)?,
                            owner: short_user_at(row, 6)?,
                        })
                    },
                )
                .optional()?;
            Ok(row)
        })
    }

    /// Newest first, with like and comment counts.
    pub fn list_posts(&self, filter: PostFilter, offset: u32, limit: u32) -> DbResult<Vec<PostSummaryRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT p.id, p.owner_id, p.title, p.body, p.image_url, p.created_at, p.updated_at,
                        (SELECT COUNT(*) FROM likes l WHERE l.post_id = p.id),
                        (SELECT COUNT(*) FROM comments c WHERE c.post_id = p.id)
                 FROM posts p
                 WHERE (?1 IS NULL OR p.owner_id = ?1)
                   AND (?2 IS NULL OR p.owner_id IN (
                        SELECT s.subscribed_to_id FROM subscriptions s WHERE s.subscriber_id = ?2))
                 ORDER BY p.created_at DESC, p.id DESC
                 LIMIT ?3 OFFSET ?4",
            )?;
            let rows = stmt
                .query_map(
                    params![filter.owner_id, filter.followed_by, limit, offset],
                    |row| {
                        Ok(PostSummaryRow {
                            id: row.get(0)?,
                            owner_id: row.get(1)?,
                            title: row.get(2)?,
                            body: row.get(3)?,
                            image_url: row.get(4)?,
                            created_at: row.get(5)?,
                            updated_at: row.get(6)?,
                            like_count: row.get(7)?,
                            comment_count: row.get(8)?,
                        })
                    },
                )?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn update_post(&self, id: i64, update: &PostUpdate) -> DbResult<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE posts SET
                    title      = COALESCE(?2, title),
                    body       = COALESCE(?3, body),
                    image_url  = COALESCE(?4, image_url),
                    updated_at = datetime('now')
                 WHERE id = ?1",
                params![id, update.title, update.body, update.image_url],
            )?;
            Ok(changed > 0)
        })
    }

    /// Deletes the post; comments, likes and category links cascade.
    pub fn delete_post(&self, id: i64) -> DbResult<bool> {
        self.with_conn(|conn| {
            let removed = conn.execute("DELETE FROM posts WHERE id = ?1", [id])?;
            Ok(removed > 0)
        })
    }
}
