use rusqlite::{OptionalExtension, Row, params};

use super::{SHORT_USER_COLUMNS, short_user_at};
use crate::models::CommentRow;
use crate::{Database, DbResult};

impl Database {
    pub fn insert_comment(&self, post_id: i64, sender_id: i64, content: &str) -> DbResult<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO comments (post_id, sender_id, content) VALUES (?1, ?2, ?3)",
                params![post_id, sender_id, content],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_comment(&self, id: i64) -> DbResult<Option<CommentRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    &format!(
                        "SELECT c.id, c.post_id, c.content, c.created_at, c.updated_at, {SHORT_USER_COLUMNS}
                         FROM comments c
                         JOIN users u ON u.id = c.sender_id
                         WHERE c.id = ?1"
                    ),
                    [id],
                    map_comment,
                )
                .optional()?;
            Ok(row)
        })
    }

    /// Oldest first.
    pub fn comments_for_post(&self, post_id: i64) -> DbResult<Vec<CommentRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT c.id, c.post_id, c.content, c.created_at, c.updated_at, {SHORT_USER_COLUMNS}
                 FROM comments c
                 JOIN users u ON u.id = c.sender_id
                 WHERE c.post_id = ?1
                 ORDER BY c.created_at, c.id"
            ))?;
            let rows = stmt
                .query_map([post_id], map_comment)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn update_comment(&self, id: i64, content: &str) -> DbResult<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE comments SET content = ?2, updated_at = datetime('now') WHERE id = ?1",
                params![id, content],
            )?;
            Ok(changed > 0)
        })
    }

    pub fn delete_comment(&self, id: i64) -> DbResult<bool> {
        self.with_conn(|conn| {
            let removed = conn.execute("DELETE FROM comments WHERE id = ?1", [id])?;
            Ok(removed > 0)
        })
    }
}

fn map_comment(row: &Row<'_>) -> rusqlite::Result<CommentRow> {
    Ok(CommentRow {
        id: row.get(0)?,
        post_id: row.get(1)?,
        content: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
        sender: short_user_at(row, 5)?,
    })
}
