use rusqlite::params;

use crate::models::LikeRow;
use crate::{Database, DbResult};

impl Database {
    /// Single insert keyed by `(post_id, user_id)`; a repeat is `DbError::Conflict`.
    pub fn insert_like(&self, post_id: i64, user_id: i64) -> DbResult<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO likes (post_id, user_id) VALUES (?1, ?2)",
                params![post_id, user_id],
            )?;
            Ok(())
        })
    }

    /// Returns false when the pair had no like.
    pub fn delete_like(&self, post_id: i64, user_id: i64) -> DbResult<bool> {
        self.with_conn(|conn| {
            let removed = conn.execute(
                "DELETE FROM likes WHERE post_id = ?1 AND user_id = ?2",
                params![post_id, user_id],
            )?;
            Ok(removed > 0)
        })
    }

    pub fn likes_for_post(&self, post_id: i64) -> DbResult<Vec<LikeRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT post_id, user_id, created_at FROM likes WHERE post_id = ?1 ORDER BY created_at, user_id",
            )?;
            let rows = stmt
                .query_map([post_id], |row| {
                    Ok(LikeRow {
                        post_id: row.get(0)?,
                        user_id: row.get(1)?,
                        created_at: row.get(2)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}
