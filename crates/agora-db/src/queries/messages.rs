use rusqlite::{OptionalExtension, Row, params, params_from_iter};

use super::{SHORT_USER_COLUMNS, short_user_at};
use crate::models::{BatchDelete, MessageRow};
use crate::{Database, DbResult};

impl Database {
    pub fn insert_message(
        &self,
        channel_id: &str,
        sender_id: i64,
        content: &str,
        image_url: Option<&str>,
    ) -> DbResult<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO messages (channel_id, sender_id, content, image_url) VALUES (?1, ?2, ?3, ?4)",
                params![channel_id, sender_id, content, image_url],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_message(&self, id: i64) -> DbResult<Option<MessageRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    &format!(
                        "SELECT m.id, m.channel_id, m.content, m.image_url, m.created_at, m.updated_at,
                                {SHORT_USER_COLUMNS}
                         FROM messages m
                         JOIN users u ON u.id = m.sender_id
                         WHERE m.id = ?1"
                    ),
                    [id],
                    map_message,
                )
                .optional()?;
            Ok(row)
        })
    }

    /// Newest first. Sender is joined in the same query.
    pub fn list_messages(&self, channel_id: &str, offset: u32, limit: u32) -> DbResult<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT m.id, m.channel_id, m.content, m.image_url, m.created_at, m.updated_at,
                        {SHORT_USER_COLUMNS}
                 FROM messages m
                 JOIN users u ON u.id = m.sender_id
                 WHERE m.channel_id = ?1
                 ORDER BY m.created_at DESC, m.id DESC
                 LIMIT ?2 OFFSET ?3"
            ))?;
            let rows = stmt
                .query_map(params![channel_id, limit, offset], map_message)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn update_message(&self, id: i64, content: &str) -> DbResult<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE messages SET content = ?2, updated_at = datetime('now') WHERE id = ?1",
                params![id, content],
            )?;
            Ok(changed > 0)
        })
    }

    pub fn delete_message(&self, id: i64) -> DbResult<bool> {
        self.with_conn(|conn| {
            let removed = conn.execute("DELETE FROM messages WHERE id = ?1", [id])?;
            Ok(removed > 0)
        })
    }

    /// Deletes every listed message only if all of them were sent by `sender_id`.
    /// Ids that match no message are ignored. Runs in one transaction.
    pub fn delete_messages_of(&self, sender_id: i64, ids: &[i64]) -> DbResult<BatchDelete> {
        if ids.is_empty() {
            return Ok(BatchDelete::NoneFound);
        }

        self.with_conn(|conn| {
            let tx = conn.unchecked_transaction()?;
            let placeholders = vec!["?"; ids.len()].join(", ");

            let found: Vec<(i64, i64)> = {
                let mut stmt = tx.prepare(&format!(
                    "SELECT id, sender_id FROM messages WHERE id IN ({placeholders})"
                ))?;
                stmt.query_map(params_from_iter(ids), |row| Ok((row.get(0)?, row.get(1)?)))?
                    .collect::<Result<Vec<_>, _>>()?
            };

            if found.is_empty() {
                return Ok(BatchDelete::NoneFound);
            }

            let foreign: Vec<i64> = found
                .iter()
                .filter(|(_, sender)| *sender != sender_id)
                .map(|(id, _)| *id)
                .collect();
            if !foreign.is_empty() {
                return Ok(BatchDelete::NotOwned(foreign));
            }

            let removed = tx.execute(
                &format!("DELETE FROM messages WHERE id IN ({placeholders})"),
                params_from_iter(ids),
            )?;
            tx.commit()?;
            Ok(BatchDelete::Deleted(removed))
        })
    }
}

fn map_message(row: &Row<'_>) -> rusqlite::Result<MessageRow> {
    Ok(MessageRow {
        id: row.get(0)?,
        channel_id: row.get(1)?,
        content: row.get(2)?,
        image_url: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
        sender: short_user_at(row, 6)?,
    })
}
