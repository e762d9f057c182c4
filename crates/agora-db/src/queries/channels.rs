use rusqlite::{OptionalExtension, Row, params};

use super::categories::{CategoryLink, link_categories};
use super::{SHORT_USER_COLUMNS, short_user_at};
use crate::models::{ChannelRow, NewChannel, ShortUserRow};
use crate::{Database, DbResult};

impl Database {
    /// Fails with `DbError::Conflict` when the tag is taken. Category links
    /// are written in the same transaction.
    pub fn create_channel(&self, channel: &NewChannel<'_>, category_ids: &[i64]) -> DbResult<()> {
        self.with_conn(|conn| {
            let tx = conn.unchecked_transaction()?;
            tx.execute(
                "INSERT INTO channels (id, name, tag, is_private, owner_id) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    channel.id,
                    channel.name,
                    channel.tag,
                    channel.is_private,
                    channel.owner_id
                ],
            )?;
            link_categories(&tx, CategoryLink::Channel, &channel.id, category_ids)?;
            tx.commit()?;
            Ok(())
        })
    }

    pub fn get_channel(&self, id: &str) -> DbResult<Option<ChannelRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    &format!(
                        "SELECT c.id, c.name, c.tag, c.is_private, c.created_at, {SHORT_USER_COLUMNS}
                         FROM channels c
                         JOIN users u ON u.id = c.owner_id
                         WHERE c.id = ?1"
                    ),
                    [id],
                    map_channel,
                )
                .optional()?;
            Ok(row)
        })
    }

    /// Channels the user owns or belongs to.
    pub fn channels_for_user(&self, user_id: i64) -> DbResult<Vec<ChannelRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT c.id, c.name, c.tag, c.is_private, c.created_at, {SHORT_USER_COLUMNS}
                 FROM channels c
                 JOIN users u ON u.id = c.owner_id
                 WHERE c.owner_id = ?1
                    OR EXISTS (SELECT 1 FROM channel_members m
                               WHERE m.channel_id = c.id AND m.user_id = ?1)
                 ORDER BY c.created_at, c.tag"
            ))?;
            let rows = stmt
                .query_map([user_id], map_channel)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Deletes the channel together with its members and messages.
    pub fn delete_channel(&self, id: &str) -> DbResult<bool> {
        self.with_conn(|conn| {
            let removed = conn.execute("DELETE FROM channels WHERE id = ?1", [id])?;
            Ok(removed > 0)
        })
    }

    /// Existence check against the membership table. Does not consider ownership.
    pub fn is_channel_member(&self, channel_id: &str, user_id: i64) -> DbResult<bool> {
        self.with_conn(|conn| {
            let exists = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM channel_members WHERE channel_id = ?1 AND user_id = ?2)",
                params![channel_id, user_id],
                |row| row.get(0),
            )?;
            Ok(exists)
        })
    }

    /// Fails with `DbError::Conflict` when the user is already a member.
    pub fn add_member(&self, channel_id: &str, user_id: i64) -> DbResult<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO channel_members (channel_id, user_id) VALUES (?1, ?2)",
                params![channel_id, user_id],
            )?;
            Ok(())
        })
    }

    /// Returns false when there was no membership to remove.
    pub fn remove_member(&self, channel_id: &str, user_id: i64) -> DbResult<bool> {
        self.with_conn(|conn| {
            let removed = conn.execute(
                "DELETE FROM channel_members WHERE channel_id = ?1 AND user_id = ?2",
                params![channel_id, user_id],
            )?;
            Ok(removed > 0)
        })
    }

    pub fn list_members(&self, channel_id: &str) -> DbResult<Vec<ShortUserRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SHORT_USER_COLUMNS}
                 FROM channel_members m
                 JOIN users u ON u.id = m.user_id
                 WHERE m.channel_id = ?1
                 ORDER BY m.joined_at, u.id"
            ))?;
            let rows = stmt
                .query_map([channel_id], |row| short_user_at(row, 0))?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn map_channel(row: &Row<'_>) -> rusqlite::Result<ChannelRow> {
    Ok(ChannelRow {
        id: row.get(0)?,
        name: row.get(1)?,
        tag: row.get(2)?,
        is_private: row.get(3)?,
        created_at: row.get(4)?,
        owner: short_user_at(row, 5)?,
    })
}
