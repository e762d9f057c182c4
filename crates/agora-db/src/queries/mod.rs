mod categories;
mod channels;
mod comments;
mod keys;
mod likes;
mod messages;
mod posts;
mod subscriptions;
mod users;

pub use categories::CategoryLink;

use rusqlite::Row;

use crate::models::ShortUserRow;

/// Columns read by [`short_user_at`], for a `users` table aliased as `u`.
pub(crate) const SHORT_USER_COLUMNS: &str =
    "u.id, u.email, u.first_name, u.last_name, u.online, u.image_url, u.last_active";

/// Reads the seven [`SHORT_USER_COLUMNS`] starting at `start`.
pub(crate) fn short_user_at(row: &Row<'_>, start: usize) -> rusqlite::Result<ShortUserRow> {
    Ok(ShortUserRow {
        id: row.get(start)?,
        email: row.get(start + 1)?,
        first_name: row.get(start + 2)?,
        last_name: row.get(start + 3)?,
        online: row.get(start + 4)?,
        image_url: row.get(start + 5)?,
        last_active: row.get(start + 6)?,
    })
}
