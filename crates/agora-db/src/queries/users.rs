use rusqlite::{Connection, OptionalExtension, Row, params};

use super::{SHORT_USER_COLUMNS, short_user_at};
use crate::models::{NewUser, ProfileUpdate, ShortUserRow, UserRow};
use crate::{Database, DbResult};

const USER_COLUMNS: &str = "id, email, password, first_name, last_name, date_of_birth, about, \
     image_url, confirmed, forgot_password_locked, online, created_at, last_active";

impl Database {
    /// Fails with `DbError::Conflict` when the email is already registered.
    pub fn create_user(&self, user: &NewUser<'_>) -> DbResult<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (email, password, first_name, last_name, date_of_birth)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    user.email,
                    user.password_hash,
                    user.first_name,
                    user.last_name,
                    user.date_of_birth
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_user_by_id(&self, id: i64) -> DbResult<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id = ?1", &id))
    }

    pub fn get_user_by_email(&self, email: &str) -> DbResult<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "email = ?1", &email))
    }

    pub fn list_users(&self, offset: u32, limit: u32) -> DbResult<Vec<ShortUserRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SHORT_USER_COLUMNS} FROM users u ORDER BY u.id LIMIT ?1 OFFSET ?2"
            ))?;
            let rows = stmt
                .query_map(params![limit, offset], |row| short_user_at(row, 0))?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Applies the non-empty fields of `update`. Returns false if the user is gone.
    pub fn update_profile(&self, id: i64, update: &ProfileUpdate) -> DbResult<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE users SET
                    first_name    = COALESCE(?2, first_name),
                    last_name     = COALESCE(?3, last_name),
                    date_of_birth = COALESCE(?4, date_of_birth),
                    about         = COALESCE(?5, about),
                    image_url     = COALESCE(?6, image_url)
                 WHERE id = ?1",
                params![
                    id,
                    update.first_name,
                    update.last_name,
                    update.date_of_birth,
                    update.about,
                    update.image_url
                ],
            )?;
            Ok(changed > 0)
        })
    }

    pub fn confirm_user(&self, id: i64) -> DbResult<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute("UPDATE users SET confirmed = 1 WHERE id = ?1", [id])?;
            Ok(changed > 0)
        })
    }

    /// Sets the presence flag and stamps `last_active`.
    pub fn set_online(&self, id: i64, online: bool) -> DbResult<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE users SET online = ?2, last_active = datetime('now') WHERE id = ?1",
                params![id, online],
            )?;
            Ok(())
        })
    }

    pub fn lock_for_recovery(&self, id: i64) -> DbResult<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE users SET forgot_password_locked = 1 WHERE id = ?1",
                [id],
            )?;
            Ok(())
        })
    }

    /// Stores a new password hash and lifts the recovery lock.
    pub fn reset_password(&self, id: i64, password_hash: &str) -> DbResult<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE users SET password = ?2, forgot_password_locked = 0 WHERE id = ?1",
                params![id, password_hash],
            )?;
            Ok(changed > 0)
        })
    }
}

fn query_user(
    conn: &Connection,
    predicate: &str,
    value: &dyn rusqlite::ToSql,
) -> DbResult<Option<UserRow>> {
    let mut stmt = conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users WHERE {predicate}"))?;
    let row = stmt.query_row([value], map_user).optional()?;
    Ok(row)
}

fn map_user(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        email: row.get(1)?,
        password: row.get(2)?,
        first_name: row.get(3)?,
        last_name: row.get(4)?,
        date_of_birth: row.get(5)?,
        about: row.get(6)?,
        image_url: row.get(7)?,
        confirmed: row.get(8)?,
        forgot_password_locked: row.get(9)?,
        online: row.get(10)?,
        created_at: row.get(11)?,
        last_active: row.get(12)?,
    })
}
