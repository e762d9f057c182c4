use rusqlite::{OptionalExtension, params};

use crate::models::KeyPurpose;
use crate::{Database, DbResult};

impl Database {
    /// Stores a one-time key that expires `ttl_secs` from now.
    pub fn insert_key(
        &self,
        key: &str,
        purpose: KeyPurpose,
        user_id: i64,
        ttl_secs: i64,
    ) -> DbResult<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO one_time_keys (key, purpose, user_id, expires_at)
                 VALUES (?1, ?2, ?3, datetime('now', ?4 || ' seconds'))",
                params![key, purpose.as_str(), user_id, ttl_secs],
            )?;
            Ok(())
        })
    }

    /// Consumes a live key and returns the user it was issued for.
    /// Expired, unknown or wrong-purpose keys yield `None`.
    pub fn redeem_key(&self, key: &str, purpose: KeyPurpose) -> DbResult<Option<i64>> {
        self.with_conn(|conn| {
            let user_id = conn
                .query_row(
                    "DELETE FROM one_time_keys
                     WHERE key = ?1 AND purpose = ?2 AND expires_at > datetime('now')
                     RETURNING user_id",
                    params![key, purpose.as_str()],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(user_id)
        })
    }

    /// Removes every expired key. Returns how many were dropped.
    pub fn prune_expired_keys(&self) -> DbResult<usize> {
        self.with_conn(|conn| {
            let removed = conn.execute(
                "DELETE FROM one_time_keys WHERE expires_at <= datetime('now')",
                [],
            )?;
            Ok(removed)
        })
    }
}
