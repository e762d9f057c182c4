use rusqlite::params;

use super::{SHORT_USER_COLUMNS, short_user_at};
use crate::models::ShortUserRow;
use crate::{Database, DbResult};

/// Direction of a follow-graph listing.
#[derive(Clone, Copy)]
enum Side {
    /// Users following the given user.
    Followers,
    /// Users the given user follows.
    Following,
}

impl Side {
    /// (column matched against the user, column joined to `users`)
    fn columns(self) -> (&'static str, &'static str) {
        match self {
            Self::Followers => ("subscribed_to_id", "subscriber_id"),
            Self::Following => ("subscriber_id", "subscribed_to_id"),
        }
    }
}

impl Database {
    /// Inserts one edge. A repeat is `DbError::Conflict`; self-edges violate a CHECK.
    pub fn subscribe(&self, subscriber_id: i64, target_id: i64) -> DbResult<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO subscriptions (subscriber_id, subscribed_to_id) VALUES (?1, ?2)",
                params![subscriber_id, target_id],
            )?;
            Ok(())
        })
    }

    /// Returns false when there was no edge.
    pub fn unsubscribe(&self, subscriber_id: i64, target_id: i64) -> DbResult<bool> {
        self.with_conn(|conn| {
            let removed = conn.execute(
                "DELETE FROM subscriptions WHERE subscriber_id = ?1 AND subscribed_to_id = ?2",
                params![subscriber_id, target_id],
            )?;
            Ok(removed > 0)
        })
    }

    pub fn followers(
        &self,
        user_id: i64,
        online: Option<bool>,
        offset: u32,
        limit: u32,
    ) -> DbResult<Vec<ShortUserRow>> {
        self.follow_listing(Side::Followers, user_id, online, offset, limit)
    }

    pub fn following(
        &self,
        user_id: i64,
        online: Option<bool>,
        offset: u32,
        limit: u32,
    ) -> DbResult<Vec<ShortUserRow>> {
        self.follow_listing(Side::Following, user_id, online, offset, limit)
    }

    pub fn follower_count(&self, user_id: i64) -> DbResult<i64> {
        self.follow_count(Side::Followers, user_id)
    }

    pub fn following_count(&self, user_id: i64) -> DbResult<i64> {
        self.follow_count(Side::Following, user_id)
    }

    fn follow_listing(
        &self,
        side: Side,
        user_id: i64,
        online: Option<bool>,
        offset: u32,
        limit: u32,
    ) -> DbResult<Vec<ShortUserRow>> {
        let (matched, joined) = side.columns();
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SHORT_USER_COLUMNS}
                 FROM subscriptions s
                 JOIN users u ON u.id = s.{joined}
                 WHERE s.{matched} = ?1
                   AND (?2 IS NULL OR u.online = ?2)
                 ORDER BY s.created_at DESC, u.id
                 LIMIT ?3 OFFSET ?4"
            ))?;
            let rows = stmt
                .query_map(params![user_id, online, limit, offset], |row| short_user_at(row, 0))?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    fn follow_count(&self, side: Side, user_id: i64) -> DbResult<i64> {
        let (matched, _) = side.columns();
        self.with_conn(|conn| {
            let count = conn.query_row(
                &format!("SELECT COUNT(*) FROM subscriptions WHERE {matched} = ?1"),
                [user_id],
                |row| row.get(0),
            )?;
            Ok(count)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures;
    use crate::DbError;

    #[test]
    fn edge_is_unique_per_ordered_pair() {
        let db = fixtures::db();
        let a = fixtures::user(&db, "a@test.com");
        let b = fixtures::user(&db, "b@test.com");

        db.subscribe(b, a).unwrap();
        assert!(db.subscribe(b, a).unwrap_err().is_conflict());
        // The reverse edge is a different pair.
        db.subscribe(a, b).unwrap();

        assert_eq!(db.follower_count(a).unwrap(), 1);
        assert_eq!(db.following_count(b).unwrap(), 1);
    }

    #[test]
    fn self_edge_is_rejected_by_schema() {
        let db = fixtures::db();
        let a = fixtures::user(&db, "a@test.com");

        let err = db.subscribe(a, a).unwrap_err();
        assert!(matches!(err, DbError::Sqlite(_)));
    }

    #[test]
    fn unsubscribe_removes_exactly_once() {
        let db = fixtures::db();
        let a = fixtures::user(&db, "a@test.com");
        let b = fixtures::user(&db, "b@test.com");
        db.subscribe(b, a).unwrap();

        assert!(db.unsubscribe(b, a).unwrap());
        assert!(!db.unsubscribe(b, a).unwrap());
        assert_eq!(db.follower_count(a).unwrap(), 0);
    }

    #[test]
    fn listings_filter_by_online_flag() {
        let db = fixtures::db();
        let star = fixtures::user(&db, "star@test.com");
        let awake = fixtures::user(&db, "awake@test.com");
        let asleep = fixtures::user(&db, "asleep@test.com");
        db.subscribe(awake, star).unwrap();
        db.subscribe(asleep, star).unwrap();
        db.set_online(awake, true).unwrap();

        assert_eq!(db.followers(star, None, 0, 50).unwrap().len(), 2);
        let online = db.followers(star, Some(true), 0, 50).unwrap();
        assert_eq!(online.len(), 1);
        assert_eq!(online[0].id, awake);
        assert_eq!(db.followers(star, Some(false), 0, 50).unwrap()[0].id, asleep);
        assert_eq!(db.following(awake, None, 0, 50).unwrap()[0].id, star);
        assert_eq!(db.followers(star, None, 1, 50).unwrap().len(), 1);
    }
}
