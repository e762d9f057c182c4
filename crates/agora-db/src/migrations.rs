use rusqlite::Connection;
use tracing::info;

use crate::DbResult;

pub fn run(conn: &Connection) -> DbResult<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            CREATE TABLE users (
                id                      INTEGER PRIMARY KEY AUTOINCREMENT,
                email                   TEXT NOT NULL UNIQUE,
                password                TEXT NOT NULL,
                first_name              TEXT NOT NULL,
                last_name               TEXT NOT NULL,
                date_of_birth           TEXT,
                about                   TEXT,
                image_url               TEXT,
                confirmed               INTEGER NOT NULL DEFAULT 0,
                forgot_password_locked  INTEGER NOT NULL DEFAULT 0,
                online                  INTEGER NOT NULL DEFAULT 0,
                created_at              TEXT NOT NULL DEFAULT (datetime('now')),
                last_active             TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE channels (
                id          TEXT PRIMARY KEY,
                name        TEXT NOT NULL,
                tag         TEXT NOT NULL UNIQUE,
                is_private  INTEGER NOT NULL DEFAULT 1,
                owner_id    INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                created_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            -- The owner is never stored here; ownership lives on channels.owner_id.
            CREATE TABLE channel_members (
                channel_id  TEXT NOT NULL REFERENCES channels(id) ON DELETE CASCADE,
                user_id     INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                joined_at   TEXT NOT NULL DEFAULT (datetime('now')),
                PRIMARY KEY (channel_id, user_id)
            );

            CREATE INDEX idx_channel_members_user ON channel_members(user_id);

            CREATE TABLE messages (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                channel_id  TEXT NOT NULL REFERENCES channels(id) ON DELETE CASCADE,
                sender_id   INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                content     TEXT NOT NULL,
                image_url   TEXT,
                created_at  TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at  TEXT
            );

            CREATE INDEX idx_messages_channel ON messages(channel_id, created_at);

            CREATE TABLE posts (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                owner_id    INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                title       TEXT NOT NULL,
                body        TEXT NOT NULL,
                image_url   TEXT,
                created_at  TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at  TEXT
            );

            CREATE INDEX idx_posts_owner ON posts(owner_id, created_at);

            CREATE TABLE comments (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                post_id     INTEGER NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
                sender_id   INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                content     TEXT NOT NULL,
                created_at  TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at  TEXT
            );

            CREATE INDEX idx_comments_post ON comments(post_id);

            CREATE TABLE likes (
                post_id     INTEGER NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
                user_id     INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                created_at  TEXT NOT NULL DEFAULT (datetime('now')),
                PRIMARY KEY (post_id, user_id)
            );

            CREATE TABLE subscriptions (
                subscriber_id     INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                subscribed_to_id  INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                created_at        TEXT NOT NULL DEFAULT (datetime('now')),
                PRIMARY KEY (subscriber_id, subscribed_to_id),
                CHECK (subscriber_id <> subscribed_to_id)
            );

            CREATE INDEX idx_subscriptions_target ON subscriptions(subscribed_to_id);

            CREATE TABLE categories (
                id    INTEGER PRIMARY KEY AUTOINCREMENT,
                name  TEXT NOT NULL UNIQUE
            );

            CREATE TABLE post_categories (
                post_id      INTEGER NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
                category_id  INTEGER NOT NULL REFERENCES categories(id) ON DELETE CASCADE,
                PRIMARY KEY (post_id, category_id)
            );

            CREATE TABLE user_categories (
                user_id      INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                category_id  INTEGER NOT NULL REFERENCES categories(id) ON DELETE CASCADE,
                PRIMARY KEY (user_id, category_id)
            );

            CREATE TABLE channel_categories (
                channel_id   TEXT NOT NULL REFERENCES channels(id) ON DELETE CASCADE,
                category_id  INTEGER NOT NULL REFERENCES categories(id) ON DELETE CASCADE,
                PRIMARY KEY (channel_id, category_id)
            );

            CREATE TABLE one_time_keys (
                key         TEXT PRIMARY KEY,
                purpose     TEXT NOT NULL,
                user_id     INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                expires_at  TEXT NOT NULL
            );

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run(&conn).unwrap();
        run(&conn).unwrap();

        let versions: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(versions, 1);
    }
}
