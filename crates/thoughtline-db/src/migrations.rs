use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
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
                id          TEXT PRIMARY KEY,
                username    TEXT NOT NULL UNIQUE,
                email       TEXT NOT NULL UNIQUE,
                created_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE thoughts (
                id              TEXT PRIMARY KEY,
                thought_text    TEXT NOT NULL,
                username        TEXT NOT NULL,
                user_id         TEXT NOT NULL,
                created_at      TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX idx_thoughts_username ON thoughts(username);
            CREATE INDEX idx_thoughts_user ON thoughts(user_id);

            -- Ordered thought ids per user. Rows go away with either side.
            CREATE TABLE user_thoughts (
                seq         INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id     TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                thought_id  TEXT NOT NULL REFERENCES thoughts(id) ON DELETE CASCADE
            );

            CREATE INDEX idx_user_thoughts_user ON user_thoughts(user_id, seq);

            -- One-directional: (user_id -> friend_id) says nothing about the reverse.
            CREATE TABLE user_friends (
                seq         INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id     TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                friend_id   TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                UNIQUE(user_id, friend_id)
            );

            CREATE TABLE reactions (
                seq             INTEGER PRIMARY KEY AUTOINCREMENT,
                reaction_id     TEXT NOT NULL,
                thought_id      TEXT NOT NULL REFERENCES thoughts(id) ON DELETE CASCADE,
                reaction_body   TEXT NOT NULL,
                username        TEXT NOT NULL,
                created_at      TEXT NOT NULL DEFAULT (datetime('now')),
                UNIQUE(thought_id, reaction_id),
                UNIQUE(thought_id, reaction_body, username)
            );

            CREATE INDEX idx_reactions_thought ON reactions(thought_id, seq);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
