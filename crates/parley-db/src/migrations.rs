use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id          TEXT PRIMARY KEY,
            username    TEXT NOT NULL UNIQUE,
            password    TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- sender_id is a weak reference: messages outlive nothing and no
        -- foreign key ties them to users (caller convention only).
        CREATE TABLE IF NOT EXISTS messages (
            id          TEXT PRIMARY KEY,
            room        TEXT NOT NULL,
            name        TEXT NOT NULL,
            body        TEXT NOT NULL,
            time        TEXT NOT NULL,
            avatar      TEXT,
            sender_id   TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_messages_room
            ON messages(room, time);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
