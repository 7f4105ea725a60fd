use anyhow::Result;
use rusqlite::Connection;

use parley_types::models::Message;

use crate::Database;
use crate::models::{MessageRow, UserRow};

impl Database {
    // -- Users --

    pub fn create_user(&self, id: &str, username: &str, password_hash: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, username, password) VALUES (?1, ?2, ?3)",
                (id, username, password_hash),
            )?;
            Ok(())
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_username(conn, username))
    }

    // -- Messages --

    pub fn insert_message(&self, msg: &Message) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO messages (id, room, name, body, time, avatar, sender_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![
                    msg.id.to_string(),
                    msg.room,
                    msg.name,
                    msg.text,
                    msg.time.to_rfc3339(),
                    msg.avatar,
                    msg.sender_id.map(|id| id.to_string()),
                ],
            )?;
            Ok(())
        })
    }

    /// All messages, oldest first. Insertion order is the one ordering the
    /// API promises to keep consistent.
    pub fn all_messages(&self) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, room, name, body, time, avatar, sender_id
                 FROM messages ORDER BY time ASC",
            )?;
            let rows = stmt
                .query_map([], map_message_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Messages in a single room, oldest first.
    pub fn messages_in_room(&self, room: &str) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, room, name, body, time, avatar, sender_id
                 FROM messages WHERE room = ?1 ORDER BY time ASC",
            )?;
            let rows = stmt
                .query_map([room], map_message_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn query_user_by_username(conn: &Connection, username: &str) -> Result<Option<UserRow>> {
    let mut stmt =
        conn.prepare("SELECT id, username, password, created_at FROM users WHERE username = ?1")?;

    let row = stmt
        .query_row([username], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                username: row.get(1)?,
                password: row.get(2)?,
                created_at: row.get(3)?,
            })
        })
        .optional()?;

    Ok(row)
}

fn map_message_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<MessageRow> {
    Ok(MessageRow {
        id: row.get(0)?,
        room: row.get(1)?,
        name: row.get(2)?,
        body: row.get(3)?,
        time: row.get(4)?,
        avatar: row.get(5)?,
        sender_id: row.get(6)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use parley_types::models::Message;
    use uuid::Uuid;

    use crate::Database;

    fn open_db(dir: &tempfile::TempDir) -> Database {
        Database::open(&dir.path().join("test.db")).unwrap()
    }

    fn message(room: &str, text: &str, minute: u32) -> Message {
        Message {
            id: Uuid::new_v4(),
            room: room.into(),
            name: "alice".into(),
            text: text.into(),
            time: Utc.with_ymd_and_hms(2026, 1, 1, 12, minute, 0).unwrap(),
            avatar: None,
            sender_id: None,
        }
    }

    #[test]
    fn duplicate_username_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let db = open_db(&dir);

        db.create_user("u1", "alice", "hash1").unwrap();
        assert!(db.create_user("u2", "alice", "hash2").is_err());

        let user = db.get_user_by_username("alice").unwrap().unwrap();
        assert_eq!(user.id, "u1");
        assert_eq!(user.password, "hash1");
    }

    #[test]
    fn unknown_username_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let db = open_db(&dir);

        assert!(db.get_user_by_username("nobody").unwrap().is_none());
    }

    #[test]
    fn room_filter_returns_only_matching_messages() {
        let dir = tempfile::tempdir().unwrap();
        let db = open_db(&dir);

        db.insert_message(&message("general", "one", 0)).unwrap();
        db.insert_message(&message("random", "two", 1)).unwrap();
        db.insert_message(&message("general", "three", 2)).unwrap();

        let general = db.messages_in_room("general").unwrap();
        assert_eq!(general.len(), 2);
        assert!(general.iter().all(|m| m.room == "general"));

        assert!(db.messages_in_room("empty").unwrap().is_empty());
        assert_eq!(db.all_messages().unwrap().len(), 3);
    }

    #[test]
    fn messages_come_back_oldest_first() {
        let dir = tempfile::tempdir().unwrap();
        let db = open_db(&dir);

        db.insert_message(&message("general", "later", 5)).unwrap();
        db.insert_message(&message("general", "earlier", 1)).unwrap();

        let rows = db.all_messages().unwrap();
        assert_eq!(rows[0].body, "earlier");
        assert_eq!(rows[1].body, "later");
    }

    #[test]
    fn optional_fields_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let db = open_db(&dir);

        let sender = Uuid::new_v4();
        let mut msg = message("general", "hi", 0);
        msg.avatar = Some("https://example.com/a.png".into());
        msg.sender_id = Some(sender);
        db.insert_message(&msg).unwrap();

        let rows = db.all_messages().unwrap();
        assert_eq!(rows[0].avatar.as_deref(), Some("https://example.com/a.png"));
        assert_eq!(rows[0].sender_id.as_deref(), Some(sender.to_string().as_str()));
    }
}
