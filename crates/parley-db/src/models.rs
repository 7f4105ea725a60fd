/// Database row types — these map directly to SQLite rows.
/// Distinct from parley-types API models to keep the DB layer independent.

pub struct UserRow {
    pub id: String,
    pub username: String,
    pub password: String,
    pub created_at: String,
}

pub struct MessageRow {
    pub id: String,
    pub room: String,
    pub name: String,
    pub body: String,
    pub time: String,
    pub avatar: Option<String>,
    pub sender_id: Option<String>,
}
