use sqlx::FromRow;
use time::OffsetDateTime;

/// Agent record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct Account {
    pub id: i64,
    pub email: String,
    pub password_hash: String, // Argon2id output, Base64
    pub salt: String,
    pub name: Option<String>,
    pub created_at: OffsetDateTime,
    pub last_seen: OffsetDateTime,
}

/// Fields supplied by the service when inserting an agent.
#[derive(Debug, Clone, Copy)]
pub struct NewAccount<'a> {
    pub email: &'a str,
    pub password_hash: &'a str,
    pub salt: &'a str,
    pub name: Option<&'a str>,
}
