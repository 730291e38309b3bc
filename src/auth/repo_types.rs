use sqlx::FromRow;

pub type UserId = i64;

/// Credentials row; `created_at` stays in the table only.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: UserId,
    pub username: String,       // unique, case-sensitive
    pub password_hash: String,  // Argon2 PHC string
}
