use sqlx::FromRow;

/// The stored credential columns of one administrator.
#[derive(Debug, Clone, FromRow)]
pub struct AdminRow {
    pub pass_hash: String,
    pub salt: String,
}
