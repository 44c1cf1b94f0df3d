/// Applied in order on every initialize; each statement is idempotent.
pub const MIGRATIONS: &[&str] = &["CREATE TABLE IF NOT EXISTS kv (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);"];
