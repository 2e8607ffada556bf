//! Database schema and migrations for Depot.
//!
//! Migrations are applied sequentially when the database is opened; the
//! schema_version table tracks which migrations have already run.

/// Database migrations.
pub const MIGRATIONS: &[&str] = &[
    // v1: Initial schema - files table
    r#"
-- File records: one row per stored blob
CREATE TABLE files (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    filename       TEXT NOT NULL UNIQUE,              -- generated storage filename
    original_name  TEXT NOT NULL,                     -- user-supplied display name
    mimetype       TEXT NOT NULL,
    size           INTEGER NOT NULL,
    path           TEXT NOT NULL,                     -- internal storage path, never serialized
    uploaded_by    TEXT NOT NULL DEFAULT 'anonymous',
    description    TEXT NOT NULL DEFAULT '',
    tags           TEXT NOT NULL DEFAULT '[]',        -- JSON array of strings
    download_count INTEGER NOT NULL DEFAULT 0,
    created_at     TEXT NOT NULL,
    updated_at     TEXT NOT NULL
);

CREATE INDEX idx_files_original_name ON files(original_name);
CREATE INDEX idx_files_uploaded_by ON files(uploaded_by);
CREATE INDEX idx_files_created_at ON files(created_at DESC);
CREATE INDEX idx_files_tags ON files(tags);
"#,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_not_empty() {
        assert!(!MIGRATIONS.is_empty());
    }

    #[test]
    fn test_first_migration_creates_files_table() {
        assert!(MIGRATIONS[0].contains("CREATE TABLE files"));
        assert!(MIGRATIONS[0].contains("filename"));
        assert!(MIGRATIONS[0].contains("download_count"));
    }
}
