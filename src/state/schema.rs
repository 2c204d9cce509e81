/// Current schema version. Bump when CREATE_TABLES_SQL changes shape.
pub const SCHEMA_VERSION: i32 = 1;

/// DDL for the resource state database. Idempotent.
pub const CREATE_TABLES_SQL: &str = "
CREATE TABLE IF NOT EXISTS resource_states (
    resource_id TEXT PRIMARY KEY,
    provider    TEXT NOT NULL DEFAULT '',
    status      TEXT NOT NULL DEFAULT 'pending',
    config_json TEXT NOT NULL DEFAULT '{}',
    message     TEXT NOT NULL DEFAULT '',
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS schema_version (
    version     INTEGER PRIMARY KEY,
    applied_at  TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT ''
);
";

pub const CREATE_INDEXES_SQL: &str = "
CREATE INDEX IF NOT EXISTS idx_resource_states_status ON resource_states(status);
CREATE INDEX IF NOT EXISTS idx_resource_states_provider ON resource_states(provider);
";
