use anyhow::{Context, Result};
use async_trait::async_trait;
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::sync::Mutex;

use super::models::{ConfigMap, ResourceState, ResourceStatus, StateFilter};
use super::schema;
use super::store::StateStore;

/// SQLite-backed state store for durable single-host deployments.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create the state database at the given path.
    pub fn open(db_path: &str) -> Result<Self> {
        if let Some(dir) = Path::new(db_path).parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir)?;
            }
        }
        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to open state database at {}", db_path))?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (for testing).
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn now() -> String {
        chrono::Utc::now().to_rfc3339()
    }
}

fn state_from_row(row: &Row<'_>) -> rusqlite::Result<ResourceState> {
    let status_str: String = row.get(2)?;
    let status = ResourceStatus::parse(&status_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            rusqlite::types::Type::Text,
            format!("unknown resource status '{}'", status_str).into(),
        )
    })?;
    let config_json: String = row.get(3)?;
    let config: ConfigMap = serde_json::from_str(&config_json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Text,
            Box::new(e),
        )
    })?;
    Ok(ResourceState {
        resource_id: row.get(0)?,
        provider: row.get(1)?,
        status,
        config,
        message: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

const SELECT_COLUMNS: &str =
    "resource_id, provider, status, config_json, message, created_at, updated_at";

#[async_trait]
impl StateStore for SqliteStore {
    async fn initialize(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(schema::CREATE_TABLES_SQL)?;
        conn.execute_batch(schema::CREATE_INDEXES_SQL)?;
        conn.execute(
            "INSERT OR IGNORE INTO schema_version (version, applied_at, description) VALUES (?1, ?2, ?3)",
            params![schema::SCHEMA_VERSION, Self::now(), "Initial schema"],
        )?;
        Ok(())
    }

    async fn save_state(&self, state: &ResourceState) -> Result<()> {
        let config_json = serde_json::to_string(&state.config)?;
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO resource_states (resource_id, provider, status, config_json, message, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(resource_id) DO UPDATE SET
                provider = excluded.provider,
                status = excluded.status,
                config_json = excluded.config_json,
                message = excluded.message,
                updated_at = excluded.updated_at",
            params![
                state.resource_id,
                state.provider,
                state.status.as_str(),
                config_json,
                state.message,
                state.created_at,
                state.updated_at,
            ],
        )?;
        Ok(())
    }

    async fn get_state(&self, resource_id: &str) -> Result<Option<ResourceState>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM resource_states WHERE resource_id = ?1",
            SELECT_COLUMNS
        ))?;
        let result = stmt
            .query_row(params![resource_id], state_from_row)
            .ok();
        Ok(result)
    }

    async fn list(&self, filter: &StateFilter) -> Result<Vec<ResourceState>> {
        let conn = self.conn.lock().unwrap();
        let mut sql = format!("SELECT {} FROM resource_states WHERE 1=1", SELECT_COLUMNS);
        let mut param_values: Vec<String> = Vec::new();
        let mut param_idx = 1;

        if let Some(status) = filter.status {
            sql.push_str(&format!(" AND status = ?{}", param_idx));
            param_values.push(status.as_str().to_string());
            param_idx += 1;
        }
        if let Some(ref provider) = filter.provider {
            sql.push_str(&format!(" AND provider = ?{}", param_idx));
            param_values.push(provider.clone());
        }

        sql.push_str(" ORDER BY resource_id");

        let mut stmt = conn.prepare(&sql)?;
        let param_refs: Vec<&dyn rusqlite::ToSql> = param_values
            .iter()
            .map(|v| v as &dyn rusqlite::ToSql)
            .collect();
        let rows = stmt
            .query_map(param_refs.as_slice(), state_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    async fn delete(&self, resource_id: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "DELETE FROM resource_states WHERE resource_id = ?1",
            params![resource_id],
        )?;
        Ok(())
    }
}
