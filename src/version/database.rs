use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row};
use tracing::{debug, info};

use crate::version::error::StoreError;
use crate::version::store::{VersionQuery, VersionStore};
use crate::version::types::{ReleaseType, Version};

/// Schema migrations
/// Each version contains a list of SQL statements to execute
const MIGRATIONS: &[&[&str]] = &[
    // v1: loader column
    &["ALTER TABLE versions ADD COLUMN loader TEXT NOT NULL DEFAULT ''"],
];

const SELECT_COLUMNS: &str = "id, project_id, file_id, mod_id, version, loader, \
     game_versions, release_type, release_date, url";

pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn new(db_path: &Path) -> Result<Self, StoreError> {
        info!("Initializing version store at {:?}", db_path);

        let conn = Connection::open(db_path)?;

        // Enable WAL mode for better concurrency
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;

        Self::with_connection(conn)
    }

    /// Store backed by a private in-memory database
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        debug!("Database connection established");

        let database = Self {
            conn: Mutex::new(conn),
        };

        database.create_schema()?;
        info!("Version store initialized successfully");

        Ok(database)
    }

    /// Acquire database connection lock with proper error handling
    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }

    fn create_schema(&self) -> Result<(), StoreError> {
        debug!("Creating database schema");

        let conn = self.lock_conn()?;

        // Base table (without migration columns)
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS versions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                project_id INTEGER NOT NULL,
                file_id INTEGER NOT NULL,
                mod_id TEXT NOT NULL,
                version TEXT NOT NULL,
                game_versions TEXT NOT NULL,
                release_type INTEGER NOT NULL,
                release_date INTEGER NOT NULL,
                url TEXT NOT NULL
            )
            "#,
            [],
        )?;

        conn.execute(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_versions_identity ON versions(project_id, file_id, mod_id)",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_versions_mod ON versions(project_id, mod_id)",
            [],
        )?;

        Self::apply_migrations(&conn)?;

        debug!("Database schema created successfully");
        Ok(())
    }

    /// Apply pending migrations based on user_version pragma
    fn apply_migrations(conn: &Connection) -> Result<(), StoreError> {
        let current_version: i32 =
            conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

        for (i, statements) in MIGRATIONS.iter().enumerate() {
            let version = (i + 1) as i32;
            if version > current_version {
                for sql in *statements {
                    // Stores written before user_version was tracked may
                    // already carry the column
                    match conn.execute(sql, []) {
                        Ok(_) => {}
                        Err(rusqlite::Error::SqliteFailure(_, Some(ref msg)))
                            if msg.contains("duplicate column name") =>
                        {
                            debug!("Column already exists, skipping: {}", sql);
                        }
                        Err(e) => return Err(e.into()),
                    }
                }
                debug!("Applied migration v{}", version);
            }
        }

        let target_version = MIGRATIONS.len() as i32;
        if target_version > current_version {
            conn.pragma_update(None, "user_version", target_version)?;
            debug!("Updated schema version to v{}", target_version);
        }

        Ok(())
    }

    /// Insert one row unless its identity exists, returning the stored row
    fn insert_row(conn: &Connection, version: &Version) -> Result<Version, StoreError> {
        let inserted = conn.execute(
            r#"
            INSERT INTO versions (project_id, file_id, mod_id, version, loader,
                                  game_versions, release_type, release_date, url)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ON CONFLICT(project_id, file_id, mod_id) DO NOTHING
            "#,
            (
                version.project_id,
                version.file_id,
                &version.mod_id,
                &version.version,
                &version.loader,
                &version.game_versions,
                version.release_type.code(),
                version.release_date.timestamp_millis(),
                &version.url,
            ),
        )?;

        if inserted == 0 {
            debug!(
                "Version {}/{}/{:?} already stored",
                version.project_id, version.file_id, version.mod_id
            );
        }

        let stored = conn
            .query_row(
                &format!(
                    "SELECT {SELECT_COLUMNS} FROM versions WHERE project_id = ?1 AND file_id = ?2 AND mod_id = ?3"
                ),
                (version.project_id, version.file_id, &version.mod_id),
                Self::from_row,
            )
            .optional()?;

        stored.ok_or(StoreError::Database(rusqlite::Error::QueryReturnedNoRows))
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Version> {
        let release_type: i64 = row.get(7)?;
        let release_date: i64 = row.get(8)?;
        Ok(Version {
            id: Some(row.get(0)?),
            project_id: row.get(1)?,
            file_id: row.get(2)?,
            mod_id: row.get(3)?,
            version: row.get(4)?,
            loader: row.get(5)?,
            game_versions: row.get(6)?,
            release_type: ReleaseType::from(release_type),
            release_date: DateTime::<Utc>::from_timestamp_millis(release_date).unwrap_or_default(),
            url: row.get(9)?,
        })
    }
}

impl VersionStore for Database {
    fn find(&self, query: &VersionQuery) -> Result<Vec<Version>, StoreError> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT {SELECT_COLUMNS} FROM versions
            WHERE project_id = ?1
              AND (?2 IS NULL OR file_id = ?2)
              AND (?3 IS NULL OR mod_id = ?3 COLLATE NOCASE)
            ORDER BY id
            "#
        ))?;

        let versions = stmt
            .query_map(
                (query.project_id, query.file_id, query.mod_id.as_deref()),
                Self::from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        debug!("Found {} versions for {:?}", versions.len(), query);
        Ok(versions)
    }

    fn insert(&self, version: &Version) -> Result<Version, StoreError> {
        let conn = self.lock_conn()?;
        Self::insert_row(&conn, version)
    }

    fn insert_all(&self, versions: &[Version]) -> Result<Vec<Version>, StoreError> {
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;

        let stored = versions
            .iter()
            .map(|version| Self::insert_row(&tx, version))
            .collect::<Result<Vec<_>, _>>()?;

        tx.commit()?;
        debug!("Committed {} version rows", stored.len());
        Ok(stored)
    }

    fn update(&self, version: &Version) -> Result<(), StoreError> {
        let Some(id) = version.id else {
            return Err(StoreError::Database(rusqlite::Error::QueryReturnedNoRows));
        };

        let conn = self.lock_conn()?;
        conn.execute(
            r#"
            UPDATE versions
            SET loader = ?1, game_versions = ?2, release_type = ?3
            WHERE id = ?4
            "#,
            (
                &version.loader,
                &version.game_versions,
                version.release_type.code(),
                id,
            ),
        )?;

        debug!("Updated version row {}", id);
        Ok(())
    }
}
