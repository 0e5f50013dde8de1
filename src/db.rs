use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::NaiveDate;
use rusqlite::{Connection, params};
use tracing::{debug, info};

use crate::error::TrackerError;
use crate::models::{Application, Status};

/// Sort order for `list_applications`. Ascending id is the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Id,
    Date,
    Company,
}

impl FromStr for SortKey {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "id" => Ok(SortKey::Id),
            "date" => Ok(SortKey::Date),
            "company" => Ok(SortKey::Company),
            other => Err(TrackerError::validation(
                "sort",
                format!("'{}' is not one of: id, date, company", other),
            )),
        }
    }
}

/// Fields of a general edit. `None` leaves the field as is; `notes` set to
/// an empty string clears the column.
#[derive(Debug, Default)]
pub struct ApplicationUpdate {
    pub company: Option<String>,
    pub position: Option<String>,
    pub date_applied: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl ApplicationUpdate {
    pub fn is_empty(&self) -> bool {
        self.company.is_none()
            && self.position.is_none()
            && self.date_applied.is_none()
            && self.notes.is_none()
    }
}

pub struct Statistics {
    pub total: i64,
    pub by_status: Vec<(Status, i64)>,
}

pub struct Database {
    conn: Connection,
    path: PathBuf,
}

impl Database {
    pub fn open() -> Result<Self, TrackerError> {
        Self::open_at(&Self::default_path())
    }

    pub fn open_at(path: &Path) -> Result<Self, TrackerError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        Ok(Self {
            conn,
            path: path.to_path_buf(),
        })
    }

    #[cfg(test)]
    fn open_in_memory() -> Result<Self, TrackerError> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn,
            path: PathBuf::from(":memory:"),
        })
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn default_path() -> PathBuf {
        // Use XDG data directory or fallback
        if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "apptrack") {
            proj_dirs.data_dir().join("apptrack.db")
        } else {
            PathBuf::from("apptrack.db")
        }
    }

    /// Create the schema. Idempotent. AUTOINCREMENT keeps identifiers
    /// monotonic and never reused, even after deletion.
    pub fn init(&self) -> Result<(), TrackerError> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS applications (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                company TEXT NOT NULL,
                position TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'applied'
                    CHECK (status IN ('applied', 'interviewing', 'offer', 'rejected', 'withdrawn')),
                date_applied TEXT NOT NULL,
                notes TEXT,
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX IF NOT EXISTS idx_applications_status ON applications(status);
            CREATE INDEX IF NOT EXISTS idx_applications_date ON applications(date_applied);
            "#,
        )?;
        info!(path = %self.path.display(), "database schema ready");
        Ok(())
    }

    pub fn ensure_initialized(&self) -> Result<(), TrackerError> {
        let tables: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='applications'",
            [],
            |row| row.get(0),
        )?;
        if tables == 0 {
            return Err(TrackerError::Uninitialized);
        }
        Ok(())
    }

    // --- Application operations ---

    pub fn add_application(
        &self,
        company: &str,
        position: &str,
        date_applied: NaiveDate,
        status: Status,
        notes: Option<&str>,
    ) -> Result<i64, TrackerError> {
        let company = company.trim();
        if company.is_empty() {
            return Err(TrackerError::validation("company", "must not be empty"));
        }
        let position = position.trim();
        if position.is_empty() {
            return Err(TrackerError::validation("position", "must not be empty"));
        }
        let notes = notes.map(str::trim).filter(|n| !n.is_empty());

        self.conn.execute(
            "INSERT INTO applications (company, position, status, date_applied, notes)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![company, position, status.as_str(), date_applied, notes],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!(id, company, "added application");
        Ok(id)
    }

    pub fn list_applications(
        &self,
        status: Option<Status>,
        sort: SortKey,
    ) -> Result<Vec<Application>, TrackerError> {
        let mut sql = String::from(
            "SELECT id, company, position, status, date_applied, notes, created_at, updated_at
             FROM applications",
        );
        if status.is_some() {
            sql.push_str(" WHERE status = ?1");
        }
        sql.push_str(match sort {
            SortKey::Id => " ORDER BY id",
            SortKey::Date => " ORDER BY date_applied DESC, id",
            SortKey::Company => " ORDER BY company COLLATE NOCASE, id",
        });

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = if let Some(s) = status {
            stmt.query_map([s.as_str()], Self::row_to_application)?
        } else {
            stmt.query_map([], Self::row_to_application)?
        };

        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn get_application(&self, id: i64) -> Result<Option<Application>, TrackerError> {
        let result = self.conn.query_row(
            "SELECT id, company, position, status, date_applied, notes, created_at, updated_at
             FROM applications WHERE id = ?1",
            [id],
            Self::row_to_application,
        );
        match result {
            Ok(app) => Ok(Some(app)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn update_status(&self, id: i64, status: Status) -> Result<(), TrackerError> {
        let changed = self.conn.execute(
            "UPDATE applications SET status = ?1, updated_at = datetime('now') WHERE id = ?2",
            params![status.as_str(), id],
        )?;
        if changed == 0 {
            return Err(TrackerError::NotFound { id });
        }
        debug!(id, status = status.as_str(), "updated status");
        Ok(())
    }

    /// General edit. Validates replacements before touching the row, so a
    /// failed edit leaves the record unchanged.
    pub fn update_application(
        &self,
        id: i64,
        update: &ApplicationUpdate,
    ) -> Result<(), TrackerError> {
        let current = self
            .get_application(id)?
            .ok_or(TrackerError::NotFound { id })?;

        let company = match &update.company {
            Some(c) => {
                let c = c.trim();
                if c.is_empty() {
                    return Err(TrackerError::validation("company", "must not be empty"));
                }
                c.to_string()
            }
            None => current.company,
        };
        let position = match &update.position {
            Some(p) => {
                let p = p.trim();
                if p.is_empty() {
                    return Err(TrackerError::validation("position", "must not be empty"));
                }
                p.to_string()
            }
            None => current.position,
        };
        let date_applied = update.date_applied.unwrap_or(current.date_applied);
        let notes = match &update.notes {
            Some(n) => {
                let n = n.trim();
                if n.is_empty() { None } else { Some(n.to_string()) }
            }
            None => current.notes,
        };

        self.conn.execute(
            "UPDATE applications
             SET company = ?1, position = ?2, date_applied = ?3, notes = ?4,
                 updated_at = datetime('now')
             WHERE id = ?5",
            params![company, position, date_applied, notes, id],
        )?;
        debug!(id, "edited application");
        Ok(())
    }

    pub fn delete_application(&self, id: i64) -> Result<(), TrackerError> {
        let changed = self
            .conn
            .execute("DELETE FROM applications WHERE id = ?1", [id])?;
        if changed == 0 {
            return Err(TrackerError::NotFound { id });
        }
        debug!(id, "deleted application");
        Ok(())
    }

    /// Case-insensitive substring match on the company column, most recent
    /// applications first.
    pub fn search_by_company(&self, fragment: &str) -> Result<Vec<Application>, TrackerError> {
        let pattern = format!("%{}%", fragment.trim());
        let mut stmt = self.conn.prepare(
            "SELECT id, company, position, status, date_applied, notes, created_at, updated_at
             FROM applications WHERE company LIKE ?1
             ORDER BY date_applied DESC, id",
        )?;
        let rows = stmt.query_map([pattern], Self::row_to_application)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn statistics(&self) -> Result<Statistics, TrackerError> {
        let total: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM applications", [], |row| row.get(0))?;

        let mut stmt = self
            .conn
            .prepare("SELECT status, COUNT(*) FROM applications GROUP BY status")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;

        let mut counts = std::collections::HashMap::new();
        for row in rows {
            let (status, count) = row?;
            counts.insert(status, count);
        }

        let by_status = Status::ALL
            .iter()
            .map(|s| (*s, counts.get(s.as_str()).copied().unwrap_or(0)))
            .collect();

        Ok(Statistics { total, by_status })
    }

    fn row_to_application(row: &rusqlite::Row) -> rusqlite::Result<Application> {
        let status: String = row.get(3)?;
        let status = status.parse::<Status>().map_err(|_| {
            rusqlite::Error::FromSqlConversionFailure(
                3,
                rusqlite::types::Type::Text,
                format!("unknown status '{}'", status).into(),
            )
        })?;
        Ok(Application {
            id: row.get(0)?,
            company: row.get(1)?,
            position: row.get(2)?,
            status,
            date_applied: row.get(4)?,
            notes: row.get(5)?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
        })
    }
}
