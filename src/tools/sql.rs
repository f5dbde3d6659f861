//! SQL lookup demo plugin
//!
//! Wraps an embedded SQLite database holding election demo data
//! (candidates, polling stations, results). Query output is rendered as
//! CSV under a `[DATABASE RESULTS]` banner so the model can read it back.

use rusqlite::types::ValueRef;
use rusqlite::Connection;
use std::sync::Mutex;

use crate::core::{RedraftError, Result};

/// Embedded election demo database
pub struct ElectionDb {
    conn: Mutex<Connection>,
}

impl ElectionDb {
    /// Open the database at `path` (":memory:" for a throwaway instance)
    ///
    /// A database with no tables is seeded with the demo data set.
    pub fn open(path: &str) -> Result<Self> {
        let conn = if path == ":memory:" {
            Connection::open_in_memory()?
        } else {
            Connection::open(path)?
        };

        let table_count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'",
            [],
            |row| row.get(0),
        )?;
        if table_count == 0 {
            Self::seed(&conn)?;
        }

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn seed(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "BEGIN;
             CREATE TABLE candidates (
                 id INTEGER PRIMARY KEY,
                 name TEXT NOT NULL,
                 party TEXT NOT NULL
             );
             CREATE TABLE polling_stations (
                 id INTEGER PRIMARY KEY,
                 name TEXT NOT NULL,
                 district TEXT NOT NULL
             );
             CREATE TABLE results (
                 candidate_id INTEGER NOT NULL REFERENCES candidates(id),
                 station_id INTEGER NOT NULL REFERENCES polling_stations(id),
                 votes INTEGER NOT NULL
             );
             INSERT INTO candidates (id, name, party) VALUES
                 (1, 'Awa Ndiaye', 'Progress Alliance'),
                 (2, 'Mamadou Sow', 'Unity Front'),
                 (3, 'Fatou Diop', 'Citizens Movement');
             INSERT INTO polling_stations (id, name, district) VALUES
                 (1, 'Centre A', 'Dakar'),
                 (2, 'Centre B', 'Thies'),
                 (3, 'Centre C', 'Saint-Louis');
             INSERT INTO results (candidate_id, station_id, votes) VALUES
                 (1, 1, 1200), (2, 1, 950), (3, 1, 430),
                 (1, 2, 800), (2, 2, 1100), (3, 2, 510),
                 (1, 3, 640), (2, 3, 700), (3, 3, 920);
             COMMIT;",
        )?;
        Ok(())
    }

    /// Names of the tables in the database
    pub fn list_tables(&self) -> Result<String> {
        self.query_as_csv(
            "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
            [],
        )
    }

    /// Column names and types for one table
    pub fn describe_table(&self, table: &str) -> Result<String> {
        self.query_as_csv(
            "SELECT name, type FROM pragma_table_info(?1)",
            [table],
        )
    }

    /// Run an arbitrary read query
    pub fn run_query(&self, query: &str) -> Result<String> {
        self.query_as_csv(query, [])
    }

    fn query_as_csv<P: rusqlite::Params>(&self, sql: &str, params: P) -> Result<String> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| RedraftError::tool("database lock poisoned"))?;

        let mut stmt = conn.prepare(sql)?;
        let column_count = stmt.column_count();
        let header = stmt
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect::<Vec<_>>()
            .join(",");

        let mut output = String::from("[DATABASE RESULTS]\n");
        output.push_str(&header);
        output.push('\n');

        let mut rows = stmt.query(params)?;
        while let Some(row) = rows.next()? {
            for i in 0..column_count {
                let value = match row.get_ref(i)? {
                    ValueRef::Null => String::new(),
                    ValueRef::Integer(v) => v.to_string(),
                    ValueRef::Real(v) => v.to_string(),
                    ValueRef::Text(t) => String::from_utf8_lossy(t).to_string(),
                    ValueRef::Blob(_) => "<blob>".to_string(),
                };
                output.push_str(&value);
                if i < column_count - 1 {
                    output.push(',');
                }
            }
            output.push('\n');
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo_db() -> ElectionDb {
        ElectionDb::open(":memory:").unwrap()
    }

    #[test]
    fn test_list_tables_shows_seeded_schema() {
        let db = demo_db();
        let tables = db.list_tables().unwrap();
        assert!(tables.starts_with("[DATABASE RESULTS]"));
        assert!(tables.contains("candidates"));
        assert!(tables.contains("polling_stations"));
        assert!(tables.contains("results"));
    }

    #[test]
    fn test_describe_table() {
        let db = demo_db();
        let schema = db.describe_table("candidates").unwrap();
        assert!(schema.contains("name,type"));
        assert!(schema.contains("party"));
    }

    #[test]
    fn test_run_query_renders_csv() {
        let db = demo_db();
        let out = db
            .run_query(
                "SELECT c.name, SUM(r.votes) AS total \
                 FROM candidates c JOIN results r ON r.candidate_id = c.id \
                 GROUP BY c.name ORDER BY total DESC",
            )
            .unwrap();

        assert!(out.contains("name,total"));
        // Unity Front polls highest in the seeded data
        assert!(out.contains("Mamadou Sow,2750"));
    }

    #[test]
    fn test_invalid_query_is_an_error() {
        let db = demo_db();
        assert!(db.run_query("SELECT * FROM no_such_table").is_err());
    }
}
