//! # SQLite Store
//!
//! A thin handle over a local Turso database with the handful of operations the
//! pipeline needs: full-replace table writes, query-to-table reads and table
//! listing.

use crate::errors::PipelineError;
use crate::table::{Cell, Table};
use std::fmt::{self, Debug};
use tracing::{debug, error, info, warn};
use turso::{Connection, Database, Value as TursoValue};

/// A handle to the inventory database.
///
/// Cloning shares the same underlying database, so an in-memory store can be
/// cloned to hand the same data to several callers (e.g., in tests).
#[derive(Clone)]
pub struct Store {
    pub db: Database,
}

impl Store {
    /// Opens (or creates) the database at `db_path`. Use ":memory:" for an
    /// isolated in-memory database.
    pub async fn open(db_path: &str) -> Result<Self, PipelineError> {
        let db = turso::Builder::new_local(db_path)
            .build()
            .await
            .map_err(|e| PipelineError::Connection(e.to_string()))?;
        debug!(db_path = %db_path, "Opened database.");
        Ok(Self { db })
    }

    /// Opens a new connection to the database.
    pub fn connect(&self) -> Result<Connection, PipelineError> {
        self.db
            .connect()
            .map_err(|e| PipelineError::Connection(e.to_string()))
    }

    /// Writes `table` as `table_name`, dropping any existing table of that name first.
    ///
    /// Rows are inserted inside one transaction; the first failed insert rolls it
    /// back and is returned. Returns the number of rows written.
    pub async fn replace_table(
        &self,
        table_name: &str,
        table: &Table,
    ) -> Result<usize, PipelineError> {
        validate_table_name(table_name)?;
        let conn = self.connect()?;
        let quoted_table = quote_ident(table_name);

        conn.execute(&format!("DROP TABLE IF EXISTS {quoted_table};"), ())
            .await?;

        let columns_def = table
            .columns
            .iter()
            .zip(table.column_types.iter())
            .map(|(name, ty)| format!("{} {ty}", quote_ident(name)))
            .collect::<Vec<_>>()
            .join(", ");
        let create_sql = format!("CREATE TABLE {quoted_table} ({columns_def});");
        debug!("Executing CREATE TABLE statement: {create_sql}");
        conn.execute(&create_sql, ()).await?;

        if table.is_empty() {
            info!("Created empty table '{table_name}'.");
            return Ok(0);
        }

        let columns = table
            .columns
            .iter()
            .map(|c| quote_ident(c))
            .collect::<Vec<_>>()
            .join(", ");
        let values_placeholders = (0..table.columns.len())
            .map(|_| "?")
            .collect::<Vec<_>>()
            .join(", ");
        let insert_sql =
            format!("INSERT INTO {quoted_table} ({columns}) VALUES ({values_placeholders})");

        conn.execute("BEGIN TRANSACTION", ()).await?;
        let mut stmt = conn.prepare(&insert_sql).await?;
        let mut insert_count = 0;

        for row in &table.rows {
            let params: Vec<TursoValue> = row.iter().map(TursoValue::from).collect();
            match stmt.execute(params).await {
                Ok(_) => insert_count += 1,
                Err(e) => {
                    warn!("Failed to insert row into '{table_name}': {e:?}. Rolling back transaction.");
                    if let Err(rollback_err) = conn.execute("ROLLBACK", ()).await {
                        error!("Rollback of '{table_name}' failed: {rollback_err:?}");
                    }
                    return Err(PipelineError::Database(e));
                }
            }
        }

        conn.execute("COMMIT", ()).await?;
        info!("Transaction committed. Wrote {insert_count} rows into '{table_name}'.");
        Ok(insert_count)
    }

    /// Runs `sql` and collects the full result set into a [`Table`].
    pub async fn query_table(&self, sql: &str) -> Result<Table, PipelineError> {
        let conn = self.connect()?;
        query_table(&conn, sql).await
    }

    /// Reads every row of `table_name` in storage order.
    pub async fn read_table(&self, table_name: &str) -> Result<Table, PipelineError> {
        validate_table_name(table_name)?;
        self.query_table(&format!("SELECT * FROM {}", quote_ident(table_name)))
            .await
    }

    /// Lists the user tables in the database, sorted by name.
    pub async fn list_tables(&self) -> Result<Vec<String>, PipelineError> {
        let conn = self.connect()?;
        let mut rows = conn
            .query(
                "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name;",
                (),
            )
            .await?;

        let mut tables = Vec::new();
        while let Some(row) = rows.next().await? {
            if let Ok(TursoValue::Text(name)) = row.get_value(0) {
                tables.push(name);
            }
        }
        Ok(tables)
    }
}

impl Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store").finish_non_exhaustive()
    }
}

/// Runs `sql` on an existing connection and collects the result into a [`Table`].
pub async fn query_table(conn: &Connection, sql: &str) -> Result<Table, PipelineError> {
    debug!(query = %sql, "--> Executing SQLite query");
    let mut stmt = conn.prepare(sql).await?;

    let column_names: Vec<String> = stmt
        .columns()
        .iter()
        .map(|c| c.name().to_string())
        .collect();

    let mut rows = stmt.query(()).await?;
    let mut cells: Vec<Vec<Cell>> = Vec::new();
    while let Some(row) = rows.next().await? {
        let mut values = Vec::with_capacity(column_names.len());
        for i in 0..column_names.len() {
            values.push(Cell::from(row.get_value(i)?));
        }
        cells.push(values);
    }

    Ok(Table::from_rows(column_names, cells))
}

/// Wraps an identifier in double quotes, escaping embedded quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn validate_table_name(table_name: &str) -> Result<(), PipelineError> {
    if table_name.trim().is_empty() || table_name.starts_with("sqlite_") {
        return Err(PipelineError::InvalidTableName(table_name.to_string()));
    }
    Ok(())
}
