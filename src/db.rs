// 🗄️ Store Layer - relational targets and their row sinks
//
// A `Store` owns one connection for the whole run. Rows reach a table through
// a `RowSink` opened per file; which sink a store hands out decides the write
// path (batched INSERT here, streaming COPY in `pg`).

use crate::entities::{OutputRow, TableDef, Value};
use crate::schema::{self, Dialect};
use anyhow::{Context, Result};
use rusqlite::types::{ToSqlOutput, ValueRef};
use rusqlite::{params_from_iter, Connection, ToSql};
use serde::Serialize;
use std::path::Path;
use tracing::debug;

// ============================================================================
// TRAITS
// ============================================================================

/// How a store writes loaded rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WritePath {
    /// `COPY ... FROM STDIN` with tab-separated lines
    Copy,
    /// Prepared INSERT flushed in batches, one transaction per file
    BatchedInsert,
}

/// Destination for the output tuples of one file
pub trait RowSink {
    fn write_row(&mut self, row: OutputRow) -> Result<()>;

    /// Flush what is pending and make the file's rows durable.
    /// Returns the number of rows written.
    fn finish(self: Box<Self>) -> Result<u64>;
}

/// A relational target for a load run
pub trait Store {
    /// Short backend name for logs and the run report
    fn backend(&self) -> &'static str;

    fn dialect(&self) -> Dialect;

    fn write_path(&self) -> WritePath;

    /// Run one or more statements without parameters
    fn execute(&mut self, sql: &str) -> Result<()>;

    fn execute_params(&mut self, sql: &str, params: &[Value]) -> Result<u64>;

    fn query(&mut self, sql: &str, params: &[Value]) -> Result<Vec<Vec<Value>>>;

    fn begin(&mut self) -> Result<()> {
        self.execute("BEGIN")
    }

    fn commit(&mut self) -> Result<()> {
        self.execute("COMMIT")
    }

    fn rollback(&mut self) -> Result<()> {
        self.execute("ROLLBACK")
    }

    fn open_sink<'a>(
        &'a mut self,
        table: &'static TableDef,
        batch_size: usize,
    ) -> Result<Box<dyn RowSink + 'a>>;

    fn placeholder(&self, n: usize) -> String {
        self.dialect().placeholder(n)
    }
}

// ============================================================================
// SQLITE
// ============================================================================

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::Borrowed(match self {
            Value::Null => ValueRef::Null,
            Value::Text(s) => ValueRef::Text(s.as_bytes()),
            Value::Integer(v) => ValueRef::Integer(*v),
            Value::Real(v) => ValueRef::Real(*v),
        }))
    }
}

fn value_from_ref(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(v) => Value::Integer(v),
        ValueRef::Real(v) => Value::Real(v),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Value::Text(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open SQLite database: {}", path.display()))?;

        // Enable WAL mode for crash recovery
        conn.pragma_update(None, "journal_mode", "WAL")?;

        Ok(SqliteStore { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory SQLite database")?;
        Ok(SqliteStore { conn })
    }
}

impl Store for SqliteStore {
    fn backend(&self) -> &'static str {
        "sqlite"
    }

    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn write_path(&self) -> WritePath {
        WritePath::BatchedInsert
    }

    fn execute(&mut self, sql: &str) -> Result<()> {
        self.conn
            .execute_batch(sql)
            .with_context(|| format!("Failed to execute: {}", sql))
    }

    fn execute_params(&mut self, sql: &str, params: &[Value]) -> Result<u64> {
        let mut stmt = self.conn.prepare_cached(sql)?;
        let changed = stmt
            .execute(params_from_iter(params.iter()))
            .with_context(|| format!("Failed to execute: {}", sql))?;
        Ok(changed as u64)
    }

    fn query(&mut self, sql: &str, params: &[Value]) -> Result<Vec<Vec<Value>>> {
        let mut stmt = self.conn.prepare_cached(sql)?;
        let width = stmt.column_count();

        let rows = stmt
            .query_map(params_from_iter(params.iter()), |row| {
                (0..width)
                    .map(|idx| row.get_ref(idx).map(value_from_ref))
                    .collect::<rusqlite::Result<Vec<Value>>>()
            })?
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("Failed to query: {}", sql))?;

        Ok(rows)
    }

    fn open_sink<'a>(
        &'a mut self,
        table: &'static TableDef,
        batch_size: usize,
    ) -> Result<Box<dyn RowSink + 'a>> {
        Ok(Box::new(InsertSink::new(&self.conn, table, batch_size)?))
    }
}

// ============================================================================
// BATCHED INSERT SINK
// ============================================================================

/// Buffers tuples and flushes them through one prepared INSERT.
///
/// The whole file runs in a single transaction: `finish` commits it, dropping
/// an unfinished sink rolls it back.
pub struct InsertSink<'a> {
    conn: &'a Connection,
    table: &'static TableDef,
    sql: String,
    pending: Vec<OutputRow>,
    batch_size: usize,
    written: u64,
    finished: bool,
}

impl<'a> InsertSink<'a> {
    pub fn new(conn: &'a Connection, table: &'static TableDef, batch_size: usize) -> Result<Self> {
        let batch_size = batch_size.max(1);
        let sql = schema::insert_sql(table, Dialect::Sqlite);

        conn.execute_batch("BEGIN")
            .with_context(|| format!("Failed to open transaction for {}", table.name))?;

        let sink = InsertSink {
            conn,
            table,
            sql,
            pending: Vec::with_capacity(batch_size),
            batch_size,
            written: 0,
            finished: false,
        };

        // A table that does not match fails here, before any row is read
        sink.conn
            .prepare_cached(&sink.sql)
            .with_context(|| format!("Failed to prepare insert for {}", table.name))?;

        Ok(sink)
    }

    fn flush(&mut self) -> Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }

        let conn = self.conn;
        let mut stmt = conn.prepare_cached(&self.sql)?;
        for row in self.pending.drain(..) {
            stmt.execute(params_from_iter(row.iter()))
                .with_context(|| format!("Failed to insert into {}", self.table.name))?;
            self.written += 1;
        }

        debug!(table = self.table.name, written = self.written, "Flushed batch");
        Ok(())
    }
}

impl RowSink for InsertSink<'_> {
    fn write_row(&mut self, row: OutputRow) -> Result<()> {
        self.pending.push(row);
        if self.pending.len() >= self.batch_size {
            self.flush()?;
        }
        Ok(())
    }

    fn finish(mut self: Box<Self>) -> Result<u64> {
        self.flush()?;
        self.conn
            .execute_batch("COMMIT")
            .with_context(|| format!("Failed to commit {}", self.table.name))?;
        self.finished = true;
        Ok(self.written)
    }
}

impl Drop for InsertSink<'_> {
    fn drop(&mut self) {
        if !self.finished {
            let _ = self.conn.execute_batch("ROLLBACK");
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::calendar_dates;

    fn store_with_calendar_dates() -> SqliteStore {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store
            .execute(&schema::create_table_sql(&calendar_dates::TABLE, Dialect::Sqlite))
            .unwrap();
        store
    }

    fn exception(idx: i64, service: &str) -> OutputRow {
        vec![
            Value::Integer(idx),
            Value::text(service),
            Value::text("20240101"),
            Value::Integer(1),
        ]
    }

    fn count(store: &mut SqliteStore) -> i64 {
        let rows = store.query("SELECT count(*) FROM calendar_dates", &[]).unwrap();
        rows[0][0].as_i64().unwrap()
    }

    #[test]
    fn test_insert_sink_flushes_in_batches() {
        let mut store = store_with_calendar_dates();

        let mut sink = store.open_sink(&calendar_dates::TABLE, 2).unwrap();
        for i in 1..=5 {
            sink.write_row(exception(i, "WK")).unwrap();
        }
        let written = sink.finish().unwrap();

        assert_eq!(written, 5);
        assert_eq!(count(&mut store), 5);
        println!("✅ Batched insert PASSED: 5 rows across 3 flushes");
    }

    #[test]
    fn test_unfinished_sink_rolls_back() {
        let mut store = store_with_calendar_dates();

        {
            let mut sink = store.open_sink(&calendar_dates::TABLE, 2).unwrap();
            for i in 1..=3 {
                sink.write_row(exception(i, "WK")).unwrap();
            }
            // dropped without finish
        }

        assert_eq!(count(&mut store), 0, "Partial file must not be visible");

        // The connection is usable again for the next file
        let mut sink = store.open_sink(&calendar_dates::TABLE, 10).unwrap();
        sink.write_row(exception(1, "SA")).unwrap();
        assert_eq!(sink.finish().unwrap(), 1);
        assert_eq!(count(&mut store), 1);
    }

    #[test]
    fn test_values_round_trip() {
        let mut store = store_with_calendar_dates();

        let mut sink = store.open_sink(&calendar_dates::TABLE, 10).unwrap();
        sink.write_row(vec![Value::Integer(7), Value::Null, Value::text("20240101"), Value::Integer(2)])
            .unwrap();
        sink.finish().unwrap();

        let rows = store
            .query(
                "SELECT service_index, service_id, date, exception_type FROM calendar_dates WHERE service_index = ?1",
                &[Value::Integer(7)],
            )
            .unwrap();

        assert_eq!(
            rows,
            vec![vec![
                Value::Integer(7),
                Value::Null,
                Value::Text("20240101".to_string()),
                Value::Integer(2),
            ]]
        );
    }

    #[test]
    fn test_execute_params_reports_changes() {
        let mut store = store_with_calendar_dates();
        let mut sink = store.open_sink(&calendar_dates::TABLE, 10).unwrap();
        sink.write_row(exception(1, "WK")).unwrap();
        sink.write_row(exception(2, "WK")).unwrap();
        sink.finish().unwrap();

        let changed = store
            .execute_params(
                "UPDATE calendar_dates SET exception_type = ?1 WHERE service_id = ?2",
                &[Value::Integer(2), Value::text("WK")],
            )
            .unwrap();
        assert_eq!(changed, 2);
    }

    #[test]
    fn test_sink_on_missing_table_fails_cleanly() {
        let mut store = SqliteStore::open_in_memory().unwrap();

        assert!(store.open_sink(&calendar_dates::TABLE, 10).is_err());

        // The failed open must not leave a transaction behind
        store.begin().unwrap();
        store.commit().unwrap();
    }
}
