// 🐘 PostgreSQL store - streaming COPY write path
//
// Plain synchronous client. Each file is one `COPY ... FROM STDIN`, which
// the server applies atomically; everything else goes through cached
// prepared statements.

use crate::copy::{CopySink, CopyTarget};
use crate::db::{RowSink, Store, WritePath};
use crate::entities::{TableDef, Value};
use crate::schema::{self, Dialect};
use anyhow::{Context, Result};
use bytes::BytesMut;
use postgres::types::{to_sql_checked, IsNull, ToSql, Type};
use postgres::{Client, Config, CopyInWriter, NoTls, Row, Statement};
use std::collections::HashMap;
use std::error::Error;
use tracing::info;

// ============================================================================
// PARAMETER ENCODING
// ============================================================================

impl ToSql for Value {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Text(s) => s.to_sql(ty, out),
            Value::Integer(v) => {
                // INTEGER columns are int4 on the server
                if *ty == Type::INT2 {
                    i16::try_from(*v)?.to_sql(ty, out)
                } else if *ty == Type::INT4 {
                    i32::try_from(*v)?.to_sql(ty, out)
                } else {
                    v.to_sql(ty, out)
                }
            }
            Value::Real(v) => {
                if *ty == Type::FLOAT4 {
                    (*v as f32).to_sql(ty, out)
                } else {
                    v.to_sql(ty, out)
                }
            }
        }
    }

    fn accepts(ty: &Type) -> bool {
        <String as ToSql>::accepts(ty)
            || <i16 as ToSql>::accepts(ty)
            || <i32 as ToSql>::accepts(ty)
            || <i64 as ToSql>::accepts(ty)
            || <f32 as ToSql>::accepts(ty)
            || <f64 as ToSql>::accepts(ty)
    }

    to_sql_checked!();
}

fn value_at(row: &Row, idx: usize) -> Result<Value> {
    let ty = row.columns()[idx].type_();

    let value = if *ty == Type::INT2 {
        row.try_get::<_, Option<i16>>(idx)?.map(|v| Value::Integer(v.into()))
    } else if *ty == Type::INT4 {
        row.try_get::<_, Option<i32>>(idx)?.map(|v| Value::Integer(v.into()))
    } else if *ty == Type::INT8 {
        row.try_get::<_, Option<i64>>(idx)?.map(Value::Integer)
    } else if *ty == Type::FLOAT4 {
        row.try_get::<_, Option<f32>>(idx)?.map(|v| Value::Real(v.into()))
    } else if *ty == Type::FLOAT8 {
        row.try_get::<_, Option<f64>>(idx)?.map(Value::Real)
    } else {
        row.try_get::<_, Option<String>>(idx)?.map(Value::Text)
    };

    Ok(value.unwrap_or(Value::Null))
}

// ============================================================================
// STORE
// ============================================================================

pub struct PgStore {
    client: Client,
    statements: HashMap<String, Statement>,
}

impl PgStore {
    /// Connect using a `postgres://` URL; explicit credentials override the
    /// ones embedded in the URL
    pub fn connect(url: &str, username: Option<&str>, password: Option<&str>) -> Result<Self> {
        let mut config: Config = url.parse().context("Invalid PostgreSQL connection URL")?;
        if let Some(user) = username {
            config.user(user);
        }
        if let Some(password) = password {
            config.password(password);
        }

        let client = config.connect(NoTls).context("Failed to connect to PostgreSQL")?;
        info!(
            host = ?config.get_hosts(),
            dbname = config.get_dbname().unwrap_or(""),
            "Connected to PostgreSQL"
        );

        Ok(PgStore {
            client,
            statements: HashMap::new(),
        })
    }

    fn prepared(&mut self, sql: &str) -> Result<Statement> {
        if let Some(stmt) = self.statements.get(sql) {
            return Ok(stmt.clone());
        }
        let stmt = self
            .client
            .prepare(sql)
            .with_context(|| format!("Failed to prepare: {}", sql))?;
        self.statements.insert(sql.to_string(), stmt.clone());
        Ok(stmt)
    }
}

fn as_params(params: &[Value]) -> Vec<&(dyn ToSql + Sync)> {
    params.iter().map(|v| v as &(dyn ToSql + Sync)).collect()
}

impl Store for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    fn write_path(&self) -> WritePath {
        WritePath::Copy
    }

    fn execute(&mut self, sql: &str) -> Result<()> {
        self.client
            .batch_execute(sql)
            .with_context(|| format!("Failed to execute: {}", sql))
    }

    fn execute_params(&mut self, sql: &str, params: &[Value]) -> Result<u64> {
        let stmt = self.prepared(sql)?;
        self.client
            .execute(&stmt, &as_params(params))
            .with_context(|| format!("Failed to execute: {}", sql))
    }

    fn query(&mut self, sql: &str, params: &[Value]) -> Result<Vec<Vec<Value>>> {
        let stmt = self.prepared(sql)?;
        let rows = self
            .client
            .query(&stmt, &as_params(params))
            .with_context(|| format!("Failed to query: {}", sql))?;

        rows.iter()
            .map(|row| (0..row.len()).map(|idx| value_at(row, idx)).collect::<Result<Vec<_>>>())
            .collect()
    }

    fn open_sink<'a>(
        &'a mut self,
        table: &'static TableDef,
        _batch_size: usize,
    ) -> Result<Box<dyn RowSink + 'a>> {
        let sql = schema::copy_sql(table);
        let writer = self
            .client
            .copy_in(sql.as_str())
            .with_context(|| format!("Failed to start COPY into {}", table.name))?;
        Ok(Box::new(CopySink::new(writer)))
    }
}

impl CopyTarget for CopyInWriter<'_> {
    fn end_copy(self) -> Result<()> {
        self.finish().context("Failed to finish COPY")?;
        Ok(())
    }
}
