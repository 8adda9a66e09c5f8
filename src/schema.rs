// 📐 Schema Layer - DDL and DML text for the catalogue tables
// Same table definitions render for SQLite and PostgreSQL

use crate::entities::{EntityKind, FieldType, TableDef};

// ============================================================================
// DIALECT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Sqlite,
    Postgres,
}

impl Dialect {
    pub fn column_type(&self, ty: FieldType) -> &'static str {
        match (self, ty) {
            (_, FieldType::Text) => "TEXT",
            (_, FieldType::Integer) => "INTEGER",
            (Dialect::Sqlite, FieldType::Real) => "REAL",
            (Dialect::Postgres, FieldType::Real) => "DOUBLE PRECISION",
        }
    }

    /// Positional parameter marker, 1-based
    pub fn placeholder(&self, n: usize) -> String {
        match self {
            Dialect::Sqlite => format!("?{}", n),
            Dialect::Postgres => format!("${}", n),
        }
    }
}

// ============================================================================
// TABLE LIFECYCLE
// ============================================================================

pub fn drop_table_sql(table: &TableDef) -> String {
    format!("DROP TABLE IF EXISTS {}", table.name)
}

pub fn create_table_sql(table: &TableDef, dialect: Dialect) -> String {
    let columns: Vec<String> = table
        .columns
        .iter()
        .map(|c| format!("{} {}", c.name, dialect.column_type(c.ty)))
        .collect();

    format!("CREATE TABLE {} ({})", table.name, columns.join(", "))
}

/// One single-column index per declared field, named `<table>_<field>`
pub fn index_sqls(table: &TableDef) -> Vec<String> {
    table
        .indexes
        .iter()
        .map(|field| format!("CREATE INDEX {}_{} ON {} ({})", table.name, field, table.name, field))
        .collect()
}

/// Full drop + create script for every catalogue table, in load order
pub fn recreate_all(dialect: Dialect) -> Vec<String> {
    EntityKind::ALL
        .iter()
        .flat_map(|kind| {
            let table = kind.table();
            [drop_table_sql(table), create_table_sql(table, dialect)]
        })
        .collect()
}

// ============================================================================
// ROW WRITES
// ============================================================================

/// Parameterized insert covering the columns a transformer emits
pub fn insert_sql(table: &TableDef, dialect: Dialect) -> String {
    let columns = table.load_column_names();
    let params: Vec<String> = (1..=columns.len()).map(|n| dialect.placeholder(n)).collect();

    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table.name,
        columns.join(", "),
        params.join(", ")
    )
}

/// Streaming load statement; rows follow as tab-separated text
pub fn copy_sql(table: &TableDef) -> String {
    format!(
        "COPY {} ({}) FROM STDIN WITH DELIMITER E'\\t' NULL AS ''",
        table.name,
        table.load_column_names().join(", ")
    )
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{calendar_dates, shapes, trips};

    #[test]
    fn test_create_table_types_per_dialect() {
        let sqlite = create_table_sql(&shapes::TABLE, Dialect::Sqlite);
        assert_eq!(
            sqlite,
            "CREATE TABLE shapes (shape_index INTEGER, shape_id TEXT, shape_pt_lat REAL, \
             shape_pt_lon REAL, shape_pt_sequence INTEGER, shape_dist_traveled REAL)"
        );

        let pg = create_table_sql(&shapes::TABLE, Dialect::Postgres);
        assert!(pg.contains("shape_pt_lat DOUBLE PRECISION"));
    }

    #[test]
    fn test_trips_table_includes_derived_columns() {
        let sql = create_table_sql(&trips::TABLE, Dialect::Sqlite);
        assert!(sql.ends_with("arrival_time TEXT, arrival_time_secs INTEGER)"));

        let insert = insert_sql(&trips::TABLE, Dialect::Sqlite);
        assert!(!insert.contains("arrival_time"), "Derived columns are not loaded");
        assert!(insert.ends_with("?14)"));
    }

    #[test]
    fn test_insert_placeholders() {
        assert_eq!(
            insert_sql(&calendar_dates::TABLE, Dialect::Sqlite),
            "INSERT INTO calendar_dates (service_index, service_id, date, exception_type) \
             VALUES (?1, ?2, ?3, ?4)"
        );
        assert!(insert_sql(&calendar_dates::TABLE, Dialect::Postgres).ends_with("($1, $2, $3, $4)"));
    }

    #[test]
    fn test_index_names() {
        assert_eq!(
            index_sqls(&calendar_dates::TABLE),
            vec!["CREATE INDEX calendar_dates_service_index ON calendar_dates (service_index)"]
        );
    }

    #[test]
    fn test_copy_statement() {
        assert_eq!(
            copy_sql(&calendar_dates::TABLE),
            "COPY calendar_dates (service_index, service_id, date, exception_type) \
             FROM STDIN WITH DELIMITER E'\\t' NULL AS ''"
        );
    }

    #[test]
    fn test_recreate_all_drops_before_create() {
        let script = recreate_all(Dialect::Sqlite);
        assert_eq!(script.len(), EntityKind::ALL.len() * 2);
        assert_eq!(script[0], "DROP TABLE IF EXISTS agency");
        assert!(script[1].starts_with("CREATE TABLE agency ("));
    }
}
