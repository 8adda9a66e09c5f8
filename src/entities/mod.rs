// Entity catalogue - one module per GTFS file
//
// Each entity kind owns:
// - its target table (typed columns + index fields)
// - a transformer: decoded CSV row + identifier registry → output tuple
//
// Adding a kind = new module + one `EntityKind` variant + dispatch arms.

pub mod agency;
pub mod calendar;
pub mod calendar_dates;
pub mod fare_attributes;
pub mod fare_rules;
pub mod feed_info;
pub mod frequencies;
pub mod routes;
pub mod shapes;
pub mod stif;
pub mod stop_times;
pub mod stops;
pub mod transfers;
pub mod trips;

use crate::decoder::DecodedRow;
use crate::registry::IdRegistry;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// VALUES
// ============================================================================

/// A scalar in an output tuple
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Text(String),
    Integer(i64),
    Real(f64),
}

impl Value {
    /// Text field; the empty string is stored as NULL so that the copy and
    /// insert write paths agree
    pub fn text(raw: &str) -> Value {
        if raw.is_empty() {
            Value::Null
        } else {
            Value::Text(raw.to_string())
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Ordered values for one row of a target table
pub type OutputRow = Vec<Value>;

// ============================================================================
// TABLE DEFINITIONS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Text,
    Integer,
    Real,
}

#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub ty: FieldType,
}

pub const fn text(name: &'static str) -> Column {
    Column { name, ty: FieldType::Text }
}

pub const fn int(name: &'static str) -> Column {
    Column { name, ty: FieldType::Integer }
}

pub const fn real(name: &'static str) -> Column {
    Column { name, ty: FieldType::Real }
}

/// Target relation for one entity kind
#[derive(Debug)]
pub struct TableDef {
    pub name: &'static str,
    /// Table columns in DDL order
    pub columns: &'static [Column],
    /// Output-tuple order when it is not the table order. Columns left out
    /// are derived after the load.
    pub emitted: Option<&'static [&'static str]>,
    /// Fields that get a single-column index once the load is done
    pub indexes: &'static [&'static str],
}

impl TableDef {
    /// Number of values in an output tuple
    pub fn width(&self) -> usize {
        self.emitted.map_or(self.columns.len(), <[&str]>::len)
    }

    /// Column names in output-tuple order
    pub fn load_column_names(&self) -> Vec<&'static str> {
        match self.emitted {
            Some(names) => names.to_vec(),
            None => self.columns.iter().map(|c| c.name).collect(),
        }
    }
}

// ============================================================================
// ROW ERRORS
// ============================================================================

/// A row that cannot become a complete output tuple
#[derive(Debug, Error, PartialEq)]
pub enum RowError {
    #[error("field '{field}' must be an integer, got '{value}'")]
    InvalidInteger { field: &'static str, value: String },

    #[error("field '{field}' must be a number, got '{value}'")]
    InvalidReal { field: &'static str, value: String },
}

// ============================================================================
// ENTITY KINDS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Agency,
    Stops,
    Routes,
    Trips,
    StopTimes,
    Calendar,
    CalendarDates,
    Shapes,
    FareAttributes,
    FareRules,
    Frequencies,
    Transfers,
    FeedInfo,
    PerimetreStif,
}

impl EntityKind {
    /// Load order. Later files may reference keys introduced by earlier ones.
    pub const ALL: [EntityKind; 14] = [
        EntityKind::Agency,
        EntityKind::Stops,
        EntityKind::Routes,
        EntityKind::Trips,
        EntityKind::StopTimes,
        EntityKind::Calendar,
        EntityKind::CalendarDates,
        EntityKind::Shapes,
        EntityKind::FareAttributes,
        EntityKind::FareRules,
        EntityKind::Frequencies,
        EntityKind::Transfers,
        EntityKind::FeedInfo,
        EntityKind::PerimetreStif,
    ];

    pub fn table(&self) -> &'static TableDef {
        match self {
            EntityKind::Agency => &agency::TABLE,
            EntityKind::Stops => &stops::TABLE,
            EntityKind::Routes => &routes::TABLE,
            EntityKind::Trips => &trips::TABLE,
            EntityKind::StopTimes => &stop_times::TABLE,
            EntityKind::Calendar => &calendar::TABLE,
            EntityKind::CalendarDates => &calendar_dates::TABLE,
            EntityKind::Shapes => &shapes::TABLE,
            EntityKind::FareAttributes => &fare_attributes::TABLE,
            EntityKind::FareRules => &fare_rules::TABLE,
            EntityKind::Frequencies => &frequencies::TABLE,
            EntityKind::Transfers => &transfers::TABLE,
            EntityKind::FeedInfo => &feed_info::TABLE,
            EntityKind::PerimetreStif => &stif::TABLE,
        }
    }

    pub fn table_name(&self) -> &'static str {
        self.table().name
    }

    /// Canonical source file name, also the key used by the exclusion list
    pub fn file_name(&self) -> String {
        format!("{}.txt", self.table_name())
    }

    /// Alternative extension tried when the canonical file is absent
    pub fn alt_file_name(&self) -> String {
        format!("{}.csv", self.table_name())
    }

    /// Turn one decoded row into this kind's output tuple
    pub fn transform(&self, row: &DecodedRow, ids: &mut IdRegistry) -> Result<OutputRow, RowError> {
        let out = match self {
            EntityKind::Agency => agency::transform(row),
            EntityKind::Stops => stops::transform(row, ids)?,
            EntityKind::Routes => routes::transform(row, ids)?,
            EntityKind::Trips => trips::transform(row, ids),
            EntityKind::StopTimes => stop_times::transform(row, ids)?,
            EntityKind::Calendar => calendar::transform(row, ids),
            EntityKind::CalendarDates => calendar_dates::transform(row, ids)?,
            EntityKind::Shapes => shapes::transform(row, ids)?,
            EntityKind::FareAttributes => fare_attributes::transform(row, ids),
            EntityKind::FareRules => fare_rules::transform(row, ids),
            EntityKind::Frequencies => frequencies::transform(row, ids),
            EntityKind::Transfers => transfers::transform(row, ids),
            EntityKind::FeedInfo => feed_info::transform(row),
            EntityKind::PerimetreStif => stif::transform(row),
        };
        debug_assert_eq!(out.len(), self.table().width(), "{} tuple width", self.table_name());
        Ok(out)
    }
}

/// Text columns copied verbatim, in order
pub(crate) fn passthrough(row: &DecodedRow, columns: &[Column]) -> OutputRow {
    columns.iter().map(|c| Value::text(row.get(c.name))).collect()
}

// ============================================================================
// TESTS
// ============================================================================
