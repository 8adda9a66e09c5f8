// 📅 calendar_dates.txt - per-day exceptions to a service

use super::{int, text, Column, OutputRow, RowError, TableDef, Value};
use crate::coerce;
use crate::decoder::DecodedRow;
use crate::registry::{IdDomain, IdRegistry};

const COLUMNS: &[Column] = &[
    int("service_index"),
    text("service_id"),
    text("date"),
    int("exception_type"),
];

pub static TABLE: TableDef = TableDef {
    name: "calendar_dates",
    columns: COLUMNS,
    emitted: None,
    indexes: &["service_index"],
};

pub fn transform(row: &DecodedRow, ids: &mut IdRegistry) -> Result<OutputRow, RowError> {
    let exception_type = coerce::required_int("exception_type", row.get("exception_type"))?;
    let service_id = row.get("service_id");

    Ok(vec![
        Value::Integer(ids.map_id(IdDomain::Service, service_id)),
        Value::text(service_id),
        Value::text(row.get("date")),
        Value::Integer(exception_type),
    ])
}
