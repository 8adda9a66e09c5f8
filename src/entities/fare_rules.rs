// 💶 fare_rules.txt - only surrogates are kept, zone references go through
// the zone domain shared with stops

use super::{int, Column, OutputRow, TableDef, Value};
use crate::decoder::DecodedRow;
use crate::registry::{IdDomain, IdRegistry};

const COLUMNS: &[Column] = &[
    int("fare_index"),
    int("route_index"),
    int("origin_index"),
    int("destination_index"),
    int("contains_index"),
];

pub static TABLE: TableDef = TableDef {
    name: "fare_rules",
    columns: COLUMNS,
    emitted: None,
    indexes: &["fare_index"],
};

pub fn transform(row: &DecodedRow, ids: &mut IdRegistry) -> OutputRow {
    vec![
        Value::Integer(ids.map_id(IdDomain::Fare, row.get("fare_id"))),
        Value::Integer(ids.map_id(IdDomain::Route, row.get("route_id"))),
        Value::Integer(ids.map_id(IdDomain::Zone, row.get("origin_id"))),
        Value::Integer(ids.map_id(IdDomain::Zone, row.get("destination_id"))),
        Value::Integer(ids.map_id(IdDomain::Zone, row.get("contains_id"))),
    ]
}
