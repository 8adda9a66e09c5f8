// 💶 fare_attributes.txt

use super::{int, text, Column, OutputRow, TableDef, Value};
use crate::decoder::DecodedRow;
use crate::registry::{IdDomain, IdRegistry};

const COLUMNS: &[Column] = &[
    int("fare_index"),
    text("fare_id"),
    text("price"),
    text("currency_type"),
    text("payment_method"),
    text("transfers"),
    text("transfer_duration"),
];

pub static TABLE: TableDef = TableDef {
    name: "fare_attributes",
    columns: COLUMNS,
    emitted: None,
    indexes: &["fare_index", "fare_id"],
};

pub fn transform(row: &DecodedRow, ids: &mut IdRegistry) -> OutputRow {
    let fare_id = row.get("fare_id");

    let mut out = vec![
        Value::Integer(ids.map_id(IdDomain::Fare, fare_id)),
        Value::text(fare_id),
    ];
    out.extend(COLUMNS[2..].iter().map(|c| Value::text(row.get(c.name))));
    out
}
