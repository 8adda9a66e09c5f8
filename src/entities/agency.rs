// 🏢 agency.txt - no surrogate key, agency_id stays textual

use super::{passthrough, text, Column, OutputRow, TableDef};
use crate::decoder::DecodedRow;

const COLUMNS: &[Column] = &[
    text("agency_id"),
    text("agency_name"),
    text("agency_timezone"),
    text("agency_url"),
    text("agency_lang"),
    text("agency_phone"),
    text("agency_fare_url"),
];

pub static TABLE: TableDef = TableDef {
    name: "agency",
    columns: COLUMNS,
    emitted: None,
    indexes: &["agency_id"],
};

pub fn transform(row: &DecodedRow) -> OutputRow {
    passthrough(row, COLUMNS)
}
