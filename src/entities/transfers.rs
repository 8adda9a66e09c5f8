// 🔀 transfers.txt

use super::{int, text, Column, OutputRow, TableDef, Value};
use crate::decoder::DecodedRow;
use crate::registry::{IdDomain, IdRegistry};

const COLUMNS: &[Column] = &[
    int("from_stop_index"),
    int("to_stop_index"),
    text("transfer_type"),
    text("min_transfer_time"),
];

pub static TABLE: TableDef = TableDef {
    name: "transfers",
    columns: COLUMNS,
    emitted: None,
    indexes: &["from_stop_index", "to_stop_index"],
};

pub fn transform(row: &DecodedRow, ids: &mut IdRegistry) -> OutputRow {
    vec![
        Value::Integer(ids.map_id(IdDomain::Stop, row.get("from_stop_id"))),
        Value::Integer(ids.map_id(IdDomain::Stop, row.get("to_stop_id"))),
        Value::text(row.get("transfer_type")),
        Value::text(row.get("min_transfer_time")),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_between_known_stops() {
        let mut ids = IdRegistry::new();
        ids.map_id(IdDomain::Stop, "A");
        ids.map_id(IdDomain::Stop, "B");

        let row = DecodedRow::from_pairs(&[
            ("from_stop_id", "B"),
            ("to_stop_id", "A"),
            ("transfer_type", "2"),
            ("min_transfer_time", "180"),
        ]);
        let out = transform(&row, &mut ids);

        assert_eq!(out[0], Value::Integer(2));
        assert_eq!(out[1], Value::Integer(1));
        assert_eq!(out[3], Value::Text("180".to_string()));
        assert_eq!(ids.len(IdDomain::Stop), 2);
    }
}
