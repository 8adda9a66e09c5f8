// 🔁 frequencies.txt - headway-based trips

use super::{int, text, Column, OutputRow, TableDef, Value};
use crate::decoder::DecodedRow;
use crate::registry::{IdDomain, IdRegistry};

const COLUMNS: &[Column] = &[
    int("trip_index"),
    text("start_time"),
    text("end_time"),
    text("headway_secs"),
    text("exact_times"),
];

pub static TABLE: TableDef = TableDef {
    name: "frequencies",
    columns: COLUMNS,
    emitted: None,
    indexes: &["trip_index"],
};

pub fn transform(row: &DecodedRow, ids: &mut IdRegistry) -> OutputRow {
    let mut out = vec![Value::Integer(ids.map_id(IdDomain::Trip, row.get("trip_id")))];
    out.extend(COLUMNS[1..].iter().map(|c| Value::text(row.get(c.name))));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_row() {
        let mut ids = IdRegistry::new();
        ids.map_id(IdDomain::Trip, "T1");

        let row = DecodedRow::from_pairs(&[
            ("trip_id", "T1"),
            ("start_time", "06:00:00"),
            ("end_time", "09:00:00"),
            ("headway_secs", "300"),
        ]);
        let out = transform(&row, &mut ids);

        assert_eq!(
            out,
            vec![
                Value::Integer(1),
                Value::Text("06:00:00".to_string()),
                Value::Text("09:00:00".to_string()),
                Value::Text("300".to_string()),
                Value::Null,
            ]
        );
    }
}
