// 📅 calendar.txt - weekly service pattern

use super::{int, text, Column, OutputRow, TableDef, Value};
use crate::coerce;
use crate::decoder::DecodedRow;
use crate::registry::{IdDomain, IdRegistry};

const DAYS: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

const COLUMNS: &[Column] = &[
    int("service_index"),
    text("service_id"),
    int("monday"),
    int("tuesday"),
    int("wednesday"),
    int("thursday"),
    int("friday"),
    int("saturday"),
    int("sunday"),
    text("start_date"),
    text("end_date"),
];

pub static TABLE: TableDef = TableDef {
    name: "calendar",
    columns: COLUMNS,
    emitted: None,
    indexes: &["service_index", "service_id"],
};

pub fn transform(row: &DecodedRow, ids: &mut IdRegistry) -> OutputRow {
    let service_id = row.get("service_id");

    let mut out = Vec::with_capacity(COLUMNS.len());
    out.push(Value::Integer(ids.map_id(IdDomain::Service, service_id)));
    out.push(Value::text(service_id));
    out.extend(DAYS.iter().map(|day| Value::Integer(coerce::flag(row.get(day)))));
    out.push(Value::text(row.get("start_date")));
    out.push(Value::text(row.get("end_date")));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weekday_flags() {
        let mut ids = IdRegistry::new();
        let row = DecodedRow::from_pairs(&[
            ("service_id", "WK"),
            ("monday", "1"),
            ("tuesday", "1"),
            ("wednesday", "0"),
            ("thursday", "yes"),
            ("friday", "1"),
            ("start_date", "20240101"),
            ("end_date", "20241231"),
        ]);

        let out = transform(&row, &mut ids);
        assert_eq!(out.len(), COLUMNS.len());
        assert_eq!(out[0], Value::Integer(1));

        let flags: Vec<i64> = out[2..9].iter().filter_map(Value::as_i64).collect();
        assert_eq!(flags, vec![1, 1, 0, 0, 1, 0, 0], "Only the literal '1' is true");
        assert_eq!(out[9], Value::Text("20240101".to_string()));
    }
}
