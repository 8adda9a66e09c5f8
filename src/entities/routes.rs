// 🚌 routes.txt

use super::{int, text, Column, OutputRow, RowError, TableDef, Value};
use crate::coerce;
use crate::decoder::DecodedRow;
use crate::registry::{IdDomain, IdRegistry};

const COLUMNS: &[Column] = &[
    int("route_index"),
    text("route_id"),
    text("agency_id"),
    text("route_short_name"),
    text("route_long_name"),
    text("route_desc"),
    int("route_type"),
    text("route_color"),
    text("route_text_color"),
    text("route_url"),
];

pub static TABLE: TableDef = TableDef {
    name: "routes",
    columns: COLUMNS,
    emitted: None,
    indexes: &["route_index", "route_id", "agency_id"],
};

/// route_type is mandatory; a route without a mode is dropped
pub fn transform(row: &DecodedRow, ids: &mut IdRegistry) -> Result<OutputRow, RowError> {
    let route_type = coerce::required_int("route_type", row.get("route_type"))?;
    let route_id = row.get("route_id");

    Ok(vec![
        Value::Integer(ids.map_id(IdDomain::Route, route_id)),
        Value::text(route_id),
        Value::text(row.get("agency_id")),
        Value::text(row.get("route_short_name")),
        Value::text(row.get("route_long_name")),
        Value::text(row.get("route_desc")),
        Value::Integer(route_type),
        Value::text(row.get("route_color")),
        Value::text(row.get("route_text_color")),
        Value::text(row.get("route_url")),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_gets_surrogate() {
        let mut ids = IdRegistry::new();
        let row = DecodedRow::from_pairs(&[
            ("route_id", "747"),
            ("agency_id", "STM"),
            ("route_short_name", "747"),
            ("route_type", "3"),
        ]);

        let out = transform(&row, &mut ids).unwrap();
        assert_eq!(out[0], Value::Integer(1));
        assert_eq!(out[1], Value::Text("747".to_string()));
        assert_eq!(out[6], Value::Integer(3));
        assert_eq!(ids.get(IdDomain::Route, "747"), Some(1));
    }

    #[test]
    fn test_route_type_is_required() {
        let mut ids = IdRegistry::new();
        let row = DecodedRow::from_pairs(&[("route_id", "R1"), ("route_type", "bus")]);

        let err = transform(&row, &mut ids).unwrap_err();
        assert_eq!(
            err,
            RowError::InvalidInteger { field: "route_type", value: "bus".to_string() }
        );
        assert_eq!(ids.len(IdDomain::Route), 0, "Rejected row must not register its key");
    }
}
