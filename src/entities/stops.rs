// 🚏 stops.txt
//
// A stop may point at its parent station. The parent is resolved in the same
// stop domain, so a station listed after its children still gets a single
// surrogate. No parent means NULL in both parent columns, never index 0.

use super::{int, real, text, Column, OutputRow, RowError, TableDef, Value};
use crate::coerce;
use crate::decoder::DecodedRow;
use crate::registry::{IdDomain, IdRegistry};

const COLUMNS: &[Column] = &[
    int("stop_index"),
    text("stop_id"),
    text("stop_code"),
    text("stop_name"),
    text("stop_desc"),
    text("zone_id"),
    int("zone_index"),
    real("stop_lat"),
    real("stop_lon"),
    int("location_type"),
    text("parent_station"),
    int("parent_station_index"),
    int("wheelchair_boarding"),
    text("stop_url"),
    text("stop_timezone"),
];

pub static TABLE: TableDef = TableDef {
    name: "stops",
    columns: COLUMNS,
    emitted: None,
    indexes: &["stop_index", "stop_id", "stop_code", "zone_id", "zone_index"],
};

pub fn transform(row: &DecodedRow, ids: &mut IdRegistry) -> Result<OutputRow, RowError> {
    let stop_lat = coerce::required_real("stop_lat", row.get("stop_lat"))?;
    let stop_lon = coerce::required_real("stop_lon", row.get("stop_lon"))?;

    let stop_id = row.get("stop_id");
    let zone_id = row.get("zone_id");
    let parent_id = row.get("parent_station");

    let stop_index = ids.map_id(IdDomain::Stop, stop_id);
    let zone_index = ids.map_id(IdDomain::Zone, zone_id);

    let (parent_station, parent_index) = if parent_id.is_empty() {
        (Value::Null, Value::Null)
    } else {
        (
            Value::text(parent_id),
            Value::Integer(ids.map_id(IdDomain::Stop, parent_id)),
        )
    };

    Ok(vec![
        Value::Integer(stop_index),
        Value::text(stop_id),
        Value::text(row.get("stop_code")),
        Value::text(row.get("stop_name")),
        Value::text(row.get("stop_desc")),
        Value::text(zone_id),
        Value::Integer(zone_index),
        Value::Real(stop_lat),
        Value::Real(stop_lon),
        Value::Integer(coerce::int_or(row.get("location_type"), 0)),
        parent_station,
        parent_index,
        Value::Integer(coerce::int_or(row.get("wheelchair_boarding"), 0)),
        Value::text(row.get("stop_url")),
        Value::text(row.get("stop_timezone")),
    ])
}
