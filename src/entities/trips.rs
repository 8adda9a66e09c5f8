// 🚆 trips.txt
//
// Four foreign keys (route, service, shape, block) go through the registry.
// The trailing departure/arrival columns are empty after the load and are
// filled by the optimizer from stop_times.

use super::{int, text, Column, OutputRow, TableDef, Value};
use crate::coerce;
use crate::decoder::DecodedRow;
use crate::registry::{IdDomain, IdRegistry};

const COLUMNS: &[Column] = &[
    int("trip_index"),
    text("trip_id"),
    int("route_index"),
    text("route_id"),
    int("service_index"),
    text("service_id"),
    int("shape_index"),
    text("shape_id"),
    text("trip_headsign"),
    text("trip_short_name"),
    int("direction_id"),
    int("block_index"),
    text("block_id"),
    int("wheelchair_accessible"),
    // derived
    text("departure_time"),
    int("departure_time_secs"),
    text("arrival_time"),
    int("arrival_time_secs"),
];

pub static TABLE: TableDef = TableDef {
    name: "trips",
    columns: COLUMNS,
    emitted: Some(&[
        "trip_index",
        "trip_id",
        "route_index",
        "route_id",
        "service_index",
        "shape_index",
        "block_index",
        "block_id",
        "trip_headsign",
        "trip_short_name",
        "direction_id",
        "wheelchair_accessible",
        "shape_id",
        "service_id",
    ]),
    indexes: &[
        "trip_index",
        "route_index",
        "service_index",
        "shape_index",
        "trip_id",
        "route_id",
        "block_index",
    ],
};

pub fn transform(row: &DecodedRow, ids: &mut IdRegistry) -> OutputRow {
    let trip_id = row.get("trip_id");
    let route_id = row.get("route_id");
    let service_id = row.get("service_id");
    let shape_id = row.get("shape_id");
    let block_id = row.get("block_id");

    // direction_id: unset stays NULL; wheelchair_accessible: unset is 0
    let direction_id = coerce::non_negative_int(row.get("direction_id"));
    let wheelchair = coerce::int_or(row.get("wheelchair_accessible"), 0);

    vec![
        Value::Integer(ids.map_id(IdDomain::Trip, trip_id)),
        Value::text(trip_id),
        Value::Integer(ids.map_id(IdDomain::Route, route_id)),
        Value::text(route_id),
        Value::Integer(ids.map_id(IdDomain::Service, service_id)),
        Value::Integer(ids.map_id(IdDomain::Shape, shape_id)),
        Value::Integer(ids.map_id(IdDomain::Block, block_id)),
        Value::text(block_id),
        Value::text(row.get("trip_headsign")),
        Value::text(row.get("trip_short_name")),
        Value::from(direction_id),
        Value::Integer(wheelchair),
        Value::text(shape_id),
        Value::text(service_id),
    ]
}
