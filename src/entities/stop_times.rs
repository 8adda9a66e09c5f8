// ⏱️ stop_times.txt - by far the largest file of a feed
//
// Clock strings are kept verbatim next to their seconds value. GTFS allows
// hours past 24 for trips running after midnight, so no time type is used.

use super::{int, real, text, Column, OutputRow, RowError, TableDef, Value};
use crate::coerce;
use crate::decoder::DecodedRow;
use crate::registry::{IdDomain, IdRegistry};

const COLUMNS: &[Column] = &[
    int("trip_index"),
    text("trip_id"),
    int("stop_index"),
    text("stop_id"),
    text("arrival_time"),
    int("arrival_time_secs"),
    text("departure_time"),
    int("departure_time_secs"),
    int("stop_sequence"),
    int("last_stop"),
    real("shape_dist_traveled"),
    text("stop_headsign"),
    int("pickup_type"),
    int("drop_off_type"),
];

pub static TABLE: TableDef = TableDef {
    name: "stop_times",
    columns: COLUMNS,
    emitted: None,
    indexes: &["stop_index", "trip_index", "stop_id", "trip_id"],
};

pub fn transform(row: &DecodedRow, ids: &mut IdRegistry) -> Result<OutputRow, RowError> {
    let stop_sequence = coerce::required_int("stop_sequence", row.get("stop_sequence"))?;
    let shape_dist = coerce::optional_real("shape_dist_traveled", row.get("shape_dist_traveled"))?;

    let trip_id = row.get("trip_id");
    let stop_id = row.get("stop_id");
    let arrival = row.get("arrival_time");
    let departure = row.get("departure_time");

    Ok(vec![
        Value::Integer(ids.map_id(IdDomain::Trip, trip_id)),
        Value::text(trip_id),
        Value::Integer(ids.map_id(IdDomain::Stop, stop_id)),
        Value::text(stop_id),
        Value::text(arrival),
        Value::from(coerce::clock_seconds(arrival)),
        Value::text(departure),
        Value::from(coerce::clock_seconds(departure)),
        Value::Integer(stop_sequence),
        // set by the optimizer
        Value::Integer(0),
        Value::from(shape_dist),
        Value::text(row.get("stop_headsign").trim()),
        Value::from(coerce::non_negative_int(row.get("pickup_type"))),
        Value::from(coerce::non_negative_int(row.get("drop_off_type"))),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_times_are_converted_to_seconds() {
        let mut ids = IdRegistry::new();
        let row = DecodedRow::from_pairs(&[
            ("trip_id", "T1"),
            ("arrival_time", "25:10:05"),
            ("departure_time", "25:11:00"),
            ("stop_id", "S1"),
            ("stop_sequence", "4"),
            ("stop_headsign", "  Downtown "),
        ]);

        let out = transform(&row, &mut ids).unwrap();
        assert_eq!(out[4], Value::Text("25:10:05".to_string()));
        assert_eq!(out[5], Value::Integer(25 * 3600 + 10 * 60 + 5));
        assert_eq!(out[7], Value::Integer(25 * 3600 + 11 * 60));
        assert_eq!(out[8], Value::Integer(4));
        assert_eq!(out[9], Value::Integer(0), "last_stop starts cleared");
        assert!(out[10].is_null());
        assert_eq!(out[11], Value::Text("Downtown".to_string()));
        assert!(out[12].is_null());
        assert!(out[13].is_null());
    }

    #[test]
    fn test_blank_times_are_null() {
        let mut ids = IdRegistry::new();
        let row = DecodedRow::from_pairs(&[
            ("trip_id", "T1"),
            ("arrival_time", ""),
            ("departure_time", "soon"),
            ("stop_id", "S1"),
            ("stop_sequence", "2"),
            ("pickup_type", "1"),
        ]);

        let out = transform(&row, &mut ids).unwrap();
        assert!(out[4].is_null());
        assert!(out[5].is_null());
        assert_eq!(out[6], Value::Text("soon".to_string()));
        assert!(out[7].is_null());
        assert_eq!(out[12], Value::Integer(1));
    }

    #[test]
    fn test_oversized_clock_has_no_seconds() {
        let mut ids = IdRegistry::new();
        let row = DecodedRow::from_pairs(&[
            ("trip_id", "T1"),
            ("arrival_time", "3000000000000000:00:00"),
            ("departure_time", "08:00:00"),
            ("stop_id", "S1"),
            ("stop_sequence", "1"),
        ]);

        let out = transform(&row, &mut ids).unwrap();
        assert_eq!(out[4], Value::Text("3000000000000000:00:00".to_string()));
        assert!(out[5].is_null());
        assert_eq!(out[7], Value::Integer(28_800));
    }

    #[test]
    fn test_sequence_and_distance_validation() {
        let mut ids = IdRegistry::new();

        let missing_seq = DecodedRow::from_pairs(&[("trip_id", "T1"), ("stop_id", "S1")]);
        assert!(matches!(
            transform(&missing_seq, &mut ids),
            Err(RowError::InvalidInteger { field: "stop_sequence", .. })
        ));

        let bad_dist = DecodedRow::from_pairs(&[
            ("trip_id", "T1"),
            ("stop_id", "S1"),
            ("stop_sequence", "1"),
            ("shape_dist_traveled", "far"),
        ]);
        assert!(matches!(
            transform(&bad_dist, &mut ids),
            Err(RowError::InvalidReal { field: "shape_dist_traveled", .. })
        ));

        assert!(ids.is_empty(), "Rejected rows leave the registry untouched");
    }
}
