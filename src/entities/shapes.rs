// 〰️ shapes.txt - one row per shape point

use super::{int, real, text, Column, OutputRow, RowError, TableDef, Value};
use crate::coerce;
use crate::decoder::DecodedRow;
use crate::registry::{IdDomain, IdRegistry};

const COLUMNS: &[Column] = &[
    int("shape_index"),
    text("shape_id"),
    real("shape_pt_lat"),
    real("shape_pt_lon"),
    int("shape_pt_sequence"),
    real("shape_dist_traveled"),
];

pub static TABLE: TableDef = TableDef {
    name: "shapes",
    columns: COLUMNS,
    emitted: None,
    indexes: &["shape_index", "shape_id"],
};

pub fn transform(row: &DecodedRow, ids: &mut IdRegistry) -> Result<OutputRow, RowError> {
    let lat = coerce::required_real("shape_pt_lat", row.get("shape_pt_lat"))?;
    let lon = coerce::required_real("shape_pt_lon", row.get("shape_pt_lon"))?;
    let sequence = coerce::required_int("shape_pt_sequence", row.get("shape_pt_sequence"))?;
    let dist = coerce::optional_real("shape_dist_traveled", row.get("shape_dist_traveled"))?;
    let shape_id = row.get("shape_id");

    Ok(vec![
        Value::Integer(ids.map_id(IdDomain::Shape, shape_id)),
        Value::text(shape_id),
        Value::Real(lat),
        Value::Real(lon),
        Value::Integer(sequence),
        Value::from(dist),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_point() {
        let mut ids = IdRegistry::new();
        let row = DecodedRow::from_pairs(&[
            ("shape_id", "SH1"),
            ("shape_pt_lat", "48.8566"),
            ("shape_pt_lon", "2.3522"),
            ("shape_pt_sequence", "7"),
            ("shape_dist_traveled", "12.5"),
        ]);

        let out = transform(&row, &mut ids).unwrap();
        assert_eq!(out[0], Value::Integer(1));
        assert_eq!(out[2], Value::Real(48.8566));
        assert_eq!(out[4], Value::Integer(7));
        assert_eq!(out[5], Value::Real(12.5));
    }

    #[test]
    fn test_shape_point_needs_position() {
        let mut ids = IdRegistry::new();
        let row = DecodedRow::from_pairs(&[
            ("shape_id", "SH1"),
            ("shape_pt_lat", "48.8566"),
            ("shape_pt_sequence", "7"),
        ]);

        assert!(matches!(
            transform(&row, &mut ids),
            Err(RowError::InvalidReal { field: "shape_pt_lon", .. })
        ));
    }

    #[test]
    fn test_shape_point_rejects_non_finite() {
        let mut ids = IdRegistry::new();
        let row = DecodedRow::from_pairs(&[
            ("shape_id", "SH"),
            ("shape_pt_lat", "NaN"),
            ("shape_pt_lon", "inf"),
            ("shape_pt_sequence", "1"),
        ]);

        assert!(matches!(
            transform(&row, &mut ids),
            Err(RowError::InvalidReal { field: "shape_pt_lat", .. })
        ));
        assert!(ids.is_empty());
    }
}
