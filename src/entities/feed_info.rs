// ℹ️ feed_info.txt

use super::{passthrough, text, Column, OutputRow, TableDef};
use crate::decoder::DecodedRow;

const COLUMNS: &[Column] = &[
    text("feed_publisher_name"),
    text("feed_publisher_url"),
    text("feed_lang"),
    text("feed_start_date"),
    text("feed_end_date"),
    text("feed_version"),
];

pub static TABLE: TableDef = TableDef {
    name: "feed_info",
    columns: COLUMNS,
    emitted: None,
    indexes: &[],
};

pub fn transform(row: &DecodedRow) -> OutputRow {
    passthrough(row, COLUMNS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Value;

    #[test]
    fn test_feed_info_passthrough() {
        let row = DecodedRow::from_pairs(&[
            ("feed_lang", "fr"),
            ("feed_publisher_name", "STM"),
            ("feed_version", "2024-03"),
            ("feed_contact_email", "gtfs@stm.info"),
        ]);

        let out = transform(&row);
        assert_eq!(out.len(), TABLE.width());
        assert_eq!(out[0], Value::Text("STM".to_string()));
        assert!(out[1].is_null(), "Missing feed_publisher_url is NULL");
        assert_eq!(out[2], Value::Text("fr".to_string()));
        assert_eq!(out[5], Value::Text("2024-03".to_string()));
    }
}
