// 🗺️ perimetre_tr_plateforme_stif.txt
//
// Île-de-France extension mapping GTFS stops and lines onto the regional
// referential. Column names keep the publisher's casing.

use super::{passthrough, text, Column, OutputRow, TableDef};
use crate::decoder::DecodedRow;

const COLUMNS: &[Column] = &[
    text("MonitoringRef_ZDE"),
    text("reflex_lda_id"),
    text("reflex_lda_nom"),
    text("reflex_zdl_id"),
    text("reflex_zdl_nom"),
    text("reflex_zde_id"),
    text("reflex_zde_nom"),
    text("gtfs_stop_id"),
    text("Lineref"),
    text("gtfs_line_name"),
    text("codifligne_line_id"),
    text("codifligne_line_externalcode"),
    text("destination_code"),
    text("codifligne_network_name"),
    text("gtfs_agency"),
    text("opendata_date"),
    text("Dispo"),
    text("reflex_zde_x"),
    text("reflex_zde_y"),
    text("xy"),
];

pub static TABLE: TableDef = TableDef {
    name: "perimetre_tr_plateforme_stif",
    columns: COLUMNS,
    emitted: None,
    indexes: &[],
};

pub fn transform(row: &DecodedRow) -> OutputRow {
    passthrough(row, COLUMNS)
}
