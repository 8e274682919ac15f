use eframe::egui::{ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use super::plot::NO_DATA;

/// Render rows of text under a header row. Empty input still shows the
/// header, followed by a "no data" note.
pub fn text_table(ui: &mut Ui, id: &str, headers: &[&str], rows: &[Vec<String>]) {
    ui.push_id(id, |ui: &mut Ui| {
        ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .vscroll(false)
                .columns(Column::auto().at_least(60.0), headers.len())
                .header(20.0, |mut header| {
                    for h in headers {
                        header.col(|ui: &mut Ui| {
                            ui.strong(*h);
                        });
                    }
                })
                .body(|mut body| {
                    for row in rows {
                        body.row(18.0, |mut table_row| {
                            for cell in row {
                                table_row.col(|ui: &mut Ui| {
                                    ui.label(cell);
                                });
                            }
                        });
                    }
                });
        });
    });
    if rows.is_empty() {
        ui.label(NO_DATA);
    }
}

/// Two-column key/value table.
pub fn pairs_table<K: ToString, V: ToString>(
    ui: &mut Ui,
    id: &str,
    headers: [&str; 2],
    pairs: &[(K, V)],
) {
    let rows: Vec<Vec<String>> = pairs
        .iter()
        .map(|(k, v)| vec![k.to_string(), v.to_string()])
        .collect();
    text_table(ui, id, &headers, &rows);
}
