use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::state::{AppState, Section};
use crate::ui::sections;

// ---------------------------------------------------------------------------
// Left side panel – section selector
// ---------------------------------------------------------------------------

/// Render the left panel: section combo box and the "show all" toggle.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Анализ торгового предприятия");
    ui.separator();

    ui.strong("Выберите раздел для анализа:");
    let current = state.section.map(Section::label).unwrap_or("—");
    egui::ComboBox::from_id_salt("section")
        .selected_text(current)
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            ui.selectable_value(&mut state.section, None, "—");
            for section in Section::ALL {
                ui.selectable_value(&mut state.section, Some(section), section.label());
            }
        });

    ui.add_space(8.0);
    ui.checkbox(&mut state.show_all, "Показать все разделы");
}

// ---------------------------------------------------------------------------
// Central panel – the selected sections
// ---------------------------------------------------------------------------

pub fn central_panel(ui: &mut Ui, state: &AppState) {
    let sections = state.visible_sections();
    if sections.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.label(RichText::new(sections::PROMPT).color(Color32::YELLOW));
        });
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for (i, section) in sections.into_iter().enumerate() {
                if i > 0 {
                    ui.separator();
                }
                ui.push_id(section.label(), |ui: &mut Ui| {
                    sections::show(ui, state, section);
                });
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        ui.label(format!(
            "{}: {} records, {} columns",
            state.session.source,
            state.session.table.len(),
            state.session.table.columns.len()
        ));

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open products table")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open(&path);
    }
}
