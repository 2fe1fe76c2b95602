use eframe::egui::{self, Color32, ComboBox, RichText, ScrollArea, Ui};

use crate::dashboard::Dropdown;
use crate::state::AppState;
use crate::ui::Action;

// ---------------------------------------------------------------------------
// Left side panel – search and filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    // ---- Logo (centered) ----
    if let Some(logo) = &state.logo {
        ui.vertical_centered(|ui: &mut Ui| {
            ui.add(
                egui::Image::from_bytes(logo.egui_uri(), logo.bytes.clone())
                    .max_width(ui.available_width() * 0.8)
                    .max_height(120.0),
            );
        });
        ui.add_space(4.0);
    }

    ui.heading("Filtros");
    ui.separator();

    let controls = match &state.view {
        Some(view) => view.controls.clone(),
        None => {
            ui.label("No hay datos cargados.");
            return;
        }
    };

    // Edit a copy so the handler runs once per frame at most.
    let mut edited = state.selections.clone();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.label("Buscar por nombre de la unidad económica:");
            ui.text_edit_singleline(&mut edited.name_query);
            ui.add_space(4.0);

            ui.label("Buscar por razón social:");
            ui.text_edit_singleline(&mut edited.legal_name_query);
            ui.separator();

            if let Some(dd) = &controls.activity_codes {
                dropdown(
                    ui,
                    "Selecciona el código de actividad:",
                    dd,
                    &mut edited.activity_code,
                    |v| v.clone(),
                );
            }
            if let Some(dd) = &controls.municipalities {
                dropdown(
                    ui,
                    "Selecciona el municipio:",
                    dd,
                    &mut edited.municipality,
                    |v| v.clone(),
                );
            }
            if let Some(dd) = &controls.employee_brackets {
                dropdown(
                    ui,
                    "Selecciona el estrato de personal ocupado:",
                    dd,
                    &mut edited.employee_bracket,
                    |v| v.label().to_string(),
                );
            }
            if let Some(dd) = &controls.registration_years {
                dropdown(
                    ui,
                    "Selecciona el año de incorporación al DENUE:",
                    dd,
                    &mut edited.registration_year,
                    |v| v.to_string(),
                );
            }
            ui.add_space(8.0);

            state.update_selections(edited);

            if ui.button("Realizar búsqueda").clicked() {
                state.submit();
            }
        });
}

/// A combo box whose first entry (blank) clears the selection.
fn dropdown<T: Clone + PartialEq>(
    ui: &mut Ui,
    label: &str,
    dropdown: &Dropdown<T>,
    current: &mut Option<T>,
    text: impl Fn(&T) -> String,
) {
    let entry_text = |v: &Option<T>| v.as_ref().map(&text).unwrap_or_default();

    ui.label(label);
    ComboBox::from_id_salt(label)
        .width(ui.available_width())
        .selected_text(entry_text(current))
        .show_ui(ui, |ui: &mut Ui| {
            for entry in dropdown.entries() {
                let shown = entry_text(&entry);
                ui.selectable_value(&mut *current, entry, shown);
            }
        });
    ui.add_space(4.0);
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &AppState) -> Option<Action> {
    let mut action = None;
    let submitted = state
        .view
        .as_ref()
        .is_some_and(|v| v.results.is_some());

    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("Archivo", |ui: &mut Ui| {
            if ui.button("Recargar datos").clicked() {
                action = Some(Action::Reload);
                ui.close_menu();
            }
            if ui
                .add_enabled(submitted, egui::Button::new("Guardar página HTML…"))
                .clicked()
            {
                action = Some(Action::SaveHtml);
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(source), Some(view)) = (&state.source, &state.view) {
            ui.label(format!(
                "{} empresas cargadas, {} tras los filtros",
                source.len(),
                view.filtered.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });

    action
}
