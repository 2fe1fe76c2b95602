use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column as GridColumn, TableBuilder};

use crate::dashboard::{Card, NOT_AVAILABLE, Side};
use crate::data::model::Table;
use crate::state::AppState;
use crate::ui::Action;

const MAPS_BLUE: Color32 = Color32::from_rgb(0x00, 0x7b, 0xff);
const SITE_GREEN: Color32 = Color32::from_rgb(0x28, 0xa7, 0x45);

// ---------------------------------------------------------------------------
// Central panel: full table, then the submitted results
// ---------------------------------------------------------------------------

pub fn central_panel(ui: &mut Ui, state: &AppState) -> Option<Action> {
    let (Some(source), Some(view)) = (&state.source, &state.view) else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("No se pudo cargar el directorio  (Archivo → Recargar datos)");
        });
        return None;
    };

    let mut action = None;

    ScrollArea::vertical()
        .id_salt("results_scroll")
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading(&state.config.title);
            ui.add_space(8.0);

            ui.label(RichText::new("Datos Completos").size(18.0).strong());
            data_grid(ui, "full_grid", source);

            let Some(results) = &view.results else {
                return;
            };

            ui.add_space(12.0);
            ui.label(RichText::new("Datos Filtrados").size(18.0).strong());
            data_grid(ui, "filtered_grid", &view.filtered);

            if ui.button("Descargar datos filtrados como CSV").clicked() {
                action = Some(Action::SaveCsv);
            }

            ui.add_space(12.0);
            ui.label(RichText::new("Empresas").size(18.0).strong());
            ui.columns(2, |cols: &mut [Ui]| {
                for card in &results.cards {
                    let col = match card.side {
                        Side::Left => &mut cols[0],
                        Side::Right => &mut cols[1],
                    };
                    card_frame(col, card);
                }
            });
        });

    action
}

/// Scrollable grid of every column of `table`; nulls show as `N/A`.
fn data_grid(ui: &mut Ui, id: &str, table: &Table) {
    let columns = table.columns();
    ui.push_id(id, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .max_scroll_height(240.0)
            .columns(GridColumn::auto().at_least(80.0), columns.len())
            .header(20.0, |mut header| {
                for col in columns {
                    header.col(|ui: &mut Ui| {
                        ui.strong(col.key());
                    });
                }
            })
            .body(|body| {
                body.rows(18.0, table.len(), |mut row| {
                    let record = &table.rows()[row.index()].record;
                    for col in columns {
                        row.col(|ui: &mut Ui| {
                            let text = record
                                .cell(*col)
                                .unwrap_or_else(|| NOT_AVAILABLE.to_string());
                            ui.label(text);
                        });
                    }
                });
            });
    });
}

fn card_frame(ui: &mut Ui, card: &Card) {
    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.set_width(ui.available_width());
        ui.set_min_height(110.0);

        ui.strong(&card.name);
        ui.horizontal(|ui: &mut Ui| {
            ui.label(RichText::new("Correo:").italics());
            match card.mailto() {
                Some(href) => {
                    ui.hyperlink_to(card.email_label(), href);
                }
                None => {
                    ui.label(NOT_AVAILABLE);
                }
            }
        });

        ui.add_space(8.0);
        ui.horizontal(|ui: &mut Ui| {
            if let Some(url) = &card.maps_url {
                ui.hyperlink_to(RichText::new("Ver en Maps").color(MAPS_BLUE), url);
            }
            if let Some(url) = &card.website {
                ui.hyperlink_to(RichText::new("Ver sitio web").color(SITE_GREEN), url);
            }
        });
    });
}
