use std::path::Path;

use anyhow::{Context, Result};

use crate::config::AppConfig;
use crate::dashboard::{self, Dashboard, Selections};
use crate::data::export::CSV_FILE_NAME;
use crate::data::loader::load_file;
use crate::data::model::Table;
use crate::html::{self, Logo};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: AppConfig,

    /// Loaded registry (None when loading failed).
    pub source: Option<Table>,

    /// Current user input.
    pub selections: Selections,

    /// Output of the last handler run (cached until selections change).
    pub view: Option<Dashboard>,

    pub logo: Option<Logo>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let logo = match Logo::load(&config.logo_path) {
            Ok(logo) => Some(logo),
            Err(e) => {
                log::warn!("No logo: {e:#}");
                None
            }
        };
        let mut state = Self {
            config,
            source: None,
            selections: Selections::default(),
            view: None,
            logo,
            status_message: None,
        };
        state.reload();
        state
    }

    /// (Re)load the registry from the configured path and reset the search.
    pub fn reload(&mut self) {
        self.selections = Selections::default();
        match load_file(&self.config.data_path) {
            Ok(table) => {
                self.source = Some(table);
                self.status_message = None;
            }
            Err(e) => {
                log::error!(
                    "Failed to load {}: {e}",
                    self.config.data_path.display()
                );
                self.source = None;
                self.status_message = Some(format!("Error: {e}"));
            }
        }
        self.refresh();
    }

    /// Re-run the handler for the current selections.
    pub fn refresh(&mut self) {
        let Some(source) = &self.source else {
            self.view = None;
            return;
        };
        match dashboard::handle(source, &self.selections) {
            Ok(view) => {
                // Keep the widgets in sync with what was actually applied.
                self.selections = view.applied.clone();
                self.view = Some(view);
            }
            Err(e) => {
                log::error!("Search failed: {e}");
                self.status_message = Some(format!("Error: {e}"));
                self.view = None;
            }
        }
    }

    /// Apply an edit made by the filter widgets. Any change hides the results
    /// until the search is submitted again.
    pub fn update_selections(&mut self, selections: Selections) {
        if selections != self.selections {
            self.selections = Selections {
                submitted: false,
                ..selections
            };
            self.refresh();
        }
    }

    pub fn submit(&mut self) {
        self.selections.submitted = true;
        self.refresh();
    }

    /// Write the CSV export of the submitted search to `path`.
    pub fn save_csv(&self, path: &Path) -> Result<()> {
        let results = self
            .view
            .as_ref()
            .and_then(|v| v.results.as_ref())
            .context("no submitted search to export")?;
        std::fs::write(path, &results.export.body)
            .with_context(|| format!("writing {}", path.display()))?;
        log::info!("Saved {} to {}", results.export.file_name, path.display());
        Ok(())
    }

    /// Write a standalone HTML page with the submitted cards to `path`.
    pub fn save_html(&self, path: &Path) -> Result<()> {
        let results = self
            .view
            .as_ref()
            .and_then(|v| v.results.as_ref())
            .context("no submitted search to render")?;
        let page = html::page_html(&self.config.title, self.logo.as_ref(), &results.cards);
        std::fs::write(path, page).with_context(|| format!("writing {}", path.display()))?;
        log::info!("Saved page with {} cards to {}", results.cards.len(), path.display());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Save dialogs
// ---------------------------------------------------------------------------

pub fn save_csv_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Descargar datos filtrados como CSV")
        .set_file_name(CSV_FILE_NAME)
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        if let Err(e) = state.save_csv(&path) {
            log::error!("Failed to save CSV: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}

pub fn save_html_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Guardar página HTML")
        .set_file_name("empresas.html")
        .add_filter("HTML", &["html"])
        .save_file();

    if let Some(path) = file {
        if let Err(e) = state.save_html(&path) {
            log::error!("Failed to save page: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const DATA: &str = r#"[
        {"Nombre de la Unidad Económica": "A", "Municipio": "Toluca",
         "Correo electrónico": "a@a.mx"},
        {"Nombre de la Unidad Económica": "B", "Municipio": "Metepec"}
    ]"#;

    fn state_in(dir: &Path) -> AppState {
        let data_path = dir.join("inegi.json");
        std::fs::write(&data_path, DATA).unwrap();
        AppState::new(AppConfig {
            data_path,
            logo_path: dir.join("logo.webp"),
            ..AppConfig::default()
        })
    }

    #[test]
    fn missing_file_surfaces_an_error() {
        let state = AppState::new(AppConfig {
            data_path: PathBuf::from("/nonexistent/inegi.json"),
            ..AppConfig::default()
        });
        assert!(state.source.is_none());
        assert!(state.view.is_none());
        assert!(state.status_message.unwrap().starts_with("Error:"));
    }

    #[test]
    fn editing_a_filter_clears_the_submitted_results() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state_in(dir.path());
        assert!(state.logo.is_none());

        state.submit();
        assert!(state.view.as_ref().unwrap().results.is_some());

        let mut edited = state.selections.clone();
        edited.municipality = Some("Toluca".into());
        state.update_selections(edited);
        assert!(!state.selections.submitted);
        let view = state.view.as_ref().unwrap();
        assert!(view.results.is_none());
        assert_eq!(view.filtered.len(), 1);
    }

    #[test]
    fn saves_need_a_submitted_search() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state_in(dir.path());
        let csv_path = dir.path().join("datos_filtrados.csv");
        assert!(state.save_csv(&csv_path).is_err());

        state.submit();
        state.save_csv(&csv_path).unwrap();
        let csv = std::fs::read_to_string(&csv_path).unwrap();
        assert!(csv.starts_with("Nombre de la Unidad Económica,Municipio,Correo electrónico\n"));

        let html_path = dir.path().join("empresas.html");
        state.save_html(&html_path).unwrap();
        let page = std::fs::read_to_string(&html_path).unwrap();
        assert!(page.contains(r#"<a href="mailto:a@a.mx">a@a.mx</a>"#));
        assert!(!page.contains("<img"));
    }
}
