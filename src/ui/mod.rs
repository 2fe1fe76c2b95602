pub mod panels;
pub mod results;

/// Something a widget asked for that needs a native dialog or a reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Reload,
    SaveCsv,
    SaveHtml,
}
