use std::path::PathBuf;

/// Start-up settings. Paths are relative to the working directory.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_path: PathBuf,
    pub logo_path: PathBuf,
    pub title: String,
    pub inner_size: [f32; 2],
    pub min_inner_size: [f32; 2],
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data").join("inegi.json"),
            logo_path: PathBuf::from("logo").join("logo.webp"),
            title: "Directorio empresas en INEGI".to_string(),
            inner_size: [1200.0, 800.0],
            min_inner_size: [600.0, 400.0],
        }
    }
}
