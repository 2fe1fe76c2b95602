use directorio::app::DirectorioApp;
use directorio::config::AppConfig;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let config = AppConfig::default();
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(config.title.clone())
            .with_inner_size(config.inner_size)
            .with_min_inner_size(config.min_inner_size),
        ..Default::default()
    };

    let title = config.title.clone();
    eframe::run_native(
        &title,
        options,
        Box::new(move |cc| {
            // Install image loaders so egui can render the webp/png logo.
            egui_extras::install_image_loaders(&cc.egui_ctx);
            Ok(Box::new(DirectorioApp::new(config)))
        }),
    )
}
