#![deny(missing_docs)]
#![deny(warnings)]

//! Entry point for the prefix classification lab UI.
#![cfg_attr(
    all(not(debug_assertions), target_os = "windows"),
    windows_subsystem = "windows"
)]
use eframe::egui;
use prefixlab::config;
use prefixlab::logging;
use prefixlab::ui::{EguiApp, MIN_VIEWPORT_SIZE};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(err) = logging::init() {
        eprintln!("Logging disabled: {err}");
    }

    let settings = config::load_or_default().map_err(|err| {
        tracing::error!(error = %err, "Failed to load settings");
        err.to_string()
    });

    let viewport = egui::ViewportBuilder::default()
        .with_min_inner_size(MIN_VIEWPORT_SIZE)
        .with_inner_size([1100.0, 860.0]);
    let native_options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        "Prefix Classification Lab",
        native_options,
        Box::new(move |_cc| {
            let app: Box<dyn eframe::App> = match settings {
                Ok(settings) => Box::new(EguiApp::new(&settings)),
                Err(message) => Box::new(LaunchError { message }),
            };
            Ok(app)
        }),
    )?;
    Ok(())
}

/// Minimal fallback app to display initialization errors.
struct LaunchError {
    message: String,
}

impl eframe::App for LaunchError {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.heading("Failed to start");
                ui.label(&self.message);
                ui.label("Fix or remove prefixlab.toml and restart.");
            });
        });
    }
}
