//! egui front-end. Rendering reads [`Session::state`]; user actions go back
//! through the session, never straight to the network.

mod panels;
pub mod plots;
mod results;
pub mod style;

use std::sync::Arc;
use std::time::Duration;

use eframe::egui;

use crate::backend::HttpService;
use crate::config::AppSettings;
use crate::experiment::Selection;
use crate::session::Session;
use plots::PlotTextures;

/// Minimum window size that keeps the two-column layouts readable.
pub const MIN_VIEWPORT_SIZE: egui::Vec2 = egui::vec2(760.0, 560.0);
const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub struct EguiApp {
    session: Session,
    selection: Selection,
    backend_url: String,
    plots: PlotTextures,
    visuals_set: bool,
}

impl EguiApp {
    pub fn new(settings: &AppSettings) -> Self {
        let service = HttpService::new(&settings.backend.base_url, settings.backend.probe_timeout());
        let backend_url = service.base_url().to_string();
        let mut session = Session::new(Arc::new(service), settings.backend.experiment_timeout());
        session.start();
        Self {
            session,
            selection: settings.experiment.selection(),
            backend_url,
            plots: PlotTextures::default(),
            visuals_set: false,
        }
    }

    fn run_experiment(&mut self) {
        self.plots.clear();
        self.session.request_run(self.selection.to_request());
    }

    fn retry_connection(&mut self) {
        self.plots.clear();
        self.session.retry_connectivity();
    }
}

impl eframe::App for EguiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if !self.visuals_set {
            style::apply_visuals(ctx);
            self.visuals_set = true;
        }
        if self.session.poll() {
            self.plots.clear();
        }
        self.render_header(ctx);
        self.render_footer(ctx);
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    self.render_connectivity_banner(ui);
                    ui.add_space(10.0);
                    self.render_controls(ui);
                    self.render_outcome(ui);
                });
        });
        if self.session.has_pending_work() {
            ctx.request_repaint_after(POLL_INTERVAL);
        }
    }
}
