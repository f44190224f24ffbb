use std::time::Instant;

use eframe::egui::{self, Frame, Margin, RichText};

use super::EguiApp;
use super::results::{self, card};
use super::style;
use crate::backend::ConnectivityStatus;
use crate::experiment::catalog::{
    DATASETS, MODELS, PREFIX_LENGTH_MAX, PREFIX_LENGTH_MIN, PREFIX_LENGTH_STEP,
};
use crate::experiment::{DatasetId, ModelId};
use crate::session::SessionState;

pub(super) const PAPER_URL: &str = "https://arxiv.org/abs/2503.02875";
const PAPER_CITATION: &str =
    "Based on \"The First Few Tokens Are All You Need\" (arXiv:2503.02875).";

impl EguiApp {
    pub(super) fn render_header(&mut self, ctx: &egui::Context) {
        let palette = style::palette();
        egui::TopBottomPanel::top("header")
            .frame(
                Frame::new()
                    .fill(palette.bg_primary)
                    .stroke(style::card_stroke())
                    .inner_margin(Margin::symmetric(16, 10)),
            )
            .show(ctx, |ui| {
                ui.heading(RichText::new("Prefix Classification Lab").strong());
                ui.label(
                    RichText::new(
                        "How much of a document does a classifier need? Compare a model \
                         trained on full texts with one that only sees the first N tokens.",
                    )
                    .color(palette.text_muted),
                );
            });
    }

    pub(super) fn render_footer(&mut self, ctx: &egui::Context) {
        let palette = style::palette();
        egui::TopBottomPanel::bottom("footer")
            .frame(
                Frame::new()
                    .fill(palette.bg_primary)
                    .stroke(style::card_stroke())
                    .inner_margin(Margin::symmetric(16, 6)),
            )
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(RichText::new(PAPER_CITATION).color(palette.text_muted).small());
                    if ui.small_button("Open paper").clicked() {
                        if let Err(err) = open::that(PAPER_URL) {
                            tracing::warn!(error = %err, "Failed to open paper link");
                        }
                    }
                });
            });
    }

    pub(super) fn render_connectivity_banner(&mut self, ui: &mut egui::Ui) {
        let palette = style::palette();
        let probing = matches!(self.session.state(), SessionState::Probing);
        let status = self.session.connectivity();
        let color = match status {
            ConnectivityStatus::Checking => palette.info,
            ConnectivityStatus::Online => palette.success,
            ConnectivityStatus::Offline => palette.warning,
        };
        let mut retry = false;
        Frame::new()
            .fill(palette.bg_primary)
            .stroke(egui::Stroke::new(2.0, color))
            .inner_margin(Margin::same(10))
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.horizontal(|ui| {
                    if probing {
                        ui.spinner();
                    }
                    ui.label(RichText::new(status.label()).strong().color(color));
                    ui.label(RichText::new(&self.backend_url).monospace().color(palette.text_muted));
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        retry = ui
                            .add_enabled(!probing, egui::Button::new("Retry connection"))
                            .clicked();
                    });
                });
                if status == ConnectivityStatus::Offline {
                    ui.label(
                        RichText::new(
                            "Start the experiment service and make sure it listens on the \
                             address above, then retry.",
                        )
                        .color(palette.text_muted),
                    );
                }
            });
        if retry {
            self.retry_connection();
        }
    }

    pub(super) fn render_controls(&mut self, ui: &mut egui::Ui) {
        let palette = style::palette();
        let selection = &mut self.selection;
        ui.columns(2, |columns| {
            card(&mut columns[0], |ui| dataset_selector(ui, &mut selection.dataset));
            card(&mut columns[1], |ui| model_selector(ui, &mut selection.model));
        });

        ui.add_space(10.0);
        card(ui, |ui| {
            ui.label(RichText::new("Prefix length").strong());
            ui.label(
                RichText::new("Number of leading tokens the prefix model is allowed to see.")
                    .color(palette.text_muted),
            );
            ui.style_mut().spacing.slider_width = (ui.available_width() - 120.0).max(120.0);
            ui.add(
                egui::Slider::new(
                    &mut selection.prefix_length,
                    PREFIX_LENGTH_MIN..=PREFIX_LENGTH_MAX,
                )
                .step_by(f64::from(PREFIX_LENGTH_STEP))
                .suffix(" tokens"),
            );
        });

        ui.add_space(10.0);
        let running = matches!(self.session.state(), SessionState::Running);
        let enabled = !self.session.state().is_busy();
        let label = if running { "Running experiment..." } else { "Run experiment" };
        let button = egui::Button::new(RichText::new(label).strong().size(18.0))
            .min_size(egui::vec2(ui.available_width(), 40.0));
        if ui.add_enabled(enabled, button).clicked() {
            self.run_experiment();
        }
        if running {
            ui.horizontal(|ui| {
                ui.spinner();
                let remaining = self
                    .session
                    .run_deadline()
                    .map(|deadline| deadline.saturating_duration_since(Instant::now()).as_secs())
                    .unwrap_or(0);
                ui.label(
                    RichText::new(format!(
                        "Training both models. Giving up in {remaining}s."
                    ))
                    .color(palette.text_muted),
                );
            });
        }
    }

    pub(super) fn render_outcome(&mut self, ui: &mut egui::Ui) {
        let palette = style::palette();
        let Self { session, plots, .. } = self;
        match session.state() {
            SessionState::Failed(err) => {
                ui.add_space(10.0);
                Frame::new()
                    .fill(palette.bg_primary)
                    .stroke(egui::Stroke::new(2.0, palette.error))
                    .inner_margin(Margin::same(12))
                    .show(ui, |ui| {
                        ui.set_width(ui.available_width());
                        ui.label(RichText::new("Error").strong().color(palette.error));
                        ui.label(err.to_string());
                    });
            }
            SessionState::Succeeded(result) => {
                ui.add_space(10.0);
                results::render_results(ui, result, plots);
            }
            _ => {}
        }
    }
}

fn dataset_selector(ui: &mut egui::Ui, current: &mut DatasetId) {
    let palette = style::palette();
    ui.label(RichText::new("Dataset").strong());
    for info in DATASETS {
        ui.selectable_value(current, info.id, RichText::new(info.name).strong());
        ui.label(
            RichText::new(format!("{} ({} samples)", info.description, info.samples))
                .small()
                .color(palette.text_muted),
        );
    }
}

fn model_selector(ui: &mut egui::Ui, current: &mut ModelId) {
    let palette = style::palette();
    ui.label(RichText::new("Model").strong());
    for info in MODELS {
        ui.selectable_value(current, info.id, RichText::new(info.name).strong());
        ui.label(RichText::new(info.description).small().color(palette.text_muted));
    }
}
