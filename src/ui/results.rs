use eframe::egui::{self, Frame, Margin, RichText};

use super::plots::{PlotKind, PlotTextures};
use super::style::{self, RetentionBand};
use crate::experiment::{ClassificationMetrics, ExperimentResult};

/// Render a metric stored as a fraction in `[0, 1]` as a percentage.
pub(crate) fn format_percent(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.0)
}

pub(crate) fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Plain-language summary lines shown under the plots.
pub(crate) fn key_findings(result: &ExperimentResult) -> Vec<String> {
    let drop = result.accuracy_drop_points();
    let drop_line = if drop >= 0.0 {
        format!("Accuracy drops by {drop:.2} percentage points when only the prefix is used.")
    } else {
        format!(
            "Accuracy improves by {:.2} percentage points when only the prefix is used.",
            -drop
        )
    };
    vec![
        format!(
            "Using only the first {} tokens retains {:.1}% of full-text accuracy.",
            result.prefix_length, result.performance_retention
        ),
        drop_line,
        format!(
            "F1 score: {} on full text vs {} on the prefix.",
            format_percent(result.full_text.f1_score),
            format_percent(result.prefix.f1_score)
        ),
    ]
}

pub(super) fn render_results(ui: &mut egui::Ui, result: &ExperimentResult, plots: &mut PlotTextures) {
    let palette = style::palette();
    card(ui, |ui| {
        ui.heading("Results");
        ui.add_space(6.0);
        egui::Grid::new("result_summary")
            .num_columns(2)
            .spacing([24.0, 4.0])
            .show(ui, |ui| {
                ui.label(RichText::new("Dataset size").color(palette.text_muted));
                ui.label(format!("{} samples", format_count(result.dataset_size)));
                ui.end_row();
                ui.label(RichText::new("Train / test").color(palette.text_muted));
                ui.label(format!(
                    "{} / {}",
                    format_count(result.train_size),
                    format_count(result.test_size)
                ));
                ui.end_row();
                ui.label(RichText::new("Prefix length").color(palette.text_muted));
                ui.label(format!("{} tokens", result.prefix_length));
                ui.end_row();
                ui.label(RichText::new("Performance retention").color(palette.text_muted));
                let band = RetentionBand::from_retention(result.performance_retention);
                ui.label(
                    RichText::new(format!("{:.1}%", result.performance_retention))
                        .strong()
                        .size(20.0)
                        .color(band.color()),
                );
                ui.end_row();
            });
    });

    ui.add_space(10.0);
    ui.columns(2, |columns| {
        card(&mut columns[0], |ui| {
            metrics_table(ui, "full_text_metrics", "Full text", &result.full_text, &result.label_names)
        });
        card(&mut columns[1], |ui| {
            let title = format!("First {} tokens", result.prefix_length);
            metrics_table(ui, "prefix_metrics", &title, &result.prefix, &result.label_names)
        });
    });

    ui.add_space(10.0);
    card(ui, |ui| {
        ui.label(RichText::new("Accuracy comparison").strong());
        plots.show(ui, PlotKind::Comparison, &result.plots);
    });
    ui.add_space(10.0);
    ui.columns(2, |columns| {
        card(&mut columns[0], |ui| {
            ui.label(RichText::new("Confusion matrix: full text").strong());
            plots.show(ui, PlotKind::ConfusionFull, &result.plots);
        });
        card(&mut columns[1], |ui| {
            ui.label(RichText::new("Confusion matrix: prefix").strong());
            plots.show(ui, PlotKind::ConfusionPrefix, &result.plots);
        });
    });

    ui.add_space(10.0);
    card(ui, |ui| {
        ui.label(RichText::new("Key findings").strong());
        for line in key_findings(result) {
            ui.label(format!("• {line}"));
        }
    });
}

fn metrics_table(
    ui: &mut egui::Ui,
    id: &str,
    title: &str,
    metrics: &ClassificationMetrics,
    labels: &[String],
) {
    let palette = style::palette();
    ui.label(RichText::new(title).strong());
    egui::Grid::new(id)
        .num_columns(2)
        .spacing([24.0, 2.0])
        .show(ui, |ui| {
            for (name, value) in [
                ("Accuracy", metrics.accuracy),
                ("Precision", metrics.precision),
                ("Recall", metrics.recall),
                ("F1 score", metrics.f1_score),
            ] {
                ui.label(RichText::new(name).color(palette.text_muted));
                ui.label(RichText::new(format_percent(value)).monospace());
                ui.end_row();
            }
        });
    ui.add_space(4.0);
    egui::Grid::new((id, "confusion"))
        .num_columns(labels.len() + 1)
        .striped(true)
        .show(ui, |ui| {
            ui.label(RichText::new("true \\ pred").color(palette.text_muted).small());
            for label in labels {
                ui.label(RichText::new(label).small());
            }
            ui.end_row();
            for (label, row) in labels.iter().zip(&metrics.confusion_matrix) {
                ui.label(RichText::new(label).small());
                for count in row {
                    ui.label(RichText::new(count.to_string()).monospace());
                }
                ui.end_row();
            }
        });
}

pub(super) fn card<R>(ui: &mut egui::Ui, add_contents: impl FnOnce(&mut egui::Ui) -> R) -> R {
    let palette = style::palette();
    Frame::new()
        .fill(palette.bg_primary)
        .stroke(style::card_stroke())
        .inner_margin(Margin::same(12))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            add_contents(ui)
        })
        .inner
}
