//! Decoding of the service's base64 PNG plots into cached textures.

use std::collections::HashMap;

use base64::Engine;
use eframe::egui::{self, ColorImage, RichText, TextureHandle, TextureOptions};

use super::style;
use crate::experiment::PlotSet;

const DATA_URL_PREFIX: &str = "data:image/png;base64,";

#[derive(Debug, thiserror::Error)]
pub enum PlotDecodeError {
    #[error("Plot is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("Plot is not a readable PNG: {0}")]
    Image(#[from] image::ImageError),
}

/// Decode one base64 PNG (optionally wrapped in a data URL).
pub fn decode_plot(encoded: &str) -> Result<ColorImage, PlotDecodeError> {
    let trimmed = encoded.trim();
    let payload = trimmed.strip_prefix(DATA_URL_PREFIX).unwrap_or(trimmed);
    let bytes = base64::engine::general_purpose::STANDARD.decode(payload)?;
    let image = image::load_from_memory_with_format(&bytes, image::ImageFormat::Png)?.to_rgba8();
    let size = [image.width() as usize, image.height() as usize];
    Ok(ColorImage::from_rgba_unmultiplied(size, image.as_raw()))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(super) enum PlotKind {
    Comparison,
    ConfusionFull,
    ConfusionPrefix,
}

impl PlotKind {
    fn source(self, plots: &PlotSet) -> &str {
        match self {
            Self::Comparison => &plots.comparison,
            Self::ConfusionFull => &plots.confusion_full,
            Self::ConfusionPrefix => &plots.confusion_prefix,
        }
    }

    fn texture_name(self) -> &'static str {
        match self {
            Self::Comparison => "plot_comparison",
            Self::ConfusionFull => "plot_confusion_full",
            Self::ConfusionPrefix => "plot_confusion_prefix",
        }
    }
}

/// Textures for the currently displayed result; cleared whenever it changes.
#[derive(Default)]
pub(super) struct PlotTextures {
    entries: HashMap<PlotKind, Result<TextureHandle, String>>,
}

impl PlotTextures {
    pub(super) fn clear(&mut self) {
        self.entries.clear();
    }

    fn texture(
        &mut self,
        ctx: &egui::Context,
        kind: PlotKind,
        plots: &PlotSet,
    ) -> &Result<TextureHandle, String> {
        self.entries.entry(kind).or_insert_with(|| {
            decode_plot(kind.source(plots))
                .map(|image| ctx.load_texture(kind.texture_name(), image, TextureOptions::LINEAR))
                .map_err(|err| {
                    tracing::warn!(plot = kind.texture_name(), error = %err, "Plot decode failed");
                    err.to_string()
                })
        })
    }

    pub(super) fn show(&mut self, ui: &mut egui::Ui, kind: PlotKind, plots: &PlotSet) {
        let ctx = ui.ctx().clone();
        match self.texture(&ctx, kind, plots) {
            Ok(texture) => {
                let width = ui.available_width();
                ui.add(egui::Image::new(texture).max_width(width));
            }
            Err(message) => {
                ui.label(RichText::new(message).color(style::palette().warning));
            }
        }
    }
}
