use eframe::egui::{
    self, Color32, Stroke, Visuals,
    epaint::{CornerRadius, Shadow},
    style::WidgetVisuals,
};

#[derive(Clone, Copy)]
pub struct Palette {
    pub bg_primary: Color32,
    pub bg_secondary: Color32,
    pub bg_tertiary: Color32,
    pub outline: Color32,
    pub text_primary: Color32,
    pub text_muted: Color32,
    pub accent: Color32,
    pub info: Color32,
    pub warning: Color32,
    pub error: Color32,
    pub success: Color32,
}

pub fn palette() -> Palette {
    Palette {
        bg_primary: Color32::from_rgb(12, 12, 14),
        bg_secondary: Color32::from_rgb(26, 28, 30),
        bg_tertiary: Color32::from_rgb(42, 44, 48),
        outline: Color32::from_rgb(56, 60, 66),
        text_primary: Color32::from_rgb(200, 204, 210),
        text_muted: Color32::from_rgb(140, 146, 155),
        accent: Color32::from_rgb(253, 224, 71),
        info: Color32::from_rgb(147, 197, 253),
        warning: Color32::from_rgb(253, 186, 116),
        error: Color32::from_rgb(248, 113, 113),
        success: Color32::from_rgb(134, 239, 172),
    }
}

pub fn apply_visuals(ctx: &egui::Context) {
    let palette = palette();
    let mut visuals = Visuals::dark();
    visuals.window_fill = palette.bg_primary;
    visuals.panel_fill = palette.bg_secondary;
    visuals.override_text_color = Some(palette.text_primary);
    visuals.extreme_bg_color = palette.bg_primary;
    visuals.faint_bg_color = palette.bg_secondary;
    visuals.error_fg_color = palette.error;
    visuals.warn_fg_color = palette.warning;
    visuals.selection.bg_fill = palette.bg_tertiary;
    visuals.selection.stroke = Stroke::new(2.0, palette.accent);
    set_rectilinear(&mut visuals.widgets.inactive, palette);
    set_rectilinear(&mut visuals.widgets.hovered, palette);
    set_rectilinear(&mut visuals.widgets.active, palette);
    set_rectilinear(&mut visuals.widgets.open, palette);
    visuals.window_corner_radius = CornerRadius::ZERO;
    visuals.popup_shadow = Shadow::NONE;
    ctx.set_visuals(visuals);
}

fn set_rectilinear(vis: &mut WidgetVisuals, palette: Palette) {
    vis.corner_radius = CornerRadius::ZERO;
    vis.bg_fill = palette.bg_tertiary;
    vis.weak_bg_fill = palette.bg_tertiary;
    vis.bg_stroke = Stroke::new(1.0, palette.outline);
    vis.fg_stroke = Stroke::new(1.0, palette.text_primary);
}

/// Thick border used for the main cards.
pub fn card_stroke() -> Stroke {
    Stroke::new(2.0, palette().outline)
}

/// How well the prefix preserved full-text accuracy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RetentionBand {
    Strong,
    Moderate,
    Weak,
}

impl RetentionBand {
    pub fn from_retention(percent: f64) -> Self {
        if percent >= 95.0 {
            Self::Strong
        } else if percent >= 85.0 {
            Self::Moderate
        } else {
            Self::Weak
        }
    }

    pub fn color(self) -> Color32 {
        let palette = palette();
        match self {
            Self::Strong => palette.success,
            Self::Moderate => palette.accent,
            Self::Weak => palette.error,
        }
    }
}
