/// Theme system — light and dark application themes
///
/// Each theme also decides which chart palette the plots are derived with,
/// so a theme switch re-derives every visible chart.
use crate::chart::palette::ChartPalette;

/// Available themes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum AppTheme {
    #[default]
    Light,
    Dark,
}

impl AppTheme {
    pub fn label(&self) -> &'static str {
        match self {
            AppTheme::Light => "☀ Light",
            AppTheme::Dark => "🌙 Dark",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            AppTheme::Light => AppTheme::Dark,
            AppTheme::Dark => AppTheme::Light,
        }
    }

    /// Chart colors for this theme
    pub fn palette(&self) -> ChartPalette {
        match self {
            AppTheme::Light => ChartPalette::light(),
            AppTheme::Dark => ChartPalette::dark(),
        }
    }
}

/// Window colors a theme needs to provide
#[derive(Debug, Clone)]
pub struct ThemeColors {
    // Panels & backgrounds
    pub panel_fill: egui::Color32,
    pub window_fill: egui::Color32,
    pub faint_bg: egui::Color32,

    // Widgets
    pub widget_bg: egui::Color32,
    pub widget_bg_stroke: egui::Color32,
    pub widget_hovered_stroke: egui::Color32,
    pub widget_active_bg: egui::Color32,

    pub selection_bg: egui::Color32,
    pub selection_stroke: egui::Color32,

    // Text
    pub text_primary: egui::Color32,
    pub text_muted: egui::Color32,

    // Tabs
    pub tab_active_bg: egui::Color32,
    pub tab_active_text: egui::Color32,
    pub tab_inactive_bg: egui::Color32,
    pub tab_inactive_text: egui::Color32,

    pub status_bar_bg: egui::Color32,

    pub is_dark: bool,
}

impl ThemeColors {
    pub fn from_theme(theme: AppTheme) -> Self {
        match theme {
            AppTheme::Light => Self::light(),
            AppTheme::Dark => Self::dark(),
        }
    }

    fn light() -> Self {
        Self {
            panel_fill: egui::Color32::from_rgb(0xF7, 0xF7, 0xF8),
            window_fill: egui::Color32::WHITE,
            faint_bg: egui::Color32::from_rgb(0xF0, 0xF1, 0xF3),

            widget_bg: egui::Color32::from_rgb(0xEB, 0xEC, 0xEE),
            widget_bg_stroke: egui::Color32::from_rgb(0xD0, 0xD2, 0xD6),
            widget_hovered_stroke: egui::Color32::from_rgb(0x5C, 0x6B, 0xC0),
            widget_active_bg: egui::Color32::from_rgb(0x28, 0x35, 0x93),

            selection_bg: egui::Color32::from_rgba_premultiplied(0x14, 0x1A, 0x4A, 0x40),
            selection_stroke: egui::Color32::from_rgb(0x28, 0x35, 0x93),

            text_primary: egui::Color32::from_rgb(0x33, 0x33, 0x33),
            text_muted: egui::Color32::from_rgb(0x88, 0x8C, 0x94),

            tab_active_bg: egui::Color32::from_rgb(0x28, 0x35, 0x93),
            tab_active_text: egui::Color32::WHITE,
            tab_inactive_bg: egui::Color32::from_rgb(0xE8, 0xEA, 0xED),
            tab_inactive_text: egui::Color32::from_rgb(0x55, 0x58, 0x62),

            status_bar_bg: egui::Color32::from_rgb(0xF0, 0xF1, 0xF3),

            is_dark: false,
        }
    }

    fn dark() -> Self {
        Self {
            panel_fill: egui::Color32::from_rgb(0x1E, 0x1E, 0x1E),
            window_fill: egui::Color32::from_rgb(0x25, 0x25, 0x26),
            faint_bg: egui::Color32::from_rgb(0x2A, 0x2A, 0x2C),

            widget_bg: egui::Color32::from_rgb(0x2D, 0x2D, 0x30),
            widget_bg_stroke: egui::Color32::from_rgb(0x44, 0x44, 0x44),
            widget_hovered_stroke: egui::Color32::from_rgb(0x7F, 0x8F, 0xE0),
            widget_active_bg: egui::Color32::from_rgb(0x3F, 0x51, 0xB5),

            selection_bg: egui::Color32::from_rgba_premultiplied(0x1F, 0x28, 0x5A, 0x40),
            selection_stroke: egui::Color32::from_rgb(0x3F, 0x51, 0xB5),

            text_primary: egui::Color32::WHITE,
            text_muted: egui::Color32::from_rgb(0x9A, 0x9A, 0xA0),

            tab_active_bg: egui::Color32::from_rgb(0x3F, 0x51, 0xB5),
            tab_active_text: egui::Color32::WHITE,
            tab_inactive_bg: egui::Color32::from_rgb(0x2D, 0x2D, 0x30),
            tab_inactive_text: egui::Color32::from_rgb(0xB0, 0xB0, 0xB8),

            status_bar_bg: egui::Color32::from_rgb(0x18, 0x18, 0x18),

            is_dark: true,
        }
    }
}

/// Apply a theme to the egui context
pub fn apply_theme(ctx: &egui::Context, theme: AppTheme) {
    let c = ThemeColors::from_theme(theme);

    let mut visuals = if c.is_dark {
        egui::Visuals::dark()
    } else {
        egui::Visuals::light()
    };

    visuals.panel_fill = c.panel_fill;
    visuals.window_fill = c.window_fill;
    visuals.faint_bg_color = c.faint_bg;
    visuals.override_text_color = Some(c.text_primary);

    visuals.widgets.noninteractive.bg_fill = c.widget_bg;
    visuals.widgets.noninteractive.bg_stroke = egui::Stroke::new(0.5, c.widget_bg_stroke);
    visuals.widgets.noninteractive.corner_radius = egui::CornerRadius::same(3);

    visuals.widgets.inactive.corner_radius = egui::CornerRadius::same(4);
    visuals.widgets.hovered.bg_stroke = egui::Stroke::new(1.0, c.widget_hovered_stroke);
    visuals.widgets.active.bg_fill = c.widget_active_bg;

    visuals.selection.bg_fill = c.selection_bg;
    visuals.selection.stroke = egui::Stroke::new(1.5, c.selection_stroke);

    ctx.set_visuals(visuals);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_toggle_and_palette() {
        assert_eq!(AppTheme::Light.next(), AppTheme::Dark);
        assert_eq!(AppTheme::Dark.next().next(), AppTheme::Dark);
        assert_eq!(AppTheme::Dark.palette(), ChartPalette::dark());
        assert!(ThemeColors::from_theme(AppTheme::Dark).is_dark);
    }
}
