/// Chart color tables. Resolved once per derivation and passed in
/// explicitly; nothing in the chart core reads the active theme itself.
use egui::Color32;

use super::dataset::ColorRole;

/// Stroke and fill color of one palette role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RoleColors {
    pub line: Color32,
    pub background: Color32,
}

impl RoleColors {
    const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self {
            line: Color32::from_rgb(r, g, b),
            // 50% alpha, premultiplied
            background: Color32::from_rgba_premultiplied(r / 2, g / 2, b / 2, 128),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChartPalette {
    pub text: Color32,
    pub grid: Color32,
    pub primary: RoleColors,
    pub secondary: RoleColors,
    pub tertiary: RoleColors,
}

impl ChartPalette {
    pub const fn light() -> Self {
        Self {
            text: Color32::from_rgb(0x33, 0x33, 0x33),
            grid: Color32::from_rgb(0xBB, 0xBB, 0xBB),
            primary: RoleColors::rgb(40, 53, 147),
            secondary: RoleColors::rgb(198, 40, 40),
            tertiary: RoleColors::rgb(0, 105, 92),
        }
    }

    pub const fn dark() -> Self {
        Self {
            text: Color32::from_rgb(0xFF, 0xFF, 0xFF),
            grid: Color32::from_rgb(0x44, 0x44, 0x44),
            primary: RoleColors::rgb(63, 81, 181),
            secondary: RoleColors::rgb(213, 0, 0),
            tertiary: RoleColors::rgb(0, 150, 136),
        }
    }

    pub fn role(&self, role: ColorRole) -> RoleColors {
        match role {
            ColorRole::Primary => self.primary,
            ColorRole::Secondary => self.secondary,
            ColorRole::Tertiary => self.tertiary,
        }
    }
}

impl Default for ChartPalette {
    fn default() -> Self {
        Self::light()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_lookup() {
        let p = ChartPalette::light();
        assert_eq!(p.role(ColorRole::Primary).line, Color32::from_rgb(40, 53, 147));
        assert_eq!(p.role(ColorRole::Tertiary).line, Color32::from_rgb(0, 105, 92));
        assert_eq!(p.role(ColorRole::Secondary).background.a(), 128);
    }

    #[test]
    fn test_themes_differ() {
        assert_ne!(ChartPalette::light(), ChartPalette::dark());
        assert_eq!(ChartPalette::default(), ChartPalette::light());
    }
}
