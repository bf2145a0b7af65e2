/// Gel-lane chromatogram strip: per-sample intensity normalization and the
/// gutter paint routine shared by the interactive and offscreen renderers.
use super::dataset::Point;

/// Normalized intensity per sample, each in `[0, 1]`.
///
/// Sample `i` is weighed against a window of depth `i + 1`:
/// `round(y / max * (i + 1)) / (i + 1)`. Early samples therefore quantize
/// coarsely and saturate fast, later ones approach `y / max`. An all-zero
/// trace yields all zeros.
pub fn normalize(points: &[Point]) -> Vec<f64> {
    if points.is_empty() {
        return Vec::new();
    }
    let max_value = points.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);
    if max_value == 0.0 || !max_value.is_finite() {
        return vec![0.0; points.len()];
    }

    points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let height = (i + 1) as f64;
            let fill_height = (p.y / max_value * height).round();
            let intensity = fill_height / height;
            // Negative excursions of a baseline-corrected trace read as empty
            if intensity.is_finite() {
                intensity.clamp(0.0, 1.0)
            } else {
                0.0
            }
        })
        .collect()
}

/// Plot frame the gutter is attached to, in surface pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawArea {
    pub top: f32,
    pub height: f32,
    /// Right edge of the plot frame
    pub right: f32,
}

/// Gutter geometry and the gray level painted for intensity 1.0
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GutterStyle {
    pub width: f32,
    pub gap: f32,
    pub max_gray: u8,
}

impl GutterStyle {
    /// Horizontal space the gutter needs to the right of the plot
    pub fn reserved(&self) -> f32 {
        self.gap + self.width
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrayRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

/// Anything that can fill an axis-aligned rectangle with a gray level
pub trait GrayCanvas {
    fn fill_gray(&mut self, rect: GrayRect, level: u8);
}

/// Channel value for one intensity
pub fn gray_level(intensity: f64, max_gray: u8) -> u8 {
    (intensity.clamp(0.0, 1.0) * max_gray as f64).round() as u8
}

/// Paint the strip: one row per sample, index 0 at the bottom of the
/// plot frame and the last sample at the top. Row placement depends only
/// on the frame's vertical extent, never on the horizontal view.
pub fn paint<C: GrayCanvas + ?Sized>(
    canvas: &mut C,
    area: DrawArea,
    intensity: &[f64],
    gutter: GutterStyle,
) {
    if intensity.is_empty() || area.height <= 0.0 {
        return;
    }
    let row_height = area.height / intensity.len() as f32;
    let left = area.right + gutter.gap;
    let bottom = area.top + area.height;

    for (i, &value) in intensity.iter().enumerate() {
        let rect = GrayRect {
            left,
            top: bottom - (i + 1) as f32 * row_height,
            width: gutter.width,
            height: row_height,
        };
        canvas.fill_gray(rect, gray_level(value, gutter.max_gray));
    }
}
