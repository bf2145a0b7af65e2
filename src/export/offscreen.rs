/// Offscreen chart renderer — rasterizes a render configuration into an
/// RGB image and encodes it as PNG, for report pages.
use std::io::Cursor;

use egui::Color32;
use image::{Rgb, RgbImage};

use super::RenderError;
use crate::chart::annotation::{format_label, AllVisible};
use crate::chart::chromatogram::{self, DrawArea, GrayCanvas, GrayRect};
use crate::chart::dataset::{Dataset, DatasetKind, MarkerShape, Point};
use crate::chart::view::RenderConfiguration;

const MARGIN_LEFT: u32 = 56;
const MARGIN_TOP: u32 = 40;
const MARGIN_BOTTOM: u32 = 28;
const MARGIN_RIGHT: u32 = 12;
const GRID_LINES: u32 = 5;
const MARKER_RADIUS: i32 = 3;
/// Headroom above the tallest point for annotation labels
const Y_HEADROOM: f64 = 1.1;

/// Pixel layout of one chart on the surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl Layout {
    fn compute(surface_w: u32, surface_h: u32, gutter: f32) -> Result<Self, RenderError> {
        let right = MARGIN_RIGHT.saturating_add(gutter.ceil().max(0.0) as u32);
        let width = surface_w.saturating_sub(MARGIN_LEFT.saturating_add(right));
        let height = surface_h.saturating_sub(MARGIN_TOP + MARGIN_BOTTOM);
        if width < 10 || height < 10 {
            return Err(RenderError::failed(format!(
                "surface {}x{} leaves no room for the plot",
                surface_w, surface_h
            )));
        }
        Ok(Self {
            left: MARGIN_LEFT,
            top: MARGIN_TOP,
            width,
            height,
        })
    }

    fn right(&self) -> u32 {
        self.left + self.width
    }

    fn bottom(&self) -> u32 {
        self.top + self.height
    }
}

/// Data extent mapped onto the layout
#[derive(Debug, Clone, Copy)]
struct Viewport {
    layout: Layout,
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
}

impl Viewport {
    /// Full data extent, the same view the interactive chart opens with
    fn fit(layout: Layout, config: &RenderConfiguration) -> Self {
        let points = config.datasets.iter().flat_map(|d| d.points.iter());
        let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut y_min, mut y_max) = (0.0f64, 0.0f64);
        for p in points.filter(|p| p.x.is_finite() && p.y.is_finite()) {
            x_min = x_min.min(p.x);
            x_max = x_max.max(p.x);
            y_min = y_min.min(p.y);
            y_max = y_max.max(p.y);
        }
        if !x_min.is_finite() {
            (x_min, x_max) = (0.0, 1.0);
        } else if x_max - x_min <= f64::EPSILON {
            x_min -= 0.5;
            x_max += 0.5;
        }
        y_max *= Y_HEADROOM;
        if y_max - y_min <= f64::EPSILON {
            y_max = y_min + 1.0;
        }
        Self { layout, x_min, x_max, y_min, y_max }
    }

    fn px_x(&self, x: f64) -> f64 {
        self.layout.left as f64 + (x - self.x_min) / (self.x_max - self.x_min) * self.layout.width as f64
    }

    fn px_y(&self, y: f64) -> f64 {
        let frac = 1.0 - (y - self.y_min) / (self.y_max - self.y_min);
        self.layout.top as f64 + frac.clamp(0.0, 1.0) * self.layout.height as f64
    }

    fn to_px(&self, p: Point) -> (i32, i32) {
        (self.px_x(p.x).round() as i32, self.px_y(p.y).round() as i32)
    }

    fn data_x(&self, px: f64) -> f64 {
        self.x_min + (px - self.layout.left as f64) / self.layout.width as f64 * (self.x_max - self.x_min)
    }
}

fn rgb(c: Color32) -> Rgb<u8> {
    Rgb([c.r(), c.g(), c.b()])
}

/// Reusable raster surface. `render` needs `&mut self`, so charts share a
/// surface strictly one after another.
pub struct OffscreenSurface {
    img: RgbImage,
}

impl OffscreenSurface {
    pub fn new(width: u32, height: u32) -> Result<Self, RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::failed(format!(
                "invalid surface size {}x{}",
                width, height
            )));
        }
        Ok(Self {
            img: RgbImage::new(width, height),
        })
    }

    /// Clear, draw `config` and return the PNG bytes
    pub fn render(&mut self, config: &RenderConfiguration) -> Result<Vec<u8>, RenderError> {
        self.draw(config)?;
        self.encode_png()
    }

    /// Clear and draw `config` without encoding
    pub fn draw(&mut self, config: &RenderConfiguration) -> Result<(), RenderError> {
        let (w, h) = self.img.dimensions();
        let layout = Layout::compute(w, h, config.reserved_right_padding())?;
        let view = Viewport::fit(layout, config);
        let palette = config.palette;

        // Light text means a dark theme
        let text = palette.text;
        let dark = (text.r() as u32 + text.g() as u32 + text.b() as u32) > 3 * 128;
        let background = if dark { Rgb([0x1E, 0x1E, 0x1E]) } else { Rgb([255, 255, 255]) };
        for px in self.img.pixels_mut() {
            *px = background;
        }

        self.draw_axes(&view, &config.y_title, rgb(palette.grid), rgb(text));
        self.draw_legend(config, rgb(text));

        for dataset in &config.datasets {
            let color = palette.role(dataset.color).line;
            match dataset.kind {
                DatasetKind::Line => self.draw_polyline(&view, &dataset.points, rgb(color)),
                DatasetKind::Point { shape } => {
                    for &p in &dataset.points {
                        let (x, y) = view.to_px(p);
                        self.draw_marker(x, y, shape, rgb(color));
                    }
                }
                DatasetKind::Filled => self.draw_fill(&view, dataset, rgb(color)),
            }
        }

        // Nothing to toggle offscreen: every annotation is drawn
        for line in config.annotations.iter().filter(|l| l.visible(&AllVisible)) {
            let color = rgb(palette.role(line.color).line);
            let (x, y0) = view.to_px(Point::new(line.x, 0.0));
            let (_, y1) = view.to_px(Point::new(line.x, line.y_max));
            draw_line(&mut self.img, x, y0, x, y1, color);
            let label_w = text_width(&line.label, 1) as i32;
            draw_text(
                &mut self.img,
                &line.label,
                (x - label_w / 2).max(0) as u32,
                (y1 - 8).max(0) as u32,
                rgb(text),
                1,
            );
        }

        let area = DrawArea {
            top: layout.top as f32,
            height: layout.height as f32,
            right: layout.right() as f32,
        };
        let mut canvas = ImageCanvas { img: &mut self.img };
        chromatogram::paint(&mut canvas, area, &config.chromatogram, config.gutter);

        Ok(())
    }

    pub fn encode_png(&self) -> Result<Vec<u8>, RenderError> {
        let mut bytes = Vec::new();
        self.img
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .map_err(|e| RenderError::failed(e.to_string()))?;
        Ok(bytes)
    }

    fn draw_axes(&mut self, view: &Viewport, y_title: &str, grid: Rgb<u8>, text: Rgb<u8>) {
        let l = view.layout;
        let (w, h) = self.img.dimensions();

        for gi in 0..=GRID_LINES {
            // Horizontal grid + y tick label
            let gy = l.top + l.height * gi / GRID_LINES;
            for x in l.left..=l.right() {
                if x < w && gy < h {
                    self.img.put_pixel(x, gy, grid);
                }
            }
            let value = view.y_max - (view.y_max - view.y_min) * gi as f64 / GRID_LINES as f64;
            let label = format_label(value);
            let label_w = text_width(&label, 1);
            draw_text(&mut self.img, &label, l.left.saturating_sub(label_w + 4), gy.saturating_sub(2), text, 1);

            // Vertical grid + x tick label
            let gx = l.left + l.width * gi / GRID_LINES;
            for y in l.top..=l.bottom() {
                if gx < w && y < h {
                    self.img.put_pixel(gx, y, grid);
                }
            }
            let label = format!("{:.0}", view.data_x(gx as f64));
            let label_w = text_width(&label, 1);
            draw_text(&mut self.img, &label, gx.saturating_sub(label_w / 2), l.bottom() + 6, text, 1);
        }

        // Frame
        for x in l.left..=l.right() {
            for y in [l.top, l.bottom()] {
                if x < w && y < h {
                    self.img.put_pixel(x, y, text);
                }
            }
        }
        for y in l.top..=l.bottom() {
            for x in [l.left, l.right()] {
                if x < w && y < h {
                    self.img.put_pixel(x, y, text);
                }
            }
        }

        draw_text(&mut self.img, y_title, 4, 4, text, 2);
    }

    fn draw_legend(&mut self, config: &RenderConfiguration, text: Rgb<u8>) {
        let mut x = MARGIN_LEFT;
        let y = 22;
        for dataset in &config.datasets {
            let color = rgb(config.palette.role(dataset.color).line);
            for sy in 0..6 {
                for sx in 0..6 {
                    if x + sx < self.img.width() && y + sy < self.img.height() {
                        self.img.put_pixel(x + sx, y + sy, color);
                    }
                }
            }
            draw_text(&mut self.img, &dataset.title, x + 9, y, text, 1);
            x += 9 + text_width(&dataset.title, 1) + 12;
        }
    }

    fn draw_polyline(&mut self, view: &Viewport, points: &[Point], color: Rgb<u8>) {
        let mut prev: Option<(i32, i32)> = None;
        for &p in points {
            if !p.x.is_finite() || !p.y.is_finite() {
                prev = None;
                continue;
            }
            let (x, y) = view.to_px(p);
            if let Some((px, py)) = prev {
                draw_line(&mut self.img, px, py, x, y, color);
            }
            prev = Some((x, y));
        }
    }

    fn draw_marker(&mut self, x: i32, y: i32, shape: MarkerShape, color: Rgb<u8>) {
        let r = MARKER_RADIUS;
        match shape {
            MarkerShape::Circle => {
                for dy in -r..=r {
                    for dx in -r..=r {
                        if dx * dx + dy * dy <= r * r {
                            put(&mut self.img, x + dx, y + dy, color);
                        }
                    }
                }
            }
            MarkerShape::Cross => {
                draw_line(&mut self.img, x - r, y, x + r, y, color);
                draw_line(&mut self.img, x, y - r, x, y + r, color);
            }
            MarkerShape::CrossRot => {
                draw_line(&mut self.img, x - r, y - r, x + r, y + r, color);
                draw_line(&mut self.img, x - r, y + r, x + r, y - r, color);
            }
        }
    }

    /// Half-transparent area between the curve and y = 0, one pass per
    /// pixel column so overlapping segments never darken twice
    fn draw_fill(&mut self, view: &Viewport, dataset: &Dataset, color: Rgb<u8>) {
        let pts: Vec<Point> = dataset
            .points
            .iter()
            .copied()
            .filter(|p| p.x.is_finite() && p.y.is_finite())
            .collect();
        let (Some(first), Some(last)) = (pts.first(), pts.last()) else {
            return;
        };
        let base = view.px_y(0.0).round() as i32;
        let l = view.layout;

        for col in l.left..=l.right() {
            let x = view.data_x(col as f64);
            if x < first.x || x > last.x {
                continue;
            }
            let i = pts.partition_point(|p| p.x < x);
            let y = match (i.checked_sub(1).and_then(|j| pts.get(j)), pts.get(i)) {
                (Some(a), Some(b)) if b.x > a.x => a.y + (b.y - a.y) * (x - a.x) / (b.x - a.x),
                (_, Some(b)) => b.y,
                (Some(a), None) => a.y,
                (None, None) => continue,
            };
            let top = view.px_y(y).round() as i32;
            for row in top.min(base)..=top.max(base) {
                blend(&mut self.img, col as i32, row, color);
            }
        }
    }
}

/// Surface adapter for the chromatogram gutter
struct ImageCanvas<'a> {
    img: &'a mut RgbImage,
}

impl GrayCanvas for ImageCanvas<'_> {
    fn fill_gray(&mut self, rect: GrayRect, level: u8) {
        let x0 = rect.left.round() as i32;
        let x1 = (rect.left + rect.width).round() as i32;
        let y0 = rect.top.round() as i32;
        let y1 = (rect.top + rect.height).round() as i32;
        for y in y0..y1 {
            for x in x0..x1 {
                put(self.img, x, y, Rgb([level, level, level]));
            }
        }
    }
}

fn put(img: &mut RgbImage, x: i32, y: i32, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
        img.put_pixel(x as u32, y as u32, color);
    }
}

/// 50% blend of `color` over the existing pixel
fn blend(img: &mut RgbImage, x: i32, y: i32, color: Rgb<u8>) {
    if x < 0 || y < 0 || x as u32 >= img.width() || y as u32 >= img.height() {
        return;
    }
    let dst = img.get_pixel_mut(x as u32, y as u32);
    for c in 0..3 {
        dst.0[c] = ((dst.0[c] as u16 + color.0[c] as u16) / 2) as u8;
    }
}

/// Bresenham line, clipped to the image
fn draw_line(img: &mut RgbImage, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgb<u8>) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx: i32 = if x0 < x1 { 1 } else { -1 };
    let sy: i32 = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let (mut cx, mut cy) = (x0, y0);
    loop {
        put(img, cx, cy, color);
        if cx == x1 && cy == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            cx += sx;
        }
        if e2 <= dx {
            err += dx;
            cy += sy;
        }
    }
}

/// Pixel width of `text` in the 3×5 font
pub fn text_width(text: &str, scale: u32) -> u32 {
    text.chars().count() as u32 * 4 * scale.max(1)
}

fn glyph(c: char) -> [u8; 5] {
    // Superscript digits and the multiplication sign fold onto ASCII
    let c = match c {
        '⁰' => '0',
        '¹' => '1',
        '²' => '2',
        '³' => '3',
        '⁴' => '4',
        '⁵' => '5',
        '⁶' => '6',
        '⁷' => '7',
        '⁸' => '8',
        '⁹' => '9',
        '×' => 'x',
        other => other.to_ascii_uppercase(),
    };
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b010, 0b010, 0b010],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        '(' => [0b010, 0b100, 0b100, 0b100, 0b010],
        ')' => [0b010, 0b001, 0b001, 0b001, 0b010],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '_' => [0b000, 0b000, 0b000, 0b000, 0b111],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        'x' => [0b000, 0b101, 0b010, 0b101, 0b000],
        'A' => [0b010, 0b101, 0b111, 0b101, 0b101],
        'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'C' => [0b011, 0b100, 0b100, 0b100, 0b011],
        'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'E' => [0b111, 0b100, 0b110, 0b100, 0b111],
        'F' => [0b111, 0b100, 0b110, 0b100, 0b100],
        'G' => [0b011, 0b100, 0b101, 0b101, 0b011],
        'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'J' => [0b001, 0b001, 0b001, 0b101, 0b010],
        'K' => [0b101, 0b110, 0b100, 0b110, 0b101],
        'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'M' => [0b101, 0b111, 0b111, 0b101, 0b101],
        'N' => [0b110, 0b101, 0b101, 0b101, 0b101],
        'O' => [0b010, 0b101, 0b101, 0b101, 0b010],
        'P' => [0b110, 0b101, 0b110, 0b100, 0b100],
        'Q' => [0b010, 0b101, 0b101, 0b110, 0b011],
        'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        'S' => [0b011, 0b100, 0b010, 0b001, 0b110],
        'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'V' => [0b101, 0b101, 0b101, 0b101, 0b010],
        'W' => [0b101, 0b101, 0b111, 0b111, 0b101],
        'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'Y' => [0b101, 0b101, 0b010, 0b010, 0b010],
        'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        _ => [0b000, 0b000, 0b010, 0b000, 0b000],
    }
}

/// Built-in 3×5 bitmap font, `scale` pixels per font pixel
fn draw_text(img: &mut RgbImage, text: &str, x: u32, y: u32, color: Rgb<u8>, scale: u32) {
    let scale = scale.max(1);
    let mut cx = x;
    for ch in text.chars() {
        for (row, &bits) in glyph(ch).iter().enumerate() {
            for col in 0..3u32 {
                if (bits >> (2 - col)) & 1 == 0 {
                    continue;
                }
                for sy in 0..scale {
                    for sx in 0..scale {
                        let px = cx + col * scale + sx;
                        let py = y + row as u32 * scale + sy;
                        if px < img.width() && py < img.height() {
                            img.put_pixel(px, py, color);
                        }
                    }
                }
            }
        }
        cx += 4 * scale;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::dataset::ColorRole;
    use crate::chart::palette::ChartPalette;
    use crate::chart::view::{derive_configuration, ChartSettings, RenderMode};

    fn config(datasets: Vec<Dataset>) -> RenderConfiguration {
        derive_configuration(
            datasets,
            &ChartPalette::light(),
            &ChartSettings::default(),
            RenderMode::Offscreen,
            None,
        )
        .unwrap()
    }

    fn trace() -> Dataset {
        Dataset::line(
            "Intensity",
            ColorRole::Primary,
            vec![Point::new(0.0, 1.0), Point::new(1.0, 3.0), Point::new(2.0, 6.0), Point::new(3.0, 8.0)],
        )
        .with_chromatogram()
    }

    #[test]
    fn test_oversized_gutter_leaves_no_plot() {
        assert!(matches!(
            Layout::compute(800, 480, u32::MAX as f32),
            Err(RenderError::ImageRenderFailed { .. })
        ));
        assert!(Layout::compute(800, 480, f32::INFINITY).is_err());
    }

    #[test]
    fn test_invalid_surface() {
        assert!(matches!(
            OffscreenSurface::new(0, 100),
            Err(RenderError::ImageRenderFailed { .. })
        ));
        let mut tiny = OffscreenSurface::new(40, 40).unwrap();
        assert!(matches!(
            tiny.render(&config(vec![trace()])),
            Err(RenderError::ImageRenderFailed { .. })
        ));
    }

    #[test]
    fn test_render_produces_png() {
        let mut surface = OffscreenSurface::new(320, 200).unwrap();
        let png = surface.render(&config(vec![trace()])).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
        let decoded = image::load_from_memory(&png).unwrap().to_rgb8();
        assert_eq!(decoded.dimensions(), (320, 200));
        assert_eq!(&decoded, &surface.img);
    }

    #[test]
    fn test_empty_configuration_renders_blank_chart() {
        let mut surface = OffscreenSurface::new(200, 120).unwrap();
        surface.render(&config(Vec::new())).unwrap();
        // Gutter area stays background without a chromatogram
        let img = &surface.img;
        assert_eq!(*img.get_pixel(195, 60), Rgb([255, 255, 255]));
    }

    #[test]
    fn test_gutter_rows_bottom_to_top() {
        let mut cfg = config(vec![trace()]);
        cfg.chromatogram = vec![0.0, 1.0];
        let mut surface = OffscreenSurface::new(200, 120).unwrap();
        surface.draw(&cfg).unwrap();

        let layout = Layout::compute(200, 120, cfg.reserved_right_padding()).unwrap();
        let gx = layout.right() + 5 + 20;
        let img = &surface.img;
        assert_eq!(*img.get_pixel(gx, layout.bottom() - 1), Rgb([0, 0, 0]));
        assert_eq!(*img.get_pixel(gx, layout.top + 1), Rgb([245, 245, 245]));
    }

    #[test]
    fn test_sequential_renders_are_independent() {
        let first = config(vec![trace()]);
        let second = config(vec![Dataset::line(
            "Other",
            ColorRole::Secondary,
            vec![Point::new(0.0, 5.0), Point::new(10.0, 0.0)],
        )]);
        let mut surface = OffscreenSurface::new(300, 180).unwrap();
        let a = surface.render(&first).unwrap();
        surface.render(&second).unwrap();
        let again = surface.render(&first).unwrap();
        assert_eq!(a, again);
    }

    #[test]
    fn test_annotation_line_is_drawn() {
        let peaks = Dataset::points(
            "Peaks",
            ColorRole::Secondary,
            MarkerShape::CrossRot,
            vec![Point::new(2.0, 6.0)],
        )
        .with_labels(vec![35.0]);
        let cfg = config(vec![trace(), peaks]);
        let mut surface = OffscreenSurface::new(320, 200).unwrap();
        surface.draw(&cfg).unwrap();

        let layout = Layout::compute(320, 200, cfg.reserved_right_padding()).unwrap();
        let view = Viewport::fit(layout, &cfg);
        let (x, _) = view.to_px(Point::new(2.0, 0.0));
        let (_, y_peak) = view.to_px(Point::new(2.0, 6.0));
        let (_, y_base) = view.to_px(Point::new(2.0, 0.0));
        let red = rgb(ChartPalette::light().secondary.line);
        let mid = (y_peak + y_base) / 2;
        assert_eq!(*surface.img.get_pixel(x as u32, mid as u32), red);
    }

    #[test]
    fn test_glyph_folding() {
        assert_eq!(glyph('⁶'), glyph('6'));
        assert_eq!(glyph('a'), glyph('A'));
        assert_ne!(glyph('×'), glyph('?'));
        assert_eq!(text_width("Intensity × 10⁶", 2), 15 * 8);
    }
}
