/// Interactive chart widget — draws a derived render configuration with
/// egui_plot, plus the legend, peak annotations and chromatogram gutter.
use std::collections::HashSet;

use egui_plot::{Line, Plot, PlotBounds, PlotPoints, PlotUi, Points, Text};

use crate::chart::annotation::DatasetVisibility;
use crate::chart::chromatogram::{self, DrawArea, GrayCanvas, GrayRect};
use crate::chart::dataset::{DatasetKind, MarkerShape, Point};
use crate::chart::view::RenderConfiguration;

/// Per-chart UI state that survives re-derivation
#[derive(Debug, Clone, Default)]
pub struct ChartViewState {
    /// Dataset indices switched off in the legend
    pub hidden: HashSet<usize>,
    /// Incremented to give the plot a fresh ID (resets zoom)
    pub plot_generation: u32,
    /// Screen x where a zoom drag started
    drag_start: Option<egui::Pos2>,
    /// X range picked by a finished zoom drag, applied next frame
    pending_x_range: Option<(f64, f64)>,
}

impl ChartViewState {
    pub fn reset_zoom(&mut self) {
        self.plot_generation = self.plot_generation.wrapping_add(1);
        self.drag_start = None;
        self.pending_x_range = None;
    }

    pub fn toggle(&mut self, index: usize) {
        if !self.hidden.remove(&index) {
            self.hidden.insert(index);
        }
    }
}

impl DatasetVisibility for ChartViewState {
    fn is_dataset_visible(&self, index: usize) -> bool {
        !self.hidden.contains(&index)
    }
}

/// Paints gutter rows straight onto the UI painter
struct PainterCanvas<'a> {
    painter: &'a egui::Painter,
}

impl GrayCanvas for PainterCanvas<'_> {
    fn fill_gray(&mut self, rect: GrayRect, level: u8) {
        let r = egui::Rect::from_min_size(
            egui::pos2(rect.left, rect.top),
            egui::vec2(rect.width, rect.height),
        );
        self.painter.rect_filled(r, 0.0, egui::Color32::from_gray(level));
    }
}

fn plot_marker(shape: MarkerShape) -> egui_plot::MarkerShape {
    match shape {
        MarkerShape::Circle => egui_plot::MarkerShape::Circle,
        MarkerShape::Cross => egui_plot::MarkerShape::Plus,
        MarkerShape::CrossRot => egui_plot::MarkerShape::Cross,
    }
}

fn plot_points(points: &[Point]) -> PlotPoints {
    points.iter().map(|p| [p.x, p.y]).collect()
}

/// X range selected by a drag, or `None` when the drag was too short.
/// `a`/`b` are (screen x, plot x) of the drag start and end.
pub fn drag_zoom_range(a: (f32, f64), b: (f32, f64), threshold: f32) -> Option<(f64, f64)> {
    if (b.0 - a.0).abs() < threshold || a.1 == b.1 {
        return None;
    }
    Some((a.1.min(b.1), a.1.max(b.1)))
}

/// Show one chart. `id` must be unique per chart slot.
pub fn show_chart(
    ui: &mut egui::Ui,
    id: &str,
    config: &RenderConfiguration,
    state: &mut ChartViewState,
) {
    if config.is_empty() {
        ui.centered_and_justified(|ui| {
            ui.heading("No data to plot");
        });
        return;
    }

    let palette = config.palette;

    // Legend: toggling hides the dataset and its annotation lines
    ui.horizontal_wrapped(|ui| {
        for (index, dataset) in config.datasets.iter().enumerate() {
            let color = palette.role(dataset.color).line;
            let mut shown = state.is_dataset_visible(index);
            let text = egui::RichText::new(&dataset.title).color(color);
            if ui.checkbox(&mut shown, text).changed() {
                state.toggle(index);
            }
        }
        if config.zoom_enabled {
            ui.separator();
            if ui.button("⊞ Reset zoom").clicked() {
                state.reset_zoom();
            }
        }
    });

    let interaction = config.interaction;
    let ctrl_held = ui.input(|i| i.modifiers.ctrl);
    let panning = interaction.ctrl_pan && ctrl_held;
    let gutter = config.reserved_right_padding();

    let plot = Plot::new(format!("{}_{}", id, state.plot_generation))
        .width((ui.available_width() - gutter).max(50.0))
        .height((ui.available_height() - 4.0).max(50.0))
        .y_axis_label(config.y_title.clone())
        .include_y(0.0)
        .allow_zoom([config.zoom_enabled && interaction.pinch_zoom, false])
        .allow_drag([panning, false])
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .allow_double_click_reset(interaction.double_click_reset);

    let pending = state.pending_x_range.take();
    let visibility: &ChartViewState = &*state;

    let plot_resp = plot.show(ui, |plot_ui: &mut PlotUi| {
        if let Some((lo, hi)) = pending {
            let bounds = plot_ui.plot_bounds();
            plot_ui.set_plot_bounds(PlotBounds::from_min_max(
                [lo, bounds.min()[1]],
                [hi, bounds.max()[1]],
            ));
        }

        for (index, dataset) in config.datasets.iter().enumerate() {
            if !visibility.is_dataset_visible(index) {
                continue;
            }
            let colors = palette.role(dataset.color);
            match dataset.kind {
                DatasetKind::Line => {
                    plot_ui.line(
                        Line::new(plot_points(&dataset.points))
                            .name(&dataset.title)
                            .color(colors.line)
                            .width(1.2),
                    );
                }
                DatasetKind::Point { shape } => {
                    plot_ui.points(
                        Points::new(plot_points(&dataset.points))
                            .name(&dataset.title)
                            .color(colors.line)
                            .shape(plot_marker(shape))
                            .radius(4.0),
                    );
                }
                DatasetKind::Filled => {
                    plot_ui.line(
                        Line::new(plot_points(&dataset.points))
                            .name(&dataset.title)
                            .color(colors.background)
                            .fill(0.0)
                            .width(0.0),
                    );
                }
            }
        }

        // ── Peak annotations ──
        for line in &config.annotations {
            if !line.visible(visibility) {
                continue;
            }
            let color = palette.role(line.color).line;
            plot_ui.line(
                Line::new(PlotPoints::from(vec![[line.x, 0.0], [line.x, line.y_max]]))
                    .color(color)
                    .width(1.0),
            );
            plot_ui.text(
                Text::new(
                    [line.x, line.y_max].into(),
                    egui::RichText::new(&line.label).size(10.0).color(palette.text),
                )
                .anchor(egui::Align2::CENTER_BOTTOM),
            );
        }
    });

    // ── Drag-to-zoom on the x axis ──
    let response = &plot_resp.response;
    if config.zoom_enabled && interaction.drag_zoom && !panning {
        if response.drag_started_by(egui::PointerButton::Primary) {
            state.drag_start = response.interact_pointer_pos();
        }
        if let (true, Some(start), Some(now)) = (
            response.dragged(),
            state.drag_start,
            response.interact_pointer_pos(),
        ) {
            let frame = *plot_resp.transform.frame();
            let band = egui::Rect::from_x_y_ranges(
                start.x.min(now.x)..=start.x.max(now.x),
                frame.y_range(),
            );
            ui.painter().rect_filled(
                band,
                0.0,
                egui::Color32::from_rgba_unmultiplied(128, 128, 128, 40),
            );
        }
        if response.drag_stopped() {
            let end = response.interact_pointer_pos().or(response.hover_pos());
            if let (Some(start), Some(end)) = (state.drag_start.take(), end) {
                let a = plot_resp.transform.value_from_position(start).x;
                let b = plot_resp.transform.value_from_position(end).x;
                if let Some(range) = drag_zoom_range((start.x, a), (end.x, b), interaction.drag_threshold) {
                    log::debug!("Zoom to x range {:.1}..{:.1}", range.0, range.1);
                    state.pending_x_range = Some(range);
                    ui.ctx().request_repaint();
                }
            }
        }
    } else {
        state.drag_start = None;
    }

    // ── Chromatogram gutter, right of the plot frame ──
    if !config.chromatogram.is_empty() {
        let frame = *plot_resp.transform.frame();
        let area = DrawArea {
            top: frame.top(),
            height: frame.height(),
            right: frame.right(),
        };
        let mut canvas = PainterCanvas { painter: ui.painter() };
        chromatogram::paint(&mut canvas, area, &config.chromatogram, config.gutter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legend_toggle() {
        let mut state = ChartViewState::default();
        assert!(state.is_dataset_visible(2));
        state.toggle(2);
        assert!(!state.is_dataset_visible(2));
        assert!(state.is_dataset_visible(1));
        state.toggle(2);
        assert!(state.is_dataset_visible(2));
    }

    #[test]
    fn test_drag_threshold() {
        assert_eq!(drag_zoom_range((100.0, 10.0), (105.0, 12.0), 10.0), None);
        assert_eq!(
            drag_zoom_range((200.0, 40.0), (100.0, 20.0), 10.0),
            Some((20.0, 40.0))
        );
        assert_eq!(
            drag_zoom_range((100.0, 20.0), (110.0, 25.0), 10.0),
            Some((20.0, 25.0))
        );
    }

    #[test]
    fn test_reset_bumps_generation() {
        let mut state = ChartViewState::default();
        state.pending_x_range = Some((1.0, 2.0));
        state.reset_zoom();
        assert_eq!(state.plot_generation, 1);
        assert!(state.pending_x_range.is_none());
    }

    #[test]
    fn test_marker_mapping() {
        assert_eq!(plot_marker(MarkerShape::Cross), egui_plot::MarkerShape::Plus);
        assert_eq!(plot_marker(MarkerShape::CrossRot), egui_plot::MarkerShape::Cross);
    }
}
