/// Main application state and eframe::App implementation
///
/// Ties together session loading, chart derivation, the interactive chart
/// host and report export.
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use eframe::egui;

use crate::chart::builder::ChartSource;
use crate::chart::palette::ChartPalette;
use crate::chart::view::{ChartSettings, ChartView, RenderConfiguration, RenderMode};
use crate::chart::ChartError;
use crate::data::records::{self, AnalysisSession};
use crate::export::report;
use crate::gui::chart_view::{self, ChartViewState};
use crate::gui::theme::{self, AppTheme, ThemeColors};
use crate::gui::toolbar::{self, ToolbarAction};

/// Which chart the user is viewing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum ChartTab {
    StandardRaw,
    StandardAnalyzed,
    Calibration,
    LibrariesRaw,
    LibraryAnalyzed,
}

impl ChartTab {
    const ALL: [ChartTab; 5] = [
        ChartTab::StandardRaw,
        ChartTab::StandardAnalyzed,
        ChartTab::Calibration,
        ChartTab::LibrariesRaw,
        ChartTab::LibraryAnalyzed,
    ];

    fn label(&self) -> &'static str {
        match self {
            ChartTab::StandardRaw => "📈 Standard (raw)",
            ChartTab::StandardAnalyzed => "🎯 Standard (analyzed)",
            ChartTab::Calibration => "📐 Calibration curve",
            ChartTab::LibrariesRaw => "📈 Libraries (raw)",
            ChartTab::LibraryAnalyzed => "🧬 Library (analyzed)",
        }
    }

    /// Plot id salt, stable per tab
    fn id(&self) -> &'static str {
        match self {
            ChartTab::StandardRaw => "standard_raw",
            ChartTab::StandardAnalyzed => "standard_analyzed",
            ChartTab::Calibration => "calibration",
            ChartTab::LibrariesRaw => "libraries_raw",
            ChartTab::LibraryAnalyzed => "library_analyzed",
        }
    }
}

/// The record a tab plots, if the session has it
fn chart_source(session: &AnalysisSession, tab: ChartTab, library: usize) -> Option<ChartSource<'_>> {
    let result = session.result.as_ref();
    match tab {
        ChartTab::StandardRaw => session.size_standard().map(ChartSource::StandardRaw),
        ChartTab::StandardAnalyzed => result.map(ChartSource::StandardAnalyzed),
        ChartTab::Calibration => result.map(ChartSource::CalibrationCurve),
        ChartTab::LibrariesRaw => {
            let libs = &session.input.gen_libs;
            (!libs.is_empty()).then_some(ChartSource::GenLibsRaw(libs.as_slice()))
        }
        ChartTab::LibraryAnalyzed => result
            .and_then(|r| r.genlib_data.get(library))
            .map(ChartSource::GenLibAnalyzed),
    }
}

/// Identifies one chart: the tab, plus the library for per-library tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct ChartKey {
    tab: ChartTab,
    library: usize,
}

impl ChartKey {
    fn new(tab: ChartTab, library: usize) -> Self {
        let library = match tab {
            ChartTab::LibraryAnalyzed => library,
            _ => 0,
        };
        Self { tab, library }
    }

    fn plot_id(&self) -> String {
        format!("{}_{}", self.tab.id(), self.library)
    }
}

/// Derive the configuration shown for `key`.
///
/// On failure the chart keeps its own last good configuration, if any;
/// a configuration of another chart is never returned.
fn displayed_configuration(
    views: &mut HashMap<ChartKey, ChartView>,
    key: ChartKey,
    source: ChartSource<'_>,
    palette: &ChartPalette,
    settings: &ChartSettings,
) -> (Option<Arc<RenderConfiguration>>, Option<ChartError>) {
    let view = views.entry(key).or_default();
    match view.configuration(source, palette, settings, RenderMode::Interactive) {
        Ok(config) => (Some(config), None),
        Err(e) => (view.current(), Some(e)),
    }
}

/// The main application
pub struct CeViewerApp {
    session: Option<AnalysisSession>,
    session_path: Option<PathBuf>,

    tab: ChartTab,
    /// Index into the analysed libraries
    selected_library: usize,

    /// Memoized derivation per chart
    chart_views: HashMap<ChartKey, ChartView>,
    /// Legend and zoom state per chart
    view_states: HashMap<ChartKey, ChartViewState>,

    settings: ChartSettings,

    status_message: String,
    show_about: bool,

    current_theme: AppTheme,
    theme_colors: ThemeColors,

    dropped_files: Vec<PathBuf>,
}

impl CeViewerApp {
    pub fn new(cc: &eframe::CreationContext<'_>, settings: ChartSettings) -> Self {
        let default_theme = AppTheme::Light;
        theme::apply_theme(&cc.egui_ctx, default_theme);

        // ── Typography: scale for monitor DPI ──
        let ppi = cc.egui_ctx.pixels_per_point();
        let base_size = if ppi > 1.5 { 14.0 } else { 13.0 };
        let mut style = (*cc.egui_ctx.style()).clone();
        style.text_styles.insert(
            egui::TextStyle::Body,
            egui::FontId::new(base_size, egui::FontFamily::Proportional),
        );
        style.text_styles.insert(
            egui::TextStyle::Button,
            egui::FontId::new(base_size, egui::FontFamily::Proportional),
        );
        style.text_styles.insert(
            egui::TextStyle::Heading,
            egui::FontId::new(base_size * 1.25, egui::FontFamily::Proportional),
        );
        style.spacing.item_spacing = egui::vec2(8.0, 5.0);
        style.spacing.button_padding = egui::vec2(8.0, 4.0);
        cc.egui_ctx.set_style(style);

        Self {
            session: None,
            session_path: None,
            tab: ChartTab::StandardRaw,
            selected_library: 0,
            chart_views: HashMap::new(),
            view_states: HashMap::new(),
            settings,
            status_message: "Ready — open an analysis session (JSON) to begin".to_string(),
            show_about: false,
            current_theme: default_theme,
            theme_colors: ThemeColors::from_theme(default_theme),
            dropped_files: Vec::new(),
        }
    }

    fn load_path(&mut self, path: PathBuf) {
        match records::load_session(&path) {
            Ok(session) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();
                self.status_message = if session.is_empty() {
                    format!("{} contains no traces", name)
                } else {
                    format!("Loaded {}", name)
                };

                // Open on the most processed chart available
                self.tab = ChartTab::ALL
                    .iter()
                    .rev()
                    .copied()
                    .find(|&t| chart_source(&session, t, 0).is_some())
                    .unwrap_or(ChartTab::StandardRaw);
                self.selected_library = 0;
                self.chart_views.clear();
                self.view_states.clear();
                self.session = Some(session);
                self.session_path = Some(path);
            }
            Err(e) => {
                log::error!("Failed to load {}: {}", path.display(), e);
                self.status_message = format!("Load failed: {}", e);
            }
        }
    }

    fn chart_key(&self) -> ChartKey {
        ChartKey::new(self.tab, self.selected_library)
    }

    fn export_report(&mut self) {
        let Some(result) = self.session.as_ref().and_then(|s| s.result.as_ref()) else {
            self.status_message = "No analysis result to export".to_string();
            return;
        };
        let Some(dir) = toolbar::report_folder_dialog() else {
            return;
        };
        let stem = report::report_file_stem(&chrono::Local::now());
        let outcome = report::render_report_images(result, &self.settings)
            .and_then(|images| images.save_to_dir(&dir, &stem));
        match outcome {
            Ok(paths) => {
                self.status_message = format!("Exported {} report image(s) to {}", paths.len(), dir.display());
            }
            Err(e) => {
                log::error!("Report export failed: {}", e);
                self.status_message = format!("Report export failed: {}", e);
            }
        }
    }

    fn handle_toolbar_action(&mut self, action: ToolbarAction) {
        match action {
            ToolbarAction::OpenSession => {
                if let Some(path) = toolbar::open_session_dialog() {
                    self.load_path(path);
                }
            }
            ToolbarAction::ExportReport => self.export_report(),
            ToolbarAction::ZoomReset => {
                self.view_states.entry(self.chart_key()).or_default().reset_zoom();
                self.status_message = "Zoom reset".to_string();
            }
            ToolbarAction::ThemeToggle => {
                // Applied on the next frame; the palette change re-derives the chart
                self.current_theme = self.current_theme.next();
                self.theme_colors = ThemeColors::from_theme(self.current_theme);
            }
            ToolbarAction::ShowAbout => {
                self.show_about = true;
            }
            ToolbarAction::None => {}
        }
    }

    fn show_tabs(&mut self, ui: &mut egui::Ui) {
        let tc = &self.theme_colors;
        let (active_bg, active_text) = (tc.tab_active_bg, tc.tab_active_text);
        let (inactive_bg, inactive_text) = (tc.tab_inactive_bg, tc.tab_inactive_text);
        let Some(session) = &self.session else {
            return;
        };

        ui.horizontal(|ui| {
            ui.add_space(4.0);
            for tab in ChartTab::ALL {
                if chart_source(session, tab, self.selected_library).is_none() {
                    continue;
                }
                let active = self.tab == tab;
                let label = egui::RichText::new(tab.label())
                    .size(13.0)
                    .color(if active { active_text } else { inactive_text });
                let button = egui::Button::new(label)
                    .fill(if active { active_bg } else { inactive_bg })
                    .corner_radius(6.0);
                if ui.add(button).clicked() {
                    self.tab = tab;
                }
                ui.add_space(4.0);
            }

            if self.tab == ChartTab::LibraryAnalyzed {
                if let Some(result) = &session.result {
                    ui.separator();
                    let current = result
                        .genlib_data
                        .get(self.selected_library)
                        .map(|l| l.title.as_str())
                        .unwrap_or("—");
                    egui::ComboBox::from_label("Library")
                        .selected_text(current)
                        .show_ui(ui, |ui| {
                            for (i, lib) in result.genlib_data.iter().enumerate() {
                                ui.selectable_value(&mut self.selected_library, i, &lib.title);
                            }
                        });
                }
            }
        });
    }
}

impl eframe::App for CeViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        theme::apply_theme(ctx, self.current_theme);

        // Handle drag-and-drop
        ctx.input(|i| {
            for file in &i.raw.dropped_files {
                if let Some(path) = &file.path {
                    self.dropped_files.push(path.clone());
                }
            }
        });
        if let Some(path) = self.dropped_files.pop() {
            self.dropped_files.clear();
            self.load_path(path);
        }

        // ── Toolbar ──
        let can_export = self
            .session
            .as_ref()
            .is_some_and(|s| s.result.is_some());
        let action = toolbar::show_toolbar(ctx, self.current_theme.label(), can_export);
        if action != ToolbarAction::None {
            self.handle_toolbar_action(action);
        }

        // ── Status Bar ──
        let tc = &self.theme_colors;
        let (sb_bg, sb_text, sb_muted) = (tc.status_bar_bg, tc.text_primary, tc.text_muted);
        let summary = self.session.as_ref().map(|s| {
            format!(
                "{} standard(s) · {} library trace(s) · {} analysed",
                s.input.size_standards.len(),
                s.input.gen_libs.len(),
                s.result.as_ref().map_or(0, |r| r.genlib_data.len()),
            )
        });
        egui::TopBottomPanel::bottom("status_bar")
            .frame(egui::Frame::new().fill(sb_bg).inner_margin(egui::Margin::symmetric(12, 4)))
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new(&self.status_message).size(11.5).color(sb_text));
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if let Some(summary) = &summary {
                            ui.label(egui::RichText::new(summary).size(11.0).color(sb_muted));
                        }
                        if let Some(path) = &self.session_path {
                            ui.separator();
                            ui.label(egui::RichText::new(path.display().to_string()).size(11.0).color(sb_muted));
                        }
                    });
                });
            });

        // ── Central Panel: chart tabs ──
        egui::CentralPanel::default().show(ctx, |ui| {
            self.show_tabs(ui);
            ui.separator();

            let Some(session) = &self.session else {
                ui.centered_and_justified(|ui| {
                    ui.heading("Open an analysis session (File → Open Session…) or drop a JSON file here");
                });
                return;
            };
            let Some(source) = chart_source(session, self.tab, self.selected_library) else {
                ui.centered_and_justified(|ui| {
                    ui.heading("Nothing to plot for this view");
                });
                return;
            };

            let key = ChartKey::new(self.tab, self.selected_library);
            let palette = self.current_theme.palette();
            let (config, error) =
                displayed_configuration(&mut self.chart_views, key, source, &palette, &self.settings);
            if let Some(e) = error {
                self.status_message = format!("Chart error: {}", e);
            }
            match config {
                Some(config) => {
                    let state = self.view_states.entry(key).or_default();
                    chart_view::show_chart(ui, &key.plot_id(), &config, state);
                }
                None => {
                    ui.centered_and_justified(|ui| {
                        ui.heading("This chart could not be drawn, see the status bar");
                    });
                }
            }
        });

        // ── About Dialog ──
        if self.show_about {
            egui::Window::new("About")
                .open(&mut self.show_about)
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.heading("🧬 CE Trace Viewer");
                    ui.label(format!("Version {}", env!("CARGO_PKG_VERSION")));
                    ui.add_space(10.0);
                    ui.label("Built with Rust + egui");
                    ui.add_space(10.0);
                    ui.label("• Size standard and genomic library traces");
                    ui.label("• Gel-lane chromatogram strip");
                    ui.label("• Labelled peak markers with legend toggling");
                    ui.label("• Drag to zoom, Ctrl+drag to pan, double-click to reset");
                    ui.label("• Report image export");
                });
        }

        // Keyboard shortcuts
        let open = ctx.input(|i| (i.modifiers.ctrl || i.modifiers.command) && i.key_pressed(egui::Key::O));
        if open {
            if let Some(path) = toolbar::open_session_dialog() {
                self.load_path(path);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::records::{AnalyzeResult, AnalyzeResultData, GenLib, SizeStandard};

    fn analyzed_session() -> AnalysisSession {
        let good = AnalyzeResultData {
            title: "good".into(),
            t_main: vec![0.0, 1.0, 2.0],
            denoised_data: vec![1e6, 4e6, 2e6],
            lib_length: vec![1.0],
            lib_peak_locations: vec![1.0],
            hpx: vec![150.0],
            ..Default::default()
        };
        let bad = AnalyzeResultData {
            title: "bad".into(),
            t_main: vec![0.0, 1.0, 2.0],
            denoised_data: vec![1e6, 4e6, 2e6],
            lib_length: vec![1.0, 2.0],
            lib_peak_locations: vec![1.0, 2.0],
            hpx: vec![100.0],
            ..Default::default()
        };
        AnalysisSession {
            result: Some(AnalyzeResult {
                zr_ref: vec![1e6, 2e6, 5e6, 3e6],
                peak: vec![2.0],
                sizes: vec![35.0],
                genlib_data: vec![good, bad],
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn show(
        session: &AnalysisSession,
        views: &mut HashMap<ChartKey, ChartView>,
        tab: ChartTab,
        library: usize,
    ) -> (Option<Arc<RenderConfiguration>>, Option<ChartError>) {
        let source = chart_source(session, tab, library).unwrap();
        displayed_configuration(
            views,
            ChartKey::new(tab, library),
            source,
            &ChartPalette::light(),
            &ChartSettings::default(),
        )
    }

    #[test]
    fn test_failed_chart_never_shows_another_chart() {
        let session = analyzed_session();
        let mut views = HashMap::new();

        let (standard, error) = show(&session, &mut views, ChartTab::StandardAnalyzed, 0);
        assert!(standard.is_some() && error.is_none());

        let (library, error) = show(&session, &mut views, ChartTab::LibraryAnalyzed, 1);
        assert!(matches!(error, Some(ChartError::LabelCountMismatch { .. })));
        assert!(library.is_none());

        // A good library keeps its own configuration after a sibling fails
        let (good, _) = show(&session, &mut views, ChartTab::LibraryAnalyzed, 0);
        let good = good.unwrap();
        assert!(show(&session, &mut views, ChartTab::LibraryAnalyzed, 1).0.is_none());
        let (again, error) = show(&session, &mut views, ChartTab::LibraryAnalyzed, 0);
        assert!(error.is_none());
        assert!(Arc::ptr_eq(&good, &again.unwrap()));
    }

    #[test]
    fn test_chart_keys_separate_libraries() {
        assert_ne!(
            ChartKey::new(ChartTab::LibraryAnalyzed, 0),
            ChartKey::new(ChartTab::LibraryAnalyzed, 1)
        );
        assert_eq!(
            ChartKey::new(ChartTab::Calibration, 0),
            ChartKey::new(ChartTab::Calibration, 3)
        );
        assert_ne!(
            ChartKey::new(ChartTab::LibraryAnalyzed, 0).plot_id(),
            ChartKey::new(ChartTab::LibraryAnalyzed, 1).plot_id()
        );

        // Hiding a legend entry in one library leaves the next one untouched
        let mut states: HashMap<ChartKey, ChartViewState> = HashMap::new();
        states.entry(ChartKey::new(ChartTab::LibraryAnalyzed, 0)).or_default().toggle(2);
        let other = states.entry(ChartKey::new(ChartTab::LibraryAnalyzed, 1)).or_default();
        assert!(other.hidden.is_empty());
    }

    #[test]
    fn test_tabs_follow_session_content() {
        let mut session = AnalysisSession::default();
        assert!(ChartTab::ALL.iter().all(|&t| chart_source(&session, t, 0).is_none()));

        session.input.size_standards.push(SizeStandard::default());
        session.input.gen_libs.push(GenLib::default());
        assert!(chart_source(&session, ChartTab::StandardRaw, 0).is_some());
        assert!(chart_source(&session, ChartTab::LibrariesRaw, 0).is_some());
        assert!(chart_source(&session, ChartTab::Calibration, 0).is_none());

        session.result = Some(AnalyzeResult {
            genlib_data: vec![AnalyzeResultData::default()],
            ..Default::default()
        });
        assert!(chart_source(&session, ChartTab::StandardAnalyzed, 0).is_some());
        assert!(chart_source(&session, ChartTab::LibraryAnalyzed, 0).is_some());
        assert!(chart_source(&session, ChartTab::LibraryAnalyzed, 1).is_none());
    }

    #[test]
    fn test_tab_ids_are_unique() {
        let ids: std::collections::HashSet<_> = ChartTab::ALL.iter().map(|t| t.id()).collect();
        assert_eq!(ids.len(), ChartTab::ALL.len());
    }
}
