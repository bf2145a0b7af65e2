/// Toolbar — top menu bar with session and report actions
use std::path::PathBuf;

/// Actions that can be triggered from the toolbar
#[derive(Debug, Clone, PartialEq)]
pub enum ToolbarAction {
    None,
    OpenSession,
    ExportReport,
    ZoomReset,
    ThemeToggle,
    ShowAbout,
}

/// Render the toolbar and return any triggered action
pub fn show_toolbar(ctx: &egui::Context, theme_label: &str, can_export: bool) -> ToolbarAction {
    let mut action = ToolbarAction::None;

    egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
        egui::menu::bar(ui, |ui| {
            ui.menu_button("📁 File", |ui| {
                if ui.button("📂 Open Session…").clicked() {
                    action = ToolbarAction::OpenSession;
                    ui.close_menu();
                }
                ui.separator();
                if ui
                    .add_enabled(can_export, egui::Button::new("🖼 Export Report Images…"))
                    .clicked()
                {
                    action = ToolbarAction::ExportReport;
                    ui.close_menu();
                }
            });

            ui.menu_button("🔍 View", |ui| {
                if ui.button("🔄 Reset Zoom").clicked() {
                    action = ToolbarAction::ZoomReset;
                    ui.close_menu();
                }
                ui.separator();
                if ui.button(format!("🎨 Theme: {}", theme_label)).clicked() {
                    action = ToolbarAction::ThemeToggle;
                    ui.close_menu();
                }
            });

            ui.menu_button("❓ Help", |ui| {
                if ui.button("ℹ About").clicked() {
                    action = ToolbarAction::ShowAbout;
                    ui.close_menu();
                }
            });

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui
                    .add(egui::Button::new(egui::RichText::new(theme_label).size(12.0)).corner_radius(12.0))
                    .clicked()
                {
                    action = ToolbarAction::ThemeToggle;
                }
                ui.separator();
                ui.label(
                    egui::RichText::new("CE Trace Viewer")
                        .color(egui::Color32::from_rgb(0x70, 0x75, 0x80))
                        .size(12.0),
                );
            });
        });
    });

    action
}

/// Show file-open dialog for session / analysis JSON
pub fn open_session_dialog() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title("Open Analysis Session")
        .add_filter("JSON", &["json"])
        .add_filter("All Files", &["*"])
        .pick_file()
}

/// Show folder picker for report images
pub fn report_folder_dialog() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title("Export Report Images To")
        .pick_folder()
}
