/// Report image set — every chart a printed report embeds, rendered
/// offscreen one after another on a single surface.
use std::fmt::Display;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};

use super::offscreen::OffscreenSurface;
use super::RenderError;
use crate::chart::builder::ChartSource;
use crate::chart::palette::ChartPalette;
use crate::chart::view::{derive_for_source, ChartSettings, RenderMode};
use crate::data::records::AnalyzeResult;

/// One encoded chart
#[derive(Debug, Clone)]
pub struct ReportImage {
    /// File-name suffix, e.g. `standard` or `library_01`
    pub name: String,
    pub title: String,
    pub png: Vec<u8>,
}

#[derive(Debug, Clone, Default)]
pub struct ReportImages {
    pub images: Vec<ReportImage>,
}

impl ReportImages {
    /// Write every image as `<stem>_<name>.png` under `dir`
    pub fn save_to_dir(&self, dir: &Path, stem: &str) -> Result<Vec<PathBuf>, RenderError> {
        std::fs::create_dir_all(dir)?;
        let mut written = Vec::with_capacity(self.images.len());
        for image in &self.images {
            let path = dir.join(format!("{}_{}.png", stem, image.name));
            std::fs::write(&path, &image.png)?;
            log::debug!("Wrote {} ({})", path.display(), image.title);
            written.push(path);
        }
        log::info!("Saved {} report image(s) to {}", written.len(), dir.display());
        Ok(written)
    }
}

/// Report base name for a given moment, `report_YYYY-MM-DD_HH-MM-SS`
pub fn report_file_stem<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    now.format("report_%Y-%m-%d_%H-%M-%S").to_string()
}

/// Standard, calibration curve, then one chart per analysed library.
/// Always the light palette, whatever the window theme.
pub fn render_report_images(
    result: &AnalyzeResult,
    settings: &ChartSettings,
) -> Result<ReportImages, RenderError> {
    let palette = ChartPalette::light();
    let mut surface = OffscreenSurface::new(settings.report_width, settings.report_height)?;

    let mut charts = vec![
        ("standard".to_string(), "Size standard".to_string(), ChartSource::StandardAnalyzed(result)),
        ("calibration".to_string(), "Calibration curve".to_string(), ChartSource::CalibrationCurve(result)),
    ];
    for (i, lib) in result.genlib_data.iter().enumerate() {
        charts.push((format!("library_{:02}", i + 1), lib.title.clone(), ChartSource::GenLibAnalyzed(lib)));
    }

    let mut images = Vec::with_capacity(charts.len());
    for (name, title, source) in charts {
        let config = derive_for_source(source, &palette, settings, RenderMode::Offscreen)?;
        let png = surface.render(&config)?;
        log::debug!("Rendered report chart {} ({} bytes)", name, png.len());
        images.push(ReportImage { name, title, png });
    }

    log::info!("Rendered {} report image(s)", images.len());
    Ok(ReportImages { images })
}
