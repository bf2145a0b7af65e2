/// Chart view controller — assembles datasets, annotations and the
/// chromatogram into one render configuration, memoized on its inputs.
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::annotation::{annotation_lines, AnnotationLine};
use super::builder::{ChartSource, AMPLITUDE_AXIS_TITLE};
use super::chromatogram::{self, GutterStyle};
use super::dataset::Dataset;
use super::palette::ChartPalette;
use super::ChartError;
use crate::data::LoadError;

/// Environment variable naming an optional settings JSON file
pub const SETTINGS_ENV: &str = "CE_VIEWER_SETTINGS";

/// Upper bound for the gutter and its gap, in pixels
const MAX_GUTTER_PX: u32 = 1024;
/// Upper bound for either side of a report image
const MAX_REPORT_PX: u32 = 8192;

/// User-tunable chart settings
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartSettings {
    /// Overrides every chart's y-axis title when set
    pub y_title: Option<String>,
    /// Chromatogram gutter width in pixels
    pub gutter_width: u32,
    /// Space between the plot frame and the gutter
    pub gutter_gap: u32,
    /// Gray level painted for full intensity
    pub max_gray: u8,
    /// Minimum drag distance before a box zoom starts
    pub drag_threshold: u32,
    /// Offscreen report image size
    pub report_width: u32,
    pub report_height: u32,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            y_title: None,
            gutter_width: 40,
            gutter_gap: 5,
            max_gray: 245,
            drag_threshold: 10,
            report_width: 800,
            report_height: 480,
        }
    }
}

impl ChartSettings {
    pub fn gutter(&self) -> GutterStyle {
        GutterStyle {
            width: self.gutter_width as f32,
            gap: self.gutter_gap as f32,
            max_gray: self.max_gray,
        }
    }

    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let json = std::fs::read_to_string(path)?;
        let settings: Self = serde_json::from_str(&json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject sizes no chart or report surface could hold
    pub fn validate(&self) -> Result<(), LoadError> {
        if self.gutter_width > MAX_GUTTER_PX || self.gutter_gap > MAX_GUTTER_PX {
            return Err(LoadError::InvalidSettings(format!(
                "gutter {}+{} px exceeds {} px",
                self.gutter_width, self.gutter_gap, MAX_GUTTER_PX
            )));
        }
        let report_ok = |side: u32| (1..=MAX_REPORT_PX).contains(&side);
        if !report_ok(self.report_width) || !report_ok(self.report_height) {
            return Err(LoadError::InvalidSettings(format!(
                "report size {}x{} outside 1..={} px",
                self.report_width, self.report_height, MAX_REPORT_PX
            )));
        }
        Ok(())
    }

    /// Settings from `path`, defaults if absent or unreadable
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };
        match Self::load(path) {
            Ok(settings) => {
                log::info!("Chart settings loaded from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Ignoring chart settings {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Settings from the file named by `$CE_VIEWER_SETTINGS`
    pub fn from_env() -> Self {
        let path = std::env::var_os(SETTINGS_ENV);
        Self::load_or_default(path.as_deref().map(Path::new))
    }
}

/// Interactive window or static report image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderMode {
    Interactive,
    Offscreen,
}

/// Gestures the host must provide. Zoom and pan only ever move the
/// horizontal (sample) axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interaction {
    /// Drag a rectangle to zoom
    pub drag_zoom: bool,
    pub drag_threshold: f32,
    pub pinch_zoom: bool,
    /// Pan while Ctrl is held
    pub ctrl_pan: bool,
    /// Double-click restores the full data extent
    pub double_click_reset: bool,
}

impl Interaction {
    fn for_mode(mode: RenderMode, drag_threshold: u32) -> Self {
        let on = mode == RenderMode::Interactive;
        Self {
            drag_zoom: on,
            drag_threshold: drag_threshold as f32,
            pinch_zoom: on,
            ctrl_pan: on,
            double_click_reset: on,
        }
    }
}

/// Everything a host needs to draw one chart. Never mutated after
/// derivation; a new theme or new data produces a new value.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfiguration {
    pub datasets: Vec<Dataset>,
    pub annotations: Vec<AnnotationLine>,
    pub chromatogram: Vec<f64>,
    pub y_title: String,
    pub zoom_enabled: bool,
    pub animation_enabled: bool,
    pub interaction: Interaction,
    pub palette: ChartPalette,
    pub gutter: GutterStyle,
}

impl RenderConfiguration {
    /// Right padding the plot must leave for the gutter
    pub fn reserved_right_padding(&self) -> f32 {
        if self.chromatogram.is_empty() {
            0.0
        } else {
            self.gutter.reserved()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.iter().all(|d| d.points.is_empty())
    }
}

/// Full derivation from datasets. Pure: same inputs, same output.
pub fn derive_configuration(
    datasets: Vec<Dataset>,
    palette: &ChartPalette,
    settings: &ChartSettings,
    mode: RenderMode,
    y_title: Option<&str>,
) -> Result<RenderConfiguration, ChartError> {
    let mut annotations = Vec::new();
    let mut chromatogram = Vec::new();

    for (index, dataset) in datasets.iter().enumerate() {
        if let Some(labels) = &dataset.labels {
            annotations.extend(annotation_lines(
                index,
                &dataset.points,
                &labels.0,
                dataset.color,
            )?);
        }
        if dataset.emits_chromatogram {
            chromatogram.extend(chromatogram::normalize(&dataset.points));
        }
    }

    let interactive = mode == RenderMode::Interactive;
    let y_title = settings
        .y_title
        .as_deref()
        .or(y_title)
        .unwrap_or(AMPLITUDE_AXIS_TITLE)
        .to_string();

    Ok(RenderConfiguration {
        datasets,
        annotations,
        chromatogram,
        y_title,
        zoom_enabled: interactive,
        animation_enabled: interactive,
        interaction: Interaction::for_mode(mode, settings.drag_threshold),
        palette: *palette,
        gutter: settings.gutter(),
    })
}

/// Build the datasets for `source` and derive its configuration
pub fn derive_for_source(
    source: ChartSource<'_>,
    palette: &ChartPalette,
    settings: &ChartSettings,
    mode: RenderMode,
) -> Result<RenderConfiguration, ChartError> {
    derive_configuration(source.datasets(), palette, settings, mode, source.y_title())
}

fn derivation_key(
    source: &ChartSource<'_>,
    palette: &ChartPalette,
    settings: &ChartSettings,
    mode: RenderMode,
) -> u64 {
    let mut hasher = DefaultHasher::new();
    source.hash(&mut hasher);
    palette.hash(&mut hasher);
    settings.hash(&mut hasher);
    mode.hash(&mut hasher);
    hasher.finish()
}

/// Memoized derivation entry point for one chart slot.
///
/// Keyed by a content hash of every input. A new configuration replaces
/// the previous one only once it has been derived successfully; a failed
/// derivation leaves the previous one in place.
#[derive(Debug, Default)]
pub struct ChartView {
    key: Option<u64>,
    current: Option<Arc<RenderConfiguration>>,
    failed: Option<(u64, ChartError)>,
    derivations: u64,
}

impl ChartView {
    pub fn configuration(
        &mut self,
        source: ChartSource<'_>,
        palette: &ChartPalette,
        settings: &ChartSettings,
        mode: RenderMode,
    ) -> Result<Arc<RenderConfiguration>, ChartError> {
        let key = derivation_key(&source, palette, settings, mode);
        if self.key == Some(key) {
            if let Some(current) = &self.current {
                return Ok(Arc::clone(current));
            }
        }
        if let Some((failed_key, err)) = &self.failed {
            if *failed_key == key {
                return Err(err.clone());
            }
        }

        self.derivations += 1;
        log::debug!("Deriving chart configuration #{} (key {:016x})", self.derivations, key);
        match derive_for_source(source, palette, settings, mode) {
            Ok(config) => {
                let config = Arc::new(config);
                self.key = Some(key);
                self.current = Some(Arc::clone(&config));
                self.failed = None;
                Ok(config)
            }
            Err(err) => {
                log::warn!("Chart derivation failed: {}", err);
                self.failed = Some((key, err.clone()));
                Err(err)
            }
        }
    }

    /// Last successfully derived configuration
    pub fn current(&self) -> Option<Arc<RenderConfiguration>> {
        self.current.clone()
    }
}
