use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use std::path::Path;

use super::LoadError;

/// Size (length) standard as uploaded by the user: raw trace plus the
/// known fragment table used for calibration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SizeStandard {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub data: Vec<f64>,
    #[serde(default)]
    pub sizes: Vec<f64>,
    #[serde(default)]
    pub concentrations: Vec<f64>,
    #[serde(default)]
    pub release_times: Vec<f64>,
}

/// Raw genomic library trace
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenLib {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub data: Vec<f64>,
}

/// Parsed instrument export before analysis
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedData {
    #[serde(default, rename = "size_standarts")]
    pub size_standards: Vec<SizeStandard>,
    #[serde(default)]
    pub gen_libs: Vec<GenLib>,
}

/// Analysis of the size standard, with one entry per analysed library
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzeResult {
    pub title: String,
    /// Sample index of every detected standard peak
    pub peak: Vec<f64>,
    pub led_area: Vec<f64>,
    pub led_conc: Vec<f64>,
    /// Baseline-corrected standard trace
    #[serde(rename = "ZrRef")]
    pub zr_ref: Vec<f64>,
    #[serde(rename = "SD_molarity")]
    pub sd_molarity: Vec<f64>,
    /// Calibration fit: fragment sizes and matching sample positions
    pub liz_fit: Vec<f64>,
    pub locs_fit: Vec<f64>,
    pub sizes: Vec<f64>,
    pub concentrations: Vec<f64>,
    pub genlib_data: Vec<AnalyzeResultData>,
}

/// Analysis of one genomic library against the calibrated standard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzeResultData {
    pub title: String,
    pub t_main: Vec<f64>,
    pub denoised_data: Vec<f64>,
    /// Reference peaks: plotted position and trace location
    pub st_peaks: Vec<f64>,
    pub st_length: Vec<f64>,
    pub t_unrecognized_peaks: Vec<f64>,
    pub unrecognized_peaks: Vec<f64>,
    pub lib_length: Vec<f64>,
    #[serde(rename = "LibPeakLocations")]
    pub lib_peak_locations: Vec<f64>,
    /// Fragment sizes labelling library, unrecognized and reference peaks
    pub hpx: Vec<f64>,
    pub unr: Vec<f64>,
    pub stp: Vec<f64>,
    #[serde(rename = "GLAreas")]
    pub gl_areas: Vec<f64>,
    #[serde(rename = "peaksCorr")]
    pub peaks_corr: Vec<f64>,
    pub library_peaks: Vec<f64>,
    #[serde(rename = "areaCorr")]
    pub area_corr: Vec<f64>,
    pub molarity: Vec<f64>,
    #[serde(rename = "maxLibPeak")]
    pub max_lib_peak: f64,
    #[serde(rename = "maxLibValue")]
    pub max_lib_value: f64,
    #[serde(rename = "totalLibArea")]
    pub total_lib_area: f64,
    #[serde(rename = "totalLibConc")]
    pub total_lib_conc: f64,
    #[serde(rename = "totalLibMolarity")]
    pub total_lib_molarity: f64,
    pub x_fill: Vec<f64>,
    pub y_fill: Vec<f64>,
    #[serde(rename = "x_Lib_fill")]
    pub x_lib_fill: Vec<f64>,
    #[serde(rename = "y_Lib_fill")]
    pub y_lib_fill: Vec<f64>,
}

/// Everything the viewer shows for one run: the uploaded traces and,
/// once the backend has answered, the analysis result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSession {
    #[serde(default)]
    pub input: ParsedData,
    #[serde(default)]
    pub result: Option<AnalyzeResult>,
}

impl AnalysisSession {
    pub fn size_standard(&self) -> Option<&SizeStandard> {
        self.input.size_standards.first()
    }

    pub fn is_empty(&self) -> bool {
        self.input.size_standards.is_empty()
            && self.input.gen_libs.is_empty()
            && self.result.is_none()
    }
}

/// Feed a float slice into a hasher by bit pattern
pub fn hash_f64s<H: Hasher>(values: &[f64], state: &mut H) {
    values.len().hash(state);
    for v in values {
        v.to_bits().hash(state);
    }
}

impl Hash for SizeStandard {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.title.hash(state);
        hash_f64s(&self.data, state);
    }
}

impl Hash for GenLib {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.title.hash(state);
        hash_f64s(&self.data, state);
    }
}

impl Hash for AnalyzeResult {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.title.hash(state);
        hash_f64s(&self.peak, state);
        hash_f64s(&self.zr_ref, state);
        hash_f64s(&self.liz_fit, state);
        hash_f64s(&self.locs_fit, state);
        hash_f64s(&self.sizes, state);
    }
}

impl Hash for AnalyzeResultData {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.title.hash(state);
        hash_f64s(&self.t_main, state);
        hash_f64s(&self.denoised_data, state);
        hash_f64s(&self.st_peaks, state);
        hash_f64s(&self.st_length, state);
        hash_f64s(&self.t_unrecognized_peaks, state);
        hash_f64s(&self.unrecognized_peaks, state);
        hash_f64s(&self.lib_length, state);
        hash_f64s(&self.lib_peak_locations, state);
        hash_f64s(&self.hpx, state);
        hash_f64s(&self.unr, state);
        hash_f64s(&self.stp, state);
        hash_f64s(&self.x_fill, state);
        hash_f64s(&self.y_fill, state);
        hash_f64s(&self.x_lib_fill, state);
        hash_f64s(&self.y_lib_fill, state);
    }
}

/// Parse a session document. Accepts a bare analysis result, a bare parsed
/// upload, or a `{ "input": …, "result": … }` wrapper.
pub fn parse_session(json: &str) -> Result<AnalysisSession, LoadError> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    let obj = value
        .as_object()
        .ok_or_else(|| LoadError::Unrecognized("top-level value is not an object".into()))?;

    if obj.contains_key("input") || obj.contains_key("result") {
        return Ok(serde_json::from_value(value)?);
    }
    if obj.contains_key("genlib_data") || obj.contains_key("ZrRef") {
        let result: AnalyzeResult = serde_json::from_value(value)?;
        return Ok(AnalysisSession {
            input: ParsedData::default(),
            result: Some(result),
        });
    }
    if obj.contains_key("size_standarts") || obj.contains_key("gen_libs") {
        let input: ParsedData = serde_json::from_value(value)?;
        return Ok(AnalysisSession { input, result: None });
    }

    Err(LoadError::Unrecognized(
        "expected an analysis result, a parsed upload, or a session".into(),
    ))
}

/// Read and parse a session file from disk
pub fn load_session(path: &Path) -> Result<AnalysisSession, LoadError> {
    let json = std::fs::read_to_string(path)?;
    let session = parse_session(&json)?;
    log::info!(
        "Loaded {}: {} standard(s), {} library trace(s), analysis {}",
        path.display(),
        session.input.size_standards.len(),
        session.input.gen_libs.len(),
        if session.result.is_some() { "present" } else { "absent" }
    );
    Ok(session)
}
