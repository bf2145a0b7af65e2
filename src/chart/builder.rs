/// Dataset builders — map analysis records onto chart datasets
///
/// Color convention: primary = raw/measured trace, secondary =
/// detected/fitted features. Optional peak categories and fill regions
/// only contribute a dataset when they are non-empty.
use std::hash::{Hash, Hasher};

use super::dataset::{indexed_points, ColorRole, Dataset, MarkerShape, Point};
use crate::data::records::{AnalyzeResult, AnalyzeResultData, GenLib, SizeStandard};

/// Instrument amplitudes are plotted in millions
pub const AMPLITUDE_SCALE: f64 = 1e-6;

/// Default y-axis title matching `AMPLITUDE_SCALE`
pub const AMPLITUDE_AXIS_TITLE: &str = "Intensity × 10⁶";

/// Amplitude of `trace` at sample `location`, scaled for plotting.
/// Locations come from the backend as floats; out-of-range or negative
/// locations read as zero.
fn trace_at(trace: &[f64], location: f64) -> f64 {
    let idx = location.round();
    if idx >= 0.0 && (idx as usize) < trace.len() {
        trace[idx as usize] * AMPLITUDE_SCALE
    } else {
        log::warn!(
            "Peak location {} outside trace of {} samples",
            location,
            trace.len()
        );
        0.0
    }
}

/// Peak markers: x from `positions`, y read from `trace` at `locations[i]`
fn peak_points(positions: &[f64], locations: &[f64], trace: &[f64]) -> Vec<Point> {
    positions
        .iter()
        .enumerate()
        .map(|(i, &x)| {
            let y = locations
                .get(i)
                .map(|&loc| trace_at(trace, loc))
                .unwrap_or(0.0);
            Point::new(x, y)
        })
        .collect()
}

/// Fill region from paired coordinate arrays (shorter one wins)
fn fill_points(xs: &[f64], ys: &[f64]) -> Vec<Point> {
    xs.iter()
        .zip(ys.iter())
        .map(|(&x, &y)| Point::new(x, y * AMPLITUDE_SCALE))
        .collect()
}

/// Uploaded size standard before analysis
pub fn standard_raw(standard: &SizeStandard) -> Vec<Dataset> {
    vec![Dataset::line(
        standard.title.clone(),
        ColorRole::Primary,
        indexed_points(&standard.data, AMPLITUDE_SCALE),
    )]
}

/// Analysed standard: corrected trace with chromatogram and labelled peaks
pub fn standard_analyzed(result: &AnalyzeResult) -> Vec<Dataset> {
    let mut datasets = vec![Dataset::line(
        "Intensity",
        ColorRole::Primary,
        indexed_points(&result.zr_ref, AMPLITUDE_SCALE),
    )
    .with_chromatogram()];

    datasets.push(
        Dataset::points(
            "Peaks",
            ColorRole::Secondary,
            MarkerShape::Circle,
            peak_points(&result.peak, &result.peak, &result.zr_ref),
        )
        .with_labels(result.sizes.clone()),
    );
    datasets
}

/// Calibration curve: fragment size against peak position, plus the fit
pub fn calibration_curve(result: &AnalyzeResult) -> Vec<Dataset> {
    let measured = result
        .sizes
        .iter()
        .zip(result.peak.iter())
        .map(|(&x, &y)| Point::new(x, y))
        .collect();
    let fit = result
        .liz_fit
        .iter()
        .zip(result.locs_fit.iter())
        .map(|(&x, &y)| Point::new(x, y))
        .collect();
    vec![
        Dataset::points("Measured", ColorRole::Primary, MarkerShape::Circle, measured),
        Dataset::line("Polynomial fit", ColorRole::Secondary, fit),
    ]
}

/// All uploaded library traces on one chart
pub fn gen_libs_raw(libs: &[GenLib]) -> Vec<Dataset> {
    libs.iter()
        .map(|lib| {
            Dataset::line(
                lib.title.clone(),
                ColorRole::Primary,
                indexed_points(&lib.data, AMPLITUDE_SCALE),
            )
        })
        .collect()
}

/// Analysed library: denoised trace, up to three peak categories and up to
/// two fill regions.
pub fn gen_lib_analyzed(data: &AnalyzeResultData) -> Vec<Dataset> {
    let trace: Vec<Point> = data
        .t_main
        .iter()
        .enumerate()
        .map(|(i, &x)| {
            let y = data.denoised_data.get(i).copied().unwrap_or(0.0);
            Point::new(x, y * AMPLITUDE_SCALE)
        })
        .collect();
    let mut datasets = vec![Dataset::line("Intensity", ColorRole::Primary, trace).with_chromatogram()];

    // Reference peaks get their own role once another peak category
    // shares the plot with them.
    let other_peaks = !data.t_unrecognized_peaks.is_empty() || !data.lib_length.is_empty();
    let reference_color = if other_peaks {
        ColorRole::Tertiary
    } else {
        ColorRole::Secondary
    };
    if !data.st_peaks.is_empty() {
        datasets.push(
            Dataset::points(
                "Reference peaks",
                reference_color,
                MarkerShape::CrossRot,
                peak_points(&data.st_peaks, &data.st_length, &data.denoised_data),
            )
            .with_labels(data.stp.clone()),
        );
    }
    if !data.t_unrecognized_peaks.is_empty() {
        datasets.push(
            Dataset::points(
                "Unrecognized peaks",
                ColorRole::Secondary,
                MarkerShape::Cross,
                peak_points(
                    &data.t_unrecognized_peaks,
                    &data.unrecognized_peaks,
                    &data.denoised_data,
                ),
            )
            .with_labels(data.unr.clone()),
        );
    }
    if !data.lib_length.is_empty() {
        datasets.push(
            Dataset::points(
                "Library peaks",
                ColorRole::Secondary,
                MarkerShape::Circle,
                peak_points(&data.lib_length, &data.lib_peak_locations, &data.denoised_data),
            )
            .with_labels(data.hpx.clone()),
        );
    }
    if !data.x_fill.is_empty() {
        datasets.push(Dataset::filled(
            "Fragment fill",
            ColorRole::Secondary,
            fill_points(&data.x_fill, &data.y_fill),
        ));
    }
    if !data.x_lib_fill.is_empty() {
        datasets.push(Dataset::filled(
            "Library fill",
            ColorRole::Secondary,
            fill_points(&data.x_lib_fill, &data.y_lib_fill),
        ));
    }
    datasets
}

/// Which chart to build, borrowing the record it is built from
#[derive(Debug, Clone, Copy)]
pub enum ChartSource<'a> {
    StandardRaw(&'a SizeStandard),
    StandardAnalyzed(&'a AnalyzeResult),
    CalibrationCurve(&'a AnalyzeResult),
    GenLibsRaw(&'a [GenLib]),
    GenLibAnalyzed(&'a AnalyzeResultData),
}

impl ChartSource<'_> {
    pub fn datasets(&self) -> Vec<Dataset> {
        match self {
            ChartSource::StandardRaw(s) => standard_raw(s),
            ChartSource::StandardAnalyzed(r) => standard_analyzed(r),
            ChartSource::CalibrationCurve(r) => calibration_curve(r),
            ChartSource::GenLibsRaw(libs) => gen_libs_raw(libs),
            ChartSource::GenLibAnalyzed(d) => gen_lib_analyzed(d),
        }
    }

    /// Y-axis title; the calibration curve plots sample position
    pub fn y_title(&self) -> Option<&'static str> {
        match self {
            ChartSource::CalibrationCurve(_) => Some("Release time, samples"),
            _ => None,
        }
    }
}

impl Hash for ChartSource<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            ChartSource::StandardRaw(s) => s.hash(state),
            ChartSource::StandardAnalyzed(r) | ChartSource::CalibrationCurve(r) => r.hash(state),
            ChartSource::GenLibsRaw(libs) => libs.hash(state),
            ChartSource::GenLibAnalyzed(d) => d.hash(state),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::dataset::DatasetKind;

    fn library(
        st: bool,
        unrecognized: bool,
        lib: bool,
        fill: bool,
        lib_fill: bool,
    ) -> AnalyzeResultData {
        let mut d = AnalyzeResultData {
            title: "lib".into(),
            t_main: vec![0.0, 1.0, 2.0, 3.0, 4.0],
            denoised_data: vec![0.0, 2e6, 5e6, 1e6, 0.0],
            ..Default::default()
        };
        if st {
            d.st_peaks = vec![2.0];
            d.st_length = vec![2.0];
            d.stp = vec![35.0];
        }
        if unrecognized {
            d.t_unrecognized_peaks = vec![1.0];
            d.unrecognized_peaks = vec![1.0];
            d.unr = vec![20.5];
        }
        if lib {
            d.lib_length = vec![3.0];
            d.lib_peak_locations = vec![3.0];
            d.hpx = vec![410.0];
        }
        if fill {
            d.x_fill = vec![1.0, 2.0];
            d.y_fill = vec![2e6, 5e6];
        }
        if lib_fill {
            d.x_lib_fill = vec![2.0, 3.0];
            d.y_lib_fill = vec![5e6, 1e6];
        }
        d
    }

    #[test]
    fn test_full_library_dataset_count() {
        let ds = gen_lib_analyzed(&library(true, true, true, true, true));
        assert_eq!(ds.len(), 6);
        assert_eq!(ds[0].kind, DatasetKind::Line);
        assert!(ds[0].emits_chromatogram);
        assert_eq!(ds[1].kind, DatasetKind::Point { shape: MarkerShape::CrossRot });
        assert_eq!(ds[1].color, ColorRole::Tertiary);
        assert_eq!(ds[2].kind, DatasetKind::Point { shape: MarkerShape::Cross });
        assert_eq!(ds[3].kind, DatasetKind::Point { shape: MarkerShape::Circle });
        assert_eq!(ds[4].kind, DatasetKind::Filled);
        assert_eq!(ds[5].kind, DatasetKind::Filled);
    }

    #[test]
    fn test_absent_categories_add_nothing() {
        let ds = gen_lib_analyzed(&library(false, false, false, false, false));
        assert_eq!(ds.len(), 1);
        assert_eq!(ds[0].points.len(), 5);

        let ds = gen_lib_analyzed(&library(false, true, false, false, true));
        assert_eq!(ds.len(), 3);
        assert_eq!(ds[1].title, "Unrecognized peaks");
        assert_eq!(ds[2].title, "Library fill");
    }

    #[test]
    fn test_peak_y_comes_from_trace_location() {
        let ds = gen_lib_analyzed(&library(true, false, false, false, false));
        let peak = ds[1].points[0];
        assert_eq!(peak.x, 2.0);
        assert!((peak.y - 5.0).abs() < 1e-9);
        assert_eq!(ds[1].labels.as_ref().unwrap().0, vec![35.0]);
        assert_eq!(ds[1].color, ColorRole::Secondary);
    }

    #[test]
    fn test_library_trace_uses_calibrated_x() {
        let mut d = library(false, false, true, false, false);
        d.t_main = vec![10.0, 20.0, 30.0, 40.0, 50.0];
        d.lib_length = vec![40.0];
        let ds = gen_lib_analyzed(&d);
        let xs: Vec<f64> = ds[0].points.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![10.0, 20.0, 30.0, 40.0, 50.0]);
        // Peak sits on the trace sample at the same calibrated position
        assert_eq!(ds[1].points[0].x, ds[0].points[3].x);
        assert_eq!(ds[1].points[0].y, ds[0].points[3].y);
    }

    #[test]
    fn test_out_of_range_location_reads_zero() {
        let mut d = library(false, false, true, false, false);
        d.lib_peak_locations = vec![99.0];
        let ds = gen_lib_analyzed(&d);
        assert_eq!(ds[1].points[0].y, 0.0);
    }

    #[test]
    fn test_standard_analyzed() {
        let result = AnalyzeResult {
            zr_ref: vec![0.0, 3e6, 0.0, 8e6, 0.0],
            peak: vec![1.0, 3.0],
            sizes: vec![35.0, 50.0],
            ..Default::default()
        };
        let ds = standard_analyzed(&result);
        assert_eq!(ds.len(), 2);
        assert!(ds[0].emits_chromatogram);
        assert_eq!(ds[0].points.len(), 5);
        assert_eq!(ds[0].points[3].x, 3.0);
        assert!((ds[0].points[3].y - 8.0).abs() < 1e-9);
        assert_eq!(ds[1].points.len(), 2);
        assert_eq!(ds[1].points[0].x, 1.0);
        assert!((ds[1].points[0].y - 3.0).abs() < 1e-9);
        assert!((ds[1].points[1].y - 8.0).abs() < 1e-9);
        assert_eq!(ds[1].labels.as_ref().unwrap().0.len(), 2);
    }

    #[test]
    fn test_empty_standard_still_has_base_trace() {
        let ds = standard_raw(&SizeStandard::default());
        assert_eq!(ds.len(), 1);
        assert!(ds[0].points.is_empty());
    }

    #[test]
    fn test_calibration_curve_pairs() {
        let result = AnalyzeResult {
            peak: vec![100.0, 200.0],
            sizes: vec![35.0, 50.0],
            liz_fit: vec![30.0, 40.0, 50.0],
            locs_fit: vec![90.0, 150.0, 205.0],
            ..Default::default()
        };
        let ds = calibration_curve(&result);
        assert_eq!(ds[0].points, vec![Point::new(35.0, 100.0), Point::new(50.0, 200.0)]);
        assert_eq!(ds[1].kind, DatasetKind::Line);
        assert_eq!(ds[1].points.len(), 3);
        assert!(ds.iter().all(|d| !d.emits_chromatogram));
    }

    #[test]
    fn test_gen_libs_raw_one_line_each() {
        let libs = vec![
            GenLib { title: "a".into(), data: vec![1.0, 2.0] },
            GenLib { title: "b".into(), data: vec![3.0] },
        ];
        let ds = gen_libs_raw(&libs);
        assert_eq!(ds.len(), 2);
        assert_eq!(ds[1].title, "b");
        assert!(gen_libs_raw(&[]).is_empty());
    }
}
