use std::hash::{Hash, Hasher};

/// One sample of a trace: `x` is the sample position, `y` the amplitude
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Hash for Point {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.x.to_bits().hash(state);
        self.y.to_bits().hash(state);
    }
}

/// Build a trace whose x is the array position
pub fn indexed_points(values: &[f64], scale: f64) -> Vec<Point> {
    values
        .iter()
        .enumerate()
        .map(|(x, &y)| Point::new(x as f64, y * scale))
        .collect()
}

/// Marker glyph for point datasets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MarkerShape {
    #[default]
    Circle,
    /// Upright "+"
    Cross,
    /// Rotated "×"
    CrossRot,
}

/// How a dataset is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatasetKind {
    /// Connected strokes, markers hidden
    Line,
    /// Markers only, no connecting stroke
    Point { shape: MarkerShape },
    /// Area fill between the points and the baseline
    Filled,
}

/// Palette slot a dataset is colored with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorRole {
    /// Raw or measured trace
    #[default]
    Primary,
    /// Detected or fitted features
    Secondary,
    /// Distinguished reference features
    Tertiary,
}

/// Physical values labelling each point of a peak dataset (one per point)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PeakLabels(pub Vec<f64>);

impl Hash for PeakLabels {
    fn hash<H: Hasher>(&self, state: &mut H) {
        crate::data::records::hash_f64s(&self.0, state);
    }
}

/// A renderable series. Produced fresh on every derivation.
#[derive(Debug, Clone, PartialEq, Hash)]
pub struct Dataset {
    pub title: String,
    pub kind: DatasetKind,
    pub color: ColorRole,
    pub points: Vec<Point>,
    /// Vertical marker lines with these labels, one per point
    pub labels: Option<PeakLabels>,
    /// Whether this trace feeds the chromatogram strip
    pub emits_chromatogram: bool,
}

impl Dataset {
    pub fn line(title: impl Into<String>, color: ColorRole, points: Vec<Point>) -> Self {
        Self {
            title: title.into(),
            kind: DatasetKind::Line,
            color,
            points,
            labels: None,
            emits_chromatogram: false,
        }
    }

    pub fn points(
        title: impl Into<String>,
        color: ColorRole,
        shape: MarkerShape,
        points: Vec<Point>,
    ) -> Self {
        Self {
            title: title.into(),
            kind: DatasetKind::Point { shape },
            color,
            points,
            labels: None,
            emits_chromatogram: false,
        }
    }

    pub fn filled(title: impl Into<String>, color: ColorRole, points: Vec<Point>) -> Self {
        Self {
            title: title.into(),
            kind: DatasetKind::Filled,
            color,
            points,
            labels: None,
            emits_chromatogram: false,
        }
    }

    pub fn with_labels(mut self, labels: Vec<f64>) -> Self {
        self.labels = Some(PeakLabels(labels));
        self
    }

    pub fn with_chromatogram(mut self) -> Self {
        self.emits_chromatogram = true;
        self
    }
}
