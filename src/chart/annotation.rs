/// Vertical peak marker lines bound to the dataset that owns them
use super::dataset::{ColorRole, Point};
use super::ChartError;

/// Legend toggle state as reported by whatever is drawing the chart
pub trait DatasetVisibility {
    fn is_dataset_visible(&self, index: usize) -> bool;
}

/// Every dataset shown (offscreen rendering has no legend interaction)
#[derive(Debug, Clone, Copy, Default)]
pub struct AllVisible;

impl DatasetVisibility for AllVisible {
    fn is_dataset_visible(&self, _index: usize) -> bool {
        true
    }
}

/// A line from `y = 0` to `y = y_max` at `x`, labelled with a rounded value
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationLine {
    /// Index of the owning dataset in the render configuration
    pub owner: usize,
    pub x: f64,
    pub y_max: f64,
    pub label: String,
    pub color: ColorRole,
}

impl AnnotationLine {
    /// Whether to draw this line. Asks the host on every call so a legend
    /// toggle takes effect on the next draw without re-deriving.
    pub fn visible<V: DatasetVisibility + ?Sized>(&self, legend: &V) -> bool {
        legend.is_dataset_visible(self.owner)
    }
}

/// Round to two decimals, ties away from zero
pub fn round2(value: f64) -> f64 {
    let r = (value * 100.0).round() / 100.0;
    // Avoid printing "-0"
    if r == 0.0 {
        0.0
    } else {
        r
    }
}

pub fn format_label(value: f64) -> String {
    format!("{}", round2(value))
}

/// One marker line per (point, label) pair. The counts must match: a
/// silent truncation would put a size on the wrong peak.
pub fn annotation_lines(
    owner: usize,
    points: &[Point],
    labels: &[f64],
    color: ColorRole,
) -> Result<Vec<AnnotationLine>, ChartError> {
    if points.len() != labels.len() {
        return Err(ChartError::LabelCountMismatch {
            dataset: owner,
            points: points.len(),
            labels: labels.len(),
        });
    }
    Ok(points
        .iter()
        .zip(labels.iter())
        .map(|(p, &label)| AnnotationLine {
            owner,
            x: p.x,
            y_max: p.y,
            label: format_label(label),
            color,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashSet;

    struct Legend {
        hidden: RefCell<HashSet<usize>>,
    }

    impl DatasetVisibility for Legend {
        fn is_dataset_visible(&self, index: usize) -> bool {
            !self.hidden.borrow().contains(&index)
        }
    }

    #[test]
    fn test_one_line_per_point() {
        let points = vec![Point::new(3.0, 1.5), Point::new(7.0, 2.5), Point::new(9.0, 0.5)];
        let lines = annotation_lines(2, &points, &[35.0, 50.125, 75.556], ColorRole::Secondary).unwrap();
        assert_eq!(lines.len(), 3);
        for (line, p) in lines.iter().zip(points.iter()) {
            assert_eq!(line.x, p.x);
            assert_eq!(line.y_max, p.y);
            assert_eq!(line.owner, 2);
        }
        assert_eq!(lines[0].label, "35");
        assert_eq!(lines[1].label, "50.13");
        assert_eq!(lines[2].label, "75.56");
    }

    #[test]
    fn test_mismatch_is_rejected() {
        let points = vec![Point::new(1.0, 1.0), Point::new(2.0, 1.0)];
        let err = annotation_lines(4, &points, &[1.0], ColorRole::Primary).unwrap_err();
        assert_eq!(
            err,
            ChartError::LabelCountMismatch { dataset: 4, points: 2, labels: 1 }
        );
    }

    #[test]
    fn test_empty_is_fine() {
        assert!(annotation_lines(0, &[], &[], ColorRole::Primary).unwrap().is_empty());
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(1005.0), 1005.0);
        assert_eq!(round2(0.125), 0.13);
        assert_eq!(round2(-0.125), -0.13);
        assert_eq!(round2(-2.5), -2.5);
        assert_eq!(round2(-0.001), 0.0);
        assert_eq!(format_label(-0.001), "0");
        assert_eq!(format_label(123.4), "123.4");
    }

    #[test]
    fn test_visibility_is_live() {
        let legend = Legend { hidden: RefCell::new(HashSet::new()) };
        let a = annotation_lines(1, &[Point::new(0.0, 1.0)], &[10.0], ColorRole::Secondary).unwrap();
        let b = annotation_lines(2, &[Point::new(1.0, 1.0)], &[20.0], ColorRole::Secondary).unwrap();
        assert!(a[0].visible(&legend));

        legend.hidden.borrow_mut().insert(1);
        assert!(!a[0].visible(&legend));
        assert!(b[0].visible(&legend));

        legend.hidden.borrow_mut().remove(&1);
        assert!(a[0].visible(&legend));
        assert!(a[0].visible(&AllVisible));
    }
}
