/// Signal visualization core: dataset derivation, chromatogram strip,
/// peak annotations and the assembled render configuration.
///
/// Everything here is a pure function of (domain records, palette,
/// settings). The GUI and the offscreen exporter only read the results.

pub mod annotation;
pub mod builder;
pub mod chromatogram;
pub mod dataset;
pub mod palette;
pub mod view;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChartError {
    #[error("dataset {dataset} has {points} peak points but {labels} labels")]
    LabelCountMismatch {
        dataset: usize,
        points: usize,
        labels: usize,
    },
}
