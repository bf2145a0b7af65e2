/// Static chart images for reports
pub mod offscreen;
pub mod report;

use thiserror::Error;

use crate::chart::ChartError;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Image render failed: {reason}")]
    ImageRenderFailed { reason: String },

    #[error("Chart derivation failed: {0}")]
    Chart(#[from] ChartError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RenderError {
    pub fn failed(reason: impl Into<String>) -> Self {
        RenderError::ImageRenderFailed {
            reason: reason.into(),
        }
    }
}
