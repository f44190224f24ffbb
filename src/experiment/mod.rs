//! Experiment inputs, outputs, and failure taxonomy.

pub mod catalog;
pub mod error;
pub mod request;
pub mod result;

pub use catalog::{DatasetId, DatasetInfo, ModelId, ModelInfo};
pub use error::ExperimentError;
pub use request::{ExperimentRequest, Selection, ValidationError};
pub use result::{ClassificationMetrics, ExperimentResult, PlotSet};
