//! Validation and serialization of experiment submissions.

use serde::Serialize;

use super::catalog::{
    DatasetId, ModelId, PREFIX_LENGTH_DEFAULT, PREFIX_LENGTH_MAX, PREFIX_LENGTH_MIN,
    PREFIX_LENGTH_STEP,
};

/// Reasons a submission is rejected before it reaches the network.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Unknown dataset '{0}'")]
    UnknownDataset(String),
    #[error("Unknown model '{0}'")]
    UnknownModel(String),
    #[error("Prefix length {value} is outside {min}..={max}")]
    PrefixLengthOutOfRange { value: i64, min: u32, max: u32 },
    #[error("Prefix length {value} is not a multiple of {step}")]
    PrefixLengthStep { value: i64, step: u32 },
}

/// One validated experiment submission.
///
/// Fields are private so a request can only be obtained through validation and
/// cannot be altered once built. Serializes to the service payload
/// `{"dataset": .., "model": .., "prefixLength": ..}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperimentRequest {
    dataset: DatasetId,
    model: ModelId,
    prefix_length: u32,
}

impl ExperimentRequest {
    /// Validate raw selections against the static catalogs and prefix bounds.
    pub fn build(dataset: &str, model: &str, prefix_length: i64) -> Result<Self, ValidationError> {
        let dataset = DatasetId::parse(dataset)
            .ok_or_else(|| ValidationError::UnknownDataset(dataset.to_string()))?;
        let model =
            ModelId::parse(model).ok_or_else(|| ValidationError::UnknownModel(model.to_string()))?;
        Self::new(dataset, model, prefix_length)
    }

    /// Validate typed selections; the prefix length is still checked.
    pub fn new(dataset: DatasetId, model: ModelId, prefix_length: i64) -> Result<Self, ValidationError> {
        let prefix_length = validate_prefix_length(prefix_length)?;
        Ok(Self {
            dataset,
            model,
            prefix_length,
        })
    }

    pub fn dataset(&self) -> DatasetId {
        self.dataset
    }

    pub fn model(&self) -> ModelId {
        self.model
    }

    pub fn prefix_length(&self) -> u32 {
        self.prefix_length
    }
}

/// The user's current choices, as edited by the UI before submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Selection {
    pub dataset: DatasetId,
    pub model: ModelId,
    pub prefix_length: u32,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            dataset: DatasetId::default(),
            model: ModelId::default(),
            prefix_length: PREFIX_LENGTH_DEFAULT,
        }
    }
}

impl Selection {
    /// Re-validate the selection; the UI's stepped slider is not trusted.
    pub fn to_request(&self) -> Result<ExperimentRequest, ValidationError> {
        ExperimentRequest::new(self.dataset, self.model, i64::from(self.prefix_length))
    }
}

/// Reject out-of-range or off-step values; never clamps.
pub fn validate_prefix_length(value: i64) -> Result<u32, ValidationError> {
    if value < i64::from(PREFIX_LENGTH_MIN) || value > i64::from(PREFIX_LENGTH_MAX) {
        return Err(ValidationError::PrefixLengthOutOfRange {
            value,
            min: PREFIX_LENGTH_MIN,
            max: PREFIX_LENGTH_MAX,
        });
    }
    if value % i64::from(PREFIX_LENGTH_STEP) != 0 {
        return Err(ValidationError::PrefixLengthStep {
            value,
            step: PREFIX_LENGTH_STEP,
        });
    }
    u32::try_from(value).map_err(|_| ValidationError::PrefixLengthOutOfRange {
        value,
        min: PREFIX_LENGTH_MIN,
        max: PREFIX_LENGTH_MAX,
    })
}
