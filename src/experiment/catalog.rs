//! Static dataset and model catalogs offered by the experiment service.
//!
//! The tables are configuration data: the state machine never consults them,
//! only the request builder (for membership checks) and the UI (for labels).

use serde::{Deserialize, Serialize};

/// Smallest prefix length the service accepts.
pub const PREFIX_LENGTH_MIN: u32 = 5;
/// Largest prefix length the service accepts.
pub const PREFIX_LENGTH_MAX: u32 = 200;
/// Prefix lengths must be a multiple of this step.
pub const PREFIX_LENGTH_STEP: u32 = 5;
/// Prefix length selected on first launch.
pub const PREFIX_LENGTH_DEFAULT: u32 = 50;

/// Dataset identifiers known to the service.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetId {
    #[default]
    Imdb,
    News,
}

/// Display metadata for one dataset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DatasetInfo {
    pub id: DatasetId,
    pub name: &'static str,
    pub description: &'static str,
    pub samples: u32,
}

pub const DATASETS: &[DatasetInfo] = &[
    DatasetInfo {
        id: DatasetId::Imdb,
        name: "IMDb Movie Reviews",
        description: "Binary sentiment classification (positive/negative)",
        samples: 2000,
    },
    DatasetInfo {
        id: DatasetId::News,
        name: "News Category Dataset",
        description: "Multi-class news article classification",
        samples: 2000,
    },
];

impl DatasetId {
    /// Wire identifier used in request payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Imdb => "imdb",
            Self::News => "news",
        }
    }

    /// Look up a dataset by its wire identifier.
    pub fn parse(value: &str) -> Option<Self> {
        DATASETS
            .iter()
            .map(|info| info.id)
            .find(|id| id.as_str() == value)
    }

    pub fn info(self) -> &'static DatasetInfo {
        match self {
            Self::Imdb => &DATASETS[0],
            Self::News => &DATASETS[1],
        }
    }
}

/// Classifier identifiers known to the service.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelId {
    #[default]
    Logistic,
    NaiveBayes,
    Svm,
}

/// Display metadata for one classifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModelInfo {
    pub id: ModelId,
    pub name: &'static str,
    pub description: &'static str,
}

pub const MODELS: &[ModelInfo] = &[
    ModelInfo {
        id: ModelId::Logistic,
        name: "Logistic Regression",
        description: "Fast linear classifier",
    },
    ModelInfo {
        id: ModelId::NaiveBayes,
        name: "Naive Bayes",
        description: "Probabilistic classifier",
    },
    ModelInfo {
        id: ModelId::Svm,
        name: "Support Vector Machine",
        description: "Powerful kernel-based classifier",
    },
];

impl ModelId {
    /// Wire identifier used in request payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Logistic => "logistic",
            Self::NaiveBayes => "naive_bayes",
            Self::Svm => "svm",
        }
    }

    /// Look up a model by its wire identifier.
    pub fn parse(value: &str) -> Option<Self> {
        MODELS
            .iter()
            .map(|info| info.id)
            .find(|id| id.as_str() == value)
    }

    pub fn info(self) -> &'static ModelInfo {
        match self {
            Self::Logistic => &MODELS[0],
            Self::NaiveBayes => &MODELS[1],
            Self::Svm => &MODELS[2],
        }
    }
}

/// All prefix lengths the slider can produce, in ascending order.
pub fn prefix_length_choices() -> impl Iterator<Item = u32> {
    (PREFIX_LENGTH_MIN..=PREFIX_LENGTH_MAX).step_by(PREFIX_LENGTH_STEP as usize)
}
