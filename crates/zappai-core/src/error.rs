//! Error types for the zappai core.

use thiserror::Error;

/// Result type for zappai-core operations.
pub type Result<T> = std::result::Result<T, ZappaiError>;

/// Domain error kinds, one per spec §7 failure mode. A caller (the
/// `zappai-service` boundary, a test, a CLI) matches on these directly rather
/// than on a string.
#[derive(Error, Debug)]
pub enum ZappaiError {
    #[error("location not found")]
    LocationNotFound,

    #[error("crop not found")]
    CropNotFound,

    #[error("no past climate data found for the requested window")]
    PastClimateDataNotFound,

    #[error("no crop yield data found")]
    CropYieldDataNotFound,

    #[error("no climate generative model found for this location")]
    ClimateGenerativeModelNotFound,

    #[error("no crop yield model found for this crop")]
    CropYieldModelNotFound,

    #[error("insufficient history: need at least {needed} past months, got {got}")]
    InsufficientHistory { needed: usize, got: usize },

    #[error("seed ends at {seed_end:?}, expected projection to start at {expected:?}, got {projection_start:?}")]
    NonSequentialSeed {
        seed_end: (i32, u32),
        projection_start: (i32, u32),
        expected: (i32, u32),
    },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("computation error: {0}")]
    ComputationError(String),

    #[error("no stored record matches the requested range")]
    NotFound,
}

impl ZappaiError {
    /// Stable kind string, used by `zappai-service` to build the
    /// `{ "error": <kind> }` response shape spec §6 requires.
    pub fn kind(&self) -> &'static str {
        match self {
            ZappaiError::LocationNotFound => "location_not_found",
            ZappaiError::CropNotFound => "crop_not_found",
            ZappaiError::PastClimateDataNotFound => "past_climate_data_not_found",
            ZappaiError::CropYieldDataNotFound => "crop_yield_data_not_found",
            ZappaiError::ClimateGenerativeModelNotFound => "climate_generative_model_not_found",
            ZappaiError::CropYieldModelNotFound => "crop_yield_model_not_found",
            ZappaiError::InsufficientHistory { .. } => "insufficient_history",
            ZappaiError::NonSequentialSeed { .. } => "non_sequential_seed",
            ZappaiError::InvalidInput(_) => "invalid_input",
            ZappaiError::ComputationError(_) => "computation_error",
            ZappaiError::NotFound => "not_found",
        }
    }
}
