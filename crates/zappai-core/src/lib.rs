//! Core forecasting and planning library for the zappai agronomic system.
//!
//! Pure domain logic: no I/O, no async runtime. The `zappai-service` crate
//! composes this library behind an async facade.

pub mod calendar;
pub mod climate;
pub mod crop;
pub mod error;
pub mod features;
pub mod generator;
pub mod location;
pub mod metrics;
pub mod optimizer;
pub mod regressor;
pub mod scaler;
pub mod stats;
pub mod store;

pub use calendar::{months_between, YearMonth};
pub use climate::{
    FutureClimateRecord, PastClimateRecord, SoilTypeId, CMIP_OVERLAP_VARIABLES,
    ERA5_EXCLUSIVE_VARIABLES,
};
pub use crop::{Crop, CropYieldObservation};
pub use error::{Result, ZappaiError};
pub use generator::{ClimateGenerativeModel, ClimateGenerativeModelSnapshot, SEQUENCE_LENGTH};
pub use location::Location;
pub use metrics::{mse, r2, rmse};
pub use regressor::CropYieldRegressor;
pub use scaler::StandardScaler;
pub use stats::{compute_window_stats, WindowStats};
pub use store::{ClimateStore, InMemoryClimateStore};
