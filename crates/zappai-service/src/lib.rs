//! Async service facade composing zappai-core's pure domain logic behind a
//! shared, lock-guarded `AppState`.
//!
//! This is the boundary a request layer (HTTP, CLI, whatever) would sit
//! behind: each `*_service` type borrows `Arc<AppState>` and exposes async
//! methods, offloading CPU-bound model training and rollout to
//! `spawn_blocking`. No concrete network client or database is wired up
//! here (spec §6 non-goal); [`sources::ClimateDataSource`] and
//! [`sources::YieldDataSource`] are the seam where one would plug in.

pub mod climate_service;
pub mod crop_service;
pub mod error;
pub mod io;
pub mod location_service;
pub mod prediction_service;
pub mod retry;
pub mod sources;
pub mod state;

pub use climate_service::ClimateService;
pub use crop_service::CropService;
pub use error::{Result, ServiceError};
pub use location_service::LocationService;
pub use prediction_service::{PlantingRecommendation, PredictionService};
pub use sources::{ClimateDataSource, CropYieldRow, YieldDataSource};
pub use state::AppState;
