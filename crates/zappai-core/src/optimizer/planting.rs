//! Optimal planting window search: which (sowing index, harvest index) pair
//! into a generated climate forecast maximizes a crop's predicted yield,
//! subject to its allowed farming duration.
//!
//! Built on [`super::genetic`], the way `crop_optimizer_service.py` wires a
//! generic `GeneticAlgorithm` to a crop-specific fitness function. Candidates
//! are encoded as a 10-bit chromosome (5 bits sowing index, 5 bits harvest
//! index, both little-endian) indexing into the forecast rather than
//! calendar months directly, so the fitness function never reaches outside
//! the current forecast horizon (spec §4.4, §9 "genetic search over indices,
//! not dates"). The chromosome and its fitness composition are this module's
//! own encoding, since the prototype's optimizer service was left unfinished.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::climate::PastClimateRecord;
use crate::crop::{Crop, CropYieldObservation};
use crate::features;
use crate::optimizer::genetic::{self, GeneticAlgorithmConfig};
use crate::regressor::CropYieldRegressor;

const MONTH_BITS: usize = 5;
const CHROMOSOME_LENGTH: usize = MONTH_BITS * 2;
const POPULATION_SIZE: usize = 20;
const MUTATION_RATE: f64 = 0.01;
const CROSSOVER_RATE: f64 = 0.7;
const GENERATIONS: usize = 20;

/// Default length, in months, of the forecast the search ranges over.
pub const DEFAULT_HORIZON: usize = 24;

/// A candidate planting window, decoded from a chromosome as a pair of
/// 0-based positions within the forecast series (the glossary's "sowing /
/// harvest month index").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlantingCandidate {
    pub sowing_index: usize,
    pub harvest_index: usize,
}

fn decode_index(bits: &[bool]) -> usize {
    genetic::chromosome_to_u32(bits) as usize
}

fn decode(chromosome: &[bool]) -> PlantingCandidate {
    PlantingCandidate {
        sowing_index: decode_index(&chromosome[..MONTH_BITS]),
        harvest_index: decode_index(&chromosome[MONTH_BITS..]),
    }
}

/// Predicted yield for `candidate` resolved against `forecast`, or `0.0`
/// (spec §7: `InvalidWindow` is internal to fitness, never a hard error) when
/// either index falls outside the forecast, the window is non-chronological,
/// its duration falls outside `crop`'s farming range, or climate data inside
/// it cannot be assembled into a feature row.
fn score_candidate(
    crop: &Crop,
    forecast: &[PastClimateRecord],
    regressor: &CropYieldRegressor,
    candidate: PlantingCandidate,
) -> f64 {
    if candidate.sowing_index >= forecast.len() || candidate.harvest_index >= forecast.len() {
        return 0.0;
    }
    let sowing = forecast[candidate.sowing_index].year_month;
    let harvest = forecast[candidate.harvest_index].year_month;
    let duration = sowing.months_until(harvest) + 1;
    if duration <= 0 || !crop.farming_months_range().contains(&(duration as u32)) {
        return 0.0;
    }
    let Ok(season) = features::select_growing_season(forecast, sowing, harvest) else {
        return 0.0;
    };
    let season: Vec<PastClimateRecord> = season.into_iter().copied().collect();
    // Yield and outlier flag are irrelevant to feature assembly; this
    // observation only carries the window's dates through to the row.
    let observation = CropYieldObservation {
        location_id: uuid::Uuid::nil(),
        crop_id: crop.id,
        sowing,
        harvest,
        yield_per_hectare: 0.0,
        is_outlier: false,
    };
    let Ok(row) = features::regressor_feature_row(&observation, &season) else {
        return 0.0;
    };
    regressor.predict(&row).unwrap_or(0.0).max(0.0)
}

/// Searches the `forecast` for up to `top_k` distinct (sowing, harvest) index
/// pairs maximizing predicted yield, subject to `crop`'s farming-duration
/// range. Returns the survivors of the final generation, deduplicated by
/// candidate and sorted by fitness descending (spec §8 property 8 / S4);
/// windows with fitness `0.0` are included only if every candidate scored
/// zero, since a literal zero is itself a valid (if useless) prediction.
pub fn optimize_planting_window(
    crop: &Crop,
    forecast: &[PastClimateRecord],
    regressor: &CropYieldRegressor,
    seed: u64,
    top_k: usize,
) -> Vec<(PlantingCandidate, f64)> {
    let config = GeneticAlgorithmConfig {
        chromosome_length: CHROMOSOME_LENGTH,
        population_size: POPULATION_SIZE,
        mutation_rate: MUTATION_RATE,
        crossover_rate: CROSSOVER_RATE,
        generations: GENERATIONS,
    };
    let mut rng = StdRng::seed_from_u64(seed);
    let fitness =
        |chromosome: &genetic::Chromosome| -> f64 { score_candidate(crop, forecast, regressor, decode(chromosome)) };

    let scored_population = genetic::run_population(config, &mut rng, fitness);

    let mut seen = std::collections::HashSet::new();
    let mut top = Vec::new();
    for (chromosome, fitness) in scored_population {
        let candidate = decode(&chromosome);
        if seen.insert((candidate.sowing_index, candidate.harvest_index)) {
            top.push((candidate, fitness));
        }
        if top.len() == top_k {
            break;
        }
    }
    top
}
