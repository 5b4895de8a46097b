//! A domain-agnostic genetic algorithm over fixed-length bit chromosomes.
//!
//! Grounded in `tesi/zappai/utils/genetic.py`'s `GeneticAlgorithm`: generate
//! a random population, repeatedly select-crossover-mutate into the next
//! generation, then report either the fittest individual ([`run`]) or the
//! whole scored final population ([`run_population`]), for callers that need
//! more than just the single best. Selection is fitness-proportionate
//! (roulette wheel); REDESIGN FLAGS replaces the prototype's
//! divide-by-zero-on-zero-total-fitness with a uniform fallback.

use rand::rngs::StdRng;
use rand::Rng;

pub type Chromosome = Vec<bool>;

/// Tunable parameters of one genetic algorithm run.
#[derive(Debug, Clone, Copy)]
pub struct GeneticAlgorithmConfig {
    pub chromosome_length: usize,
    pub population_size: usize,
    pub mutation_rate: f64,
    pub crossover_rate: f64,
    pub generations: usize,
}

/// Runs the algorithm to completion and returns the fittest chromosome of
/// the final generation along with its fitness.
pub fn run<F>(config: GeneticAlgorithmConfig, rng: &mut StdRng, fitness: F) -> (Chromosome, f64)
where
    F: Fn(&Chromosome) -> f64,
{
    let population = run_population(config, rng, &fitness);
    population.into_iter().next().unwrap_or_else(|| (Vec::new(), 0.0))
}

/// Runs the algorithm to completion and returns every individual of the
/// final generation paired with its fitness, sorted by fitness descending.
/// Lets a caller pick more than just the single fittest individual (e.g. the
/// top-K distinct candidates of a search).
pub fn run_population<F>(
    config: GeneticAlgorithmConfig,
    rng: &mut StdRng,
    fitness: F,
) -> Vec<(Chromosome, f64)>
where
    F: Fn(&Chromosome) -> f64,
{
    let mut population = generate_population(config, rng);
    for _ in 0..config.generations.saturating_sub(1) {
        population = next_generation(&population, config, rng, &fitness);
    }
    let mut scored: Vec<(Chromosome, f64)> = population
        .into_iter()
        .map(|individual| {
            let f = fitness(&individual);
            (individual, f)
        })
        .collect();
    scored.sort_by(|(_, a), (_, b)| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
    scored
}

fn generate_population(config: GeneticAlgorithmConfig, rng: &mut StdRng) -> Vec<Chromosome> {
    (0..config.population_size)
        .map(|_| (0..config.chromosome_length).map(|_| rng.gen_bool(0.5)).collect())
        .collect()
}

/// Fitness-proportionate selection; falls back to a uniform pick when the
/// population's total fitness is zero (the prototype divides by it
/// unconditionally, which would panic here).
fn select<'a, F>(population: &'a [Chromosome], rng: &mut StdRng, fitness: &F) -> &'a Chromosome
where
    F: Fn(&Chromosome) -> f64,
{
    let fitnesses: Vec<f64> = population.iter().map(fitness).collect();
    let total: f64 = fitnesses.iter().sum();
    if total <= 0.0 {
        let index = rng.gen_range(0..population.len());
        return &population[index];
    }
    let target = rng.gen_range(0.0..total);
    let mut cumulative = 0.0;
    for (individual, f) in population.iter().zip(fitnesses.iter()) {
        cumulative += f;
        if cumulative >= target {
            return individual;
        }
    }
    population.last().unwrap()
}

fn crossover(
    parent1: &Chromosome,
    parent2: &Chromosome,
    config: GeneticAlgorithmConfig,
    rng: &mut StdRng,
) -> (Chromosome, Chromosome) {
    if rng.gen_bool(config.crossover_rate) && parent1.len() > 1 {
        let point = rng.gen_range(1..parent1.len());
        let child1 = [&parent1[..point], &parent2[point..]].concat();
        let child2 = [&parent2[..point], &parent1[point..]].concat();
        (child1, child2)
    } else {
        (parent1.clone(), parent2.clone())
    }
}

fn mutate(individual: &Chromosome, config: GeneticAlgorithmConfig, rng: &mut StdRng) -> Chromosome {
    individual
        .iter()
        .map(|&bit| if rng.gen_bool(config.mutation_rate) { !bit } else { bit })
        .collect()
}

fn next_generation<F>(
    population: &[Chromosome],
    config: GeneticAlgorithmConfig,
    rng: &mut StdRng,
    fitness: &F,
) -> Vec<Chromosome>
where
    F: Fn(&Chromosome) -> f64,
{
    let mut next = Vec::with_capacity(population.len());
    for _ in 0..population.len() / 2 {
        let parent1 = select(population, rng, fitness).clone();
        let parent2 = select(population, rng, fitness).clone();
        let (child1, child2) = crossover(&parent1, &parent2, config, rng);
        next.push(mutate(&child1, config, rng));
        next.push(mutate(&child2, config, rng));
    }
    next
}

/// Little-endian bit-to-integer decoding (`individual_to_int`): bit `i`
/// contributes `2^i`.
pub fn chromosome_to_u32(chromosome: &[bool]) -> u32 {
    chromosome
        .iter()
        .enumerate()
        .fold(0u32, |acc, (i, &bit)| acc + if bit { 1 << i } else { 0 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    /// Spec §8 property 7: the algorithm converges toward the optimum of a
    /// unimodal fitness landscape (maximize the encoded integer).
    #[test]
    fn converges_toward_the_fitness_maximum() {
        let config = GeneticAlgorithmConfig {
            chromosome_length: 8,
            population_size: 20,
            mutation_rate: 0.01,
            crossover_rate: 0.7,
            generations: 40,
        };
        let mut rng = StdRng::seed_from_u64(7);
        let (best, fitness) = run(config, &mut rng, |c| chromosome_to_u32(c) as f64);
        assert_eq!(fitness, chromosome_to_u32(&best) as f64);
        assert!(fitness > 100.0, "expected convergence near 255, got {fitness}");
    }

    #[test]
    fn chromosome_to_u32_is_little_endian() {
        assert_eq!(chromosome_to_u32(&[true, false, false]), 1);
        assert_eq!(chromosome_to_u32(&[false, true, false]), 2);
        assert_eq!(chromosome_to_u32(&[true, true, false]), 3);
    }

    #[test]
    fn run_population_is_sorted_by_fitness_descending() {
        let config = GeneticAlgorithmConfig {
            chromosome_length: 6,
            population_size: 10,
            mutation_rate: 0.01,
            crossover_rate: 0.7,
            generations: 10,
        };
        let mut rng = StdRng::seed_from_u64(3);
        let population = run_population(config, &mut rng, |c| chromosome_to_u32(c) as f64);
        assert_eq!(population.len(), config.population_size);
        for window in population.windows(2) {
            assert!(window[0].1 >= window[1].1);
        }
    }

    #[test]
    fn select_falls_back_to_uniform_when_total_fitness_is_zero() {
        let config = GeneticAlgorithmConfig {
            chromosome_length: 4,
            population_size: 6,
            mutation_rate: 0.0,
            crossover_rate: 0.0,
            generations: 1,
        };
        let mut rng = StdRng::seed_from_u64(1);
        let (_best, fitness) = run(config, &mut rng, |_| 0.0);
        assert_eq!(fitness, 0.0);
    }
}
