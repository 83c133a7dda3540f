use std::fmt::Debug;

use crate::chromosome::Chromosome;
use crate::error::SearchError;
use crate::fitness::{scalarized_fitness, GoalSet};
use crate::randomness::Randomness;

pub trait SelectionOperator<C>: Debug {
    fn select(&self, population: &[C], rng: &mut Randomness) -> Result<C, SearchError>;
}

/// Draws rank `k` with probability proportional to `k + 1`. Expects the
/// population sorted ascending by quality, worst first; algorithms that
/// supply a population must sort accordingly before calling.
#[derive(Clone, Copy, Debug, Default)]
pub struct RankSelection;

impl<C: Chromosome> SelectionOperator<C> for RankSelection {
    fn select(&self, population: &[C], rng: &mut Randomness) -> Result<C, SearchError> {
        if population.is_empty() {
            return Err(SearchError::invalid("rank selection over empty population"));
        }

        let n = population.len();
        let total = n * (n + 1) / 2;
        let mut draw = rng.next_usize(total);
        for (rank, individual) in population.iter().enumerate() {
            let weight = rank + 1;
            if draw < weight {
                return Ok(individual.clone());
            }
            draw -= weight;
        }

        Ok(population[n - 1].clone())
    }
}

/// `size` uniform draws; the winner has the best fitness summed over the
/// configured goals.
#[derive(Debug)]
pub struct TournamentSelection<C> {
    pub size: usize,
    pub goals: GoalSet<C>,
}

impl<C: Chromosome> SelectionOperator<C> for TournamentSelection<C> {
    fn select(&self, population: &[C], rng: &mut Randomness) -> Result<C, SearchError> {
        if population.is_empty() {
            return Err(SearchError::invalid(
                "tournament selection over empty population",
            ));
        }

        let mut best = rng.pick(population);
        let mut best_fitness = scalarized_fitness(&self.goals, best)?;

        for _ in 1..self.size {
            let challenger = rng.pick(population);
            let challenger_fitness = scalarized_fitness(&self.goals, challenger)?;
            if challenger_fitness > best_fitness {
                best = challenger;
                best_fitness = challenger_fitness;
            }
        }

        Ok(best.clone())
    }
}
