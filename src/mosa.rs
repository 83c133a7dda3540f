use std::time::Instant;

use crate::archive::Archive;
use crate::chromosome::Chromosome;
use crate::error::SearchError;
use crate::fitness::{fitness_or_worst, GoalSet};
use crate::generator::ChromosomeGenerator;
use crate::non_dominated_sort::{preference_sort, sub_vector_dominance};
use crate::randomness::Randomness;
use crate::search_algorithm::{SearchAlgorithm, SearchSettings};
use crate::selection::{RankSelection, SelectionOperator};
use crate::statistics::StatisticsCollector;
use crate::stopping::{SearchStatus, StoppingCondition};

#[derive(Clone, Copy, Debug)]
pub struct MosaProperties {
    pub population_size: usize,
    pub crossover_probability: f64,
    pub mutation_probability: f64,
}

/// Many-objective sorting algorithm. Survival is driven by preference
/// sorting over the goals without an archive entry; overflowing fronts are
/// truncated by ascending sub-vector dominance after a pre-shuffle, so
/// behavior is deterministic under a fixed seed.
pub struct Mosa<C> {
    generator: Box<dyn ChromosomeGenerator<C>>,
    goals: GoalSet<C>,
    stopping_condition: Box<dyn StoppingCondition<C>>,
    selection: Box<dyn SelectionOperator<C>>,
    properties: MosaProperties,
    rng: Randomness,
    statistics: StatisticsCollector,
    archive: Archive<C>,
    population: Vec<C>,
    iterations: usize,
    start_time: Instant,
}

impl<C: Chromosome + 'static> Mosa<C> {
    pub fn new(settings: SearchSettings<C>, properties: MosaProperties) -> Result<Self, SearchError> {
        if properties.population_size == 0 {
            return Err(SearchError::invalid("MOSA needs a population size of at least 1"));
        }

        let selection = settings
            .selection
            .unwrap_or_else(|| Box::new(RankSelection));

        Ok(Self {
            generator: settings.generator,
            archive: Archive::new(settings.goals.clone()),
            goals: settings.goals,
            stopping_condition: settings.stopping_condition,
            selection,
            properties,
            rng: settings.rng,
            statistics: StatisticsCollector::new(),
            population: Vec::new(),
            iterations: 0,
            start_time: Instant::now(),
        })
    }

    fn is_finished(&self) -> bool {
        let status = SearchStatus {
            iterations: self.iterations,
            start_time: self.start_time,
            current_solution: &self.population,
            total_goals: self.goals.len(),
            uncovered_goals: self.archive.uncovered_goals().len(),
        };
        self.stopping_condition.is_finished(&status)
    }

    fn generate_offspring(&mut self) -> Result<Vec<C>, SearchError> {
        let size = self.properties.population_size;
        let mut offspring = Vec::with_capacity(size);

        while offspring.len() < size {
            // The initial population has no meaningful ordering yet; rank
            // selection kicks in from the second generation.
            let (parent_one, parent_two) = if self.iterations == 0 {
                (
                    self.rng.pick(&self.population).clone(),
                    self.rng.pick(&self.population).clone(),
                )
            } else {
                (
                    self.selection.select(&self.population, &mut self.rng)?,
                    self.selection.select(&self.population, &mut self.rng)?,
                )
            };

            let (mut child_one, mut child_two) =
                if self.rng.next_probability(self.properties.crossover_probability) {
                    parent_one.crossover(&parent_two, &mut self.rng)
                } else {
                    (parent_one, parent_two)
                };

            if self.rng.next_probability(self.properties.mutation_probability) {
                child_one = child_one.mutate(&mut self.rng);
            }
            if self.rng.next_probability(self.properties.mutation_probability) {
                child_two = child_two.mutate(&mut self.rng);
            }

            self.statistics.count_fitness_evaluation();
            offspring.push(child_one);
            if offspring.len() < size {
                self.statistics.count_fitness_evaluation();
                offspring.push(child_two);
            }
        }

        Ok(offspring)
    }

    /// Fill the next population front by front; an overflowing front is
    /// shuffled, stable-sorted by ascending SVD and cut to fit.
    fn select_survivors(&mut self, combined: Vec<C>) -> Result<Vec<C>, SearchError> {
        let size = self.properties.population_size;
        let uncovered = self.archive.uncovered_goals();

        let mut matrix: Vec<Vec<f64>> = Vec::with_capacity(combined.len());
        for chromosome in &combined {
            let mut row = Vec::with_capacity(uncovered.len());
            for &goal in &uncovered {
                let function = self
                    .goals
                    .get(goal)
                    .ok_or_else(|| SearchError::invalid(format!("unknown goal {goal}")))?;
                row.push(fitness_or_worst(function.as_ref(), chromosome)?);
            }
            matrix.push(row);
        }
        let lengths: Vec<usize> = combined.iter().map(Chromosome::length).collect();

        let fronts = preference_sort(&matrix, &lengths, size);

        let mut survivors: Vec<C> = Vec::with_capacity(size);
        for front in fronts {
            if survivors.len() == size {
                break;
            }
            if survivors.len() + front.len() <= size {
                survivors.extend(front.into_iter().map(|row| combined[row].clone()));
            } else {
                let mut front = front;
                self.rng.shuffle(&mut front);
                let scores = sub_vector_dominance(&matrix, &front);
                let mut scored: Vec<(usize, usize)> =
                    front.into_iter().zip(scores).collect();
                scored.sort_by_key(|&(_, score)| score);
                survivors.extend(
                    scored
                        .into_iter()
                        .take(size - survivors.len())
                        .map(|(row, _)| combined[row].clone()),
                );
            }
        }

        debug_assert_eq!(survivors.len(), size);
        Ok(survivors)
    }
}

impl<C: Chromosome + 'static> SearchAlgorithm<C> for Mosa<C> {
    fn find_solution(&mut self) -> Result<Vec<C>, SearchError> {
        self.archive.reset();
        self.iterations = 0;
        self.start_time = Instant::now();
        self.statistics = StatisticsCollector::new();
        self.statistics.search_started(self.goals.len());

        self.population = (0..self.properties.population_size)
            .map(|_| {
                self.statistics.count_fitness_evaluation();
                self.generator.generate(&mut self.rng)
            })
            .collect();
        self.archive.consider_all(self.population.iter())?;
        self.statistics.update_coverage(self.archive.covered_count());

        while !self.is_finished() {
            let offspring = self.generate_offspring()?;
            self.archive.consider_all(offspring.iter())?;

            let mut combined = self.population.clone();
            combined.extend(offspring);

            let mut survivors = self.select_survivors(combined)?;
            self.archive.consider_all(survivors.iter())?;

            // Rank selection expects ascending quality, worst first.
            survivors.reverse();
            self.population = survivors;

            self.iterations += 1;
            self.statistics.count_iteration();
            self.statistics.update_coverage(self.archive.covered_count());
        }

        self.statistics.search_finished();
        Ok(self.archive.best_individuals())
    }

    fn iterations(&self) -> usize {
        self.iterations
    }

    fn start_time(&self) -> Instant {
        self.start_time
    }

    fn current_solution(&self) -> Vec<C> {
        self.population.clone()
    }

    fn uncovered_goal_count(&self) -> usize {
        self.archive.uncovered_goals().len()
    }

    fn statistics(&self) -> &StatisticsCollector {
        &self.statistics
    }
}
