use std::time::Instant;

use crate::archive::Archive;
use crate::chromosome::Chromosome;
use crate::error::SearchError;
use crate::fitness::{scalarized_fitness, GoalSet};
use crate::generator::ChromosomeGenerator;
use crate::randomness::Randomness;
use crate::search_algorithm::{SearchAlgorithm, SearchSettings};
use crate::statistics::StatisticsCollector;
use crate::stopping::{SearchStatus, StoppingCondition};

/// (1+1) evolutionary algorithm: a single parent, one mutant per iteration,
/// acceptance whenever the fitness summed over all goals does not decrease.
pub struct OnePlusOne<C> {
    generator: Box<dyn ChromosomeGenerator<C>>,
    goals: GoalSet<C>,
    stopping_condition: Box<dyn StoppingCondition<C>>,
    rng: Randomness,
    statistics: StatisticsCollector,
    archive: Archive<C>,
    parent: Vec<C>,
    iterations: usize,
    start_time: Instant,
}

impl<C: Chromosome> OnePlusOne<C> {
    pub fn new(settings: SearchSettings<C>) -> Result<Self, SearchError> {
        if settings.selection.is_some() {
            return Err(SearchError::UnsupportedOperation(
                "(1+1) does not use a selection operator",
            ));
        }

        Ok(Self {
            generator: settings.generator,
            archive: Archive::new(settings.goals.clone()),
            goals: settings.goals,
            stopping_condition: settings.stopping_condition,
            rng: settings.rng,
            statistics: StatisticsCollector::new(),
            parent: Vec::new(),
            iterations: 0,
            start_time: Instant::now(),
        })
    }

    fn is_finished(&self) -> bool {
        let status = SearchStatus {
            iterations: self.iterations,
            start_time: self.start_time,
            current_solution: &self.parent,
            total_goals: self.goals.len(),
            uncovered_goals: self.archive.uncovered_goals().len(),
        };
        self.stopping_condition.is_finished(&status)
    }
}

impl<C: Chromosome> SearchAlgorithm<C> for OnePlusOne<C> {
    fn find_solution(&mut self) -> Result<Vec<C>, SearchError> {
        self.archive.reset();
        self.iterations = 0;
        self.start_time = Instant::now();
        self.statistics = StatisticsCollector::new();
        self.statistics.search_started(self.goals.len());

        let parent = self.generator.generate(&mut self.rng);
        let mut parent_fitness = scalarized_fitness(&self.goals, &parent)?;
        self.statistics.count_fitness_evaluation();
        self.archive.consider(&parent)?;
        self.parent = vec![parent];

        while !self.is_finished() {
            let child = self.parent[0].mutate(&mut self.rng);
            let child_fitness = scalarized_fitness(&self.goals, &child)?;
            self.statistics.count_fitness_evaluation();
            self.archive.consider(&child)?;

            if child_fitness >= parent_fitness {
                self.parent[0] = child;
                parent_fitness = child_fitness;
            }

            self.iterations += 1;
            self.statistics.count_iteration();
            self.statistics.update_coverage(self.archive.covered_count());
        }

        self.statistics.search_finished();
        let best = self.archive.best_individuals();
        if best.is_empty() {
            Ok(self.parent.clone())
        } else {
            Ok(best)
        }
    }

    fn iterations(&self) -> usize {
        self.iterations
    }

    fn start_time(&self) -> Instant {
        self.start_time
    }

    fn current_solution(&self) -> Vec<C> {
        self.parent.clone()
    }

    fn uncovered_goal_count(&self) -> usize {
        self.archive.uncovered_goals().len()
    }

    fn statistics(&self) -> &StatisticsCollector {
        &self.statistics
    }
}
