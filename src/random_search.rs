use std::collections::BTreeSet;
use std::time::Instant;

use crate::chromosome::Chromosome;
use crate::error::SearchError;
use crate::fitness::{GoalId, GoalSet};
use crate::generator::ChromosomeGenerator;
use crate::randomness::Randomness;
use crate::search_algorithm::{SearchAlgorithm, SearchSettings};
use crate::statistics::StatisticsCollector;
use crate::stopping::{SearchStatus, StoppingCondition};

/// Draws one fresh chromosome per iteration. A chromosome joins the suite
/// once if it covers at least one still-uncovered goal, so every returned
/// test covers something no earlier test did.
pub struct RandomSearch<C> {
    generator: Box<dyn ChromosomeGenerator<C>>,
    goals: GoalSet<C>,
    stopping_condition: Box<dyn StoppingCondition<C>>,
    rng: Randomness,
    statistics: StatisticsCollector,
    suite: Vec<C>,
    uncovered: BTreeSet<GoalId>,
    iterations: usize,
    start_time: Instant,
}

impl<C: Chromosome> RandomSearch<C> {
    pub fn new(settings: SearchSettings<C>) -> Result<Self, SearchError> {
        if settings.selection.is_some() {
            return Err(SearchError::UnsupportedOperation(
                "random search does not use a selection operator",
            ));
        }

        Ok(Self {
            generator: settings.generator,
            uncovered: settings.goals.ids().collect(),
            goals: settings.goals,
            stopping_condition: settings.stopping_condition,
            rng: settings.rng,
            statistics: StatisticsCollector::new(),
            suite: Vec::new(),
            iterations: 0,
            start_time: Instant::now(),
        })
    }

    fn is_finished(&self) -> bool {
        let status = SearchStatus {
            iterations: self.iterations,
            start_time: self.start_time,
            current_solution: &self.suite,
            total_goals: self.goals.len(),
            uncovered_goals: self.uncovered.len(),
        };
        self.stopping_condition.is_finished(&status)
    }
}

impl<C: Chromosome> SearchAlgorithm<C> for RandomSearch<C> {
    fn find_solution(&mut self) -> Result<Vec<C>, SearchError> {
        self.suite.clear();
        self.uncovered = self.goals.ids().collect();
        self.iterations = 0;
        self.start_time = Instant::now();
        self.statistics = StatisticsCollector::new();
        self.statistics.search_started(self.goals.len());

        while !self.is_finished() {
            let candidate = self.generator.generate(&mut self.rng);
            self.statistics.count_fitness_evaluation();

            let mut added = false;
            let open: Vec<GoalId> = self.uncovered.iter().copied().collect();
            for goal in open {
                let function = match self.goals.get(goal) {
                    Some(function) => function,
                    None => continue,
                };
                if function.is_covered(&candidate)? {
                    if !added {
                        self.suite.push(candidate.clone());
                        added = true;
                    }
                    self.uncovered.remove(&goal);
                }
            }

            self.iterations += 1;
            self.statistics.count_iteration();
            self.statistics
                .update_coverage(self.goals.len() - self.uncovered.len());
        }

        self.statistics.search_finished();
        Ok(self.suite.clone())
    }

    fn iterations(&self) -> usize {
        self.iterations
    }

    fn start_time(&self) -> Instant {
        self.start_time
    }

    fn current_solution(&self) -> Vec<C> {
        self.suite.clone()
    }

    fn uncovered_goal_count(&self) -> usize {
        self.uncovered.len()
    }

    fn statistics(&self) -> &StatisticsCollector {
        &self.statistics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chromosome::BitString;
    use crate::crossover::SinglePointCrossover;
    use crate::fitness::SingleBit;
    use crate::generator::BitStringGenerator;
    use crate::mutation::BitflipMutation;
    use crate::stopping::FixedIterations;
    use std::rc::Rc;

    fn settings(bits: usize, budget: usize, seed: u64) -> SearchSettings<BitString> {
        let mut goals: GoalSet<BitString> = GoalSet::new();
        for bit in 0..bits {
            goals.insert(bit as GoalId, Rc::new(SingleBit { bit }));
        }

        SearchSettings {
            generator: Box::new(BitStringGenerator {
                length: bits,
                mutation: Rc::new(BitflipMutation),
                crossover: Rc::new(SinglePointCrossover),
            }),
            goals,
            stopping_condition: Box::new(FixedIterations {
                max_iterations: budget,
            }),
            selection: None,
            rng: Randomness::from_seed(seed),
        }
    }

    #[test]
    fn every_test_covers_a_fresh_goal() {
        let mut search = RandomSearch::new(settings(10, 1000, 42)).unwrap();
        let suite = search.find_solution().unwrap();

        assert!(suite.len() <= 10);
        assert!(!suite.is_empty());

        let mut covered: Vec<usize> = Vec::new();
        for test in &suite {
            let fresh: Vec<usize> = (0..10)
                .filter(|&bit| test.genes()[bit] && !covered.contains(&bit))
                .collect();
            assert!(!fresh.is_empty());
            covered.extend(fresh);
        }
    }

    #[test]
    fn selection_operator_is_rejected() {
        let mut settings = settings(4, 10, 0);
        settings.selection = Some(Box::new(crate::selection::RankSelection));

        assert!(matches!(
            RandomSearch::new(settings),
            Err(SearchError::UnsupportedOperation(_))
        ));
    }

    #[test]
    fn budget_bounds_the_iterations() {
        let mut search = RandomSearch::new(settings(10, 25, 7)).unwrap();
        search.find_solution().unwrap();
        assert_eq!(search.iterations(), 25);
    }
}
