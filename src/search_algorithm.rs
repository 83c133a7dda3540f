use std::time::Instant;

use crate::chromosome::Chromosome;
use crate::error::SearchError;
use crate::fitness::GoalSet;
use crate::generator::ChromosomeGenerator;
use crate::randomness::Randomness;
use crate::selection::SelectionOperator;
use crate::statistics::StatisticsCollector;
use crate::stopping::StoppingCondition;

// Shared contract of the four search algorithms. Wiring happens once at
// construction through a SearchSettings bundle; a component handed to an
// algorithm that cannot honour it is rejected there with
// `UnsupportedOperation`.
pub trait SearchAlgorithm<C: Chromosome> {
    /// Run the search to completion and return the best individuals.
    fn find_solution(&mut self) -> Result<Vec<C>, SearchError>;

    fn iterations(&self) -> usize;

    fn start_time(&self) -> Instant;

    fn current_solution(&self) -> Vec<C>;

    fn uncovered_goal_count(&self) -> usize;

    fn statistics(&self) -> &StatisticsCollector;
}

/// Everything an algorithm needs at construction time.
pub struct SearchSettings<C> {
    pub generator: Box<dyn ChromosomeGenerator<C>>,
    pub goals: GoalSet<C>,
    pub stopping_condition: Box<dyn StoppingCondition<C>>,
    pub selection: Option<Box<dyn SelectionOperator<C>>>,
    pub rng: Randomness,
}
