use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::rc::Rc;

use crate::chromosome::BitString;
use crate::error::SearchError;
use crate::execution_host::TestChromosome;

pub type GoalId = u32;

// One instance per coverage goal. The whole crate fixes a single direction:
// higher fitness is better, and minimizing measures negate before returning.
pub trait FitnessFunction<C>: Debug {
    fn get_fitness(&self, chromosome: &C) -> Result<f64, SearchError>;

    /// Monotone: once optimal, any improvement stays optimal.
    fn is_optimal(&self, fitness: f64) -> bool;

    /// Total order on fitness values; `Greater` means the first argument is
    /// the better one.
    fn compare(&self, a: f64, b: f64) -> Ordering {
        a.total_cmp(&b)
    }

    fn is_covered(&self, chromosome: &C) -> Result<bool, SearchError> {
        Ok(self.is_optimal(self.get_fitness(chromosome)?))
    }

    /// Fitness assigned when the execution host reports a failed run.
    fn worst(&self) -> f64 {
        f64::NEG_INFINITY
    }

    /// Normalised priority in `[0, 1]`, used by MIO to rank bucket entries.
    fn heuristic(&self, fitness: f64) -> f64 {
        if self.is_optimal(fitness) {
            1.0
        } else if fitness < 0.0 {
            1.0 / (1.0 - fitness)
        } else {
            fitness / (fitness + 1.0)
        }
    }
}

/// Fitness with execution failures folded into worst-case; every other error
/// terminates the run.
pub(crate) fn fitness_or_worst<C>(
    function: &dyn FitnessFunction<C>,
    chromosome: &C,
) -> Result<f64, SearchError> {
    match function.get_fitness(chromosome) {
        Ok(fitness) => Ok(fitness),
        Err(SearchError::ExecutionFailure(_)) => Ok(function.worst()),
        Err(other) => Err(other),
    }
}

/// Fitness summed over every goal, the scalarisation used by the (1+1)
/// algorithm and tournament selection.
pub(crate) fn scalarized_fitness<C>(goals: &GoalSet<C>, chromosome: &C) -> Result<f64, SearchError> {
    let mut total = 0.0;
    for (_, function) in goals.iter() {
        total += fitness_or_worst(function.as_ref(), chromosome)?;
    }
    Ok(total)
}

/// The set of goals for a run. Ids are assigned densely from zero in
/// insertion order, so iteration in ascending-id order is insertion order
/// and stays stable across the run.
pub struct GoalSet<C> {
    goals: BTreeMap<GoalId, Rc<dyn FitnessFunction<C>>>,
}

impl<C> Clone for GoalSet<C> {
    fn clone(&self) -> Self {
        Self {
            goals: self.goals.clone(),
        }
    }
}

impl<C> Debug for GoalSet<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoalSet")
            .field("goals", &self.goals.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<C> Default for GoalSet<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> GoalSet<C> {
    pub fn new() -> Self {
        Self {
            goals: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, id: GoalId, function: Rc<dyn FitnessFunction<C>>) {
        self.goals.insert(id, function);
    }

    pub fn get(&self, id: GoalId) -> Option<&Rc<dyn FitnessFunction<C>>> {
        self.goals.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (GoalId, &Rc<dyn FitnessFunction<C>>)> {
        self.goals.iter().map(|(&id, function)| (id, function))
    }

    pub fn ids(&self) -> impl Iterator<Item = GoalId> + '_ {
        self.goals.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.goals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.goals.is_empty()
    }
}

/// Number of `true` genes; optimal when every bit is set.
#[derive(Clone, Copy, Debug)]
pub struct OneMax {
    pub length: usize,
}

impl FitnessFunction<BitString> for OneMax {
    fn get_fitness(&self, chromosome: &BitString) -> Result<f64, SearchError> {
        Ok(chromosome.genes().iter().filter(|&&gene| gene).count() as f64)
    }

    fn is_optimal(&self, fitness: f64) -> bool {
        fitness >= self.length as f64
    }

    fn worst(&self) -> f64 {
        0.0
    }

    fn heuristic(&self, fitness: f64) -> f64 {
        if self.length == 0 {
            1.0
        } else {
            (fitness / self.length as f64).clamp(0.0, 1.0)
        }
    }
}

/// Optimal iff bit `k` is set.
#[derive(Clone, Copy, Debug)]
pub struct SingleBit {
    pub bit: usize,
}

impl FitnessFunction<BitString> for SingleBit {
    fn get_fitness(&self, chromosome: &BitString) -> Result<f64, SearchError> {
        let set = chromosome.genes().get(self.bit).copied().unwrap_or(false);
        Ok(if set { 1.0 } else { 0.0 })
    }

    fn is_optimal(&self, fitness: f64) -> bool {
        fitness >= 1.0
    }

    fn worst(&self) -> f64 {
        0.0
    }
}

/// OneMax analog over integer genes: the summed distance of every gene from
/// the top of its range, negated. Optimal when every gene sits at `max`.
#[derive(Clone, Copy, Debug)]
pub struct IntegerOneMax {
    pub max: i64,
}

impl FitnessFunction<crate::chromosome::IntegerList> for IntegerOneMax {
    fn get_fitness(
        &self,
        chromosome: &crate::chromosome::IntegerList,
    ) -> Result<f64, SearchError> {
        let distance: i64 = chromosome
            .genes()
            .iter()
            .map(|&gene| (self.max - gene).max(0))
            .sum();
        Ok(-(distance as f64))
    }

    fn is_optimal(&self, fitness: f64) -> bool {
        fitness >= 0.0
    }
}

/// Coverage of one program statement, derived from the execution trace.
/// Zero once the statement executes; otherwise the negated approach-level
/// and branch-distance measure the host reported for it. A run that leaves
/// no measure for the statement scores worst.
#[derive(Clone, Copy, Debug)]
pub struct StatementCoverage {
    pub statement: u64,
}

impl FitnessFunction<TestChromosome> for StatementCoverage {
    fn get_fitness(&self, chromosome: &TestChromosome) -> Result<f64, SearchError> {
        let trace = chromosome.trace()?;
        if trace.was_executed(self.statement) {
            return Ok(0.0);
        }
        Ok(match trace.distance(self.statement) {
            Some(distance) => -distance.max(0.0),
            None => self.worst(),
        })
    }

    fn is_optimal(&self, fitness: f64) -> bool {
        fitness >= 0.0
    }

    fn is_covered(&self, chromosome: &TestChromosome) -> Result<bool, SearchError> {
        match chromosome.trace() {
            Ok(trace) => Ok(trace.was_executed(self.statement)),
            Err(SearchError::ExecutionFailure(_)) => Ok(false),
            Err(other) => Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crossover::SinglePointCrossover;
    use crate::mutation::BitflipMutation;

    fn bitstring(genes: Vec<bool>) -> BitString {
        BitString::new(
            genes,
            Rc::new(BitflipMutation),
            Rc::new(SinglePointCrossover),
        )
    }

    #[test]
    fn one_max_counts_set_bits() {
        let function = OneMax { length: 4 };
        assert_eq!(
            function
                .get_fitness(&bitstring(vec![true, false, true, true]))
                .unwrap(),
            3.0
        );
        assert!(!function.is_optimal(3.0));
        assert!(function.is_optimal(4.0));
    }

    #[test]
    fn single_bit_is_binary() {
        let function = SingleBit { bit: 2 };
        let covered = bitstring(vec![false, false, true]);
        let uncovered = bitstring(vec![true, true, false]);

        assert!(function.is_covered(&covered).unwrap());
        assert!(!function.is_covered(&uncovered).unwrap());
    }

    #[test]
    fn compare_is_a_total_order_with_greater_meaning_better() {
        let function = OneMax { length: 8 };
        assert_eq!(function.compare(3.0, 1.0), Ordering::Greater);
        assert_eq!(function.compare(1.0, 3.0), Ordering::Less);
        assert_eq!(function.compare(2.0, 2.0), Ordering::Equal);
    }

    #[test]
    fn heuristic_is_normalised() {
        let function = OneMax { length: 10 };
        assert_eq!(function.heuristic(0.0), 0.0);
        assert_eq!(function.heuristic(5.0), 0.5);
        assert_eq!(function.heuristic(10.0), 1.0);

        let bit = SingleBit { bit: 0 };
        assert_eq!(bit.heuristic(1.0), 1.0);
        assert_eq!(bit.heuristic(0.0), 0.0);
    }

    #[test]
    fn goal_iteration_is_stable_insertion_order() {
        let mut goals: GoalSet<BitString> = GoalSet::new();
        for bit in 0..5 {
            goals.insert(bit as GoalId, Rc::new(SingleBit { bit }));
        }

        let ids: Vec<GoalId> = goals.ids().collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
    }
}
