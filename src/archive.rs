use std::collections::BTreeMap;

use itertools::Itertools;

use crate::chromosome::Chromosome;
use crate::error::SearchError;
use crate::fitness::{fitness_or_worst, GoalId, GoalSet};

/// Best-known chromosome per goal. Invariant: every stored entry is optimal
/// for its goal; non-optimal candidates never touch the archive. An entry is
/// replaced only by a strictly shorter optimal candidate, so ties keep the
/// earliest discovery.
#[derive(Debug)]
pub struct Archive<C> {
    goals: GoalSet<C>,
    best: BTreeMap<GoalId, C>,
}

impl<C: Chromosome> Archive<C> {
    pub fn new(goals: GoalSet<C>) -> Self {
        Self {
            goals,
            best: BTreeMap::new(),
        }
    }

    pub fn reset(&mut self) {
        self.best.clear();
    }

    /// Offer a candidate for every goal it is optimal on.
    pub fn consider(&mut self, candidate: &C) -> Result<(), SearchError> {
        for (goal, function) in self.goals.iter() {
            let fitness = fitness_or_worst(function.as_ref(), candidate)?;
            if !function.is_optimal(fitness) {
                continue;
            }

            match self.best.get(&goal) {
                Some(current) if candidate.length() >= current.length() => {}
                _ => {
                    self.best.insert(goal, candidate.clone());
                }
            }
        }
        Ok(())
    }

    pub fn consider_all<'a>(
        &mut self,
        candidates: impl IntoIterator<Item = &'a C>,
    ) -> Result<(), SearchError>
    where
        C: 'a,
    {
        for candidate in candidates {
            self.consider(candidate)?;
        }
        Ok(())
    }

    pub fn get(&self, goal: GoalId) -> Option<&C> {
        self.best.get(&goal)
    }

    pub fn is_covered(&self, goal: GoalId) -> bool {
        self.best.contains_key(&goal)
    }

    /// Goals with no optimal entry yet, in stable goal order.
    pub fn uncovered_goals(&self) -> Vec<GoalId> {
        self.goals
            .ids()
            .filter(|goal| !self.best.contains_key(goal))
            .collect()
    }

    pub fn covered_count(&self) -> usize {
        self.best.len()
    }

    pub fn goal_count(&self) -> usize {
        self.goals.len()
    }

    pub fn all_covered(&self) -> bool {
        self.best.len() == self.goals.len()
    }

    /// Entries in goal-insertion order.
    pub fn values(&self) -> impl Iterator<Item = &C> {
        self.best.values()
    }

    /// Distinct archived chromosomes, in goal order of first appearance.
    pub fn best_individuals(&self) -> Vec<C> {
        self.best
            .values()
            .unique_by(|chromosome| chromosome.digest())
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chromosome::BitString;
    use crate::crossover::SinglePointCrossover;
    use crate::fitness::SingleBit;
    use crate::mutation::BitflipMutation;
    use std::rc::Rc;

    fn bitstring(genes: Vec<bool>) -> BitString {
        BitString::new(
            genes,
            Rc::new(BitflipMutation),
            Rc::new(SinglePointCrossover),
        )
    }

    fn goals(bits: usize) -> GoalSet<BitString> {
        let mut set = GoalSet::new();
        for bit in 0..bits {
            set.insert(bit as GoalId, Rc::new(SingleBit { bit }));
        }
        set
    }

    #[test]
    fn only_optimal_candidates_enter() {
        let mut archive = Archive::new(goals(3));
        archive.consider(&bitstring(vec![false, true, false])).unwrap();

        assert!(!archive.is_covered(0));
        assert!(archive.is_covered(1));
        assert!(!archive.is_covered(2));
        assert_eq!(archive.uncovered_goals(), vec![0, 2]);
    }

    #[test]
    fn shorter_optimal_candidate_replaces() {
        let mut archive = Archive::new(goals(2));
        let long = bitstring(vec![true, false, false, false]);
        let short = bitstring(vec![true, false]);

        archive.consider(&long).unwrap();
        archive.consider(&short).unwrap();
        assert_eq!(archive.get(0).unwrap(), &short);
    }

    #[test]
    fn equal_length_keeps_the_earliest() {
        let mut archive = Archive::new(goals(2));
        let first = bitstring(vec![true, false]);
        let second = bitstring(vec![true, true]);

        archive.consider(&first).unwrap();
        archive.consider(&second).unwrap();
        assert_eq!(archive.get(0).unwrap(), &first);
        assert_eq!(archive.get(1).unwrap(), &second);
    }

    #[test]
    fn best_individuals_deduplicate_across_goals() {
        let mut archive = Archive::new(goals(4));
        let all_ones = bitstring(vec![true; 4]);
        archive.consider(&all_ones).unwrap();

        assert!(archive.all_covered());
        assert_eq!(archive.best_individuals().len(), 1);
    }
}
