use std::fmt::Debug;
use std::rc::Rc;

use crate::chromosome::{BitString, IntegerList};
use crate::crossover::CrossoverOperator;
use crate::execution_host::{SharedHost, TestChromosome};
use crate::mutation::MutationOperator;
use crate::randomness::Randomness;

// Factories for random initial chromosomes. A factory owns the operator
// handles it stamps into everything it produces.
pub trait ChromosomeGenerator<C> {
    fn generate(&self, rng: &mut Randomness) -> C;
}

#[derive(Debug)]
pub struct BitStringGenerator {
    pub length: usize,
    pub mutation: Rc<dyn MutationOperator<BitString>>,
    pub crossover: Rc<dyn CrossoverOperator<BitString>>,
}

impl ChromosomeGenerator<BitString> for BitStringGenerator {
    fn generate(&self, rng: &mut Randomness) -> BitString {
        let genes = (0..self.length).map(|_| rng.next_boolean()).collect();
        BitString::new(genes, Rc::clone(&self.mutation), Rc::clone(&self.crossover))
    }
}

#[derive(Debug)]
pub struct IntegerListGenerator {
    pub length: usize,
    pub min: i64,
    pub max: i64,
    pub mutation: Rc<dyn MutationOperator<IntegerList>>,
    pub crossover: Rc<dyn CrossoverOperator<IntegerList>>,
}

impl ChromosomeGenerator<IntegerList> for IntegerListGenerator {
    fn generate(&self, rng: &mut Randomness) -> IntegerList {
        let genes = (0..self.length)
            .map(|_| rng.next_int(self.min, self.max + 1))
            .collect();
        IntegerList::new(genes, Rc::clone(&self.mutation), Rc::clone(&self.crossover))
    }
}

/// Produces event sequences of `initial_length` with codes drawn from the
/// host's detected input-event table.
pub struct TestChromosomeGenerator {
    pub initial_length: usize,
    pub host: SharedHost,
    pub mutation: Rc<dyn MutationOperator<TestChromosome>>,
    pub crossover: Rc<dyn CrossoverOperator<TestChromosome>>,
}

impl ChromosomeGenerator<TestChromosome> for TestChromosomeGenerator {
    fn generate(&self, rng: &mut Randomness) -> TestChromosome {
        let events = self.host.borrow().event_count().max(1) as i64;
        let genes = (0..self.initial_length)
            .map(|_| rng.next_int(0, events))
            .collect();
        TestChromosome::new(
            genes,
            Rc::clone(&self.mutation),
            Rc::clone(&self.crossover),
            Rc::clone(&self.host),
        )
    }
}
