use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{self, Debug};
use std::rc::Rc;

use crate::chromosome::{digest_of, Chromosome};
use crate::crossover::{
    single_point, single_point_relative, CrossoverOperator, SinglePointCrossover,
    SinglePointRelativeCrossover,
};
use crate::error::SearchError;
use crate::fitness::FitnessFunction;
use crate::mutation::{
    redraw_genes, vary_length_genes, IntegerListMutation, MutationOperator,
    VariableLengthMutation,
};
use crate::randomness::Randomness;

/// The set of program statements/events observed during one execution,
/// plus the host's approach-level-and-branch-distance measure for
/// statements the run missed. Never mutated after construction.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExecutionTrace {
    executed: BTreeSet<u64>,
    distances: BTreeMap<u64, f64>,
}

impl ExecutionTrace {
    pub fn new(executed: impl IntoIterator<Item = u64>) -> Self {
        Self {
            executed: executed.into_iter().collect(),
            distances: BTreeMap::new(),
        }
    }

    /// Attach distance measures for unexecuted statements.
    pub fn with_distances(mut self, distances: impl IntoIterator<Item = (u64, f64)>) -> Self {
        self.distances = distances.into_iter().collect();
        self
    }

    pub fn was_executed(&self, statement: u64) -> bool {
        self.executed.contains(&statement)
    }

    pub fn executed(&self) -> impl Iterator<Item = u64> + '_ {
        self.executed.iter().copied()
    }

    pub fn distance(&self, statement: u64) -> Option<f64> {
        self.distances.get(&statement).copied()
    }
}

// Boundary to the embedded interpreter. The core hands over a read-only view
// of the event genes and gets back a trace; the host must not retain the
// view past the call.
pub trait ExecutionHost {
    fn evaluate(&mut self, events: &[i64]) -> Result<ExecutionTrace, SearchError>;

    /// Coverage goals of the program under test, in a stable order.
    fn coverage_goals(
        &mut self,
    ) -> Result<Vec<Rc<dyn FitnessFunction<TestChromosome>>>, SearchError>;

    /// Size of the detected input-event table; genes index into it.
    fn event_count(&self) -> usize;
}

pub type SharedHost = Rc<RefCell<dyn ExecutionHost>>;

type CachedTrace = Option<Result<Rc<ExecutionTrace>, SearchError>>;

/// Chromosome whose genes encode a sequence of input events. The trace of
/// its first evaluation is cached; a failed run is cached too and shows up
/// as worst-case fitness wherever the trace is consumed.
#[derive(Clone)]
pub struct TestChromosome {
    genes: Vec<i64>,
    mutation: Rc<dyn MutationOperator<TestChromosome>>,
    crossover: Rc<dyn CrossoverOperator<TestChromosome>>,
    host: SharedHost,
    trace: RefCell<CachedTrace>,
}

impl TestChromosome {
    pub fn new(
        genes: Vec<i64>,
        mutation: Rc<dyn MutationOperator<TestChromosome>>,
        crossover: Rc<dyn CrossoverOperator<TestChromosome>>,
        host: SharedHost,
    ) -> Self {
        Self {
            genes,
            mutation,
            crossover,
            host,
            trace: RefCell::new(None),
        }
    }

    pub fn genes(&self) -> &[i64] {
        &self.genes
    }

    /// Fresh chromosome with the same operator and host handles and an
    /// empty trace cache.
    pub fn with_genes(&self, genes: Vec<i64>) -> Self {
        Self {
            genes,
            mutation: Rc::clone(&self.mutation),
            crossover: Rc::clone(&self.crossover),
            host: Rc::clone(&self.host),
            trace: RefCell::new(None),
        }
    }

    /// Trace of this chromosome's execution, running it on first use.
    pub fn trace(&self) -> Result<Rc<ExecutionTrace>, SearchError> {
        if self.trace.borrow().is_none() {
            let outcome = self
                .host
                .borrow_mut()
                .evaluate(&self.genes)
                .map(Rc::new);
            *self.trace.borrow_mut() = Some(outcome);
        }

        match self.trace.borrow().as_ref() {
            Some(Ok(trace)) => Ok(Rc::clone(trace)),
            Some(Err(error)) => Err(error.clone()),
            None => unreachable!("trace cache filled above"),
        }
    }
}

impl Debug for TestChromosome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestChromosome")
            .field("genes", &self.genes)
            .finish()
    }
}

impl PartialEq for TestChromosome {
    fn eq(&self, other: &Self) -> bool {
        self.genes == other.genes
    }
}

impl Chromosome for TestChromosome {
    fn length(&self) -> usize {
        self.genes.len()
    }

    fn mutate(&self, rng: &mut Randomness) -> Self {
        self.mutation.apply(self, rng)
    }

    fn crossover(&self, other: &Self, rng: &mut Randomness) -> (Self, Self) {
        self.crossover.apply(self, other, rng)
    }

    fn digest(&self) -> u64 {
        digest_of(&self.genes)
    }
}

impl MutationOperator<TestChromosome> for IntegerListMutation {
    fn apply(&self, chromosome: &TestChromosome, rng: &mut Randomness) -> TestChromosome {
        chromosome.with_genes(redraw_genes(chromosome.genes(), self.min, self.max, rng))
    }
}

impl MutationOperator<TestChromosome> for VariableLengthMutation {
    fn apply(&self, chromosome: &TestChromosome, rng: &mut Randomness) -> TestChromosome {
        chromosome.with_genes(vary_length_genes(chromosome.genes(), self, rng))
    }
}

impl CrossoverOperator<TestChromosome> for SinglePointCrossover {
    fn apply(
        &self,
        first: &TestChromosome,
        second: &TestChromosome,
        rng: &mut Randomness,
    ) -> (TestChromosome, TestChromosome) {
        let (genes_one, genes_two) = single_point(first.genes(), second.genes(), rng);
        (first.with_genes(genes_one), second.with_genes(genes_two))
    }
}

impl CrossoverOperator<TestChromosome> for SinglePointRelativeCrossover {
    fn apply(
        &self,
        first: &TestChromosome,
        second: &TestChromosome,
        rng: &mut Randomness,
    ) -> (TestChromosome, TestChromosome) {
        let (genes_one, genes_two) = single_point_relative(first.genes(), second.genes(), rng);
        (first.with_genes(genes_one), second.with_genes(genes_two))
    }
}
