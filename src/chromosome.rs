use std::collections::hash_map::DefaultHasher;
use std::fmt::Debug;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use crate::crossover::CrossoverOperator;
use crate::mutation::MutationOperator;
use crate::randomness::Randomness;

// A candidate solution: an ordered sequence of genes. Chromosomes are
// immutable after construction; variation returns fresh values.
pub trait Chromosome: Clone + Debug + PartialEq {
    fn length(&self) -> usize;

    fn mutate(&self, rng: &mut Randomness) -> Self;

    fn crossover(&self, other: &Self, rng: &mut Randomness) -> (Self, Self);

    /// Hash of the gene content, used to deduplicate best individuals.
    fn digest(&self) -> u64;
}

pub(crate) fn digest_of<T: Hash>(genes: &[T]) -> u64 {
    let mut hasher = DefaultHasher::new();
    for gene in genes {
        gene.hash(&mut hasher);
    }
    hasher.finish()
}

/// Sequence of booleans.
#[derive(Clone, Debug)]
pub struct BitString {
    genes: Vec<bool>,
    mutation: Rc<dyn MutationOperator<BitString>>,
    crossover: Rc<dyn CrossoverOperator<BitString>>,
}

impl BitString {
    pub fn new(
        genes: Vec<bool>,
        mutation: Rc<dyn MutationOperator<BitString>>,
        crossover: Rc<dyn CrossoverOperator<BitString>>,
    ) -> Self {
        Self {
            genes,
            mutation,
            crossover,
        }
    }

    pub fn genes(&self) -> &[bool] {
        &self.genes
    }

    /// Fresh chromosome with the same operator handles.
    pub fn with_genes(&self, genes: Vec<bool>) -> Self {
        Self {
            genes,
            mutation: Rc::clone(&self.mutation),
            crossover: Rc::clone(&self.crossover),
        }
    }
}

impl PartialEq for BitString {
    fn eq(&self, other: &Self) -> bool {
        self.genes == other.genes
    }
}

impl Chromosome for BitString {
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

/// Sequence of integers drawn from a closed range.
#[derive(Clone, Debug)]
pub struct IntegerList {
    genes: Vec<i64>,
    mutation: Rc<dyn MutationOperator<IntegerList>>,
    crossover: Rc<dyn CrossoverOperator<IntegerList>>,
}

impl IntegerList {
    pub fn new(
        genes: Vec<i64>,
        mutation: Rc<dyn MutationOperator<IntegerList>>,
        crossover: Rc<dyn CrossoverOperator<IntegerList>>,
    ) -> Self {
        Self {
            genes,
            mutation,
            crossover,
        }
    }

    pub fn genes(&self) -> &[i64] {
        &self.genes
    }

    pub fn with_genes(&self, genes: Vec<i64>) -> Self {
        Self {
            genes,
            mutation: Rc::clone(&self.mutation),
            crossover: Rc::clone(&self.crossover),
        }
    }
}

impl PartialEq for IntegerList {
    fn eq(&self, other: &Self) -> bool {
        self.genes == other.genes
    }
}

impl Chromosome for IntegerList {
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
