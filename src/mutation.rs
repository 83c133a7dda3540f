use std::fmt::Debug;

use crate::chromosome::{BitString, Chromosome, IntegerList};
use crate::randomness::Randomness;

// Stateless variation operators. A chromosome holds a handle to the operator
// it was built with; `apply` returns a fresh chromosome.
pub trait MutationOperator<C>: Debug {
    fn apply(&self, chromosome: &C, rng: &mut Randomness) -> C;
}

/// Flip each gene with probability `1/n`.
#[derive(Clone, Copy, Debug, Default)]
pub struct BitflipMutation;

impl MutationOperator<BitString> for BitflipMutation {
    fn apply(&self, chromosome: &BitString, rng: &mut Randomness) -> BitString {
        let n = chromosome.length().max(1);
        let rate = 1.0 / n as f64;
        let genes = chromosome
            .genes()
            .iter()
            .map(|&gene| {
                if rng.next_probability(rate) {
                    !gene
                } else {
                    gene
                }
            })
            .collect();

        chromosome.with_genes(genes)
    }
}

/// Redraw each gene uniformly from `[min, max]` with probability `1/n`.
#[derive(Clone, Copy, Debug)]
pub struct IntegerListMutation {
    pub min: i64,
    pub max: i64,
}

impl IntegerListMutation {
    pub fn new(min: i64, max: i64) -> Self {
        debug_assert!(min <= max);
        Self { min, max }
    }
}

pub(crate) fn redraw_genes(
    genes: &[i64],
    min: i64,
    max: i64,
    rng: &mut Randomness,
) -> Vec<i64> {
    let n = genes.len().max(1);
    let rate = 1.0 / n as f64;
    genes
        .iter()
        .map(|&gene| {
            if rng.next_probability(rate) {
                rng.next_int(min, max + 1)
            } else {
                gene
            }
        })
        .collect()
}

impl MutationOperator<IntegerList> for IntegerListMutation {
    fn apply(&self, chromosome: &IntegerList, rng: &mut Randomness) -> IntegerList {
        chromosome.with_genes(redraw_genes(chromosome.genes(), self.min, self.max, rng))
    }
}

/// Per-gene replacement and deletion at `1/n`, plus a geometric run of
/// insertions with continuation probability `alpha`, capped at `max_length`.
/// The sequence never drops below a single gene.
#[derive(Clone, Copy, Debug)]
pub struct VariableLengthMutation {
    pub min: i64,
    pub max: i64,
    pub max_length: usize,
    pub alpha: f64,
}

impl VariableLengthMutation {
    pub fn new(min: i64, max: i64, max_length: usize, alpha: f64) -> Self {
        debug_assert!(min <= max);
        debug_assert!(max_length >= 1);
        Self {
            min,
            max,
            max_length,
            alpha,
        }
    }
}

pub(crate) fn vary_length_genes(
    genes: &[i64],
    op: &VariableLengthMutation,
    rng: &mut Randomness,
) -> Vec<i64> {
    let n = genes.len().max(1);
    let rate = 1.0 / n as f64;

    // Replacement pass, then deletion pass, then insertion run.
    let mut result: Vec<i64> = genes
        .iter()
        .map(|&gene| {
            if rng.next_probability(rate) {
                rng.next_int(op.min, op.max + 1)
            } else {
                gene
            }
        })
        .collect();

    let mut index = 0;
    while index < result.len() {
        if result.len() > 1 && rng.next_probability(rate) {
            result.remove(index);
        } else {
            index += 1;
        }
    }

    while result.len() < op.max_length && rng.next_probability(op.alpha) {
        let position = rng.next_usize(result.len() + 1);
        result.insert(position, rng.next_int(op.min, op.max + 1));
    }

    result
}

impl MutationOperator<IntegerList> for VariableLengthMutation {
    fn apply(&self, chromosome: &IntegerList, rng: &mut Randomness) -> IntegerList {
        chromosome.with_genes(vary_length_genes(chromosome.genes(), self, rng))
    }
}
