use std::fmt::Debug;

use crate::chromosome::{BitString, IntegerList};
use crate::randomness::Randomness;

pub trait CrossoverOperator<C>: Debug {
    fn apply(&self, first: &C, second: &C, rng: &mut Randomness) -> (C, C);
}

pub(crate) fn single_point<T: Clone>(
    first: &[T],
    second: &[T],
    rng: &mut Randomness,
) -> (Vec<T>, Vec<T>) {
    let shorter = first.len().min(second.len());
    let cut = if shorter < 2 {
        shorter
    } else {
        rng.next_usize(shorter - 1) + 1
    };

    let mut child_one = Vec::with_capacity(second.len());
    let mut child_two = Vec::with_capacity(first.len());
    child_one.extend_from_slice(&first[..cut]);
    child_one.extend_from_slice(&second[cut..]);
    child_two.extend_from_slice(&second[..cut]);
    child_two.extend_from_slice(&first[cut..]);

    (child_one, child_two)
}

pub(crate) fn single_point_relative<T: Clone>(
    first: &[T],
    second: &[T],
    rng: &mut Randomness,
) -> (Vec<T>, Vec<T>) {
    let ratio = rng.next_double();
    let cut_one = (ratio * first.len() as f64).floor() as usize;
    let cut_two = (ratio * second.len() as f64).floor() as usize;

    let mut child_one = Vec::with_capacity(cut_one + second.len() - cut_two);
    let mut child_two = Vec::with_capacity(cut_two + first.len() - cut_one);
    child_one.extend_from_slice(&first[..cut_one]);
    child_one.extend_from_slice(&second[cut_two..]);
    child_two.extend_from_slice(&second[..cut_two]);
    child_two.extend_from_slice(&first[cut_one..]);

    (child_one, child_two)
}

/// One cut point inside the shorter parent; the tails swap. Offspring keep
/// the parents' lengths.
#[derive(Clone, Copy, Debug, Default)]
pub struct SinglePointCrossover;

impl CrossoverOperator<BitString> for SinglePointCrossover {
    fn apply(&self, first: &BitString, second: &BitString, rng: &mut Randomness) -> (BitString, BitString) {
        let (genes_one, genes_two) = single_point(first.genes(), second.genes(), rng);
        (first.with_genes(genes_one), second.with_genes(genes_two))
    }
}

impl CrossoverOperator<IntegerList> for SinglePointCrossover {
    fn apply(&self, first: &IntegerList, second: &IntegerList, rng: &mut Randomness) -> (IntegerList, IntegerList) {
        let (genes_one, genes_two) = single_point(first.genes(), second.genes(), rng);
        (first.with_genes(genes_one), second.with_genes(genes_two))
    }
}

/// Relative cut `r` in `(0,1)`; each parent is cut at `floor(r * len)`.
/// The offspring lengths sum to the parents' lengths, neither exceeds the
/// longer parent, and the gene multiset is conserved.
#[derive(Clone, Copy, Debug, Default)]
pub struct SinglePointRelativeCrossover;

impl CrossoverOperator<BitString> for SinglePointRelativeCrossover {
    fn apply(&self, first: &BitString, second: &BitString, rng: &mut Randomness) -> (BitString, BitString) {
        let (genes_one, genes_two) = single_point_relative(first.genes(), second.genes(), rng);
        (first.with_genes(genes_one), second.with_genes(genes_two))
    }
}

impl CrossoverOperator<IntegerList> for SinglePointRelativeCrossover {
    fn apply(&self, first: &IntegerList, second: &IntegerList, rng: &mut Randomness) -> (IntegerList, IntegerList) {
        let (genes_one, genes_two) = single_point_relative(first.genes(), second.genes(), rng);
        (first.with_genes(genes_one), second.with_genes(genes_two))
    }
}
