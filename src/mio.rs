use std::collections::BTreeMap;
use std::time::Instant;

use crate::chromosome::Chromosome;
use crate::error::SearchError;
use crate::fitness::{fitness_or_worst, GoalId, GoalSet};
use crate::generator::ChromosomeGenerator;
use crate::randomness::Randomness;
use crate::search_algorithm::{SearchAlgorithm, SearchSettings};
use crate::statistics::StatisticsCollector;
use crate::stopping::{SearchStatus, StoppingCondition};

#[derive(Clone, Copy, Debug)]
pub struct MioProperties {
    pub start_of_focused_phase: f64,
    pub random_selection_probability_start: f64,
    pub random_selection_probability_focused: f64,
    pub max_archive_size_start: usize,
    pub max_archive_size_focused: usize,
    pub max_mutation_count_start: usize,
    pub max_mutation_count_focused: usize,
}

impl Default for MioProperties {
    fn default() -> Self {
        Self {
            start_of_focused_phase: 0.5,
            random_selection_probability_start: 0.5,
            random_selection_probability_focused: 0.0,
            max_archive_size_start: 10,
            max_archive_size_focused: 1,
            max_mutation_count_start: 0,
            max_mutation_count_focused: 10,
        }
    }
}

struct BucketEntry<C> {
    chromosome: C,
    heuristic: f64,
}

/// Many-objective interactive optimizer. One bucket of candidates per goal,
/// ranked by heuristic value with shorter-length tie-break; every search
/// parameter interpolates linearly from its start value to its
/// focused-phase value as the budget fraction approaches the phase
/// boundary, after which the caps pin at the focused values and force
/// convergence.
pub struct Mio<C> {
    generator: Box<dyn ChromosomeGenerator<C>>,
    goals: GoalSet<C>,
    stopping_condition: Box<dyn StoppingCondition<C>>,
    properties: MioProperties,
    rng: Randomness,
    statistics: StatisticsCollector,
    buckets: BTreeMap<GoalId, Vec<BucketEntry<C>>>,
    iterations: usize,
    start_time: Instant,
}

impl<C: Chromosome> Mio<C> {
    pub fn new(settings: SearchSettings<C>, properties: MioProperties) -> Result<Self, SearchError> {
        if settings.selection.is_some() {
            return Err(SearchError::UnsupportedOperation(
                "MIO does not use a selection operator",
            ));
        }
        if !(properties.start_of_focused_phase > 0.0 && properties.start_of_focused_phase <= 1.0) {
            return Err(SearchError::invalid(
                "startOfFocusedPhase must lie in (0, 1]",
            ));
        }

        Ok(Self {
            generator: settings.generator,
            goals: settings.goals,
            stopping_condition: settings.stopping_condition,
            properties,
            rng: settings.rng,
            statistics: StatisticsCollector::new(),
            buckets: BTreeMap::new(),
            iterations: 0,
            start_time: Instant::now(),
        })
    }

    fn status(&self) -> SearchStatus<'_, C> {
        SearchStatus {
            iterations: self.iterations,
            start_time: self.start_time,
            current_solution: &[],
            total_goals: self.goals.len(),
            uncovered_goals: self.goals.len() - self.covered_count(),
        }
    }

    fn covered_count(&self) -> usize {
        self.buckets
            .values()
            .filter(|bucket| bucket.first().is_some_and(|entry| entry.heuristic >= 1.0))
            .count()
    }

    /// Interpolation weight: 0 at the start of the search, 1 at the phase
    /// boundary and beyond.
    fn focus_fraction(&self) -> f64 {
        let progress = self.stopping_condition.progress(&self.status());
        (progress / self.properties.start_of_focused_phase).clamp(0.0, 1.0)
    }

    fn heuristic_of(&self, goal: GoalId, chromosome: &C) -> Result<f64, SearchError> {
        let function = self
            .goals
            .get(goal)
            .ok_or_else(|| SearchError::invalid(format!("unknown goal {goal}")))?;
        let fitness = fitness_or_worst(function.as_ref(), chromosome)?;
        Ok(function.heuristic(fitness))
    }

    /// Offer a candidate to every goal bucket. Zero-heuristic candidates
    /// are rejected; a full bucket evicts the worst entry, ties falling on
    /// the longer chromosome.
    fn offer(&mut self, chromosome: &C, capacity: usize) -> Result<(), SearchError> {
        self.statistics.count_fitness_evaluation();

        let goal_ids: Vec<GoalId> = self.goals.ids().collect();
        for goal in goal_ids {
            let heuristic = self.heuristic_of(goal, chromosome)?;
            if heuristic <= 0.0 {
                continue;
            }

            let bucket = self.buckets.entry(goal).or_default();
            if bucket
                .iter()
                .any(|entry| entry.chromosome.digest() == chromosome.digest())
            {
                continue;
            }

            bucket.push(BucketEntry {
                chromosome: chromosome.clone(),
                heuristic,
            });
            bucket.sort_by(|a, b| {
                b.heuristic
                    .total_cmp(&a.heuristic)
                    .then_with(|| a.chromosome.length().cmp(&b.chromosome.length()))
            });
            bucket.truncate(capacity.max(1));
        }

        Ok(())
    }

    fn lerp(&self, start: f64, focused: f64) -> f64 {
        let t = self.focus_fraction();
        start + (focused - start) * t
    }

    fn lerp_count(&self, start: usize, focused: usize) -> usize {
        self.lerp(start as f64, focused as f64).round() as usize
    }
}

impl<C: Chromosome> SearchAlgorithm<C> for Mio<C> {
    fn find_solution(&mut self) -> Result<Vec<C>, SearchError> {
        self.buckets.clear();
        self.iterations = 0;
        self.start_time = Instant::now();
        self.statistics = StatisticsCollector::new();
        self.statistics.search_started(self.goals.len());

        while !self.stopping_condition.is_finished(&self.status()) {
            let random_probability = self.lerp(
                self.properties.random_selection_probability_start,
                self.properties.random_selection_probability_focused,
            );
            let capacity = self.lerp_count(
                self.properties.max_archive_size_start,
                self.properties.max_archive_size_focused,
            );
            let mutation_count = self.lerp_count(
                self.properties.max_mutation_count_start,
                self.properties.max_mutation_count_focused,
            );

            let sampleable: Vec<GoalId> = self
                .buckets
                .iter()
                .filter(|(_, bucket)| !bucket.is_empty())
                .map(|(&goal, _)| goal)
                .collect();

            if sampleable.is_empty() || self.rng.next_probability(random_probability) {
                let fresh = self.generator.generate(&mut self.rng);
                self.offer(&fresh, capacity)?;
            } else {
                let goal = *self.rng.pick(&sampleable);
                let picked = {
                    let bucket = &self.buckets[&goal];
                    self.rng.pick(bucket).chromosome.clone()
                };

                let mut current = picked;
                let mut current_heuristic = self.heuristic_of(goal, &current)?;
                for _ in 0..mutation_count {
                    let mutant = current.mutate(&mut self.rng);
                    self.offer(&mutant, capacity)?;
                    let mutant_heuristic = self.heuristic_of(goal, &mutant)?;
                    if mutant_heuristic >= current_heuristic {
                        current = mutant;
                        current_heuristic = mutant_heuristic;
                    }
                }
            }

            self.iterations += 1;
            self.statistics.count_iteration();
            self.statistics.update_coverage(self.covered_count());
        }

        self.statistics.search_finished();

        // One chromosome per goal: each non-empty bucket's top entry.
        let best = self
            .buckets
            .values()
            .filter_map(|bucket| bucket.first())
            .map(|entry| entry.chromosome.clone())
            .collect();
        Ok(best)
    }

    fn iterations(&self) -> usize {
        self.iterations
    }

    fn start_time(&self) -> Instant {
        self.start_time
    }

    fn current_solution(&self) -> Vec<C> {
        self.buckets
            .values()
            .filter_map(|bucket| bucket.first())
            .map(|entry| entry.chromosome.clone())
            .collect()
    }

    fn uncovered_goal_count(&self) -> usize {
        self.goals.len() - self.covered_count()
    }

    fn statistics(&self) -> &StatisticsCollector {
        &self.statistics
    }
}
