use std::fmt::Debug;
use std::time::{Duration, Instant};

// Observables every algorithm exposes at iteration boundaries. Stopping
// conditions see nothing else, so they compose without algorithm
// cooperation.
#[derive(Debug)]
pub struct SearchStatus<'a, C> {
    pub iterations: usize,
    pub start_time: Instant,
    pub current_solution: &'a [C],
    pub total_goals: usize,
    pub uncovered_goals: usize,
}

/// Predicate over search progress. `is_finished` is monotone: once true it
/// stays true for the rest of the run.
pub trait StoppingCondition<C>: Debug {
    fn is_finished(&self, status: &SearchStatus<'_, C>) -> bool;

    /// Fraction of the budget spent, in `[0, 1]`. Drives MIO's phase
    /// interpolation.
    fn progress(&self, status: &SearchStatus<'_, C>) -> f64;
}

#[derive(Clone, Copy, Debug)]
pub struct FixedIterations {
    pub max_iterations: usize,
}

impl<C> StoppingCondition<C> for FixedIterations {
    fn is_finished(&self, status: &SearchStatus<'_, C>) -> bool {
        status.iterations >= self.max_iterations
    }

    fn progress(&self, status: &SearchStatus<'_, C>) -> f64 {
        if self.max_iterations == 0 {
            1.0
        } else {
            (status.iterations as f64 / self.max_iterations as f64).min(1.0)
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct FixedTime {
    pub duration: Duration,
}

impl<C> StoppingCondition<C> for FixedTime {
    fn is_finished(&self, status: &SearchStatus<'_, C>) -> bool {
        status.start_time.elapsed() >= self.duration
    }

    fn progress(&self, status: &SearchStatus<'_, C>) -> f64 {
        if self.duration.is_zero() {
            1.0
        } else {
            (status.start_time.elapsed().as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
        }
    }
}

/// Finished when every goal has an optimal archive entry.
#[derive(Clone, Copy, Debug, Default)]
pub struct OptimalSolution;

impl<C> StoppingCondition<C> for OptimalSolution {
    fn is_finished(&self, status: &SearchStatus<'_, C>) -> bool {
        status.uncovered_goals == 0
    }

    fn progress(&self, status: &SearchStatus<'_, C>) -> f64 {
        if status.total_goals == 0 {
            1.0
        } else {
            (status.total_goals - status.uncovered_goals) as f64 / status.total_goals as f64
        }
    }
}

/// Finished when any child is. Progress is the furthest child along its
/// budget, which settles how mixed time/iteration budgets advance MIO's
/// phase.
#[derive(Debug)]
pub struct OneOf<C> {
    pub conditions: Vec<Box<dyn StoppingCondition<C>>>,
}

impl<C> OneOf<C> {
    pub fn new(conditions: Vec<Box<dyn StoppingCondition<C>>>) -> Self {
        Self { conditions }
    }
}

impl<C: Debug> StoppingCondition<C> for OneOf<C> {
    fn is_finished(&self, status: &SearchStatus<'_, C>) -> bool {
        self.conditions
            .iter()
            .any(|condition| condition.is_finished(status))
    }

    fn progress(&self, status: &SearchStatus<'_, C>) -> f64 {
        self.conditions
            .iter()
            .map(|condition| condition.progress(status))
            .fold(0.0, f64::max)
    }
}
