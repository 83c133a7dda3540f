use std::io::Write;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use colored::Colorize;
use serde::Serialize;

use crate::error::SearchError;

/// Monotone counters and timers observed by the search algorithms. One
/// collector per run; algorithms only ever increment.
#[derive(Debug)]
pub struct StatisticsCollector {
    started_at: DateTime<Local>,
    search_started: Option<Instant>,
    search_duration: Duration,
    iterations: u64,
    fitness_evaluations: u64,
    covered_goals: u64,
    total_goals: u64,
    full_coverage_iteration: Option<u64>,
}

impl Default for StatisticsCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl StatisticsCollector {
    pub fn new() -> Self {
        Self {
            started_at: Local::now(),
            search_started: None,
            search_duration: Duration::ZERO,
            iterations: 0,
            fitness_evaluations: 0,
            covered_goals: 0,
            total_goals: 0,
            full_coverage_iteration: None,
        }
    }

    pub fn search_started(&mut self, total_goals: usize) {
        self.search_started = Some(Instant::now());
        self.total_goals = total_goals as u64;
    }

    pub fn search_finished(&mut self) {
        if let Some(started) = self.search_started {
            self.search_duration = started.elapsed();
        }
    }

    pub fn count_iteration(&mut self) {
        self.iterations += 1;
    }

    pub fn count_fitness_evaluation(&mut self) {
        self.fitness_evaluations += 1;
    }

    /// Record the covered-goal count, logging whenever it advances.
    pub fn update_coverage(&mut self, covered: usize) {
        let covered = covered as u64;
        if covered > self.covered_goals {
            self.covered_goals = covered;
            println!(
                "{} - covered {}/{} goals",
                format!("Iteration {:5}", self.iterations).bold().green(),
                self.covered_goals,
                self.total_goals,
            );
            if self.covered_goals == self.total_goals && self.full_coverage_iteration.is_none() {
                self.full_coverage_iteration = Some(self.iterations);
            }
        }
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    pub fn fitness_evaluations(&self) -> u64 {
        self.fitness_evaluations
    }

    pub fn covered_goals(&self) -> u64 {
        self.covered_goals
    }

    pub fn row(&self) -> StatisticsRow {
        StatisticsRow {
            started_at: self.started_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            duration_ms: self.search_duration.as_millis() as u64,
            iterations: self.iterations,
            fitness_evaluations: self.fitness_evaluations,
            covered_goals: self.covered_goals,
            total_goals: self.total_goals,
            full_coverage_iteration: self.full_coverage_iteration,
        }
    }

    /// Serialize the run summary as one CSV record.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), SearchError> {
        let mut writer = csv::Writer::from_writer(writer);
        writer
            .serialize(self.row())
            .and_then(|_| writer.flush().map_err(csv::Error::from))
            .map_err(|error| SearchError::ExecutionFailure(format!("statistics export: {error}")))
    }
}

#[derive(Debug, Serialize)]
pub struct StatisticsRow {
    pub started_at: String,
    pub duration_ms: u64,
    pub iterations: u64,
    pub fitness_evaluations: u64,
    pub covered_goals: u64,
    pub total_goals: u64,
    pub full_coverage_iteration: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_are_monotone() {
        let mut statistics = StatisticsCollector::new();
        statistics.search_started(5);
        for _ in 0..3 {
            statistics.count_iteration();
            statistics.count_fitness_evaluation();
        }
        statistics.update_coverage(2);
        statistics.update_coverage(1);

        assert_eq!(statistics.iterations(), 3);
        assert_eq!(statistics.fitness_evaluations(), 3);
        assert_eq!(statistics.covered_goals(), 2);
    }

    #[test]
    fn csv_row_contains_the_counters() {
        let mut statistics = StatisticsCollector::new();
        statistics.search_started(2);
        statistics.count_iteration();
        statistics.update_coverage(2);
        statistics.search_finished();

        let mut buffer = Vec::new();
        statistics.write_csv(&mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        assert!(text.contains("iterations"));
        assert!(text.contains("covered_goals"));
        assert!(text.lines().count() >= 2);
    }
}
