use serde::Deserialize;

use crate::error::SearchError;

// The already-parsed configuration value the core consumes. Key spelling
// follows the launcher's files: kebab-case top-level keys with camelCase
// subkeys. Defaults cover every field so partial documents deserialize.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Configuration {
    pub seed: Option<u64>,
    pub algorithm: AlgorithmKind,
    pub test_generator: TestGeneratorKind,
    pub chromosome: ChromosomeKind,
    pub population_size: usize,
    pub chromosome_length: usize,
    pub crossover: CrossoverConfig,
    pub mutation: MutationConfig,
    pub selection: SelectionConfig,
    pub archive: ArchiveConfig,
    #[serde(rename = "startOfFocusedPhase")]
    pub start_of_focused_phase: f64,
    #[serde(rename = "integerRange")]
    pub integer_range: IntegerRange,
    pub stopping_condition: StoppingConfig,
    pub fitness_function: FitnessConfig,
    pub init_var_length: usize,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            seed: None,
            algorithm: AlgorithmKind::Mosa,
            test_generator: TestGeneratorKind::ManyObjective,
            chromosome: ChromosomeKind::Bitstring,
            population_size: 50,
            chromosome_length: 10,
            crossover: CrossoverConfig::default(),
            mutation: MutationConfig::default(),
            selection: SelectionConfig::default(),
            archive: ArchiveConfig::default(),
            start_of_focused_phase: 0.5,
            integer_range: IntegerRange::default(),
            stopping_condition: StoppingConfig::default(),
            fitness_function: FitnessConfig::default(),
            init_var_length: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlgorithmKind {
    Random,
    OnePlusOne,
    Simplega,
    Mosa,
    Mio,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TestGeneratorKind {
    Random,
    Iterative,
    ManyObjective,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChromosomeKind {
    Bitstring,
    Integerlist,
    Test,
    Variablelengthtest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CrossoverOperatorKind {
    Singlepoint,
    Singlepointrelative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MutationOperatorKind {
    Bitflip,
    Integerlist,
    Variablelength,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionOperatorKind {
    Rank,
    Tournament,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FitnessKind {
    Statement,
    OneMax,
    SingleBit,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CrossoverConfig {
    pub operator: CrossoverOperatorKind,
    pub probability: f64,
}

impl Default for CrossoverConfig {
    fn default() -> Self {
        Self {
            operator: CrossoverOperatorKind::Singlepoint,
            probability: 0.8,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MutationConfig {
    pub operator: MutationOperatorKind,
    pub probability: f64,
    /// Length-drift bias of the variable-length operator.
    pub alpha: f64,
    pub max_mutation_count_start: usize,
    pub max_mutation_count_focused_phase: usize,
}

impl Default for MutationConfig {
    fn default() -> Self {
        Self {
            operator: MutationOperatorKind::Bitflip,
            probability: 0.3,
            alpha: 0.5,
            max_mutation_count_start: 0,
            max_mutation_count_focused_phase: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SelectionConfig {
    /// Absent operator means the algorithm's own default; supplying one to
    /// an algorithm without selection is rejected at wiring time.
    pub operator: Option<SelectionOperatorKind>,
    pub tournament_size: usize,
    pub random_selection_probability_start: f64,
    pub random_selection_probability_focused_phase: f64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            operator: None,
            tournament_size: 5,
            random_selection_probability_start: 0.5,
            random_selection_probability_focused_phase: 0.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ArchiveConfig {
    pub max_archive_size_start: usize,
    pub max_archive_size_focused_phase: usize,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            max_archive_size_start: 10,
            max_archive_size_focused_phase: 1,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IntegerRange {
    pub min: i64,
    pub max: i64,
}

impl Default for IntegerRange {
    fn default() -> Self {
        Self { min: -100, max: 100 }
    }
}

/// Stopping-condition tree; `one-of` nests recursively. Durations are in
/// milliseconds.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum StoppingConfig {
    FixedIteration { iterations: u64 },
    FixedTime { duration: u64 },
    Optimal,
    OneOf { conditions: Vec<StoppingConfig> },
}

impl Default for StoppingConfig {
    fn default() -> Self {
        StoppingConfig::FixedIteration { iterations: 1000 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FitnessConfig {
    #[serde(rename = "type")]
    pub kind: FitnessKind,
    /// Optional target identifiers: bits for `single-bit`, ignored
    /// otherwise.
    pub targets: Option<Vec<u64>>,
}

impl Default for FitnessConfig {
    fn default() -> Self {
        Self {
            kind: FitnessKind::OneMax,
            targets: None,
        }
    }
}

fn check(ok: bool, message: &str) -> Result<(), SearchError> {
    if ok {
        Ok(())
    } else {
        Err(SearchError::invalid(message))
    }
}

fn check_stopping(stopping: &StoppingConfig) -> Result<(), SearchError> {
    match stopping {
        StoppingConfig::FixedIteration { iterations } => {
            check(*iterations >= 1, "stopping-condition.iterations must be at least 1")
        }
        StoppingConfig::FixedTime { duration } => {
            check(*duration >= 1, "stopping-condition.duration must be at least 1ms")
        }
        StoppingConfig::Optimal => Ok(()),
        StoppingConfig::OneOf { conditions } => {
            check(!conditions.is_empty(), "stopping-condition.conditions must not be empty")?;
            conditions.iter().try_for_each(check_stopping)
        }
    }
}

impl Configuration {
    /// Range checks over every recognized key; raised before search begins.
    pub fn validate(&self) -> Result<(), SearchError> {
        check(self.population_size >= 1, "population-size must be at least 1")?;
        check(self.chromosome_length >= 1, "chromosome-length must be at least 1")?;
        check(self.init_var_length >= 1, "init-var-length must be at least 1")?;
        check(
            (0.0..=1.0).contains(&self.crossover.probability),
            "crossover.probability must lie in [0, 1]",
        )?;
        check(
            (0.0..=1.0).contains(&self.mutation.probability),
            "mutation.probability must lie in [0, 1]",
        )?;
        check(
            (0.0..=1.0).contains(&self.mutation.alpha),
            "mutation.alpha must lie in [0, 1]",
        )?;
        check(
            (0.0..=1.0).contains(&self.selection.random_selection_probability_start)
                && (0.0..=1.0).contains(&self.selection.random_selection_probability_focused_phase),
            "selection.randomSelectionProbability must lie in [0, 1]",
        )?;
        if self.selection.operator == Some(SelectionOperatorKind::Tournament) {
            check(
                self.selection.tournament_size >= 2,
                "selection.tournamentSize must be at least 2",
            )?;
        }
        check(
            self.archive.max_archive_size_start >= 1 && self.archive.max_archive_size_focused_phase >= 1,
            "archive.maxArchiveSize must be at least 1",
        )?;
        check(
            self.start_of_focused_phase > 0.0 && self.start_of_focused_phase <= 1.0,
            "startOfFocusedPhase must lie in (0, 1]",
        )?;
        check(
            self.integer_range.min <= self.integer_range.max,
            "integerRange.min must not exceed integerRange.max",
        )?;
        check_stopping(&self.stopping_condition)
    }
}
