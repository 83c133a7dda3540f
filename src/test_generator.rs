use std::collections::BTreeMap;
use std::fmt::Debug;
use std::rc::Rc;
use std::time::Duration;

use crate::chromosome::{BitString, Chromosome, IntegerList};
use crate::config::{
    AlgorithmKind, ChromosomeKind, Configuration, CrossoverOperatorKind, FitnessKind,
    MutationOperatorKind, SelectionOperatorKind, StoppingConfig, TestGeneratorKind,
};
use crate::crossover::{CrossoverOperator, SinglePointCrossover, SinglePointRelativeCrossover};
use crate::error::SearchError;
use crate::execution_host::{SharedHost, TestChromosome};
use crate::fitness::{GoalId, GoalSet, IntegerOneMax, OneMax, SingleBit};
use crate::generator::{
    BitStringGenerator, ChromosomeGenerator, IntegerListGenerator, TestChromosomeGenerator,
};
use crate::mio::{Mio, MioProperties};
use crate::mosa::{Mosa, MosaProperties};
use crate::mutation::{
    BitflipMutation, IntegerListMutation, MutationOperator, VariableLengthMutation,
};
use crate::one_plus_one::OnePlusOne;
use crate::random_search::RandomSearch;
use crate::randomness::Randomness;
use crate::search_algorithm::{SearchAlgorithm, SearchSettings};
use crate::selection::{RankSelection, SelectionOperator, TournamentSelection};
use crate::statistics::StatisticsRow;
use crate::stopping::{FixedIterations, FixedTime, OneOf, OptimalSolution, StoppingCondition};

/// One exported test: the chromosome plus the metadata consumers need to
/// report on it. The fitness snapshot holds every goal whose numeric
/// fitness is computable.
#[derive(Debug)]
pub struct WhiskerTest<C> {
    pub chromosome: C,
    pub covered_goals: Vec<GoalId>,
    pub length: usize,
    pub fitness: BTreeMap<GoalId, f64>,
}

#[derive(Debug)]
pub struct TestSuite<C> {
    pub tests: Vec<WhiskerTest<C>>,
}

/// Suites for the three genotype families behind one tagged value.
#[derive(Debug)]
pub enum GeneratedTests {
    BitStrings(TestSuite<BitString>),
    IntegerLists(TestSuite<IntegerList>),
    Tests(TestSuite<TestChromosome>),
}

#[derive(Debug)]
pub struct GenerationReport {
    pub tests: GeneratedTests,
    pub statistics: StatisticsRow,
}

/// Façade: translates a Configuration into a wired search algorithm, runs
/// it and maps the best individuals to a test suite.
pub struct TestGenerator {
    config: Configuration,
}

impl TestGenerator {
    pub fn new(config: Configuration) -> Result<Self, SearchError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Run the configured search. Test-chromosome configurations need an
    /// execution host; the other genotypes ignore it.
    pub fn generate(&self, host: Option<SharedHost>) -> Result<GenerationReport, SearchError> {
        match self.config.chromosome {
            ChromosomeKind::Bitstring => self.generate_bitstrings(),
            ChromosomeKind::Integerlist => self.generate_integer_lists(),
            ChromosomeKind::Test | ChromosomeKind::Variablelengthtest => {
                let host = host.ok_or_else(|| {
                    SearchError::invalid("test chromosomes need an execution host")
                })?;
                self.generate_tests(host)
            }
        }
    }

    fn generate_bitstrings(&self) -> Result<GenerationReport, SearchError> {
        let config = &self.config;
        if config.mutation.operator != MutationOperatorKind::Bitflip {
            return Err(SearchError::invalid(
                "bitstring chromosomes mutate by bitflip",
            ));
        }

        let length = config.chromosome_length;
        let mut goals: GoalSet<BitString> = GoalSet::new();
        match config.fitness_function.kind {
            FitnessKind::OneMax => {
                goals.insert(0, Rc::new(OneMax { length }));
            }
            FitnessKind::SingleBit => {
                let targets: Vec<usize> = match &config.fitness_function.targets {
                    Some(targets) => targets.iter().map(|&t| t as usize).collect(),
                    None => (0..length).collect(),
                };
                for (id, bit) in targets.into_iter().enumerate() {
                    if bit >= length {
                        return Err(SearchError::invalid(format!(
                            "single-bit target {bit} exceeds chromosome length {length}"
                        )));
                    }
                    goals.insert(id as GoalId, Rc::new(SingleBit { bit }));
                }
            }
            FitnessKind::Statement => {
                return Err(SearchError::invalid(
                    "statement coverage needs test chromosomes",
                ));
            }
        }

        let generator = BitStringGenerator {
            length,
            mutation: Rc::new(BitflipMutation),
            crossover: crossover_operator::<BitString>(config.crossover.operator),
        };

        let (suite, statistics) = self.run(Box::new(generator), goals)?;
        Ok(GenerationReport {
            tests: GeneratedTests::BitStrings(suite),
            statistics,
        })
    }

    fn generate_integer_lists(&self) -> Result<GenerationReport, SearchError> {
        let config = &self.config;
        let range = &config.integer_range;

        if config.fitness_function.kind != FitnessKind::OneMax {
            return Err(SearchError::invalid(
                "integer lists support only the one-max fitness function",
            ));
        }

        let mutation: Rc<dyn MutationOperator<IntegerList>> = match config.mutation.operator {
            MutationOperatorKind::Integerlist => {
                Rc::new(IntegerListMutation::new(range.min, range.max))
            }
            MutationOperatorKind::Variablelength => Rc::new(VariableLengthMutation::new(
                range.min,
                range.max,
                config.chromosome_length,
                config.mutation.alpha,
            )),
            MutationOperatorKind::Bitflip => {
                return Err(SearchError::invalid(
                    "bitflip mutation does not apply to integer lists",
                ));
            }
        };

        let mut goals: GoalSet<IntegerList> = GoalSet::new();
        goals.insert(0, Rc::new(IntegerOneMax { max: range.max }));

        let generator = IntegerListGenerator {
            length: config.chromosome_length,
            min: range.min,
            max: range.max,
            mutation,
            crossover: crossover_operator::<IntegerList>(config.crossover.operator),
        };

        let (suite, statistics) = self.run(Box::new(generator), goals)?;
        Ok(GenerationReport {
            tests: GeneratedTests::IntegerLists(suite),
            statistics,
        })
    }

    fn generate_tests(&self, host: SharedHost) -> Result<GenerationReport, SearchError> {
        let config = &self.config;
        if config.fitness_function.kind != FitnessKind::Statement {
            return Err(SearchError::invalid(
                "test chromosomes are driven by statement coverage",
            ));
        }

        let events = host.borrow().event_count();
        if events == 0 {
            return Err(SearchError::invalid(
                "the program under test has no input events",
            ));
        }
        let event_max = events as i64 - 1;

        let mutation: Rc<dyn MutationOperator<TestChromosome>> = match config.mutation.operator {
            MutationOperatorKind::Integerlist => Rc::new(IntegerListMutation::new(0, event_max)),
            MutationOperatorKind::Variablelength => Rc::new(VariableLengthMutation::new(
                0,
                event_max,
                config.chromosome_length,
                config.mutation.alpha,
            )),
            MutationOperatorKind::Bitflip => {
                return Err(SearchError::invalid(
                    "bitflip mutation does not apply to event sequences",
                ));
            }
        };

        let mut goals: GoalSet<TestChromosome> = GoalSet::new();
        let functions = host.borrow_mut().coverage_goals()?;
        for (id, function) in functions.into_iter().enumerate() {
            goals.insert(id as GoalId, function);
        }

        let initial_length = match config.chromosome {
            ChromosomeKind::Variablelengthtest => config.init_var_length,
            _ => config.chromosome_length,
        };

        let generator = TestChromosomeGenerator {
            initial_length,
            host: Rc::clone(&host),
            mutation,
            crossover: crossover_operator::<TestChromosome>(config.crossover.operator),
        };

        let (suite, statistics) = self.run(Box::new(generator), goals)?;
        Ok(GenerationReport {
            tests: GeneratedTests::Tests(suite),
            statistics,
        })
    }

    fn run<C: Chromosome + 'static>(
        &self,
        generator: Box<dyn ChromosomeGenerator<C>>,
        goals: GoalSet<C>,
    ) -> Result<(TestSuite<C>, StatisticsRow), SearchError> {
        let config = &self.config;
        let settings = SearchSettings {
            generator,
            goals: goals.clone(),
            stopping_condition: build_stopping(&config.stopping_condition),
            selection: self.build_selection(&goals),
            rng: Randomness::from_seed(config.seed.unwrap_or(0)),
        };

        let mut algorithm: Box<dyn SearchAlgorithm<C>> =
            match (config.test_generator, config.algorithm) {
                (_, AlgorithmKind::Simplega) => {
                    return Err(SearchError::NotYetImplemented("simple genetic algorithm"));
                }
                (TestGeneratorKind::Random, AlgorithmKind::Random) => {
                    Box::new(RandomSearch::new(settings)?)
                }
                (TestGeneratorKind::Iterative, AlgorithmKind::OnePlusOne) => {
                    Box::new(OnePlusOne::new(settings)?)
                }
                (TestGeneratorKind::ManyObjective, AlgorithmKind::Mosa) => Box::new(Mosa::new(
                    settings,
                    MosaProperties {
                        population_size: config.population_size,
                        crossover_probability: config.crossover.probability,
                        mutation_probability: config.mutation.probability,
                    },
                )?),
                (TestGeneratorKind::ManyObjective, AlgorithmKind::Mio) => Box::new(Mio::new(
                    settings,
                    MioProperties {
                        start_of_focused_phase: config.start_of_focused_phase,
                        random_selection_probability_start: config
                            .selection
                            .random_selection_probability_start,
                        random_selection_probability_focused: config
                            .selection
                            .random_selection_probability_focused_phase,
                        max_archive_size_start: config.archive.max_archive_size_start,
                        max_archive_size_focused: config.archive.max_archive_size_focused_phase,
                        max_mutation_count_start: config.mutation.max_mutation_count_start,
                        max_mutation_count_focused: config
                            .mutation
                            .max_mutation_count_focused_phase,
                    },
                )?),
                (generator_kind, algorithm_kind) => {
                    return Err(SearchError::invalid(format!(
                        "test generator {generator_kind:?} cannot drive algorithm {algorithm_kind:?}"
                    )));
                }
            };

        let best = algorithm.find_solution()?;
        let suite = assemble_suite(best, &goals)?;
        Ok((suite, algorithm.statistics().row()))
    }

    fn build_selection<C: Chromosome + 'static>(
        &self,
        goals: &GoalSet<C>,
    ) -> Option<Box<dyn SelectionOperator<C>>> {
        match self.config.selection.operator {
            None => None,
            Some(SelectionOperatorKind::Rank) => Some(Box::new(RankSelection)),
            Some(SelectionOperatorKind::Tournament) => Some(Box::new(TournamentSelection {
                size: self.config.selection.tournament_size,
                goals: goals.clone(),
            })),
        }
    }
}

fn crossover_operator<C>(kind: CrossoverOperatorKind) -> Rc<dyn CrossoverOperator<C>>
where
    SinglePointCrossover: CrossoverOperator<C>,
    SinglePointRelativeCrossover: CrossoverOperator<C>,
{
    match kind {
        CrossoverOperatorKind::Singlepoint => Rc::new(SinglePointCrossover),
        CrossoverOperatorKind::Singlepointrelative => Rc::new(SinglePointRelativeCrossover),
    }
}

fn build_stopping<C: Debug + 'static>(config: &StoppingConfig) -> Box<dyn StoppingCondition<C>> {
    match config {
        StoppingConfig::FixedIteration { iterations } => Box::new(FixedIterations {
            max_iterations: *iterations as usize,
        }),
        StoppingConfig::FixedTime { duration } => Box::new(FixedTime {
            duration: Duration::from_millis(*duration),
        }),
        StoppingConfig::Optimal => Box::new(OptimalSolution),
        StoppingConfig::OneOf { conditions } => Box::new(OneOf::new(
            conditions.iter().map(build_stopping::<C>).collect(),
        )),
    }
}

fn assemble_suite<C: Chromosome>(
    best: Vec<C>,
    goals: &GoalSet<C>,
) -> Result<TestSuite<C>, SearchError> {
    let mut tests = Vec::with_capacity(best.len());
    for chromosome in best {
        let mut covered_goals = Vec::new();
        let mut fitness = BTreeMap::new();
        for (goal, function) in goals.iter() {
            match function.is_covered(&chromosome) {
                Ok(true) => covered_goals.push(goal),
                Ok(false) => {}
                Err(SearchError::ExecutionFailure(_)) => {}
                Err(other) => return Err(other),
            }
            match function.get_fitness(&chromosome) {
                Ok(value) => {
                    fitness.insert(goal, value);
                }
                Err(SearchError::ExecutionFailure(_)) => {}
                Err(other) => return Err(other),
            }
        }
        tests.push(WhiskerTest {
            length: chromosome.length(),
            chromosome,
            covered_goals,
            fitness,
        });
    }
    Ok(TestSuite { tests })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution_host::{ExecutionHost, ExecutionTrace};
    use crate::fitness::{FitnessFunction, StatementCoverage};
    use std::cell::RefCell;

    // Interpreter stand-in: every event gene executes the statement with
    // the same id.
    struct EchoHost {
        statements: u64,
    }

    impl ExecutionHost for EchoHost {
        fn evaluate(&mut self, events: &[i64]) -> Result<ExecutionTrace, SearchError> {
            Ok(ExecutionTrace::new(
                events.iter().filter(|&&e| e >= 0).map(|&e| e as u64),
            ))
        }

        fn coverage_goals(
            &mut self,
        ) -> Result<Vec<Rc<dyn FitnessFunction<TestChromosome>>>, SearchError> {
            Ok((0..self.statements)
                .map(|statement| {
                    Rc::new(StatementCoverage { statement })
                        as Rc<dyn FitnessFunction<TestChromosome>>
                })
                .collect())
        }

        fn event_count(&self) -> usize {
            self.statements as usize
        }
    }

    fn base_config() -> Configuration {
        let mut config = Configuration::default();
        config.seed = Some(42);
        config.stopping_condition = StoppingConfig::FixedIteration { iterations: 50 };
        config
    }

    #[test]
    fn mosa_over_bitstrings_end_to_end() {
        let mut config = base_config();
        config.population_size = 20;
        config.chromosome_length = 5;

        let report = TestGenerator::new(config).unwrap().generate(None).unwrap();
        let suite = match report.tests {
            GeneratedTests::BitStrings(suite) => suite,
            other => panic!("expected bitstring tests, got {other:?}"),
        };

        assert_eq!(suite.tests.len(), 1);
        let test = &suite.tests[0];
        assert_eq!(test.covered_goals, vec![0]);
        assert!(test.chromosome.genes().iter().all(|&gene| gene));
        assert_eq!(test.fitness[&0], 5.0);
        assert_eq!(report.statistics.total_goals, 1);
    }

    #[test]
    fn simplega_is_not_yet_implemented() {
        let mut config = base_config();
        config.algorithm = AlgorithmKind::Simplega;

        let result = TestGenerator::new(config).unwrap().generate(None);
        assert!(matches!(result, Err(SearchError::NotYetImplemented(_))));
    }

    #[test]
    fn selection_operator_on_random_search_is_unsupported() {
        let mut config = base_config();
        config.test_generator = TestGeneratorKind::Random;
        config.algorithm = AlgorithmKind::Random;
        config.selection.operator = Some(SelectionOperatorKind::Rank);

        let result = TestGenerator::new(config).unwrap().generate(None);
        assert!(matches!(result, Err(SearchError::UnsupportedOperation(_))));
    }

    #[test]
    fn mismatched_facade_and_algorithm_are_rejected() {
        let mut config = base_config();
        config.test_generator = TestGeneratorKind::Random;
        config.algorithm = AlgorithmKind::Mosa;

        let result = TestGenerator::new(config).unwrap().generate(None);
        assert!(matches!(result, Err(SearchError::InvalidConfiguration(_))));
    }

    #[test]
    fn statement_fitness_requires_test_chromosomes() {
        let mut config = base_config();
        config.fitness_function.kind = FitnessKind::Statement;

        let result = TestGenerator::new(config).unwrap().generate(None);
        assert!(matches!(result, Err(SearchError::InvalidConfiguration(_))));
    }

    #[test]
    fn random_search_covers_statement_goals_through_the_host() {
        let mut config = base_config();
        config.test_generator = TestGeneratorKind::Random;
        config.algorithm = AlgorithmKind::Random;
        config.chromosome = ChromosomeKind::Test;
        config.chromosome_length = 6;
        config.mutation.operator = MutationOperatorKind::Integerlist;
        config.fitness_function.kind = FitnessKind::Statement;
        config.stopping_condition = StoppingConfig::FixedIteration { iterations: 200 };

        let host: SharedHost = Rc::new(RefCell::new(EchoHost { statements: 6 }));
        let report = TestGenerator::new(config)
            .unwrap()
            .generate(Some(host))
            .unwrap();

        let suite = match report.tests {
            GeneratedTests::Tests(suite) => suite,
            other => panic!("expected test chromosomes, got {other:?}"),
        };

        assert!(!suite.tests.is_empty());
        assert!(suite.tests.len() <= 6);
        for test in &suite.tests {
            assert!(!test.covered_goals.is_empty());
            for goal in &test.covered_goals {
                assert_eq!(test.fitness[goal], 0.0);
            }
        }
        assert_eq!(report.statistics.total_goals, 6);
    }

    #[test]
    fn one_plus_one_over_integer_lists() {
        let mut config = base_config();
        config.test_generator = TestGeneratorKind::Iterative;
        config.algorithm = AlgorithmKind::OnePlusOne;
        config.chromosome = ChromosomeKind::Integerlist;
        config.chromosome_length = 4;
        config.mutation.operator = MutationOperatorKind::Integerlist;
        config.integer_range.min = 0;
        config.integer_range.max = 3;
        config.stopping_condition = StoppingConfig::FixedIteration { iterations: 2000 };

        let report = TestGenerator::new(config).unwrap().generate(None).unwrap();
        let suite = match report.tests {
            GeneratedTests::IntegerLists(suite) => suite,
            other => panic!("expected integer lists, got {other:?}"),
        };

        assert_eq!(suite.tests.len(), 1);
        assert!(suite.tests[0]
            .chromosome
            .genes()
            .iter()
            .all(|&gene| gene == 3));
    }
}
