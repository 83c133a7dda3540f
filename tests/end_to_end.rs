use whisker_search::config::{
    AlgorithmKind, ChromosomeKind, Configuration, FitnessKind, MutationOperatorKind,
    StoppingConfig, TestGeneratorKind,
};
use whisker_search::{GeneratedTests, TestGenerator};

fn config(seed: u64) -> Configuration {
    let mut config = Configuration::default();
    config.seed = Some(seed);
    config
}

#[test]
fn one_plus_one_reaches_the_all_ones_bitstring() {
    let mut config = config(42);
    config.test_generator = TestGeneratorKind::Iterative;
    config.algorithm = AlgorithmKind::OnePlusOne;
    config.chromosome = ChromosomeKind::Bitstring;
    config.chromosome_length = 10;
    config.fitness_function.kind = FitnessKind::OneMax;
    config.stopping_condition = StoppingConfig::FixedIteration { iterations: 1000 };

    let report = TestGenerator::new(config).unwrap().generate(None).unwrap();
    assert!(report.statistics.iterations <= 1000);

    let suite = match report.tests {
        GeneratedTests::BitStrings(suite) => suite,
        other => panic!("expected bitstrings, got {other:?}"),
    };
    assert_eq!(suite.tests.len(), 1);
    assert!(suite.tests[0].chromosome.genes().iter().all(|&gene| gene));
    assert_eq!(suite.tests[0].covered_goals, vec![0]);
}

#[test]
fn mio_covers_all_ten_single_bit_goals() {
    let mut config = config(42);
    config.test_generator = TestGeneratorKind::ManyObjective;
    config.algorithm = AlgorithmKind::Mio;
    config.chromosome = ChromosomeKind::Bitstring;
    config.chromosome_length = 10;
    config.fitness_function.kind = FitnessKind::SingleBit;
    config.stopping_condition = StoppingConfig::FixedIteration { iterations: 1000 };

    let report = TestGenerator::new(config).unwrap().generate(None).unwrap();
    let suite = match report.tests {
        GeneratedTests::BitStrings(suite) => suite,
        other => panic!("expected bitstrings, got {other:?}"),
    };

    // One chromosome per goal, each covering its goal.
    assert_eq!(suite.tests.len(), 10);
    for bit in 0..10u32 {
        assert!(
            suite.tests.iter().any(|test| test.covered_goals.contains(&bit)),
            "goal {bit} left uncovered"
        );
    }
    assert_eq!(report.statistics.covered_goals, 10);
}

#[test]
fn random_search_returns_only_fresh_coverage() {
    let mut config = config(42);
    config.test_generator = TestGeneratorKind::Random;
    config.algorithm = AlgorithmKind::Random;
    config.chromosome = ChromosomeKind::Bitstring;
    config.chromosome_length = 10;
    config.fitness_function.kind = FitnessKind::SingleBit;
    config.stopping_condition = StoppingConfig::FixedIteration { iterations: 1000 };

    let report = TestGenerator::new(config).unwrap().generate(None).unwrap();
    let suite = match report.tests {
        GeneratedTests::BitStrings(suite) => suite,
        other => panic!("expected bitstrings, got {other:?}"),
    };

    assert!(suite.tests.len() <= 10);
    let mut seen: Vec<u32> = Vec::new();
    for test in &suite.tests {
        let fresh: Vec<u32> = test
            .covered_goals
            .iter()
            .copied()
            .filter(|goal| !seen.contains(goal))
            .collect();
        assert!(!fresh.is_empty(), "test without fresh coverage");
        seen.extend(fresh);
    }
}

#[test]
fn mosa_deduplicates_the_one_max_optimum() {
    let mut config = config(42);
    config.test_generator = TestGeneratorKind::ManyObjective;
    config.algorithm = AlgorithmKind::Mosa;
    config.chromosome = ChromosomeKind::Bitstring;
    config.chromosome_length = 5;
    config.population_size = 20;
    config.fitness_function.kind = FitnessKind::OneMax;
    config.stopping_condition = StoppingConfig::FixedIteration { iterations: 50 };

    let report = TestGenerator::new(config).unwrap().generate(None).unwrap();
    let suite = match report.tests {
        GeneratedTests::BitStrings(suite) => suite,
        other => panic!("expected bitstrings, got {other:?}"),
    };

    assert_eq!(suite.tests.len(), 1);
    assert!(suite.tests[0].chromosome.genes().iter().all(|&gene| gene));
}

#[test]
fn one_of_stops_at_whichever_condition_fires_first() {
    let mut config = config(42);
    config.test_generator = TestGeneratorKind::Iterative;
    config.algorithm = AlgorithmKind::OnePlusOne;
    config.chromosome = ChromosomeKind::Bitstring;
    config.chromosome_length = 3;
    config.fitness_function.kind = FitnessKind::OneMax;
    config.stopping_condition = StoppingConfig::OneOf {
        conditions: vec![
            StoppingConfig::FixedIteration { iterations: 100 },
            StoppingConfig::Optimal,
        ],
    };

    let report = TestGenerator::new(config).unwrap().generate(None).unwrap();

    // A three-bit one-max is found long before the iteration budget.
    assert!(report.statistics.iterations < 100);
    assert_eq!(report.statistics.covered_goals, 1);
}

#[test]
fn fixed_seed_runs_are_reproducible() {
    let run = |seed: u64| {
        let mut config = config(seed);
        config.test_generator = TestGeneratorKind::ManyObjective;
        config.algorithm = AlgorithmKind::Mosa;
        config.chromosome = ChromosomeKind::Bitstring;
        config.chromosome_length = 8;
        config.population_size = 10;
        config.fitness_function.kind = FitnessKind::SingleBit;
        config.stopping_condition = StoppingConfig::FixedIteration { iterations: 30 };

        let report = TestGenerator::new(config).unwrap().generate(None).unwrap();
        let suite = match report.tests {
            GeneratedTests::BitStrings(suite) => suite,
            other => panic!("expected bitstrings, got {other:?}"),
        };
        let genes: Vec<Vec<bool>> = suite
            .tests
            .iter()
            .map(|test| test.chromosome.genes().to_vec())
            .collect();
        (genes, report.statistics.iterations)
    };

    assert_eq!(run(7), run(7));
    assert_eq!(run(99), run(99));
}

#[test]
fn variable_length_tests_stay_within_their_bounds() {
    use std::cell::RefCell;
    use std::rc::Rc;
    use whisker_search::error::SearchError;
    use whisker_search::execution_host::{ExecutionHost, ExecutionTrace, TestChromosome};
    use whisker_search::fitness::{FitnessFunction, StatementCoverage};

    struct EchoHost;

    impl ExecutionHost for EchoHost {
        fn evaluate(&mut self, events: &[i64]) -> Result<ExecutionTrace, SearchError> {
            Ok(ExecutionTrace::new(
                events.iter().filter(|&&e| e >= 0).map(|&e| e as u64),
            ))
        }

        fn coverage_goals(
            &mut self,
        ) -> Result<Vec<Rc<dyn FitnessFunction<TestChromosome>>>, SearchError> {
            Ok((0..4u64)
                .map(|statement| {
                    Rc::new(StatementCoverage { statement })
                        as Rc<dyn FitnessFunction<TestChromosome>>
                })
                .collect())
        }

        fn event_count(&self) -> usize {
            4
        }
    }

    // MIO resamples bucket entries through the variable-length operator, so
    // the returned lengths reflect mutation, not just the generator.
    let mut config = config(5);
    config.test_generator = TestGeneratorKind::ManyObjective;
    config.algorithm = AlgorithmKind::Mio;
    config.chromosome = ChromosomeKind::Variablelengthtest;
    config.chromosome_length = 12;
    config.init_var_length = 3;
    config.mutation.operator = MutationOperatorKind::Variablelength;
    config.fitness_function.kind = FitnessKind::Statement;
    config.stopping_condition = StoppingConfig::FixedIteration { iterations: 500 };

    let report = TestGenerator::new(config)
        .unwrap()
        .generate(Some(Rc::new(RefCell::new(EchoHost))))
        .unwrap();

    let suite = match report.tests {
        GeneratedTests::Tests(suite) => suite,
        other => panic!("expected test chromosomes, got {other:?}"),
    };

    assert!(!suite.tests.is_empty());
    let mut covered: Vec<u32> = Vec::new();
    for test in &suite.tests {
        assert!(test.length >= 1);
        assert!(test.length <= 12);
        assert!(test.chromosome.genes().iter().all(|&e| (0..4).contains(&e)));
        assert!(!test.covered_goals.is_empty());
        covered.extend(&test.covered_goals);
    }
    for goal in 0..4u32 {
        assert!(covered.contains(&goal), "statement {goal} left uncovered");
    }
}
