//! Search-based test generation core for block-based programs.
//!
//! Given a program's coverage goals and a search budget, the crate evolves
//! candidate tests with one of four cooperating algorithms (random search,
//! a (1+1) evolutionary algorithm, MOSA and MIO) and returns a minimized
//! suite of best individuals. Execution of a candidate against the program
//! under test is delegated to an [`execution_host::ExecutionHost`]; the
//! [`test_generator::TestGenerator`] façade wires a parsed
//! [`config::Configuration`] into a runnable search.

pub mod archive;
pub mod chromosome;
pub mod config;
pub mod crossover;
pub mod error;
pub mod execution_host;
pub mod fitness;
pub mod generator;
pub mod mio;
pub mod mosa;
pub mod mutation;
mod non_dominated_sort;
pub mod one_plus_one;
pub mod random_search;
pub mod randomness;
pub mod search_algorithm;
pub mod selection;
pub mod statistics;
pub mod stopping;
pub mod test_generator;

pub use config::Configuration;
pub use error::SearchError;
pub use test_generator::{GeneratedTests, GenerationReport, TestGenerator, TestSuite, WhiskerTest};
