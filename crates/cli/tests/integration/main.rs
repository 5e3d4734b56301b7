//! CLI integration tests, one module per command.

mod check_tests;
mod clean_tests;
mod common;
mod paths_tests;
mod run_tests;
