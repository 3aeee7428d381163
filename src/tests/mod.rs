//! Cross-module test suites



#[cfg(test)]
mod scenario_tests;
