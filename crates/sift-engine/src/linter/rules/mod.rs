//! All built-in lint rules.

pub mod redundant_filter;
pub mod unsafe_rethrow;

use super::rule::LintRule;

/// Returns all available lint rules.
pub fn all_rules() -> Vec<Box<dyn LintRule>> {
    vec![
        // Performance
        Box::new(redundant_filter::RedundantFilter),
        // Correctness
        Box::new(unsafe_rethrow::UnsafeRethrow),
    ]
}
