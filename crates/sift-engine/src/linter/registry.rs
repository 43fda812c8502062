//! Rule registry: trigger node kind → rules to run.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::config::LintConfig;
use super::rule::LintRule;
use super::rules;
use crate::syntax::SyntaxKind;

/// Explicit mapping from node kind to the rules triggered by it.
///
/// Built once by the owner of a [`Linter`](super::Linter) and shared
/// read-only by every worker.
#[derive(Default, Clone)]
pub struct RuleRegistry {
    rules: Vec<Arc<dyn LintRule>>,
    by_kind: FxHashMap<SyntaxKind, Vec<Arc<dyn LintRule>>>,
}

impl RuleRegistry {
    /// An empty registry.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Every built-in rule.
    pub fn new() -> Self {
        Self::with_config(&LintConfig::default())
    }

    /// Built-in rules minus those disabled in `config`, by name or code.
    pub fn with_config(config: &LintConfig) -> Self {
        let mut registry = Self::empty();
        for rule in rules::all_rules() {
            let meta = rule.meta();
            if !config.is_disabled(meta.name) && !config.is_disabled(meta.code) {
                registry.register(Arc::from(rule));
            }
        }
        registry
    }

    /// Add a rule under each of its trigger kinds.
    pub fn register(&mut self, rule: Arc<dyn LintRule>) {
        for &kind in rule.meta().triggers {
            self.by_kind.entry(kind).or_default().push(Arc::clone(&rule));
        }
        self.rules.push(rule);
    }

    /// Rules to invoke for a node of `kind`.
    pub fn rules_for(&self, kind: SyntaxKind) -> &[Arc<dyn LintRule>] {
        self.by_kind.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All registered rules in registration order.
    pub fn rules(&self) -> impl Iterator<Item = &dyn LintRule> {
        self.rules.iter().map(|r| r.as_ref())
    }

    /// Look a rule up by name or code.
    pub fn find(&self, name_or_code: &str) -> Option<&dyn LintRule> {
        self.rules()
            .find(|r| r.meta().name == name_or_code || r.meta().code == name_or_code)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linter::config::RuleSetting;

    #[test]
    fn test_rules_indexed_by_trigger() {
        let registry = RuleRegistry::new();
        let names = |kind| -> Vec<&'static str> {
            registry
                .rules_for(kind)
                .iter()
                .map(|r| r.meta().name)
                .collect()
        };
        assert_eq!(names(SyntaxKind::Invocation), vec!["redundant-filter"]);
        assert_eq!(names(SyntaxKind::ThrowStatement), vec!["unsafe-rethrow"]);
        assert!(names(SyntaxKind::Block).is_empty());
    }

    #[test]
    fn test_disabled_rule_not_registered() {
        let mut config = LintConfig::new();
        config.set_rule("unsafe-rethrow", RuleSetting::Off);
        let registry = RuleRegistry::with_config(&config);
        assert_eq!(registry.len(), 1);
        assert!(registry.rules_for(SyntaxKind::ThrowStatement).is_empty());
        assert!(registry.find("S2001").is_none());
        assert!(registry.find("redundant-filter").is_some());
    }
}
