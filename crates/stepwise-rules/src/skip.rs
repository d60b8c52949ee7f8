//! Step skip rules.
//!
//! A skip rule belongs to the step it may hide. Whenever navigation lands on
//! that step and the rule holds, the navigator moves past it as if the
//! participant had continued.

use std::fmt;

use serde::{Deserialize, Serialize};
use stepwise_core::models::result::TaskResult;

use crate::object::rule_object;
use crate::predicate::{Predicate, PredicateRule};

pub trait SkipStepNavigationRule: SkipRuleObject + fmt::Debug + Send + Sync {
    fn step_should_skip(&self, result: &TaskResult) -> bool;
}

rule_object!(SkipStepNavigationRule, SkipRuleObject);

/// Skips the step while its predicate holds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PredicateSkipStepNavigationRule {
    rule: PredicateRule,
}

impl PredicateSkipStepNavigationRule {
    pub fn new(predicate: Predicate) -> Self {
        Self {
            rule: PredicateRule::new(predicate),
        }
    }

    pub fn predicate(&self) -> &Predicate {
        self.rule.predicate()
    }
}

impl SkipStepNavigationRule for PredicateSkipStepNavigationRule {
    fn step_should_skip(&self, result: &TaskResult) -> bool {
        self.rule.evaluate(result)
    }
}
