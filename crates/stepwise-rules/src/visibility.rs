//! Form item visibility rules.

use std::fmt;

use serde::{Deserialize, Serialize};
use stepwise_core::models::result::TaskResult;

use crate::object::rule_object;
use crate::predicate::{Predicate, PredicateRule};

/// Decides whether a form item is shown given the answers so far.
///
/// Host applications may implement this for their own types; the
/// navigator only ever calls [`is_visible`](Self::is_visible). A form item
/// without a rule is always visible.
pub trait FormItemVisibilityRule: VisibilityRuleObject + fmt::Debug + Send + Sync {
    fn is_visible(&self, result: &TaskResult) -> bool;
}

rule_object!(FormItemVisibilityRule, VisibilityRuleObject);

/// Shows the item while its predicate holds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PredicateFormItemVisibilityRule {
    rule: PredicateRule,
}

impl PredicateFormItemVisibilityRule {
    pub fn new(predicate: Predicate) -> Self {
        Self {
            rule: PredicateRule::new(predicate),
        }
    }

    pub fn predicate(&self) -> &Predicate {
        self.rule.predicate()
    }
}

impl FormItemVisibilityRule for PredicateFormItemVisibilityRule {
    fn is_visible(&self, result: &TaskResult) -> bool {
        self.rule.evaluate(result)
    }
}
