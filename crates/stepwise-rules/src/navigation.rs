//! Step navigation rules.
//!
//! A navigation rule is registered for a trigger step and is consulted when
//! the participant continues past it. Returning `None` means the rule has no
//! opinion and the navigator falls back to declaration order.

use std::fmt;

use serde::{Deserialize, Serialize};
use stepwise_core::identifiers::{NULL_STEP_IDENTIFIER, SKIP_STEP_IDENTIFIER};
use stepwise_core::models::result::TaskResult;
use stepwise_core::models::step::Step;

use crate::error::RuleError;
use crate::object::rule_object;
use crate::predicate::{Predicate, PredicateRule};

/// Text of the secondary action button in plain skip mode.
pub const SKIP_TEXT: &str = "Skip";

pub trait StepNavigationRule: NavigationRuleObject + fmt::Debug + Send + Sync {
    /// The step to present after `current`, or `None` to fall through.
    ///
    /// The returned identifier may be one of the reserved sentinels.
    fn destination_step(&self, current: &Step, steps: &[Step], result: &TaskResult)
    -> Option<String>;

    /// Every destination this rule can ever return, so a task can reject
    /// dangling references when the rule is registered.
    fn destination_identifiers(&self) -> Vec<&str> {
        Vec::new()
    }

    /// The secondary action this rule offers, if it is one.
    fn secondary_action(&self) -> Option<&SecondaryActionStepNavigationRule> {
        None
    }
}

rule_object!(StepNavigationRule, NavigationRuleObject);

/// Always continues to the same step.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DirectStepNavigationRule {
    destination_step_identifier: String,
}

impl DirectStepNavigationRule {
    pub fn new(destination_step_identifier: impl Into<String>) -> Self {
        Self {
            destination_step_identifier: destination_step_identifier.into(),
        }
    }

    /// Ends the task after the trigger step.
    pub fn end_of_task() -> Self {
        Self::new(NULL_STEP_IDENTIFIER)
    }

    pub fn destination_step_identifier(&self) -> &str {
        &self.destination_step_identifier
    }
}

impl StepNavigationRule for DirectStepNavigationRule {
    fn destination_step(&self, _current: &Step, _steps: &[Step], _result: &TaskResult) -> Option<String> {
        Some(self.destination_step_identifier.clone())
    }

    fn destination_identifiers(&self) -> Vec<&str> {
        vec![self.destination_step_identifier.as_str()]
    }
}

/// One `predicate → destination` pair of a [`PredicateStepNavigationRule`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PredicateBranch {
    #[serde(rename = "predicate")]
    pub rule: PredicateRule,
    pub destination_step_identifier: String,
}

/// Branches on the answers so far.
///
/// Branches are tried in order and the first predicate that holds decides
/// the destination, even when later predicates hold as well. When none
/// holds, the default destination is used; without one the rule has no
/// opinion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PredicateStepNavigationRule {
    branches: Vec<PredicateBranch>,
    #[serde(default)]
    default_destination_step_identifier: Option<String>,
}

impl PredicateStepNavigationRule {
    pub fn new<S: Into<String>>(
        branches: impl IntoIterator<Item = (Predicate, S)>,
        default_destination_step_identifier: Option<String>,
    ) -> Result<Self, RuleError> {
        let branches: Vec<_> = branches
            .into_iter()
            .map(|(predicate, destination)| PredicateBranch {
                rule: PredicateRule::new(predicate),
                destination_step_identifier: destination.into(),
            })
            .collect();
        if branches.is_empty() {
            return Err(RuleError::NoBranches);
        }
        let empty_default = default_destination_step_identifier
            .as_deref()
            .is_some_and(str::is_empty);
        if empty_default || branches.iter().any(|b| b.destination_step_identifier.is_empty()) {
            return Err(RuleError::EmptyDestination);
        }
        Ok(Self {
            branches,
            default_destination_step_identifier,
        })
    }

    pub fn branches(&self) -> &[PredicateBranch] {
        &self.branches
    }

    pub fn default_destination_step_identifier(&self) -> Option<&str> {
        self.default_destination_step_identifier.as_deref()
    }
}

impl StepNavigationRule for PredicateStepNavigationRule {
    fn destination_step(&self, _current: &Step, _steps: &[Step], result: &TaskResult) -> Option<String> {
        self.branches
            .iter()
            .find(|branch| branch.rule.evaluate(result))
            .map(|branch| branch.destination_step_identifier.clone())
            .or_else(|| self.default_destination_step_identifier.clone())
    }

    fn destination_identifiers(&self) -> Vec<&str> {
        self.branches
            .iter()
            .map(|b| b.destination_step_identifier.as_str())
            .chain(self.default_destination_step_identifier.as_deref())
            .collect()
    }
}

/// The secondary ("skip") button of a step.
///
/// In skip mode the button advances past the step without answering it.
/// Otherwise it jumps to an arbitrary step and carries its own label, for
/// example an "Opt Out" button leading to an exit step.
///
/// The label is part of the rule's identity: two rules with the same
/// destination but different text are different rules.
///
/// Continuing normally past the trigger step ignores this rule; it only
/// applies when the secondary action itself is taken.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SecondaryActionStepNavigationRule {
    destination_step_identifier: String,
    text: String,
}

impl SecondaryActionStepNavigationRule {
    pub fn new(destination_step_identifier: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            destination_step_identifier: destination_step_identifier.into(),
            text: text.into(),
        }
    }

    pub fn skip() -> Self {
        Self::new(SKIP_STEP_IDENTIFIER, SKIP_TEXT)
    }

    pub fn destination_step_identifier(&self) -> &str {
        &self.destination_step_identifier
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_skip_mode(&self) -> bool {
        self.destination_step_identifier == SKIP_STEP_IDENTIFIER
    }
}

impl Default for SecondaryActionStepNavigationRule {
    fn default() -> Self {
        Self::skip()
    }
}

impl StepNavigationRule for SecondaryActionStepNavigationRule {
    fn destination_step(&self, _current: &Step, _steps: &[Step], _result: &TaskResult) -> Option<String> {
        None
    }

    fn destination_identifiers(&self) -> Vec<&str> {
        vec![self.destination_step_identifier.as_str()]
    }

    fn secondary_action(&self) -> Option<&SecondaryActionStepNavigationRule> {
        Some(self)
    }
}
