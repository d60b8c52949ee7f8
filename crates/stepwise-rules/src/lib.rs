//! stepwise-rules
//!
//! Rule objects evaluated against a task result: predicates, form item
//! visibility rules, step navigation rules and step skip rules. Pure logic
//! with no I/O; every evaluation borrows the result tree and returns a
//! plain value.
//!
//! Each rule family is an object-safe trait so hosts can register their own
//! rule types. Built-in rules are immutable values with structural equality
//! and hashing, so tasks can store them in sets and compare copies.

pub mod error;
mod object;
pub mod navigation;
pub mod predicate;
pub mod skip;
pub mod visibility;

pub use navigation::{
    DirectStepNavigationRule, PredicateStepNavigationRule, SecondaryActionStepNavigationRule,
    StepNavigationRule,
};
pub use predicate::{Predicate, PredicateRule};
pub use skip::{PredicateSkipStepNavigationRule, SkipStepNavigationRule};
pub use visibility::{FormItemVisibilityRule, PredicateFormItemVisibilityRule};
