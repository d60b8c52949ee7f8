//! Predicates over a task result.
//!
//! A [`Predicate`] is a closed expression tree: leaves test one answer
//! addressed by a [`ResultSelector`], inner nodes combine them. Evaluation
//! is a plain recursive walk with no side effects beyond a log line for an
//! unusable regex.
//!
//! Leaves never fail. A selector that finds nothing, an answer of the wrong
//! kind, or a nil answer all make the leaf false.

use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::{LazyLock, Mutex, PoisonError};

use regex::Regex;
use serde::{Deserialize, Serialize};
use stepwise_core::models::answer::{Answer, ChoiceValue, QuestionKind};
use stepwise_core::models::result::TaskResult;
use stepwise_core::models::selector::ResultSelector;
use ts_rs::TS;

/// A numeric threshold compared and hashed by value, so predicates holding
/// one can live in hash sets. `0.0` and `-0.0` are the same number.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Number(pub f64);

impl Number {
    fn canonical_bits(self) -> u64 {
        if self.0 == 0.0 {
            0
        } else {
            self.0.to_bits()
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.canonical_bits() == other.canonical_bits()
    }
}

impl Eq for Number {}

impl Hash for Number {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical_bits().hash(state);
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Number(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(tag = "op", rename_all = "snake_case")]
#[ts(export)]
pub enum Predicate {
    Constant {
        value: bool,
    },
    /// The result exists and carries an answer.
    Answered {
        selector: ResultSelector,
    },
    /// The result exists and its answer is nil. A result that was never
    /// recorded does not count.
    NotAnswered {
        selector: ResultSelector,
    },
    BooleanEquals {
        selector: ResultSelector,
        expected: bool,
    },
    TextEquals {
        selector: ResultSelector,
        expected: String,
    },
    /// The whole text answer matches `pattern`.
    TextMatches {
        selector: ResultSelector,
        pattern: String,
    },
    NumericEquals {
        selector: ResultSelector,
        expected: Number,
    },
    /// Inclusive on both ends; a missing bound is open.
    NumericRange {
        selector: ResultSelector,
        #[serde(default)]
        minimum: Option<Number>,
        #[serde(default)]
        maximum: Option<Number>,
    },
    /// Inclusive on both ends; a missing bound is open.
    DateRange {
        selector: ResultSelector,
        #[serde(default)]
        earliest: Option<jiff::civil::Date>,
        #[serde(default)]
        latest: Option<jiff::civil::Date>,
    },
    /// The selected choices are exactly `expected`, in any order.
    ChoiceEquals {
        selector: ResultSelector,
        expected: Vec<ChoiceValue>,
    },
    /// `value` is one of the selected choices.
    ChoiceContains {
        selector: ResultSelector,
        value: ChoiceValue,
    },
    /// Some selected text choice matches `pattern` as a whole.
    ChoiceMatches {
        selector: ResultSelector,
        pattern: String,
    },
    And {
        predicates: Vec<Predicate>,
    },
    Or {
        predicates: Vec<Predicate>,
    },
    Not {
        predicate: Box<Predicate>,
    },
}

impl Predicate {
    pub fn always() -> Self {
        Predicate::Constant { value: true }
    }

    pub fn never() -> Self {
        Predicate::Constant { value: false }
    }

    pub fn answered(selector: ResultSelector) -> Self {
        Predicate::Answered { selector }
    }

    pub fn not_answered(selector: ResultSelector) -> Self {
        Predicate::NotAnswered { selector }
    }

    pub fn boolean(selector: ResultSelector, expected: bool) -> Self {
        Predicate::BooleanEquals { selector, expected }
    }

    pub fn text(selector: ResultSelector, expected: impl Into<String>) -> Self {
        Predicate::TextEquals {
            selector,
            expected: expected.into(),
        }
    }

    pub fn text_matching(selector: ResultSelector, pattern: impl Into<String>) -> Self {
        Predicate::TextMatches {
            selector,
            pattern: pattern.into(),
        }
    }

    pub fn numeric(selector: ResultSelector, expected: f64) -> Self {
        Predicate::NumericEquals {
            selector,
            expected: Number(expected),
        }
    }

    pub fn numeric_range(selector: ResultSelector, minimum: Option<f64>, maximum: Option<f64>) -> Self {
        Predicate::NumericRange {
            selector,
            minimum: minimum.map(Number),
            maximum: maximum.map(Number),
        }
    }

    pub fn date_range(
        selector: ResultSelector,
        earliest: Option<jiff::civil::Date>,
        latest: Option<jiff::civil::Date>,
    ) -> Self {
        Predicate::DateRange {
            selector,
            earliest,
            latest,
        }
    }

    pub fn choices(selector: ResultSelector, expected: impl IntoIterator<Item = ChoiceValue>) -> Self {
        Predicate::ChoiceEquals {
            selector,
            expected: expected.into_iter().collect(),
        }
    }

    pub fn choice_contains(selector: ResultSelector, value: impl Into<ChoiceValue>) -> Self {
        Predicate::ChoiceContains {
            selector,
            value: value.into(),
        }
    }

    pub fn choice_matching(selector: ResultSelector, pattern: impl Into<String>) -> Self {
        Predicate::ChoiceMatches {
            selector,
            pattern: pattern.into(),
        }
    }

    pub fn all_of(predicates: impl IntoIterator<Item = Predicate>) -> Self {
        Predicate::And {
            predicates: predicates.into_iter().collect(),
        }
    }

    pub fn any_of(predicates: impl IntoIterator<Item = Predicate>) -> Self {
        Predicate::Or {
            predicates: predicates.into_iter().collect(),
        }
    }

    pub fn negate(predicate: Predicate) -> Self {
        Predicate::Not {
            predicate: Box::new(predicate),
        }
    }

    pub fn evaluate(&self, result: &TaskResult) -> bool {
        match self {
            Predicate::Constant { value } => *value,
            Predicate::Answered { selector } => result
                .question_result(selector)
                .is_some_and(|q| q.is_answered()),
            Predicate::NotAnswered { selector } => result
                .question_result(selector)
                .is_some_and(|q| !q.is_answered()),
            Predicate::BooleanEquals { selector, expected } => {
                match answer(result, selector, |k| k == QuestionKind::Boolean) {
                    Some(Answer::Boolean(value)) => value == expected,
                    _ => false,
                }
            }
            Predicate::TextEquals { selector, expected } => {
                match answer(result, selector, |k| k == QuestionKind::Text) {
                    Some(Answer::Text(value)) => value == expected,
                    _ => false,
                }
            }
            Predicate::TextMatches { selector, pattern } => {
                match answer(result, selector, |k| k == QuestionKind::Text) {
                    Some(Answer::Text(value)) => full_match(pattern, value),
                    _ => false,
                }
            }
            Predicate::NumericEquals { selector, expected } => {
                match answer(result, selector, |k| k.is_numeric()) {
                    Some(Answer::Numeric(value)) => *value == expected.0,
                    _ => false,
                }
            }
            Predicate::NumericRange {
                selector,
                minimum,
                maximum,
            } => match answer(result, selector, |k| k.is_numeric()) {
                Some(Answer::Numeric(value)) => {
                    minimum.is_none_or(|min| *value >= min.0)
                        && maximum.is_none_or(|max| *value <= max.0)
                }
                _ => false,
            },
            Predicate::DateRange {
                selector,
                earliest,
                latest,
            } => match answer(result, selector, |k| k == QuestionKind::Date) {
                Some(Answer::Date(value)) => {
                    earliest.is_none_or(|e| *value >= e) && latest.is_none_or(|l| *value <= l)
                }
                _ => false,
            },
            Predicate::ChoiceEquals { selector, expected } => {
                match answer(result, selector, |k| k.is_choice()) {
                    Some(Answer::Choices(selected)) => same_choices(selected, expected),
                    _ => false,
                }
            }
            Predicate::ChoiceContains { selector, value } => {
                match answer(result, selector, |k| k.is_choice()) {
                    Some(Answer::Choices(selected)) => selected.contains(value),
                    _ => false,
                }
            }
            Predicate::ChoiceMatches { selector, pattern } => {
                match answer(result, selector, |k| k.is_choice()) {
                    Some(Answer::Choices(selected)) => selected.iter().any(|choice| match choice {
                        ChoiceValue::Text(text) => full_match(pattern, text),
                        ChoiceValue::Integer(_) => false,
                    }),
                    _ => false,
                }
            }
            Predicate::And { predicates } => predicates.iter().all(|p| p.evaluate(result)),
            Predicate::Or { predicates } => predicates.iter().any(|p| p.evaluate(result)),
            Predicate::Not { predicate } => !predicate.evaluate(result),
        }
    }

    /// Every selector referenced anywhere in the tree, in depth-first order.
    pub fn selectors(&self) -> Vec<&ResultSelector> {
        let mut out = Vec::new();
        self.collect_selectors(&mut out);
        out
    }

    fn collect_selectors<'a>(&'a self, out: &mut Vec<&'a ResultSelector>) {
        match self {
            Predicate::Constant { .. } => {}
            Predicate::Answered { selector }
            | Predicate::NotAnswered { selector }
            | Predicate::BooleanEquals { selector, .. }
            | Predicate::TextEquals { selector, .. }
            | Predicate::TextMatches { selector, .. }
            | Predicate::NumericEquals { selector, .. }
            | Predicate::NumericRange { selector, .. }
            | Predicate::DateRange { selector, .. }
            | Predicate::ChoiceEquals { selector, .. }
            | Predicate::ChoiceContains { selector, .. }
            | Predicate::ChoiceMatches { selector, .. } => out.push(selector),
            Predicate::And { predicates } | Predicate::Or { predicates } => {
                for p in predicates {
                    p.collect_selectors(out);
                }
            }
            Predicate::Not { predicate } => predicate.collect_selectors(out),
        }
    }
}

/// The answer behind `selector`, provided the question kind passes `kind`.
fn answer<'a>(
    result: &'a TaskResult,
    selector: &ResultSelector,
    kind: impl Fn(QuestionKind) -> bool,
) -> Option<&'a Answer> {
    let question = result.question_result(selector)?;
    if !kind(question.kind()) {
        return None;
    }
    question.answer()
}

fn full_match(pattern: &str, text: &str) -> bool {
    compiled(pattern).is_some_and(|re| re.is_match(text))
}

/// Anchored regex for `pattern`, compiled once per process. Invalid patterns
/// are remembered as `None` and warned about only on first use.
fn compiled(pattern: &str) -> Option<Regex> {
    static PATTERNS: LazyLock<Mutex<HashMap<String, Option<Regex>>>> =
        LazyLock::new(Default::default);

    let mut patterns = PATTERNS.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(re) = patterns.get(pattern) {
        return re.clone();
    }
    let re = match Regex::new(&format!("^(?:{pattern})$")) {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::warn!("invalid answer pattern {:?}: {}", pattern, e);
            None
        }
    };
    patterns.insert(pattern.to_string(), re.clone());
    re
}

fn same_choices(selected: &[ChoiceValue], expected: &[ChoiceValue]) -> bool {
    if selected.len() != expected.len() {
        return false;
    }
    let mut selected = selected.to_vec();
    let mut expected = expected.to_vec();
    selected.sort();
    expected.sort();
    selected == expected
}

/// A predicate packaged as a rule.
///
/// Two rules are equal exactly when their predicate trees are structurally
/// equal, and a rule hashes like its predicate. Predicates that are
/// logically equivalent but built differently (`a AND b` versus `b AND a`)
/// are distinct rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PredicateRule {
    predicate: Predicate,
}

impl PredicateRule {
    pub fn new(predicate: Predicate) -> Self {
        Self { predicate }
    }

    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    pub fn evaluate(&self, result: &TaskResult) -> bool {
        self.predicate.evaluate(result)
    }
}

impl Hash for PredicateRule {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.predicate.hash(state);
    }
}

impl From<Predicate> for PredicateRule {
    fn from(predicate: Predicate) -> Self {
        Self::new(predicate)
    }
}
