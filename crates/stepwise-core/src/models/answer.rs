use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// The kind of question a result was produced by.
///
/// Predicates are type-sensitive: a boolean predicate never matches a text
/// result even when the stored values would compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum QuestionKind {
    Boolean,
    SingleChoice,
    MultipleChoice,
    Text,
    Numeric,
    /// Slider-style numeric answer.
    Scale,
    Date,
}

impl QuestionKind {
    /// Whether `answer` is a value this kind of question can produce.
    pub fn accepts(&self, answer: &Answer) -> bool {
        matches!(
            (self, answer),
            (QuestionKind::Boolean, Answer::Boolean(_))
                | (QuestionKind::SingleChoice, Answer::Choices(_))
                | (QuestionKind::MultipleChoice, Answer::Choices(_))
                | (QuestionKind::Text, Answer::Text(_))
                | (QuestionKind::Numeric, Answer::Numeric(_))
                | (QuestionKind::Scale, Answer::Numeric(_))
                | (QuestionKind::Date, Answer::Date(_))
        )
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, QuestionKind::Numeric | QuestionKind::Scale)
    }

    pub fn is_choice(&self) -> bool {
        matches!(self, QuestionKind::SingleChoice | QuestionKind::MultipleChoice)
    }
}

/// A recorded answer value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
#[ts(export)]
pub enum Answer {
    Boolean(bool),
    Numeric(f64),
    Text(String),
    Date(jiff::civil::Date),
    /// Selected choices, in selection order. Single-choice questions record
    /// a one-element list.
    Choices(Vec<ChoiceValue>),
}

/// The value behind a single text choice.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[serde(untagged)]
#[ts(export)]
pub enum ChoiceValue {
    Integer(i64),
    Text(String),
}

impl From<i64> for ChoiceValue {
    fn from(value: i64) -> Self {
        ChoiceValue::Integer(value)
    }
}

impl From<&str> for ChoiceValue {
    fn from(value: &str) -> Self {
        ChoiceValue::Text(value.to_string())
    }
}

impl From<String> for ChoiceValue {
    fn from(value: String) -> Self {
        ChoiceValue::Text(value)
    }
}
