use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::answer::QuestionKind;

/// A single unit of work in a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "snake_case")]
#[ts(export)]
pub enum Step {
    Instruction {
        identifier: String,
        #[serde(default)]
        title: Option<String>,
    },
    Question {
        identifier: String,
        #[serde(default)]
        title: Option<String>,
        kind: QuestionKind,
        #[serde(default)]
        optional: bool,
    },
    Form {
        identifier: String,
        #[serde(default)]
        title: Option<String>,
        items: Vec<FormItem>,
    },
    Completion {
        identifier: String,
        #[serde(default)]
        title: Option<String>,
    },
}

impl Step {
    pub fn instruction(identifier: impl Into<String>) -> Self {
        Step::Instruction {
            identifier: identifier.into(),
            title: None,
        }
    }

    pub fn question(identifier: impl Into<String>, kind: QuestionKind) -> Self {
        Step::Question {
            identifier: identifier.into(),
            title: None,
            kind,
            optional: false,
        }
    }

    pub fn form(identifier: impl Into<String>, items: Vec<FormItem>) -> Self {
        Step::Form {
            identifier: identifier.into(),
            title: None,
            items,
        }
    }

    pub fn completion(identifier: impl Into<String>) -> Self {
        Step::Completion {
            identifier: identifier.into(),
            title: None,
        }
    }

    pub fn identifier(&self) -> &str {
        match self {
            Step::Instruction { identifier, .. }
            | Step::Question { identifier, .. }
            | Step::Form { identifier, .. }
            | Step::Completion { identifier, .. } => identifier,
        }
    }

    pub fn title(&self) -> Option<&str> {
        match self {
            Step::Instruction { title, .. }
            | Step::Question { title, .. }
            | Step::Form { title, .. }
            | Step::Completion { title, .. } => title.as_deref(),
        }
    }

    /// Declared form items, section headers included. Empty for anything
    /// other than a form step.
    pub fn form_items(&self) -> &[FormItem] {
        match self {
            Step::Form { items, .. } => items,
            _ => &[],
        }
    }

    pub fn is_form(&self) -> bool {
        matches!(self, Step::Form { .. })
    }
}

/// One entry of a form step: either a question or a section header.
///
/// Section headers carry no identifier and no answer kind; they are rendered
/// but can never be answered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FormItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<QuestionKind>,
    #[serde(default)]
    pub optional: bool,
}

impl FormItem {
    pub fn section(title: impl Into<String>) -> Self {
        Self {
            identifier: None,
            text: Some(title.into()),
            kind: None,
            optional: false,
        }
    }

    pub fn question(
        identifier: impl Into<String>,
        text: impl Into<String>,
        kind: QuestionKind,
    ) -> Self {
        Self {
            identifier: Some(identifier.into()),
            text: Some(text.into()),
            kind: Some(kind),
            optional: false,
        }
    }

    pub fn optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    pub fn is_section(&self) -> bool {
        self.identifier.is_none()
    }

    pub fn is_answerable(&self) -> bool {
        self.identifier.is_some() && self.kind.is_some()
    }
}
