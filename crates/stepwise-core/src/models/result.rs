use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use super::answer::{Answer, ChoiceValue, QuestionKind};
use super::selector::ResultSelector;
use super::step::Step;
use crate::error::CoreError;

/// The accumulated record of everything answered so far in one task run.
///
/// Step results are kept in presentation order. Only the host writes to a
/// task result; rule evaluation borrows it immutably and never copies it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaskResult {
    identifier: String,
    task_run: Uuid,
    started_at: jiff::Timestamp,
    #[serde(default)]
    steps: Vec<StepResult>,
    /// Results of sub-tasks, addressed through
    /// [`ResultSelector::task_identifier`].
    #[serde(default)]
    nested: Vec<TaskResult>,
}

impl TaskResult {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self::with_run(identifier, Uuid::new_v4())
    }

    pub fn with_run(identifier: impl Into<String>, task_run: Uuid) -> Self {
        Self {
            identifier: identifier.into(),
            task_run,
            started_at: jiff::Timestamp::now(),
            steps: Vec::new(),
            nested: Vec::new(),
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn task_run(&self) -> Uuid {
        self.task_run
    }

    pub fn started_at(&self) -> jiff::Timestamp {
        self.started_at
    }

    pub fn steps(&self) -> &[StepResult] {
        &self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn step_result(&self, step_identifier: &str) -> Option<&StepResult> {
        self.steps.iter().find(|s| s.identifier == step_identifier)
    }

    /// Position of a step in presentation order.
    pub fn position(&self, step_identifier: &str) -> Option<usize> {
        self.steps.iter().position(|s| s.identifier == step_identifier)
    }

    /// Record a completed step.
    ///
    /// Recording a step that is already present means the participant went
    /// back and revised it: that result and every later one are removed
    /// before the new result is appended. The removed results are returned.
    pub fn record(&mut self, step: StepResult) -> Vec<StepResult> {
        let dropped = match self.position(&step.identifier) {
            Some(index) => self.steps.split_off(index),
            None => Vec::new(),
        };
        self.steps.push(step);
        dropped
    }

    /// Attach the result of a sub-task, replacing any earlier result with the
    /// same task identifier.
    pub fn add_nested(&mut self, task: TaskResult) {
        self.nested.retain(|t| t.identifier != task.identifier);
        self.nested.push(task);
    }

    pub fn nested(&self, task_identifier: &str) -> Option<&TaskResult> {
        self.nested.iter().find(|t| t.identifier == task_identifier)
    }

    /// Resolve a selector to the question result it addresses.
    pub fn question_result(&self, selector: &ResultSelector) -> Option<&QuestionResult> {
        let tree = match selector.task_identifier.as_deref() {
            Some(task) if task != self.identifier => self.find_task(task)?,
            _ => self,
        };
        tree.step_result(&selector.step_identifier)?
            .result(&selector.result_identifier)
    }

    fn find_task(&self, task_identifier: &str) -> Option<&TaskResult> {
        self.nested.iter().find_map(|t| {
            if t.identifier == task_identifier {
                Some(t)
            } else {
                t.find_task(task_identifier)
            }
        })
    }
}

/// The answers recorded for one step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StepResult {
    identifier: String,
    #[serde(default)]
    results: Vec<QuestionResult>,
}

impl StepResult {
    pub fn new(identifier: impl Into<String>) -> Result<Self, CoreError> {
        let identifier = identifier.into();
        if identifier.is_empty() {
            return Err(CoreError::EmptyIdentifier);
        }
        Ok(Self {
            identifier,
            results: Vec::new(),
        })
    }

    pub fn with_results(
        identifier: impl Into<String>,
        results: impl IntoIterator<Item = QuestionResult>,
    ) -> Result<Self, CoreError> {
        let mut step = Self::new(identifier)?;
        for result in results {
            step.push(result);
        }
        Ok(step)
    }

    /// The result a host records for a step left without answering: one
    /// nil answer per answerable item.
    pub fn empty_for(step: &Step) -> Self {
        let results = match step {
            Step::Question {
                identifier, kind, ..
            } => vec![QuestionResult {
                identifier: identifier.clone(),
                kind: *kind,
                answer: None,
            }],
            Step::Form { items, .. } => items
                .iter()
                .filter(|item| item.is_answerable())
                .filter_map(|item| {
                    Some(QuestionResult {
                        identifier: item.identifier.clone()?,
                        kind: item.kind?,
                        answer: None,
                    })
                })
                .collect(),
            _ => Vec::new(),
        };
        Self {
            identifier: step.identifier().to_string(),
            results,
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn results(&self) -> &[QuestionResult] {
        &self.results
    }

    pub fn result(&self, identifier: &str) -> Option<&QuestionResult> {
        self.results.iter().find(|r| r.identifier == identifier)
    }

    /// Add a question result, replacing one with the same identifier in place.
    pub fn push(&mut self, result: QuestionResult) {
        match self
            .results
            .iter_mut()
            .find(|r| r.identifier == result.identifier)
        {
            Some(existing) => *existing = result,
            None => self.results.push(result),
        }
    }
}

/// The answer to a single question or form item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct QuestionResult {
    identifier: String,
    kind: QuestionKind,
    #[serde(default)]
    answer: Option<Answer>,
}

impl QuestionResult {
    pub fn new(
        identifier: impl Into<String>,
        kind: QuestionKind,
        answer: Option<Answer>,
    ) -> Result<Self, CoreError> {
        let identifier = identifier.into();
        if identifier.is_empty() {
            return Err(CoreError::EmptyIdentifier);
        }
        if let Some(answer) = &answer
            && !kind.accepts(answer)
        {
            return Err(CoreError::AnswerKindMismatch { identifier, kind });
        }
        Ok(Self {
            identifier,
            kind,
            answer,
        })
    }

    pub fn unanswered(identifier: impl Into<String>, kind: QuestionKind) -> Result<Self, CoreError> {
        Self::new(identifier, kind, None)
    }

    pub fn boolean(identifier: impl Into<String>, value: bool) -> Result<Self, CoreError> {
        Self::new(identifier, QuestionKind::Boolean, Some(Answer::Boolean(value)))
    }

    pub fn text(identifier: impl Into<String>, value: impl Into<String>) -> Result<Self, CoreError> {
        Self::new(identifier, QuestionKind::Text, Some(Answer::Text(value.into())))
    }

    pub fn numeric(identifier: impl Into<String>, value: f64) -> Result<Self, CoreError> {
        Self::new(identifier, QuestionKind::Numeric, Some(Answer::Numeric(value)))
    }

    pub fn scale(identifier: impl Into<String>, value: f64) -> Result<Self, CoreError> {
        Self::new(identifier, QuestionKind::Scale, Some(Answer::Numeric(value)))
    }

    pub fn date(identifier: impl Into<String>, value: jiff::civil::Date) -> Result<Self, CoreError> {
        Self::new(identifier, QuestionKind::Date, Some(Answer::Date(value)))
    }

    pub fn single_choice(
        identifier: impl Into<String>,
        value: impl Into<ChoiceValue>,
    ) -> Result<Self, CoreError> {
        Self::new(
            identifier,
            QuestionKind::SingleChoice,
            Some(Answer::Choices(vec![value.into()])),
        )
    }

    pub fn multiple_choice(
        identifier: impl Into<String>,
        values: impl IntoIterator<Item = ChoiceValue>,
    ) -> Result<Self, CoreError> {
        Self::new(
            identifier,
            QuestionKind::MultipleChoice,
            Some(Answer::Choices(values.into_iter().collect())),
        )
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn kind(&self) -> QuestionKind {
        self.kind
    }

    pub fn answer(&self) -> Option<&Answer> {
        self.answer.as_ref()
    }

    pub fn is_answered(&self) -> bool {
        self.answer.is_some()
    }
}
