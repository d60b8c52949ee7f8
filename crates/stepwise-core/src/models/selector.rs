use std::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Addresses a single question result inside a result tree.
///
/// `task_identifier` is only needed when the answer lives in a nested
/// sub-task result; leaving it empty addresses the tree being evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ResultSelector {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_identifier: Option<String>,
    pub step_identifier: String,
    pub result_identifier: String,
}

impl ResultSelector {
    pub fn new(step_identifier: impl Into<String>, result_identifier: impl Into<String>) -> Self {
        Self {
            task_identifier: None,
            step_identifier: step_identifier.into(),
            result_identifier: result_identifier.into(),
        }
    }

    /// Selector for a question step, whose only result carries the step's
    /// own identifier.
    pub fn for_question_step(identifier: impl Into<String>) -> Self {
        let identifier = identifier.into();
        Self::new(identifier.clone(), identifier)
    }

    pub fn in_task(mut self, task_identifier: impl Into<String>) -> Self {
        self.task_identifier = Some(task_identifier.into());
        self
    }
}

impl fmt::Display for ResultSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(task) = &self.task_identifier {
            write!(f, "{task}/")?;
        }
        write!(f, "{}/{}", self.step_identifier, self.result_identifier)
    }
}
