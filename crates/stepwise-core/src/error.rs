use thiserror::Error;

use crate::models::answer::QuestionKind;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("identifier must not be empty")]
    EmptyIdentifier,

    #[error("answer for '{identifier}' does not fit a {kind:?} question")]
    AnswerKindMismatch {
        identifier: String,
        kind: QuestionKind,
    },
}
