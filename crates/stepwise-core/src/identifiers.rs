//! Reserved step identifiers.
//!
//! These never name a real step. Navigation rules use them as destinations
//! and the navigator interprets them instead of looking them up.

/// Destination meaning "advance past the trigger step without answering it".
pub const SKIP_STEP_IDENTIFIER: &str = "stepwise.step.skip";

/// Destination meaning "end the task".
pub const NULL_STEP_IDENTIFIER: &str = "stepwise.step.null";

/// Whether `identifier` is one of the reserved sentinels.
pub fn is_reserved(identifier: &str) -> bool {
    identifier == SKIP_STEP_IDENTIFIER || identifier == NULL_STEP_IDENTIFIER
}
