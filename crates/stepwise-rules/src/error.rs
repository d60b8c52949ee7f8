use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("predicate navigation rule needs at least one branch")]
    NoBranches,

    #[error("navigation rule destination must not be empty")]
    EmptyDestination,
}
