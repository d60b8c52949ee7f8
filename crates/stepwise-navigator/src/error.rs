use thiserror::Error;

#[derive(Debug, Error)]
pub enum NavigationError {
    #[error("step identifier must not be empty")]
    EmptyIdentifier,

    #[error("duplicate step identifier: {0}")]
    DuplicateStep(String),

    #[error("step identifier '{0}' is reserved")]
    ReservedIdentifier(String),

    #[error("unknown step: {0}")]
    UnknownStep(String),

    #[error("navigation rule on '{trigger}' points at unknown step '{destination}'")]
    UnknownDestination {
        trigger: String,
        destination: String,
    },

    #[error("step '{0}' is not a form step")]
    NotAFormStep(String),

    #[error("form step '{step}' has no answerable item '{item}'")]
    UnknownFormItem { step: String, item: String },

    #[error("skip rules keep skipping past '{0}' without reaching a step")]
    SkipCycle(String),
}

#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("definition_version {found} is newer than this build supports ({supported})")]
    UnsupportedVersion { found: u64, supported: u32 },

    #[error("malformed task definition: {0}")]
    Malformed(String),

    #[error("rule error: {0}")]
    Rule(#[from] stepwise_rules::error::RuleError),

    #[error("navigation error: {0}")]
    Navigation(#[from] NavigationError),
}
