//! stepwise-navigator
//!
//! Runs a task definition against a task result: picks the step that comes
//! after the current one and filters a form step's items down to the ones
//! currently visible. Task definitions are built in code or loaded from
//! versioned JSON documents.

pub mod definition;
pub mod error;
pub mod navigator;

pub use definition::{TaskDefinition, load_definition, parse_definition};
pub use error::{DefinitionError, NavigationError};
pub use navigator::TaskNavigator;
