//! stepwise-core
//!
//! Pure domain types for conditional survey tasks: the result tree a host
//! accumulates while a participant answers, selectors that address single
//! answers inside it, and the step / form item definitions rules refer to.
//! No evaluation logic lives here; this is the shared vocabulary of the
//! Stepwise crates.

pub mod error;
pub mod identifiers;
pub mod models;
