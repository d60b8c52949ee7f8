//! Serializable task definitions.
//!
//! A definition describes a task the way authors write it: the ordered
//! steps plus the built-in rules attached to them. Documents carry a
//! `definition_version`; older documents are migrated as raw JSON before
//! they are deserialized, so field renames and reshapes never need
//! compatibility shims on the typed structs.

use std::path::Path;

use serde::{Deserialize, Serialize};
use stepwise_core::models::step::Step;
use stepwise_rules::navigation::{
    DirectStepNavigationRule, PredicateBranch, PredicateStepNavigationRule,
    SecondaryActionStepNavigationRule,
};
use stepwise_rules::predicate::Predicate;
use stepwise_rules::skip::PredicateSkipStepNavigationRule;
use stepwise_rules::visibility::PredicateFormItemVisibilityRule;
use tracing::info;

use crate::error::DefinitionError;
use crate::navigator::TaskNavigator;

/// Current definition version. Bump this when changing the document shape.
/// Each bump requires a corresponding entry in [`migrate`].
pub const CURRENT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDefinition {
    /// Schema version. Missing or 0 = pre-versioned document.
    #[serde(default)]
    pub definition_version: u32,
    pub identifier: String,
    pub steps: Vec<Step>,
    #[serde(default)]
    pub navigation_rules: Vec<NavigationRuleEntry>,
    #[serde(default)]
    pub skip_rules: Vec<SkipRuleEntry>,
    #[serde(default)]
    pub visibility_rules: Vec<VisibilityRuleEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationRuleEntry {
    pub trigger_step_identifier: String,
    pub rule: NavigationRuleDefinition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NavigationRuleDefinition {
    Direct {
        destination_step_identifier: String,
    },
    Predicate {
        branches: Vec<PredicateBranch>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default_destination_step_identifier: Option<String>,
    },
    /// Without a destination this is the plain "Skip" action.
    SecondaryAction {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        destination_step_identifier: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkipRuleEntry {
    pub step_identifier: String,
    pub predicate: Predicate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisibilityRuleEntry {
    pub step_identifier: String,
    pub item_identifier: String,
    pub predicate: Predicate,
}

impl TaskDefinition {
    pub fn new(identifier: impl Into<String>, steps: Vec<Step>) -> Self {
        Self {
            definition_version: CURRENT_VERSION,
            identifier: identifier.into(),
            steps,
            navigation_rules: Vec::new(),
            skip_rules: Vec::new(),
            visibility_rules: Vec::new(),
        }
    }

    /// Build a navigator, registering and validating every rule.
    pub fn into_navigator(self) -> Result<TaskNavigator, DefinitionError> {
        let mut navigator = TaskNavigator::new(self.identifier, self.steps)?;

        for entry in self.navigation_rules {
            let trigger = entry.trigger_step_identifier;
            match entry.rule {
                NavigationRuleDefinition::Direct {
                    destination_step_identifier,
                } => navigator.set_navigation_rule(
                    trigger,
                    DirectStepNavigationRule::new(destination_step_identifier),
                )?,
                NavigationRuleDefinition::Predicate {
                    branches,
                    default_destination_step_identifier,
                } => {
                    let rule = PredicateStepNavigationRule::new(
                        branches.into_iter().map(|b| {
                            (b.rule.predicate().clone(), b.destination_step_identifier)
                        }),
                        default_destination_step_identifier,
                    )?;
                    navigator.set_navigation_rule(trigger, rule)?
                }
                NavigationRuleDefinition::SecondaryAction {
                    destination_step_identifier,
                    text,
                } => {
                    let rule = match (destination_step_identifier, text) {
                        (None, None) => SecondaryActionStepNavigationRule::skip(),
                        (Some(destination), Some(text)) => {
                            SecondaryActionStepNavigationRule::new(destination, text)
                        }
                        (None, Some(text)) => SecondaryActionStepNavigationRule::new(
                            stepwise_core::identifiers::SKIP_STEP_IDENTIFIER,
                            text,
                        ),
                        (Some(_), None) => {
                            return Err(DefinitionError::Malformed(format!(
                                "secondary action on '{trigger}' has a destination but no text"
                            )));
                        }
                    };
                    navigator.set_navigation_rule(trigger, rule)?
                }
            }
        }

        for entry in self.skip_rules {
            navigator.set_skip_rule(
                entry.step_identifier,
                PredicateSkipStepNavigationRule::new(entry.predicate),
            )?;
        }

        for entry in self.visibility_rules {
            navigator.set_visibility_rule(
                entry.step_identifier,
                entry.item_identifier,
                PredicateFormItemVisibilityRule::new(entry.predicate),
            )?;
        }

        info!(
            "task {} loaded with {} steps",
            navigator.identifier(),
            navigator.steps().len()
        );
        Ok(navigator)
    }

    /// Serialize, always stamped with the current version.
    pub fn to_json(&self) -> Result<String, DefinitionError> {
        let mut stamped = self.clone();
        stamped.definition_version = CURRENT_VERSION;
        Ok(serde_json::to_string_pretty(&stamped)?)
    }
}

/// Parse a definition document, migrating it to the current version first.
pub fn parse_definition(contents: &str) -> Result<TaskDefinition, DefinitionError> {
    // Parse as raw JSON so we can run migrations before deserializing.
    let json: serde_json::Value = serde_json::from_str(contents)?;
    let on_disk_version = match json.get("definition_version") {
        None | Some(serde_json::Value::Null) => 0,
        Some(v) => v.as_u64().ok_or_else(|| {
            DefinitionError::Malformed(format!("definition_version {v} is not a version number"))
        })?,
    };

    let migrated = migrate(json, on_disk_version)?;
    let mut definition: TaskDefinition = serde_json::from_value(migrated)?;
    definition.definition_version = CURRENT_VERSION;
    Ok(definition)
}

pub fn load_definition(path: impl AsRef<Path>) -> Result<TaskDefinition, DefinitionError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)?;
    info!("loading task definition from {}", path.display());
    parse_definition(&contents)
}

/// Run sequential migrations from `from_version` up to [`CURRENT_VERSION`].
///
/// Each migration is a pure transform on the raw JSON value.
fn migrate(mut json: serde_json::Value, from_version: u64) -> Result<serde_json::Value, DefinitionError> {
    if from_version > u64::from(CURRENT_VERSION) {
        return Err(DefinitionError::UnsupportedVersion {
            found: from_version,
            supported: CURRENT_VERSION,
        });
    }

    // v0 → v1: navigation_rules was an object keyed by trigger step
    if from_version < 1 {
        let obj = json
            .as_object_mut()
            .ok_or_else(|| DefinitionError::Malformed("definition is not a JSON object".to_string()))?;
        if let Some(serde_json::Value::Object(rules)) = obj.get_mut("navigation_rules") {
            let entries: Vec<serde_json::Value> = std::mem::take(rules)
                .into_iter()
                .map(|(trigger, rule)| {
                    serde_json::json!({
                        "trigger_step_identifier": trigger,
                        "rule": rule,
                    })
                })
                .collect();
            obj.insert("navigation_rules".to_string(), serde_json::Value::Array(entries));
        }
        obj.insert(
            "definition_version".to_string(),
            serde_json::Value::Number(1.into()),
        );
        info!("migrated task definition v0 → v1 (navigation_rules as entries)");
    }

    Ok(json)
}
