use std::collections::{HashMap, HashSet};

use stepwise_core::identifiers::{NULL_STEP_IDENTIFIER, SKIP_STEP_IDENTIFIER, is_reserved};
use stepwise_core::models::result::TaskResult;
use stepwise_core::models::step::{FormItem, Step};
use stepwise_rules::navigation::{SecondaryActionStepNavigationRule, StepNavigationRule};
use stepwise_rules::skip::SkipStepNavigationRule;
use stepwise_rules::visibility::FormItemVisibilityRule;
use tracing::debug;

use crate::error::NavigationError;

/// An ordered task plus the rules that bend its order.
///
/// Rules are registered while the task is built and validated on
/// registration, so a navigation rule can never point at a step the task
/// does not have. Evaluation borrows the navigator and the task result
/// immutably; the same inputs always produce the same answer.
#[derive(Debug, Clone)]
pub struct TaskNavigator {
    identifier: String,
    steps: Vec<Step>,
    navigation_rules: HashMap<String, Box<dyn StepNavigationRule>>,
    skip_rules: HashMap<String, Box<dyn SkipStepNavigationRule>>,
    /// step identifier → form item identifier → rule
    visibility_rules: HashMap<String, HashMap<String, Box<dyn FormItemVisibilityRule>>>,
}

impl TaskNavigator {
    pub fn new(identifier: impl Into<String>, steps: Vec<Step>) -> Result<Self, NavigationError> {
        let mut seen = HashSet::new();
        for step in &steps {
            let id = step.identifier();
            if id.is_empty() {
                return Err(NavigationError::EmptyIdentifier);
            }
            if is_reserved(id) {
                return Err(NavigationError::ReservedIdentifier(id.to_string()));
            }
            if !seen.insert(id) {
                return Err(NavigationError::DuplicateStep(id.to_string()));
            }
        }

        Ok(Self {
            identifier: identifier.into(),
            steps,
            navigation_rules: HashMap::new(),
            skip_rules: HashMap::new(),
            visibility_rules: HashMap::new(),
        })
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn step(&self, identifier: &str) -> Option<&Step> {
        self.steps.iter().find(|s| s.identifier() == identifier)
    }

    fn index_of(&self, identifier: &str) -> Result<usize, NavigationError> {
        self.steps
            .iter()
            .position(|s| s.identifier() == identifier)
            .ok_or_else(|| NavigationError::UnknownStep(identifier.to_string()))
    }

    // ── Rule registration ───────────────────────────────────────────────────

    /// Register the navigation rule consulted when continuing past
    /// `trigger`. A rule already registered for the trigger is replaced.
    pub fn set_navigation_rule<R>(&mut self, trigger: impl Into<String>, rule: R) -> Result<(), NavigationError>
    where
        R: StepNavigationRule + 'static,
    {
        let trigger = trigger.into();
        self.index_of(&trigger)?;
        self.check_destinations(&trigger, &rule)?;
        debug!("navigation rule set for step {}: {:?}", trigger, rule);
        self.navigation_rules.insert(trigger, Box::new(rule));
        Ok(())
    }

    pub fn navigation_rule(&self, trigger: &str) -> Option<&dyn StepNavigationRule> {
        self.navigation_rules.get(trigger).map(|r| r.as_ref())
    }

    pub fn remove_navigation_rule(&mut self, trigger: &str) -> Option<Box<dyn StepNavigationRule>> {
        self.navigation_rules.remove(trigger)
    }

    /// All registered navigation rules keyed by trigger step, in no
    /// particular order.
    pub fn navigation_rules(&self) -> impl Iterator<Item = (&str, &dyn StepNavigationRule)> {
        self.navigation_rules
            .iter()
            .map(|(trigger, rule)| (trigger.as_str(), rule.as_ref()))
    }

    /// Register the rule that decides whether `step` is passed over when
    /// navigation lands on it. A rule already registered is replaced.
    pub fn set_skip_rule<R>(&mut self, step: impl Into<String>, rule: R) -> Result<(), NavigationError>
    where
        R: SkipStepNavigationRule + 'static,
    {
        let step = step.into();
        self.index_of(&step)?;
        debug!("skip rule set for step {}: {:?}", step, rule);
        self.skip_rules.insert(step, Box::new(rule));
        Ok(())
    }

    pub fn skip_rule(&self, step: &str) -> Option<&dyn SkipStepNavigationRule> {
        self.skip_rules.get(step).map(|r| r.as_ref())
    }

    /// Register the visibility rule of one answerable item of a form step.
    pub fn set_visibility_rule<R>(
        &mut self,
        step: impl Into<String>,
        item: impl Into<String>,
        rule: R,
    ) -> Result<(), NavigationError>
    where
        R: FormItemVisibilityRule + 'static,
    {
        let step = step.into();
        let item = item.into();
        self.check_form_item(&step, &item)?;
        debug!("visibility rule set for {}/{}: {:?}", step, item, rule);
        self.visibility_rules
            .entry(step)
            .or_default()
            .insert(item, Box::new(rule));
        Ok(())
    }

    pub fn visibility_rule(&self, step: &str, item: &str) -> Option<&dyn FormItemVisibilityRule> {
        self.visibility_rules
            .get(step)
            .and_then(|rules| rules.get(item))
            .map(|r| r.as_ref())
    }

    /// The secondary action offered on `step`, if its navigation rule is one.
    pub fn secondary_action(&self, step: &str) -> Option<&SecondaryActionStepNavigationRule> {
        self.navigation_rules
            .get(step)
            .and_then(|rule| rule.secondary_action())
    }

    /// Re-check every registered rule against the step list.
    pub fn validate(&self) -> Result<(), NavigationError> {
        for (trigger, rule) in &self.navigation_rules {
            self.index_of(trigger)?;
            self.check_destinations(trigger, rule.as_ref())?;
        }
        for step in self.skip_rules.keys() {
            self.index_of(step)?;
        }
        for (step, rules) in &self.visibility_rules {
            for item in rules.keys() {
                self.check_form_item(step, item)?;
            }
        }
        Ok(())
    }

    fn check_destinations<R>(&self, trigger: &str, rule: &R) -> Result<(), NavigationError>
    where
        R: StepNavigationRule + ?Sized,
    {
        for destination in rule.destination_identifiers() {
            if !is_reserved(destination) && self.step(destination).is_none() {
                return Err(NavigationError::UnknownDestination {
                    trigger: trigger.to_string(),
                    destination: destination.to_string(),
                });
            }
        }
        Ok(())
    }

    fn check_form_item(&self, step: &str, item: &str) -> Result<(), NavigationError> {
        let form = &self.steps[self.index_of(step)?];
        if !form.is_form() {
            return Err(NavigationError::NotAFormStep(step.to_string()));
        }
        let known = form
            .form_items()
            .iter()
            .any(|i| i.is_answerable() && i.identifier.as_deref() == Some(item));
        if !known {
            return Err(NavigationError::UnknownFormItem {
                step: step.to_string(),
                item: item.to_string(),
            });
        }
        Ok(())
    }

    // ── Navigation ──────────────────────────────────────────────────────────

    /// The step to present after `current`, or `None` once the task is
    /// complete. `None` as `current` asks for the first step.
    ///
    /// A navigation rule registered for `current` decides first; when it
    /// has no opinion the next step in declaration order follows. Steps
    /// whose skip rule holds are then passed over.
    pub fn next_step(&self, current: Option<&str>, result: &TaskResult) -> Result<Option<&str>, NavigationError> {
        let candidate = match current {
            None => (!self.steps.is_empty()).then_some(0),
            Some(current) => self.destination_after(current, result)?,
        };
        self.settle(candidate, result)
    }

    /// The step to present when the secondary action of `current` is taken.
    ///
    /// In skip mode this is the next step in declaration order; a custom
    /// secondary action jumps to its destination. Without a secondary
    /// action this behaves like [`next_step`](Self::next_step).
    pub fn step_after_secondary_action(
        &self,
        current: &str,
        result: &TaskResult,
    ) -> Result<Option<&str>, NavigationError> {
        let index = self.index_of(current)?;
        let candidate = match self.secondary_action(current) {
            Some(action) if action.is_skip_mode() => {
                debug!("secondary action on {} skips ahead", current);
                self.linear_after(index)
            }
            Some(action) => {
                debug!(
                    "secondary action on {} jumps to {}",
                    current,
                    action.destination_step_identifier()
                );
                self.resolve(current, index, action.destination_step_identifier())?
            }
            None => return self.next_step(Some(current), result),
        };
        self.settle(candidate, result)
    }

    /// The step presented before `current`, taken from the order steps were
    /// recorded in `result` rather than from declaration order.
    pub fn previous_step(&self, current: &str, result: &TaskResult) -> Option<&str> {
        let end = result.position(current).unwrap_or(result.steps().len());
        result.steps()[..end]
            .iter()
            .rev()
            .find_map(|recorded| self.step(recorded.identifier()))
            .map(Step::identifier)
    }

    /// Index of the step following `current`, before skip rules apply.
    fn destination_after(&self, current: &str, result: &TaskResult) -> Result<Option<usize>, NavigationError> {
        let index = self.index_of(current)?;
        if let Some(rule) = self.navigation_rules.get(current)
            && let Some(destination) = rule.destination_step(&self.steps[index], &self.steps, result)
        {
            debug!("navigation rule on {} chose {}", current, destination);
            return self.resolve(current, index, &destination);
        }
        debug!("no navigation rule decided for {}, advancing linearly", current);
        Ok(self.linear_after(index))
    }

    fn resolve(&self, trigger: &str, index: usize, destination: &str) -> Result<Option<usize>, NavigationError> {
        match destination {
            NULL_STEP_IDENTIFIER => Ok(None),
            SKIP_STEP_IDENTIFIER => Ok(self.linear_after(index)),
            _ => self
                .steps
                .iter()
                .position(|s| s.identifier() == destination)
                .map(Some)
                .ok_or_else(|| NavigationError::UnknownDestination {
                    trigger: trigger.to_string(),
                    destination: destination.to_string(),
                }),
        }
    }

    fn linear_after(&self, index: usize) -> Option<usize> {
        let next = index + 1;
        (next < self.steps.len()).then_some(next)
    }

    /// Walk past every candidate whose skip rule holds.
    fn settle(&self, mut candidate: Option<usize>, result: &TaskResult) -> Result<Option<&str>, NavigationError> {
        let mut hops = 0;
        while let Some(index) = candidate {
            let id = self.steps[index].identifier();
            match self.skip_rules.get(id) {
                Some(rule) if rule.step_should_skip(result) => {
                    hops += 1;
                    if hops > self.steps.len() {
                        return Err(NavigationError::SkipCycle(id.to_string()));
                    }
                    debug!("skipping step {}", id);
                    candidate = self.destination_after(id, result)?;
                }
                _ => return Ok(Some(id)),
            }
        }
        Ok(None)
    }

    // ── Form items ──────────────────────────────────────────────────────────

    /// Every declared item of a form step, section headers included.
    pub fn all_form_items(&self, step: &str) -> Result<&[FormItem], NavigationError> {
        let index = self.index_of(step)?;
        Ok(self.steps[index].form_items())
    }

    /// Items currently shown, in declaration order. Items without a
    /// visibility rule, section headers among them, are always shown.
    pub fn visible_form_items(&self, step: &str, result: &TaskResult) -> Result<Vec<&FormItem>, NavigationError> {
        let rules = self.visibility_rules.get(step);
        let items = self.all_form_items(step)?;
        Ok(items
            .iter()
            .filter(|item| {
                let rule = rules
                    .zip(item.identifier.as_deref())
                    .and_then(|(rules, id)| rules.get(id));
                rule.is_none_or(|rule| rule.is_visible(result))
            })
            .collect())
    }

    /// Visible items that can take an answer.
    pub fn answerable_form_items(
        &self,
        step: &str,
        result: &TaskResult,
    ) -> Result<Vec<&FormItem>, NavigationError> {
        let mut items = self.visible_form_items(step, result)?;
        items.retain(|item| item.is_answerable());
        Ok(items)
    }
}
