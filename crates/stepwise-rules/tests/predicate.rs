use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};

use stepwise_core::models::answer::{ChoiceValue, QuestionKind};
use stepwise_core::models::result::{QuestionResult, StepResult, TaskResult};
use stepwise_core::models::selector::ResultSelector;
use stepwise_rules::predicate::{Predicate, PredicateRule};

fn hash_of<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

fn sel(result: &str) -> ResultSelector {
    ResultSelector::new("survey", result)
}

fn survey() -> TaskResult {
    let mut task = TaskResult::new("task");
    task.record(
        StepResult::with_results(
            "survey",
            vec![
                QuestionResult::boolean("has_dogs", true).unwrap(),
                QuestionResult::text("dog_name", "Rex").unwrap(),
                QuestionResult::numeric("age", 34.0).unwrap(),
                QuestionResult::scale("pain", 7.0).unwrap(),
                QuestionResult::date("visit", jiff::civil::date(2024, 3, 15)).unwrap(),
                QuestionResult::multiple_choice(
                    "symptoms",
                    vec![ChoiceValue::from("cough"), ChoiceValue::from("fever")],
                )
                .unwrap(),
                QuestionResult::single_choice("severity", 2_i64).unwrap(),
                QuestionResult::unanswered("comments", QuestionKind::Text).unwrap(),
            ],
        )
        .unwrap(),
    );
    task
}

#[test]
fn missing_answers_never_satisfy_a_leaf() {
    let empty = TaskResult::new("task");
    let leaves = vec![
        Predicate::answered(sel("has_dogs")),
        Predicate::not_answered(sel("has_dogs")),
        Predicate::boolean(sel("has_dogs"), true),
        Predicate::boolean(sel("has_dogs"), false),
        Predicate::text(sel("dog_name"), "Rex"),
        Predicate::text_matching(sel("dog_name"), ".*"),
        Predicate::numeric(sel("age"), 34.0),
        Predicate::numeric_range(sel("age"), None, None),
        Predicate::date_range(sel("visit"), None, None),
        Predicate::choices(sel("symptoms"), vec![]),
        Predicate::choice_contains(sel("symptoms"), "cough"),
        Predicate::choice_matching(sel("symptoms"), ".*"),
    ];
    for leaf in &leaves {
        assert!(!leaf.evaluate(&empty), "{leaf:?} matched an empty result");
    }
}

#[test]
fn boolean_and_text_equality() {
    let task = survey();
    assert!(Predicate::boolean(sel("has_dogs"), true).evaluate(&task));
    assert!(!Predicate::boolean(sel("has_dogs"), false).evaluate(&task));
    assert!(Predicate::text(sel("dog_name"), "Rex").evaluate(&task));
    assert!(!Predicate::text(sel("dog_name"), "rex").evaluate(&task));
}

#[test]
fn text_pattern_matches_whole_answer() {
    let task = survey();
    assert!(Predicate::text_matching(sel("dog_name"), "R.x").evaluate(&task));
    assert!(!Predicate::text_matching(sel("dog_name"), "R").evaluate(&task));
    assert!(!Predicate::text_matching(sel("dog_name"), "(unclosed").evaluate(&task));
}

#[test]
fn patterns_evaluate_the_same_on_every_call() {
    let task = survey();
    let matching = Predicate::text_matching(sel("dog_name"), "R[a-z]+");
    let broken = Predicate::choice_matching(sel("symptoms"), "[unclosed");

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let task = task.clone();
            let matching = matching.clone();
            let broken = broken.clone();
            std::thread::spawn(move || {
                (0..25).all(|_| matching.evaluate(&task) && !broken.evaluate(&task))
            })
        })
        .collect();
    for handle in handles {
        assert!(handle.join().unwrap());
    }
}

#[test]
fn numeric_comparisons_cover_numeric_and_scale() {
    let task = survey();
    assert!(Predicate::numeric(sel("age"), 34.0).evaluate(&task));
    assert!(Predicate::numeric_range(sel("age"), Some(18.0), Some(65.0)).evaluate(&task));
    assert!(Predicate::numeric_range(sel("age"), Some(34.0), Some(34.0)).evaluate(&task));
    assert!(!Predicate::numeric_range(sel("age"), Some(35.0), None).evaluate(&task));
    assert!(Predicate::numeric_range(sel("pain"), Some(5.0), None).evaluate(&task));
}

#[test]
fn date_range_is_inclusive() {
    let task = survey();
    let day = jiff::civil::date(2024, 3, 15);
    assert!(Predicate::date_range(sel("visit"), Some(day), Some(day)).evaluate(&task));
    assert!(!Predicate::date_range(sel("visit"), Some(jiff::civil::date(2024, 3, 16)), None).evaluate(&task));
}

#[test]
fn choice_predicates() {
    let task = survey();
    assert!(Predicate::choice_contains(sel("symptoms"), "fever").evaluate(&task));
    assert!(!Predicate::choice_contains(sel("symptoms"), "rash").evaluate(&task));
    assert!(
        Predicate::choices(sel("symptoms"), vec![ChoiceValue::from("fever"), ChoiceValue::from("cough")])
            .evaluate(&task)
    );
    assert!(!Predicate::choices(sel("symptoms"), vec![ChoiceValue::from("fever")]).evaluate(&task));
    assert!(Predicate::choice_matching(sel("symptoms"), "fev.*").evaluate(&task));
    assert!(Predicate::choice_contains(sel("severity"), 2_i64).evaluate(&task));
    assert!(!Predicate::choice_matching(sel("severity"), "2").evaluate(&task));
}

#[test]
fn type_mismatch_is_false() {
    let task = survey();
    assert!(!Predicate::numeric(sel("dog_name"), 0.0).evaluate(&task));
    assert!(!Predicate::text(sel("has_dogs"), "true").evaluate(&task));
    assert!(!Predicate::boolean(sel("age"), true).evaluate(&task));
    assert!(!Predicate::choice_contains(sel("dog_name"), "Rex").evaluate(&task));
}

#[test]
fn answered_and_not_answered() {
    let task = survey();
    assert!(Predicate::answered(sel("dog_name")).evaluate(&task));
    assert!(!Predicate::answered(sel("comments")).evaluate(&task));
    assert!(Predicate::not_answered(sel("comments")).evaluate(&task));
    assert!(!Predicate::not_answered(sel("dog_name")).evaluate(&task));
}

#[test]
fn composites() {
    let task = survey();
    let yes = Predicate::boolean(sel("has_dogs"), true);
    let no = Predicate::boolean(sel("has_dogs"), false);

    assert!(Predicate::all_of(vec![yes.clone(), Predicate::always()]).evaluate(&task));
    assert!(!Predicate::all_of(vec![yes.clone(), no.clone()]).evaluate(&task));
    assert!(Predicate::any_of(vec![no.clone(), yes.clone()]).evaluate(&task));
    assert!(!Predicate::any_of(vec![no.clone(), Predicate::never()]).evaluate(&task));
    assert!(Predicate::negate(no).evaluate(&task));

    assert!(Predicate::all_of(vec![]).evaluate(&task));
    assert!(!Predicate::any_of(vec![]).evaluate(&task));
}

#[test]
fn rule_equality_is_structural() {
    let a = Predicate::boolean(sel("has_dogs"), true);
    let b = Predicate::text(sel("dog_name"), "Rex");

    let rule1 = PredicateRule::new(Predicate::all_of(vec![a.clone(), b.clone()]));
    let rule2 = PredicateRule::new(Predicate::all_of(vec![a.clone(), b.clone()]));
    let swapped = PredicateRule::new(Predicate::all_of(vec![b, a]));

    assert_eq!(rule1, rule2);
    assert_eq!(rule1, rule1.clone());
    assert_ne!(rule1, swapped);

    let set: HashSet<_> = [rule1.clone(), rule2, swapped].into_iter().collect();
    assert_eq!(set.len(), 2);
}

#[test]
fn rule_hashes_like_its_predicate() {
    let predicate = Predicate::numeric_range(sel("age"), Some(18.0), None);
    let rule = PredicateRule::new(predicate.clone());
    assert_eq!(hash_of(&rule), hash_of(&predicate));
}

#[test]
fn zero_thresholds_compare_equal() {
    assert_eq!(Predicate::numeric(sel("age"), 0.0), Predicate::numeric(sel("age"), -0.0));
    assert_eq!(
        hash_of(&Predicate::numeric(sel("age"), 0.0)),
        hash_of(&Predicate::numeric(sel("age"), -0.0))
    );
}

#[test]
fn selectors_are_listed_depth_first() {
    let predicate = Predicate::all_of(vec![
        Predicate::boolean(sel("has_dogs"), true),
        Predicate::negate(Predicate::text(sel("dog_name"), "Rex")),
        Predicate::always(),
    ]);
    let ids: Vec<_> = predicate
        .selectors()
        .iter()
        .map(|s| s.result_identifier.as_str())
        .collect();
    assert_eq!(ids, vec!["has_dogs", "dog_name"]);
}

#[test]
fn predicate_json_shape() {
    let predicate = Predicate::boolean(sel("has_dogs"), true);
    let json = serde_json::to_value(&predicate).unwrap();
    assert_eq!(json["op"], "boolean_equals");
    assert_eq!(json["selector"]["result_identifier"], "has_dogs");

    let back: Predicate = serde_json::from_value(json).unwrap();
    assert_eq!(back, predicate);
}
