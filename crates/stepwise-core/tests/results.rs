use stepwise_core::error::CoreError;
use stepwise_core::models::answer::{Answer, ChoiceValue, QuestionKind};
use stepwise_core::models::result::{QuestionResult, StepResult, TaskResult};
use stepwise_core::models::selector::ResultSelector;
use stepwise_core::models::step::{FormItem, Step};

fn step(identifier: &str, results: Vec<QuestionResult>) -> StepResult {
    StepResult::with_results(identifier, results).unwrap()
}

#[test]
fn record_keeps_presentation_order() {
    let mut task = TaskResult::new("intake");
    task.record(step("consent", vec![]));
    task.record(step("age", vec![QuestionResult::numeric("age", 42.0).unwrap()]));

    let order: Vec<_> = task.steps().iter().map(|s| s.identifier()).collect();
    assert_eq!(order, vec!["consent", "age"]);
}

#[test]
fn revising_a_step_drops_later_results() {
    let mut task = TaskResult::new("intake");
    task.record(step("a", vec![QuestionResult::boolean("a", true).unwrap()]));
    task.record(step("b", vec![]));
    task.record(step("c", vec![]));

    let dropped = task.record(step("b", vec![QuestionResult::text("note", "revised").unwrap()]));

    assert_eq!(dropped.len(), 2);
    let order: Vec<_> = task.steps().iter().map(|s| s.identifier()).collect();
    assert_eq!(order, vec!["a", "b"]);
    assert!(task.step_result("b").unwrap().result("note").is_some());
}

#[test]
fn selector_finds_answer() {
    let mut task = TaskResult::new("intake");
    task.record(step(
        "form",
        vec![
            QuestionResult::boolean("has_dogs", true).unwrap(),
            QuestionResult::text("dog_name", "Rex").unwrap(),
        ],
    ));

    let found = task
        .question_result(&ResultSelector::new("form", "dog_name"))
        .unwrap();
    assert_eq!(found.answer(), Some(&Answer::Text("Rex".to_string())));

    assert!(task
        .question_result(&ResultSelector::new("form", "cat_name"))
        .is_none());
    assert!(task
        .question_result(&ResultSelector::new("other", "dog_name"))
        .is_none());
}

#[test]
fn selector_for_question_step_uses_step_identifier() {
    let mut task = TaskResult::new("intake");
    task.record(step("smoker", vec![QuestionResult::boolean("smoker", false).unwrap()]));

    let selector = ResultSelector::for_question_step("smoker");
    assert_eq!(selector.step_identifier, "smoker");
    assert!(task.question_result(&selector).is_some());
}

#[test]
fn selector_reaches_nested_task() {
    let mut sub = TaskResult::new("screening");
    sub.record(step("phq", vec![QuestionResult::scale("phq_total", 12.0).unwrap()]));

    let mut task = TaskResult::new("visit");
    task.add_nested(sub);

    let nested = ResultSelector::new("phq", "phq_total").in_task("screening");
    assert!(task.question_result(&nested).is_some());

    let unscoped = ResultSelector::new("phq", "phq_total");
    assert!(task.question_result(&unscoped).is_none());

    let own = ResultSelector::new("phq", "phq_total").in_task("visit");
    assert!(task.question_result(&own).is_none());
}

#[test]
fn push_replaces_same_identifier() {
    let mut result = StepResult::new("form").unwrap();
    result.push(QuestionResult::text("name", "first").unwrap());
    result.push(QuestionResult::text("name", "second").unwrap());

    assert_eq!(result.results().len(), 1);
    assert_eq!(
        result.result("name").unwrap().answer(),
        Some(&Answer::Text("second".to_string()))
    );
}

#[test]
fn question_result_rejects_mismatched_answer() {
    let err = QuestionResult::new("item", QuestionKind::Text, Some(Answer::Boolean(true)))
        .unwrap_err();
    assert!(matches!(err, CoreError::AnswerKindMismatch { .. }));

    let err = QuestionResult::boolean("", true).unwrap_err();
    assert!(matches!(err, CoreError::EmptyIdentifier));

    assert!(QuestionResult::new("score", QuestionKind::Scale, Some(Answer::Numeric(3.0))).is_ok());
}

#[test]
fn empty_result_for_form_skips_sections() {
    let form = Step::form(
        "test-form-step",
        vec![
            FormItem::section("This is a Section"),
            FormItem::question("item1", "none", QuestionKind::Boolean).optional(true),
            FormItem::question("item2", "text", QuestionKind::Text),
            FormItem::question("item3", "more text", QuestionKind::Text),
        ],
    );

    let result = StepResult::empty_for(&form);
    assert_eq!(result.identifier(), "test-form-step");
    assert_eq!(result.results().len(), 3);
    assert!(result.results().iter().all(|r| !r.is_answered()));
    assert_eq!(result.results()[0].kind(), QuestionKind::Boolean);
}

#[test]
fn empty_result_skips_items_without_a_kind() {
    let note = FormItem {
        identifier: Some("note".to_string()),
        text: Some("Read this first".to_string()),
        kind: None,
        optional: false,
    };
    let form = Step::form("form", vec![note, FormItem::question("q", "Q", QuestionKind::Text)]);

    let result = StepResult::empty_for(&form);
    let ids: Vec<_> = result.results().iter().map(|r| r.identifier()).collect();
    assert_eq!(ids, vec!["q"]);
}

#[test]
fn core_errors_are_validation_failures() {
    let errors = [
        StepResult::new("").unwrap_err(),
        QuestionResult::new("x", QuestionKind::Numeric, Some(Answer::Text("1".to_string())))
            .unwrap_err(),
    ];
    for err in &errors {
        match err {
            CoreError::EmptyIdentifier => assert_eq!(err.to_string(), "identifier must not be empty"),
            CoreError::AnswerKindMismatch { identifier, kind } => {
                assert_eq!(identifier, "x");
                assert_eq!(*kind, QuestionKind::Numeric);
            }
        }
    }
}

#[test]
fn empty_result_for_question_and_instruction() {
    let question = StepResult::empty_for(&Step::question("SimpleQuestion", QuestionKind::Boolean));
    assert_eq!(question.results().len(), 1);
    assert_eq!(question.results()[0].identifier(), "SimpleQuestion");

    let instruction = StepResult::empty_for(&Step::instruction("intro"));
    assert!(instruction.results().is_empty());
}

#[test]
fn task_result_round_trips_through_json() {
    let mut task = TaskResult::new("intake");
    task.record(step(
        "diet",
        vec![QuestionResult::multiple_choice(
            "foods",
            vec![ChoiceValue::from("fish"), ChoiceValue::from(3_i64)],
        )
        .unwrap()],
    ));

    let json = serde_json::to_string(&task).unwrap();
    let back: TaskResult = serde_json::from_str(&json).unwrap();
    assert_eq!(back, task);
}
