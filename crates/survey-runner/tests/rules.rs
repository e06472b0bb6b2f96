use serde_json::{Value, json};
use survey_schema::{
    Comparand, Condition, ListSelector, LocationField, Operand, QuestionnaireSchema, RuleClause,
    WhenRule, parse_when,
};

use survey_runner::{
    Answer, AnswerStore, ListStore, Location, Metadata, Resolved, RuleContext, compare,
    evaluate_when_rules,
};

fn schema() -> QuestionnaireSchema {
    QuestionnaireSchema::from_value(json!({
        "survey_id": "0",
        "sections": [
            {
                "id": "household",
                "groups": [{
                    "id": "household-group",
                    "blocks": [
                        {
                            "id": "favourite",
                            "type": "Question",
                            "question": {
                                "id": "favourite-question",
                                "title": "Favourite colours?",
                                "answers": [
                                    { "id": "colours", "type": "Checkbox" },
                                    { "id": "size", "type": "Number" }
                                ]
                            }
                        },
                        {
                            "id": "collector",
                            "type": "ListCollector",
                            "for_list": "people",
                            "add_block": {
                                "id": "add-person",
                                "type": "ListAddQuestion",
                                "question": {
                                    "id": "add-person-question",
                                    "title": "Name?",
                                    "answers": [{ "id": "first-name", "type": "TextField" }]
                                }
                            }
                        }
                    ]
                }]
            },
            {
                "id": "individual",
                "repeat": { "for_list": "people" },
                "groups": [{
                    "id": "individual-group",
                    "blocks": [{
                        "id": "age-block",
                        "type": "Question",
                        "question": {
                            "id": "age-question",
                            "title": "Age?",
                            "answers": [{ "id": "age", "type": "Number" }]
                        }
                    }]
                }]
            }
        ]
    }))
    .expect("schema loads")
}

struct Fixture {
    schema: QuestionnaireSchema,
    metadata: Metadata,
    answers: AnswerStore,
    lists: ListStore,
}

impl Fixture {
    fn new() -> Self {
        let mut metadata = Metadata::new();
        metadata.insert("region_code", json!("GB-ENG"));
        metadata.insert("period", json!(null));
        let answers = AnswerStore::from_answers([
            Answer::new("favourite", "colours", json!(["red", "green"])),
            Answer::new("favourite", "size", json!("12")),
            Answer::new("age-block", "age", json!(34)).for_list_item("abc123"),
            Answer::new("age-block", "age", json!(9)).for_list_item("123abc"),
        ]);
        let lists: ListStore = serde_json::from_value(json!([
            { "name": "people", "items": ["abc123", "123abc"], "primary_person": "abc123" }
        ]))
        .expect("lists");
        Self {
            schema: schema(),
            metadata,
            answers,
            lists,
        }
    }

    fn ctx(&self) -> RuleContext<'_> {
        RuleContext::new(&self.schema, &self.metadata, &self.answers, &self.lists)
    }

    fn holds(&self, when: Value, location: Option<&Location>) -> bool {
        let rules = parse_when(when).expect("when rules parse");
        evaluate_when_rules(
            &rules,
            &self.schema,
            &self.metadata,
            &self.answers,
            &self.lists,
            location,
        )
    }
}

#[test]
fn empty_rules_are_unconditional() {
    let fixture = Fixture::new();
    assert!(fixture.ctx().evaluate(&[]));
    assert!(fixture.holds(Value::Null, None));
}

#[test]
fn clauses_in_a_rule_combine_with_and_or() {
    let fixture = Fixture::new();
    let both = json!([
        { "meta": "region_code", "condition": "equals", "value": "GB-ENG" },
        { "id": "colours", "condition": "contains", "value": "blue" }
    ]);
    assert!(!fixture.holds(both, None));

    let either = json!({
        "condition": "or",
        "rules": [
            { "meta": "region_code", "condition": "equals", "value": "GB-ENG" },
            { "id": "colours", "condition": "contains", "value": "blue" }
        ]
    });
    assert!(fixture.holds(either, None));
}

#[test]
fn separate_rules_combine_with_or() {
    let fixture = Fixture::new();
    let rules = vec![
        WhenRule::all(vec![RuleClause::new(
            Operand::metadata("region_code"),
            Condition::Equals,
            Comparand::Literal(json!("GB-WLS")),
        )]),
        WhenRule::all(vec![RuleClause::new(
            Operand::list("people", ListSelector::Count),
            Condition::Equals,
            Comparand::Literal(json!(2)),
        )]),
    ];
    assert!(fixture.ctx().evaluate(&rules));
}

#[test]
fn list_operands() {
    let fixture = Fixture::new();
    assert!(fixture.holds(
        json!([{ "list": "people", "condition": "greater than", "value": 1 }]),
        None
    ));
    assert!(fixture.holds(
        json!([{ "list": "people", "selector": "primary_item", "condition": "equals", "value": "abc123" }]),
        None
    ));
    assert!(fixture.holds(
        json!([{ "list": "people", "selector": "items", "condition": "contains all", "values": ["abc123", "123abc"] }]),
        None
    ));
}

#[test]
fn location_operands_need_a_location() {
    let fixture = Fixture::new();
    let primary = Location::for_list_item("individual", "age-block", "people", "abc123");
    let when = json!([{
        "location": "list_item_id",
        "condition": "equals",
        "comparison": { "list": "people", "selector": "primary_item" }
    }]);
    assert!(fixture.holds(when.clone(), Some(&primary)));
    assert!(!fixture.holds(when, None));

    assert_eq!(
        fixture
            .ctx()
            .at(&primary)
            .resolve(&Operand::location(LocationField::SectionId)),
        Resolved::Value(json!("individual"))
    );
}

#[test]
fn repeating_answers_resolve_for_the_current_list_item() {
    let fixture = Fixture::new();
    let adult = json!([{ "id": "age", "condition": "greater than or equal to", "value": 18 }]);

    let first = Location::for_list_item("individual", "age-block", "people", "abc123");
    let second = Location::for_list_item("individual", "age-block", "people", "123abc");
    assert!(fixture.holds(adult.clone(), Some(&first)));
    assert!(!fixture.holds(adult.clone(), Some(&second)));
    assert!(!fixture.holds(adult, None));
}

#[test]
fn absent_answers_only_satisfy_negated_conditions() {
    let fixture = Fixture::new();
    let none = Location::new("household", "favourite");
    let cases = [
        ("set", false),
        ("not set", true),
        ("equals", false),
        ("not equals", true),
        ("equals any", false),
        ("not equals any", true),
        ("contains", false),
        ("not contains", true),
        ("contains any", false),
        ("greater than", false),
        ("less than or equal to", false),
    ];
    for (condition, expected) in cases {
        let mut clause = json!({ "id": "first-name", "condition": condition });
        if !matches!(condition, "set" | "not set") {
            clause["values"] = json!(["x"]);
        }
        assert_eq!(
            fixture.holds(json!([clause]), Some(&none)),
            expected,
            "condition {condition}"
        );
    }
}

#[test]
fn null_metadata_is_absent() {
    let fixture = Fixture::new();
    assert!(fixture.holds(json!([{ "meta": "period", "condition": "not set" }]), None));
    assert!(fixture.holds(json!([{ "meta": "missing", "condition": "not equals", "value": 1 }]), None));
}

#[test]
fn numeric_strings_compare_as_numbers() {
    let fixture = Fixture::new();
    assert!(fixture.holds(json!([{ "id": "size", "condition": "equals", "value": 12 }]), None));
    assert!(fixture.holds(json!([{ "id": "size", "condition": "less than", "value": 100 }]), None));
}

#[test]
fn compare_covers_collection_conditions() {
    let colours = Resolved::Value(json!(["red", "green"]));
    let candidates = Resolved::Value(json!(["green", "blue"]));
    assert!(compare(Condition::ContainsAny, &colours, &candidates));
    assert!(!compare(Condition::ContainsAll, &colours, &candidates));
    assert!(compare(
        Condition::EqualsAny,
        &Resolved::Value(json!("blue")),
        &candidates
    ));
    assert!(compare(
        Condition::NotEqualsAny,
        &Resolved::Value(json!("red")),
        &candidates
    ));
    assert!(compare(
        Condition::Contains,
        &Resolved::Value(json!("household survey")),
        &Resolved::Value(json!("survey"))
    ));
    assert!(compare(
        Condition::NotEquals,
        &Resolved::Value(json!(1)),
        &Resolved::Absent
    ));
    assert!(!compare(
        Condition::GreaterThan,
        &Resolved::Value(json!(1)),
        &Resolved::Absent
    ));
}
