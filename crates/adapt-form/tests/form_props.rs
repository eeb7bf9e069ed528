use adapt_form::{
    prepare_data_for_validation, ChangeEvent, Choice, FieldBinding, FieldConfig, FormEngine,
    FormOptions, ObjectSchema, Rule,
};
use adapt_test_utils::{field_map, init_test_tracing, sample_property_tree};
use proptest::prelude::*;
use serde_json::{json, Map, Value};

fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        (-100i64..100).prop_map(Value::from),
        "[a-z]{0,3}".prop_map(Value::from),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            proptest::collection::vec(inner.clone(), 0..4).prop_map(Value::from),
            proptest::collection::btree_map("[a-z]{1,3}", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect::<Map<String, Value>>())),
        ]
    })
}

fn contains_empty_string(value: &Value) -> bool {
    match value {
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.iter().any(contains_empty_string),
        Value::Object(object) => object.values().any(contains_empty_string),
        _ => false,
    }
}

proptest! {
    #[test]
    fn prop_prepared_data_has_no_empty_strings(value in arb_json()) {
        let prepared = prepare_data_for_validation(&value);
        prop_assert!(!contains_empty_string(&prepared));
    }

    #[test]
    fn prop_prepare_keeps_non_empty_scalars(text in "[a-z]{1,8}", n in any::<i32>()) {
        let value = json!({"text": text.clone(), "n": n, "nested": [{"t": text.clone()}]});
        prop_assert_eq!(prepare_data_for_validation(&value), value);
    }

    #[test]
    fn prop_initial_value_read_until_changed(initial in "[a-z]{0,6}", edit in "[a-z]{0,6}") {
        let field = FieldConfig::text().with_initial_value(initial.clone());
        let fields = field_map(vec![("f", field)]);
        let mut form = FormEngine::new(fields, FormOptions::new());
        prop_assert_eq!(form.value("f"), Some(&Value::from(initial)));

        form.set_field_value("f", edit.clone()).unwrap();
        prop_assert_eq!(form.value("f"), Some(&Value::from(edit)));
    }

    #[test]
    fn prop_double_toggle_is_identity(
        picks in proptest::collection::vec(0usize..4, 0..8),
        target in 0usize..4,
    ) {
        let choices: Vec<Choice> = ["a", "b", "c", "d"].into_iter().map(Choice::new).collect();
        let binding = FieldBinding::for_field(
            &FieldConfig::checkbox().multi().with_choices(choices.clone()).normalized(),
        );

        let mut current = json!([]);
        for pick in picks {
            let event = ChangeEvent::Toggle {
                value: choices[pick].value.clone(),
                checked: true,
            };
            current = binding.on_change(&current, event).unwrap();
        }
        let toggle = || ChangeEvent::Toggle {
            value: choices[target].value.clone(),
            checked: true,
        };
        let once = binding.on_change(&current, toggle()).unwrap();
        let twice = binding.on_change(&once, toggle()).unwrap();

        prop_assert_ne!(
            binding.is_checked(&once, &choices[target]),
            binding.is_checked(&current, &choices[target])
        );
        prop_assert_eq!(
            binding.is_checked(&twice, &choices[target]),
            binding.is_checked(&current, &choices[target])
        );
    }
}

#[test]
fn empty_string_normalization() {
    assert_eq!(
        prepare_data_for_validation(&json!({"name": "", "age": "3"})),
        json!({"name": null, "age": "3"})
    );
}

#[test]
fn multi_checkbox_round_trip() {
    let binding = FieldBinding::for_field(
        &FieldConfig::checkbox()
            .multi()
            .with_choices(vec![Choice::new("x")])
            .normalized(),
    );
    let toggle = || ChangeEvent::Toggle {
        value: "x".into(),
        checked: true,
    };
    let on = binding.on_change(&json!([]), toggle()).unwrap();
    assert_eq!(on, json!([{"value": "x"}]));
    assert_eq!(binding.on_change(&on, toggle()).unwrap(), json!([]));
}

#[test]
fn required_choice_needs_a_value() {
    let schema = ObjectSchema::new().field("pick", Rule::choice().required());
    let check = |value: Value| {
        let data = prepare_data_for_validation(&json!({ "pick": value }));
        schema.issues(data.as_object().unwrap()).unwrap()
    };
    assert_eq!(check(json!({"label": "", "value": ""})).len(), 1);
    assert!(check(json!({"label": "A", "value": "a"})).is_empty());
}

#[tokio::test]
async fn element_form_end_to_end() {
    init_test_tracing();
    let fields = field_map(vec![(
        "element",
        FieldConfig::text().required().with_initial_value(""),
    )]);
    let mut form = FormEngine::new(fields, FormOptions::new());

    let mut calls = 0;
    assert!(form.submit(|_, _| calls += 1).await.unwrap().is_none());
    assert_eq!(calls, 0);
    assert_eq!(form.field_errors("element"), vec!["element is a required field"]);

    form.set_field_value("element", "Header").unwrap();
    let submission = form.submit(|s, _| s).await.unwrap().unwrap();
    assert!(form.errors().is_empty());
    assert_eq!(Value::from(submission.submission_values), json!({"element": "Header"}));
}

#[tokio::test]
async fn prefixed_form_submits_unprefixed_names() {
    let field = FieldConfig::text().with_initial_value("red");
    let fields = field_map(vec![("backgroundColor", field)]);
    let mut form = FormEngine::new(fields, FormOptions::new().with_prefix("Table"));

    let submission = form.submit(|s, _| s).await.unwrap().unwrap();
    assert_eq!(submission.prefix.as_deref(), Some("Table"));
    assert_eq!(submission.str("backgroundColor"), Some("red"));
    assert!(submission.values.contains_key("Table-backgroundColor"));
}

#[tokio::test]
async fn whole_form_schema_replaces_field_rules() {
    let fields = field_map(vec![("a", FieldConfig::text().required())]);
    let schema = ObjectSchema::new().field("b", Rule::string().required());
    let mut form = FormEngine::new(fields, FormOptions::new().with_validation_schema(schema));

    assert!(form.submit(|_, _| ()).await.unwrap().is_none());
    assert!(form.is_valid("a"));
    assert!(!form.is_valid("b"));
}

#[tokio::test]
async fn json_field_submits_plain_object() {
    let fields = field_map(vec![("sx", FieldConfig::json())]);
    let mut form = FormEngine::new(fields, FormOptions::new());
    form.change("sx", ChangeEvent::Tree(sample_property_tree())).unwrap();

    let submission = form.submit(|s, _| s).await.unwrap().unwrap();
    assert_eq!(
        submission.get("sx"),
        Some(&json!({"padding": ["4px", "8px"], "color": "red"}))
    );
}
