//! Tests for the generic form model: writes, observers and error reporting.

use std::sync::{Arc, Mutex};

use formwork_lib::form::{ConditionalRule, FormModel, MessageCatalog};
use formwork_lib::node::{ArrayNode, FieldNode, GroupNode};
use formwork_lib::validation::{Rule, ValidationState};
use formwork_lib::{ConfigError, FormError, PathError, Value};
use indexmap::IndexMap;

fn login_form() -> FormModel {
    FormModel::new(
        GroupNode::new()
            .with_child("user", FieldNode::new("").with_rule(Rule::Required))
            .with_child(
                "passwords",
                GroupNode::new()
                    .with_child("password", FieldNode::new("").with_rule(Rule::min_length(8)))
                    .with_child("repeat", FieldNode::new(""))
                    .with_rule(Rule::fields_match("password", "repeat")),
            )
            .with_child("tags", ArrayNode::new().with_element(FieldNode::new("a"))),
    )
    .unwrap()
}

fn recorder() -> (
    Arc<Mutex<Vec<String>>>,
    impl Fn(&str) + Clone + Send + Sync + 'static,
) {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    (log, move |entry: &str| sink.lock().unwrap().push(entry.to_string()))
}

// =============================================================================
// Writes
// =============================================================================

#[test]
fn test_set_value_marks_dirty_and_revalidates() {
    let form = login_form();
    assert!(form.errors("user").unwrap().contains("required"));

    form.set_value("user", "ada").unwrap();
    assert!(form.errors("user").unwrap().is_empty());
    assert!(form.interaction_state("user").unwrap().dirty);
    assert!(!form.interaction_state("user").unwrap().touched);
    assert!(form.interaction_state("passwords").unwrap().is_pristine());
    assert_eq!(form.validation_state("").unwrap(), ValidationState::Valid);
}

#[test]
fn test_all_failures_coexist() {
    let form = FormModel::new(GroupNode::new().with_child(
        "code",
        FieldNode::new("").with_rules([Rule::min_length(4), Rule::pattern("[0-9]+").unwrap()]),
    ))
    .unwrap();

    form.set_value("code", "ab").unwrap();
    assert_eq!(
        form.errors("code").unwrap().keys().collect::<Vec<_>>(),
        vec!["minlength", "pattern"]
    );
}

#[test]
fn test_same_value_still_notifies() {
    let form = login_form();
    let (log, record) = recorder();
    let _sub = form
        .subscribe("user", move |change| record(&change.value.to_string()))
        .unwrap();

    form.set_value("user", "ada").unwrap();
    form.set_value("user", "ada").unwrap();
    assert_eq!(*log.lock().unwrap(), vec!["ada", "ada"]);
}

#[test]
fn test_group_write_distributes_values() {
    let form = login_form();
    let (log, record) = recorder();
    for path in ["passwords.password", "passwords.repeat", "passwords"] {
        let record = record.clone();
        let _sub = form
            .subscribe(path, move |change| record(&change.path.to_string()))
            .unwrap();
    }

    let mut value = IndexMap::new();
    value.insert("repeat".to_string(), Value::from("secret123"));
    value.insert("password".to_string(), Value::from("secret123"));
    form.set_value("passwords", Value::Map(value)).unwrap();

    assert_eq!(
        *log.lock().unwrap(),
        vec!["passwords.password", "passwords.repeat", "passwords"]
    );
    assert!(form.errors("passwords").unwrap().is_empty());
    assert!(form.interaction_state("passwords.repeat").unwrap().dirty);
}

#[test]
fn test_group_write_with_wrong_shape_changes_nothing() {
    let form = login_form();
    let err = form.set_value("passwords", "flat").unwrap_err();
    assert!(matches!(
        err,
        FormError::Path(PathError::ShapeMismatch { .. })
    ));
    assert!(form.interaction_state("passwords").unwrap().is_pristine());
}

// =============================================================================
// Validators
// =============================================================================

#[test]
fn test_set_validators_recomputes_immediately() {
    let form = login_form();
    assert!(form.errors("passwords.repeat").unwrap().is_empty());

    form.set_validators("passwords.repeat", vec![Rule::Required])
        .unwrap();
    assert!(form.errors("passwords.repeat").unwrap().contains("required"));

    form.clear_validators("passwords.repeat").unwrap();
    assert!(form.errors("passwords.repeat").unwrap().is_empty());
}

#[test]
fn test_recompute_is_idempotent() {
    let form = login_form();
    form.set_value("passwords.password", "short").unwrap();
    let before = form.errors("passwords.password").unwrap();
    let state = form.recompute("passwords.password").unwrap();
    assert_eq!(state, ValidationState::Invalid);
    assert_eq!(form.errors("passwords.password").unwrap(), before);
    assert_eq!(form.recompute("").unwrap(), ValidationState::Invalid);
}

#[test]
fn test_conditional_rule_on_generic_form() {
    let form = login_form();
    let rule = ConditionalRule::new("user", "admin", "passwords.repeat", Rule::Required).unwrap();
    let sub = form.add_conditional_rule(rule).unwrap();

    form.set_value("user", "admin").unwrap();
    assert!(form.errors("passwords.repeat").unwrap().contains("required"));

    // unsubscribing stops the controller but leaves the current rules alone
    assert!(sub.unsubscribe());
    form.set_value("user", "guest").unwrap();
    assert!(form.errors("passwords.repeat").unwrap().contains("required"));
}

#[test]
fn test_revalidation_keeps_interaction_flags() {
    let form = login_form();
    form.set_value("passwords.repeat", "x").unwrap();
    form.mark_touched("passwords.repeat").unwrap();
    let flags = form.interaction_state("passwords.repeat").unwrap();
    assert!(flags.dirty && flags.touched);

    form.recompute("").unwrap();
    assert_eq!(form.interaction_state("passwords.repeat").unwrap(), flags);

    form.set_validators("passwords.repeat", vec![Rule::Required])
        .unwrap();
    assert_eq!(form.interaction_state("passwords.repeat").unwrap(), flags);

    form.clear_validators("passwords.repeat").unwrap();
    assert_eq!(form.interaction_state("passwords.repeat").unwrap(), flags);

    let rule = ConditionalRule::new("user", "admin", "passwords.repeat", Rule::Required).unwrap();
    let _sub = form.add_conditional_rule(rule).unwrap();
    form.set_value("user", "admin").unwrap();
    assert_eq!(form.interaction_state("passwords.repeat").unwrap(), flags);
    form.set_value("user", "guest").unwrap();
    assert_eq!(form.interaction_state("passwords.repeat").unwrap(), flags);

    // untouched siblings stay untouched
    assert!(form.interaction_state("passwords.password").unwrap().is_untouched());
}

// =============================================================================
// Observers
// =============================================================================

#[test]
fn test_observers_run_in_subscription_order() {
    let form = login_form();
    let (log, record) = recorder();

    let first = {
        let record = record.clone();
        form.subscribe("user", move |_| record("first")).unwrap()
    };
    let _second = form.subscribe("user", move |_| record("second")).unwrap();

    form.set_value("user", "a").unwrap();
    assert!(first.unsubscribe());
    form.set_value("user", "b").unwrap();

    assert_eq!(*log.lock().unwrap(), vec!["first", "second", "second"]);
}

#[test]
fn test_observer_can_write_back() {
    let form = login_form();
    let mirror = form.clone();
    let _sub = form
        .subscribe("passwords.password", move |change| {
            mirror
                .set_value("passwords.repeat", change.value.clone())
                .unwrap();
        })
        .unwrap();

    form.set_value("passwords.password", "hunter22").unwrap();
    assert_eq!(
        form.get_value("passwords.repeat").unwrap(),
        Value::from("hunter22")
    );
    assert!(form.errors("passwords").unwrap().is_empty());
}

#[test]
fn test_change_carries_value_and_status() {
    let form = login_form();
    let seen = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&seen);
    let _sub = form
        .subscribe("user", move |change| {
            *sink.lock().unwrap() = Some((change.value.clone(), change.status));
        })
        .unwrap();

    form.set_value("user", "").unwrap();
    assert_eq!(
        *seen.lock().unwrap(),
        Some((Value::from(""), ValidationState::Invalid))
    );
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn test_unknown_paths_are_consistency_errors() {
    let form = login_form();
    let err = form.set_value("nope", 1).unwrap_err();
    assert!(err.is_consistency());
    assert!(form.get_value("user.name").unwrap_err().is_consistency());
    assert!(form.subscribe("tags.4", |_| {}).unwrap_err().is_consistency());
    assert!(form.set_value("a..b", 1).unwrap_err().is_consistency());
}

#[test]
fn test_broken_definitions_are_config_errors() {
    let err = FormModel::new(
        GroupNode::new()
            .with_child("a", FieldNode::new(""))
            .with_rule(Rule::fields_match("a", "b")),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        FormError::Config(ConfigError::UnknownSibling { .. })
    ));

    let form = login_form();
    let err = form
        .set_validators("user", vec![Rule::fields_match("x", "y")])
        .unwrap_err();
    assert!(matches!(err, FormError::Config(ConfigError::NotAGroup { .. })));
    assert!(form.validators("user").unwrap().contains(&Rule::Required));

    let err = form.add_array_element("tags").unwrap_err();
    assert!(matches!(
        err,
        FormError::Config(ConfigError::NoElementFactory(_))
    ));

    let err = form.add_array_element("user").unwrap_err();
    assert!(err.is_config());

    let err = FormModel::new(GroupNode::new().with_child("items", ArrayNode::new().with_len(3)))
        .unwrap_err();
    assert_eq!(
        err,
        FormError::Config(ConfigError::NoElementFactory("items".to_string()))
    );
}

#[test]
fn test_feedback_outside_runtime_is_config_error() {
    let form = login_form();
    let err = form.feedback("user", MessageCatalog::default()).unwrap_err();
    assert!(matches!(err, FormError::Config(ConfigError::NoRuntime(_))));
}

#[test]
fn test_unsubscribe_after_drop() {
    let form = login_form();
    let sub = form.subscribe("user", |_| {}).unwrap();
    drop(form);
    assert!(!sub.unsubscribe());
}
