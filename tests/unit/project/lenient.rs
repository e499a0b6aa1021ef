use super::*;
use serde_json::json;

#[derive(serde::Deserialize)]
struct Fields {
    #[serde(default, deserialize_with = "opt_number")]
    maybe: Option<f64>,
    #[serde(default, deserialize_with = "step")]
    at: u32,
    #[serde(default, deserialize_with = "flag")]
    on: bool,
    #[serde(default, deserialize_with = "text")]
    label: String,
}

fn fields(v: serde_json::Value) -> Fields {
    serde_json::from_value(v).unwrap()
}

#[test]
fn numbers_accept_strings_and_treat_blank_as_unset() {
    assert_eq!(fields(json!({"maybe": "12.5"})).maybe, Some(12.5));
    assert_eq!(fields(json!({"maybe": 3})).maybe, Some(3.0));
    assert_eq!(fields(json!({"maybe": ""})).maybe, None);
    assert_eq!(fields(json!({"maybe": null})).maybe, None);
    assert_eq!(fields(json!({"maybe": "abc"})).maybe, None);
    assert_eq!(fields(json!({})).maybe, None);
}

#[test]
fn steps_truncate_and_clamp() {
    assert_eq!(fields(json!({"at": 2.9})).at, 2);
    assert_eq!(fields(json!({"at": -4})).at, 0);
    assert_eq!(fields(json!({"at": "7"})).at, 7);
}

#[test]
fn required_number_rejects_garbage() {
    #[derive(serde::Deserialize, Debug)]
    #[allow(dead_code)]
    struct Required {
        #[serde(deserialize_with = "number")]
        n: f64,
    }
    assert!(serde_json::from_value::<Required>(json!({"n": "x"})).is_err());
    assert!(serde_json::from_value::<Required>(json!({"n": null})).is_err());
}

#[test]
fn flags_and_text_are_tolerant() {
    assert!(fields(json!({"on": "true"})).on);
    assert!(fields(json!({"on": 1})).on);
    assert!(!fields(json!({"on": null})).on);
    assert_eq!(fields(json!({"label": 42})).label, "42");
    assert_eq!(fields(json!({"label": null})).label, "");
}
