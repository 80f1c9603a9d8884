use crate::commands::hello::HelloCommand;
use crate::commands::tests::frame;
use crate::commands::Command;
use crate::value::{ReplyValue, TypeMismatch};
use alloc::vec;
use alloc::vec::Vec;

fn hello_map(skip: Option<&str>) -> ReplyValue {
    let fields = vec![
        ("server", ReplyValue::bulk("redis")),
        ("version", ReplyValue::bulk("7.2.4")),
        ("proto", ReplyValue::Integer(3)),
        ("id", ReplyValue::Integer(42)),
        ("mode", ReplyValue::bulk("standalone")),
        ("role", ReplyValue::bulk("master")),
        ("modules", ReplyValue::Array(vec![ReplyValue::bulk("search")])),
    ];

    let pairs: Vec<(ReplyValue, ReplyValue)> = fields
        .into_iter()
        .filter(|(key, _)| Some(*key) != skip)
        .map(|(key, value)| (ReplyValue::bulk(key.as_bytes().to_vec()), value))
        .collect();

    ReplyValue::Map(pairs)
}

#[test]
fn test_encode() {
    assert_eq!("*2\r\n$5\r\nHELLO\r\n$1\r\n3\r\n", frame(&HelloCommand::default()));
}

#[test]
fn test_eval_response() {
    let response = HelloCommand::default().eval_response(hello_map(None)).unwrap();

    assert_eq!("redis", response.server);
    assert_eq!("7.2.4", response.version);
    assert_eq!(3, response.protocol);
    assert_eq!(42, response.id);
    assert_eq!("standalone", response.mode);
    assert_eq!("master", response.role);
    assert_eq!(vec![ReplyValue::bulk("search")], response.modules);
}

#[test]
fn test_eval_response_unknown_fields_ignored() {
    let mut reply = hello_map(None);
    if let ReplyValue::Map(pairs) = &mut reply {
        pairs.push((ReplyValue::bulk("availability_zone"), ReplyValue::bulk("eu-1")));
    }

    assert!(HelloCommand::default().eval_response(reply).is_ok());
}

#[test]
fn test_eval_response_missing_field() {
    let error = HelloCommand::default()
        .eval_response(hello_map(Some("role")))
        .unwrap_err();

    assert_eq!("complete HELLO map", error.expected);
}

#[test]
fn test_eval_response_no_map() {
    let error = HelloCommand::default()
        .eval_response(ReplyValue::Array(vec![]))
        .unwrap_err();

    assert_eq!(
        TypeMismatch {
            expected: "map",
            found: "array",
        },
        error
    );
}
