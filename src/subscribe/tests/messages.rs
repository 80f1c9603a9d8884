use crate::subscribe::messages::{classify, AckAction, PushMessage, SubscriptionAck};
use crate::subscribe::SubscriptionKind;
use crate::value::ReplyValue;
use alloc::vec;
use bytes::Bytes;

fn array(elements: &[&'static str]) -> ReplyValue {
    ReplyValue::Array(elements.iter().map(|element| ReplyValue::bulk(*element)).collect())
}

#[test]
fn test_classify_message() {
    assert_eq!(
        Some(PushMessage::Message {
            channel: Bytes::from_static(b"news"),
            payload: Bytes::from_static(b"hello"),
        }),
        classify(&array(&["message", "news", "hello"]))
    );
}

#[test]
fn test_classify_message_push_frame() {
    let value = ReplyValue::Push(vec![
        ReplyValue::simple("message"),
        ReplyValue::simple("news"),
        ReplyValue::bulk("hello"),
    ]);

    assert!(matches!(classify(&value), Some(PushMessage::Message { .. })));
}

#[test]
fn test_classify_pattern_message() {
    assert_eq!(
        Some(PushMessage::PatternMessage {
            pattern: Bytes::from_static(b"n*"),
            channel: Bytes::from_static(b"news"),
            payload: Bytes::from_static(b"hello"),
        }),
        classify(&array(&["pmessage", "n*", "news", "hello"]))
    );
}

#[test]
fn test_classify_acks() {
    let cases = [
        ("subscribe", AckAction::Subscribe, SubscriptionKind::Channel),
        ("unsubscribe", AckAction::Unsubscribe, SubscriptionKind::Channel),
        ("psubscribe", AckAction::Subscribe, SubscriptionKind::Pattern),
        ("punsubscribe", AckAction::Unsubscribe, SubscriptionKind::Pattern),
    ];

    for (tag, action, kind) in cases {
        let value = ReplyValue::Array(vec![
            ReplyValue::bulk(tag),
            ReplyValue::bulk("news"),
            ReplyValue::Integer(3),
        ]);

        assert_eq!(
            Some(PushMessage::Ack(SubscriptionAck {
                action,
                kind,
                channel: Some(Bytes::from_static(b"news")),
                remaining: 3,
            })),
            classify(&value)
        );
    }
}

#[test]
fn test_classify_ack_nil_channel() {
    let value = ReplyValue::Array(vec![
        ReplyValue::bulk("unsubscribe"),
        ReplyValue::BulkString(None),
        ReplyValue::Integer(0),
    ]);

    match classify(&value) {
        Some(PushMessage::Ack(ack)) => {
            assert_eq!(None, ack.channel);
            assert_eq!(0, ack.remaining);
        }
        other => panic!("unexpected classification: {:?}", other),
    }
}

#[test]
fn test_classify_tag_case_sensitive() {
    assert_eq!(None, classify(&array(&["MESSAGE", "news", "hello"])));
}

#[test]
fn test_classify_unknown_tag() {
    assert_eq!(None, classify(&array(&["pong", ""])));
    assert_eq!(None, classify(&array(&["invalidate", "key", "x"])));
    assert_eq!(None, classify(&ReplyValue::Array(vec![])));
}

#[test]
fn test_classify_wrong_element_count() {
    assert_eq!(None, classify(&array(&["message", "news"])));
    assert_eq!(None, classify(&array(&["pmessage", "n*", "news"])));
    assert_eq!(None, classify(&array(&["message", "news", "hello", "extra"])));
}

#[test]
fn test_classify_invalid_ack_count() {
    let negative = ReplyValue::Array(vec![
        ReplyValue::bulk("subscribe"),
        ReplyValue::bulk("news"),
        ReplyValue::Integer(-1),
    ]);
    assert_eq!(None, classify(&negative));

    let not_integer = array(&["subscribe", "news", "1"]);
    assert_eq!(None, classify(&not_integer));
}

#[test]
fn test_classify_no_aggregate() {
    assert_eq!(None, classify(&ReplyValue::bulk("message")));
    assert_eq!(None, classify(&ReplyValue::Integer(1)));
    assert_eq!(None, classify(&ReplyValue::Nil));
}
