use crate::commands::set::{ExpirationPolicy, Exclusivity, SetCommand};
use crate::commands::tests::frame;
use crate::commands::Command;
use crate::value::ReplyValue;
use bytes::Bytes;

#[test]
fn test_encode_plain() {
    assert_eq!(
        "*3\r\n$3\r\nSET\r\n$3\r\nkey\r\n$5\r\nvalue\r\n",
        frame(&SetCommand::new("key", "value"))
    );
}

#[test]
fn test_encode_expiration() {
    let command = SetCommand::new("key", "value").expires(ExpirationPolicy::Seconds(90));
    assert_eq!(
        "*5\r\n$3\r\nSET\r\n$3\r\nkey\r\n$5\r\nvalue\r\n$2\r\nEX\r\n$2\r\n90\r\n",
        frame(&command)
    );

    let command = SetCommand::new("key", "value").expires(ExpirationPolicy::TimestampMilliseconds(1000));
    assert_eq!(
        "*5\r\n$3\r\nSET\r\n$3\r\nkey\r\n$5\r\nvalue\r\n$4\r\nPXAT\r\n$4\r\n1000\r\n",
        frame(&command)
    );

    let command = SetCommand::new("key", "value").expires(ExpirationPolicy::Keep);
    assert_eq!(
        "*4\r\n$3\r\nSET\r\n$3\r\nkey\r\n$5\r\nvalue\r\n$7\r\nKEEPTTL\r\n",
        frame(&command)
    );
}

#[test]
fn test_encode_all_options() {
    let command = SetCommand::new("key", "value")
        .expires(ExpirationPolicy::Milliseconds(5))
        .set_exclusive(Exclusivity::SetIfMissing)
        .return_previous();

    assert_eq!(
        "*7\r\n$3\r\nSET\r\n$3\r\nkey\r\n$5\r\nvalue\r\n$2\r\nPX\r\n$1\r\n5\r\n$2\r\nNX\r\n$3\r\nGET\r\n",
        frame(&command)
    );
}

#[test]
fn test_eval_response_confirmation() {
    let command = SetCommand::new("key", "value");

    command.eval_response(ReplyValue::simple("OK")).unwrap();
    assert!(command.eval_response(ReplyValue::Nil).is_err());
}

#[test]
fn test_eval_response_exclusive() {
    let command = SetCommand::new("key", "value").set_exclusive(Exclusivity::SetIfExists);

    assert_eq!(Some(()), command.eval_response(ReplyValue::simple("OK")).unwrap());
    assert_eq!(None, command.eval_response(ReplyValue::BulkString(None)).unwrap());
    assert_eq!(None, command.eval_response(ReplyValue::Nil).unwrap());
    assert!(command.eval_response(ReplyValue::Integer(1)).is_err());
}

#[test]
fn test_eval_response_return_previous() {
    let command = SetCommand::new("key", "value").return_previous();

    assert_eq!(
        Some(Bytes::from_static(b"old")),
        command.eval_response(ReplyValue::bulk("old")).unwrap()
    );
    assert_eq!(None, command.eval_response(ReplyValue::BulkString(None)).unwrap());
    assert!(command.eval_response(ReplyValue::simple("OK")).is_err());
}
