use crate::network::encoder::{encode, encode_into};
use crate::network::parser::{ParserLimits, ReplyParser};
use crate::value::ReplyValue;
use alloc::vec;
use alloc::vec::Vec;
use bytes::{Bytes, BytesMut};
use proptest::prelude::*;

#[test]
fn test_encode_without_arguments() {
    let frame = encode::<&[u8]>(b"PING", &[]);
    assert_eq!(&b"*1\r\n$4\r\nPING\r\n"[..], &frame[..]);
}

#[test]
fn test_encode_with_arguments() {
    let frame = encode(b"SET", &["key", "value"]);
    assert_eq!(&b"*3\r\n$3\r\nSET\r\n$3\r\nkey\r\n$5\r\nvalue\r\n"[..], &frame[..]);
}

#[test]
fn test_encode_empty_argument() {
    let frame = encode(b"GET", &[""]);
    assert_eq!(&b"*2\r\n$3\r\nGET\r\n$0\r\n\r\n"[..], &frame[..]);
}

#[test]
fn test_encode_binary_argument_unmodified() {
    let frame = encode(b"SET", &[&b"k"[..], &b"a\r\n\0b"[..]]);
    assert_eq!(&b"*3\r\n$3\r\nSET\r\n$1\r\nk\r\n$5\r\na\r\n\0b\r\n"[..], &frame[..]);
}

#[test]
fn test_encode_length_with_multiple_digits() {
    let value = vec![b'x'; 1234];
    let frame = encode(b"SET", &[&b"k"[..], &value[..]]);

    assert!(frame.starts_with(b"*3\r\n$3\r\nSET\r\n$1\r\nk\r\n$1234\r\n"));
    assert_eq!(27 + 1234 + 2, frame.len());
}

#[test]
fn test_encode_into_appends() {
    let mut buffer = BytesMut::new();
    encode_into(&mut buffer, b"MULTI", &[] as &[Bytes]);
    encode_into(&mut buffer, b"INCR", &[Bytes::from_static(b"counter")]);

    assert_eq!(
        &b"*1\r\n$5\r\nMULTI\r\n*2\r\n$4\r\nINCR\r\n$7\r\ncounter\r\n"[..],
        &buffer[..]
    );
}

proptest! {
    #[test]
    fn test_encoded_frame_is_array_of_bulk_strings(
        name in proptest::collection::vec(any::<u8>(), 1..16),
        arguments in proptest::collection::vec(proptest::collection::vec(any::<u8>(), 0..64), 0..8),
    ) {
        let frame = encode(&name, &arguments);

        let mut parser = ReplyParser::new(ParserLimits::default());
        parser.feed(&frame);
        let reply = parser.next_reply().unwrap();

        let mut expected = vec![ReplyValue::bulk(name.clone())];
        expected.extend(arguments.iter().map(|argument| ReplyValue::bulk(argument.clone())));

        prop_assert_eq!(Some(ReplyValue::Array(expected)), reply);
        prop_assert_eq!(0, parser.buffered());
    }

    #[test]
    fn test_encoded_length_is_exact(
        arguments in proptest::collection::vec(proptest::collection::vec(any::<u8>(), 0..300), 0..20),
    ) {
        let frame = encode(b"RPUSH", &arguments);

        let mut buffer = BytesMut::new();
        encode_into(&mut buffer, b"RPUSH", &arguments);

        prop_assert_eq!(frame.len(), buffer.len());
        prop_assert_eq!(&frame[..], &buffer[..]);

        let payload: usize = arguments.iter().map(Vec::len).sum();
        prop_assert!(frame.len() > payload);
    }
}
