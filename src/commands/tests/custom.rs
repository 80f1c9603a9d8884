use crate::commands::builder::CommandBuilder;
use crate::commands::custom::CustomCommand;
use crate::commands::tests::frame;
use crate::commands::Command;
use crate::network::tests::mocks::{create_mocked_client, NetworkMockBuilder, SocketMock, TestClock};
use crate::network::{ParserLimits, Resp2, Session};
use crate::value::ReplyValue;
use alloc::vec;
use bytes::Bytes;

#[test]
fn test_encode() {
    let command = CustomCommand::new(CommandBuilder::new("HGET").arg_static("field1").arg_static("key1"));
    assert_eq!("*3\r\n$4\r\nHGET\r\n$6\r\nfield1\r\n$4\r\nkey1\r\n", frame(&command));
}

#[test]
fn test_eval_response_returns_reply() {
    let command = CustomCommand::new(CommandBuilder::new("LRANGE"));
    let reply = ReplyValue::Array(vec![ReplyValue::bulk("a"), ReplyValue::BulkString(None)]);

    assert_eq!(reply.clone(), command.eval_response(reply).unwrap());
}

#[test]
fn test_send_custom_command() {
    let clock = TestClock::new(vec![]);
    let mut network = NetworkMockBuilder::new()
        .send(1, "*2\r\n$4\r\nINCR\r\n$7\r\ncounter\r\n")
        .response(":8\r\n")
        .into_mock();

    let mut socket = SocketMock::new(1);
    let session = Session::new(ParserLimits::default());
    let client = create_mocked_client(&mut network, &mut socket, &session, &clock, Resp2 {});

    let counter = Bytes::from_static(b"counter");
    let command = CommandBuilder::new("INCR").arg(&counter).to_command();
    let response = client.send(command).unwrap().wait().unwrap();

    assert_eq!(Some(8), response.as_integer());
}
