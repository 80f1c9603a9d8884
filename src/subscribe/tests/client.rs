use crate::network::tests::mocks::{create_mocked_client, init_tracing, NetworkMockBuilder, SocketMock, TestClock};
use crate::network::transport::NalTransport;
use crate::network::{Client, CommandErrors, ParserLimits, Resp2, Resp3, Session};
use crate::subscribe::{Error, Message, SubscriptionKind};
use alloc::vec;
use bytes::Bytes;
use embedded_time::duration::Extensions;

fn session() -> Session {
    init_tracing();
    Session::new(ParserLimits::default())
}

fn message(channel: &'static str, payload: &'static str) -> Message {
    Message {
        channel: Bytes::from_static(channel.as_bytes()),
        payload: Bytes::from_static(payload.as_bytes()),
        pattern: None,
    }
}

#[test]
fn test_subscribe_send_error() {
    let clock = TestClock::new(vec![]);
    let mut network = NetworkMockBuilder::new().send_error().into_mock();

    let mut socket = SocketMock::new(164);
    let session = session();
    let client = create_mocked_client(&mut network, &mut socket, &session, &clock, Resp3 {});

    let error = client.subscribe(["test_topic"]).unwrap_err();
    assert_eq!(Error::TcpError, error);
    assert!(session.is_closed());
}

#[test]
fn test_subscribe_receive_error() {
    let clock = TestClock::new(vec![]);
    let mut network = NetworkMockBuilder::new()
        .send(164, "*2\r\n$9\r\nSUBSCRIBE\r\n$10\r\ntest_topic\r\n")
        .receive_tcp_error()
        .into_mock();

    let mut socket = SocketMock::new(164);
    let session = session();
    let client = create_mocked_client(&mut network, &mut socket, &session, &clock, Resp3 {});

    let error = client.subscribe(["test_topic"]).unwrap_err();
    assert_eq!(Error::ConnectionClosed, error);
}

#[test]
fn test_subscribe_error_response() {
    let clock = TestClock::new(vec![]);
    let mut network = NetworkMockBuilder::new()
        .send(164, "*2\r\n$9\r\nSUBSCRIBE\r\n$10\r\ntest_topic\r\n")
        .response_error()
        .into_mock();

    let mut socket = SocketMock::new(164);
    let session = session();
    let client = create_mocked_client(&mut network, &mut socket, &session, &clock, Resp3 {});

    let error = client.subscribe(["test_topic"]).unwrap_err();
    assert_eq!(
        Error::CommandError(CommandErrors::ErrorResponse {
            code: "ERR".into(),
            message: "unknown command".into(),
        }),
        error
    );
    assert!(!session.is_closed());
}

#[test]
fn test_subscribe_timeout() {
    // Timer start, expiry check
    let clock = TestClock::new(vec![100, 300]);
    let mut network = NetworkMockBuilder::new()
        .send(164, "*2\r\n$9\r\nSUBSCRIBE\r\n$10\r\ntest_topic\r\n")
        .response_no_data()
        .into_mock();

    let mut socket = SocketMock::new(164);
    let session = session();
    let client = Client::new(NalTransport::new(&mut network, &mut socket), &session, Resp3 {})
        .with_timeout(&clock, 100.microseconds());

    assert_eq!(Error::Timeout, client.subscribe(["test_topic"]).unwrap_err());
}

#[test]
fn test_subscribe_single_channel() {
    let clock = TestClock::new(vec![]);
    let mut network = NetworkMockBuilder::new()
        .send(164, "*2\r\n$9\r\nSUBSCRIBE\r\n$10\r\ntest_topic\r\n")
        .sub_confirmation_resp3("test_topic", 1)
        .into_mock();

    let mut socket = SocketMock::new(164);
    let session = session();
    let client = create_mocked_client(&mut network, &mut socket, &session, &clock, Resp3 {});

    let mut subscription = client.subscribe(["test_topic"]).unwrap();

    assert!(subscription.is_subscribed());
    assert_eq!(&[Bytes::from_static(b"test_topic")], subscription.channels());
    assert!(subscription.patterns().is_empty());
    assert!(subscription
        .client()
        .session()
        .pipeline()
        .subscriptions()
        .is_subscribed(SubscriptionKind::Channel, b"test_topic"));

    subscription.set_unsubscribed();
}

#[test]
fn test_subscribe_multiple_channels() {
    let clock = TestClock::new(vec![]);
    let mut network = NetworkMockBuilder::new()
        .send(164, "*4\r\n$9\r\nSUBSCRIBE\r\n$5\r\nfirst\r\n$6\r\nsecond\r\n$5\r\nthird\r\n")
        .sub_confirmation_resp3("first", 1)
        .sub_confirmation_resp3("second", 2)
        .sub_confirmation_resp3("third", 3)
        .into_mock();

    let mut socket = SocketMock::new(164);
    let session = session();
    let client = create_mocked_client(&mut network, &mut socket, &session, &clock, Resp3 {});

    let mut subscription = client.subscribe(["first", "second", "third"]).unwrap();

    assert_eq!(3, subscription.channels().len());
    assert_eq!(
        3,
        session.pipeline().subscriptions().count(SubscriptionKind::Channel)
    );
    assert_eq!(0, subscription.client().pending_count());

    subscription.set_unsubscribed();
}

#[test]
fn test_subscribe_resp2() {
    let clock = TestClock::new(vec![]);
    let mut network = NetworkMockBuilder::new()
        .send(164, "*2\r\n$9\r\nSUBSCRIBE\r\n$4\r\nnews\r\n")
        .response("*3\r\n$9\r\nsubscribe\r\n$4\r\nnews\r\n:1\r\n")
        .response("*3\r\n$7\r\nmessage\r\n$4\r\nnews\r\n$2\r\nhi\r\n")
        .response_no_data()
        .into_mock();

    let mut socket = SocketMock::new(164);
    let session = session();
    let client = create_mocked_client(&mut network, &mut socket, &session, &clock, Resp2 {});

    let mut subscription = client.subscribe(["news"]).unwrap();
    assert_eq!(message("news", "hi"), subscription.receive().unwrap().unwrap());

    subscription.set_unsubscribed();
}

#[test]
fn test_receive_message() {
    let clock = TestClock::new(vec![]);
    let mut network = NetworkMockBuilder::new()
        .send(164, "*2\r\n$9\r\nSUBSCRIBE\r\n$10\r\ntest_topic\r\n")
        .sub_confirmation_resp3("test_topic", 1)
        .sub_message("test_topic", "payload")
        .response_no_data()
        .response_no_data()
        .into_mock();

    let mut socket = SocketMock::new(164);
    let session = session();
    let client = create_mocked_client(&mut network, &mut socket, &session, &clock, Resp3 {});

    let mut subscription = client.subscribe(["test_topic"]).unwrap();

    assert_eq!(message("test_topic", "payload"), subscription.receive().unwrap().unwrap());
    assert_eq!(None, subscription.receive().unwrap());

    subscription.set_unsubscribed();
}

#[test]
fn test_message_before_confirmation_kept() {
    let clock = TestClock::new(vec![]);
    let mut network = NetworkMockBuilder::new()
        .send(164, "*3\r\n$9\r\nSUBSCRIBE\r\n$5\r\nfirst\r\n$6\r\nsecond\r\n")
        .sub_confirmation_resp3("first", 1)
        .sub_message("first", "early")
        .sub_confirmation_resp3("second", 2)
        .into_mock();

    let mut socket = SocketMock::new(164);
    let session = session();
    let client = create_mocked_client(&mut network, &mut socket, &session, &clock, Resp3 {});

    let mut subscription = client.subscribe(["first", "second"]).unwrap();

    // Already buffered, so no read is required
    assert_eq!(message("first", "early"), subscription.receive().unwrap().unwrap());

    subscription.set_unsubscribed();
}

#[test]
fn test_receive_pattern_message() {
    let clock = TestClock::new(vec![]);
    let mut network = NetworkMockBuilder::new()
        .send(164, "*2\r\n$10\r\nPSUBSCRIBE\r\n$2\r\nn*\r\n")
        .response(">3\r\n+psubscribe\r\n+n*\r\n:1\r\n")
        .response(">4\r\n+pmessage\r\n+n*\r\n+news\r\n+hi\r\n")
        .response_no_data()
        .into_mock();

    let mut socket = SocketMock::new(164);
    let session = session();
    let client = create_mocked_client(&mut network, &mut socket, &session, &clock, Resp3 {});

    let mut subscription = client.psubscribe(["n*"]).unwrap();
    assert!(subscription.channels().is_empty());
    assert_eq!(&[Bytes::from_static(b"n*")], subscription.patterns());

    assert_eq!(
        Message {
            channel: Bytes::from_static(b"news"),
            payload: Bytes::from_static(b"hi"),
            pattern: Some(Bytes::from_static(b"n*")),
        },
        subscription.receive().unwrap().unwrap()
    );

    subscription.set_unsubscribed();
}

#[test]
fn test_receive_error() {
    let clock = TestClock::new(vec![]);
    let mut network = NetworkMockBuilder::new()
        .send(164, "*2\r\n$9\r\nSUBSCRIBE\r\n$10\r\ntest_topic\r\n")
        .sub_confirmation_resp3("test_topic", 1)
        .receive_tcp_error()
        .into_mock();

    let mut socket = SocketMock::new(164);
    let session = session();
    let client = create_mocked_client(&mut network, &mut socket, &session, &clock, Resp3 {});

    let mut subscription = client.subscribe(["test_topic"]).unwrap();
    assert_eq!(Error::TcpError, subscription.receive().unwrap_err());

    // Closed connection: dropping does not try to unsubscribe
    drop(subscription);
    assert!(session.pipeline().subscriptions().is_empty());
}

#[test]
fn test_unsubscribe_exact_names() {
    let clock = TestClock::new(vec![]);
    let mut network = NetworkMockBuilder::new()
        .send(164, "*3\r\n$9\r\nSUBSCRIBE\r\n$5\r\nfirst\r\n$6\r\nsecond\r\n")
        .sub_confirmation_resp3("first", 1)
        .sub_confirmation_resp3("second", 2)
        .send(164, "*3\r\n$11\r\nUNSUBSCRIBE\r\n$5\r\nfirst\r\n$6\r\nsecond\r\n")
        .unsub_confirmation_resp3("first", 1)
        .unsub_confirmation_resp3("second", 0)
        .into_mock();

    let mut socket = SocketMock::new(164);
    let session = session();
    let client = create_mocked_client(&mut network, &mut socket, &session, &clock, Resp3 {});

    let subscription = client.subscribe(["first", "second"]).unwrap();
    subscription.unsubscribe().unwrap();

    assert!(session.pipeline().subscriptions().is_empty());
    assert_eq!(0, session.pipeline().pending_count());
}

#[test]
fn test_unsubscribe_patterns() {
    let clock = TestClock::new(vec![]);
    let mut network = NetworkMockBuilder::new()
        .send(164, "*2\r\n$10\r\nPSUBSCRIBE\r\n$2\r\nn*\r\n")
        .response(">3\r\n+psubscribe\r\n+n*\r\n:1\r\n")
        .send(164, "*2\r\n$12\r\nPUNSUBSCRIBE\r\n$2\r\nn*\r\n")
        .response(">3\r\n+punsubscribe\r\n+n*\r\n:0\r\n")
        .into_mock();

    let mut socket = SocketMock::new(164);
    let session = session();
    let client = create_mocked_client(&mut network, &mut socket, &session, &clock, Resp3 {});

    client.psubscribe(["n*"]).unwrap().unsubscribe().unwrap();
    assert!(session.pipeline().subscriptions().is_empty());
}

#[test]
fn test_unsubscribe_send_error() {
    let clock = TestClock::new(vec![]);
    let mut network = NetworkMockBuilder::new()
        .send(164, "*2\r\n$9\r\nSUBSCRIBE\r\n$10\r\ntest_topic\r\n")
        .sub_confirmation_resp3("test_topic", 1)
        .send_error()
        .into_mock();

    let mut socket = SocketMock::new(164);
    let session = session();
    let client = create_mocked_client(&mut network, &mut socket, &session, &clock, Resp3 {});

    let subscription = client.subscribe(["test_topic"]).unwrap();
    assert_eq!(Error::TcpError, subscription.unsubscribe().unwrap_err());
}

#[test]
fn test_drop_unsubscribes() {
    let clock = TestClock::new(vec![]);
    let mut network = NetworkMockBuilder::new()
        .send(164, "*2\r\n$9\r\nSUBSCRIBE\r\n$10\r\ntest_topic\r\n")
        .sub_confirmation_resp3("test_topic", 1)
        .send(164, "*2\r\n$11\r\nUNSUBSCRIBE\r\n$10\r\ntest_topic\r\n")
        .unsub_confirmation_resp3("test_topic", 0)
        .into_mock();

    let mut socket = SocketMock::new(164);
    let session = session();
    let client = create_mocked_client(&mut network, &mut socket, &session, &clock, Resp3 {});

    let subscription = client.subscribe(["test_topic"]).unwrap();
    drop(subscription);

    assert!(session.pipeline().subscriptions().is_empty());
}

#[test]
fn test_debug_format() {
    let clock = TestClock::new(vec![]);
    let mut network = NetworkMockBuilder::new()
        .send(164, "*2\r\n$9\r\nSUBSCRIBE\r\n$4\r\nnews\r\n")
        .sub_confirmation_resp3("news", 1)
        .into_mock();

    let mut socket = SocketMock::new(164);
    let session = session();
    let client = create_mocked_client(&mut network, &mut socket, &session, &clock, Resp3 {});

    let mut subscription = client.subscribe(["news"]).unwrap();
    let output = alloc::format!("{:?}", subscription);
    assert!(output.contains("pending_messages: 0"));
    assert!(output.contains("subscribed: true"));

    subscription.set_unsubscribed();
}
