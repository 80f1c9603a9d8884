use crate::network::tests::mocks::{create_mocked_client, init_tracing, NetworkMockBuilder, SocketMock, TestClock};
use crate::network::{CommandErrors, ParserLimits, Resp2, Session};
use crate::transaction::{ExecResponse, TransactionState, WatchCommand};
use alloc::vec;

fn session() -> Session {
    init_tracing();
    Session::new(ParserLimits::default())
}

#[test]
fn test_commit() {
    let clock = TestClock::new(vec![]);
    let mut network = NetworkMockBuilder::new()
        .send(1, "*1\r\n$5\r\nMULTI\r\n")
        .send(1, "*3\r\n$3\r\nSET\r\n$3\r\nkey\r\n$5\r\nvalue\r\n")
        .send(1, "*2\r\n$3\r\nGET\r\n$3\r\nkey\r\n")
        .send(1, "*1\r\n$4\r\nEXEC\r\n")
        .response("+OK\r\n+QUEUED\r\n+QUEUED\r\n*2\r\n+OK\r\n$5\r\nvalue\r\n")
        .into_mock();

    let mut socket = SocketMock::new(1);
    let session = session();
    let client = create_mocked_client(&mut network, &mut socket, &session, &clock, Resp2 {});

    let multi = client.multi().unwrap();
    let set = client.set("key", "value").unwrap();
    let get = client.get("key").unwrap();
    assert_eq!(TransactionState::Accumulating(2), session.pipeline().transaction_state());

    let exec = client.exec().unwrap();
    assert_eq!(TransactionState::Idle, session.pipeline().transaction_state());

    multi.wait().unwrap();
    assert_eq!(ExecResponse::Committed(2), exec.wait().unwrap());
    set.wait().unwrap();
    assert_eq!("value", get.wait().unwrap().unwrap().as_str().unwrap());
    assert_eq!(0, client.pending_count());
}

#[test]
fn test_queued_futures_resolve_with_exec() {
    let clock = TestClock::new(vec![]);
    let mut network = NetworkMockBuilder::new()
        .send_any(3)
        .response("+OK\r\n+QUEUED\r\n")
        .response("*1\r\n:1\r\n")
        .into_mock();

    let mut socket = SocketMock::new(1);
    let session = session();
    let client = create_mocked_client(&mut network, &mut socket, &session, &clock, Resp2 {});

    let multi = client.multi().unwrap();
    let publish = client.publish("news", "hello").unwrap();
    let exec = client.exec().unwrap();

    multi.wait().unwrap();

    // QUEUED does not resolve the future, the EXEC result does
    assert_eq!(1, publish.wait().unwrap());
    assert_eq!(ExecResponse::Committed(1), exec.wait().unwrap());
}

#[test]
fn test_watched_key_modified() {
    let clock = TestClock::new(vec![]);
    let mut network = NetworkMockBuilder::new()
        .send(1, "*2\r\n$5\r\nWATCH\r\n$3\r\nkey\r\n")
        .send(1, "*1\r\n$5\r\nMULTI\r\n")
        .send(1, "*3\r\n$3\r\nSET\r\n$3\r\nkey\r\n$5\r\nvalue\r\n")
        .send(1, "*1\r\n$4\r\nEXEC\r\n")
        .response("+OK\r\n+OK\r\n+QUEUED\r\n*-1\r\n")
        .into_mock();

    let mut socket = SocketMock::new(1);
    let session = session();
    let client = create_mocked_client(&mut network, &mut socket, &session, &clock, Resp2 {});

    let watch = client.send(WatchCommand::new("key")).unwrap();
    let multi = client.multi().unwrap();
    let set = client.set("key", "value").unwrap();
    let exec = client.exec().unwrap();

    watch.wait().unwrap();
    multi.wait().unwrap();
    assert_eq!(ExecResponse::Aborted, exec.wait().unwrap());
    assert_eq!(CommandErrors::TransactionAborted, set.wait().unwrap_err());
}

#[test]
fn test_discard() {
    let clock = TestClock::new(vec![]);
    let mut network = NetworkMockBuilder::new()
        .send_any(3)
        .response("+OK\r\n+QUEUED\r\n+OK\r\n")
        .into_mock();

    let mut socket = SocketMock::new(1);
    let session = session();
    let client = create_mocked_client(&mut network, &mut socket, &session, &clock, Resp2 {});

    let multi = client.multi().unwrap();
    let set = client.set("key", "value").unwrap();
    let discard = client.discard().unwrap();

    multi.wait().unwrap();
    discard.wait().unwrap();
    assert_eq!(CommandErrors::TransactionDiscarded, set.wait().unwrap_err());
    assert_eq!(TransactionState::Idle, session.pipeline().transaction_state());
}

#[test]
fn test_exec_rejected() {
    let clock = TestClock::new(vec![]);
    let mut network = NetworkMockBuilder::new()
        .send_any(3)
        .response("+OK\r\n+QUEUED\r\n-EXECABORT Transaction discarded\r\n")
        .into_mock();

    let mut socket = SocketMock::new(1);
    let session = session();
    let client = create_mocked_client(&mut network, &mut socket, &session, &clock, Resp2 {});

    let multi = client.multi().unwrap();
    let set = client.set("key", "value").unwrap();
    let exec = client.exec().unwrap();

    multi.wait().unwrap();

    let expected = CommandErrors::ErrorResponse {
        code: "EXECABORT".into(),
        message: "Transaction discarded".into(),
    };
    assert_eq!(expected, exec.wait().unwrap_err());
    assert_eq!(expected, set.wait().unwrap_err());
}

#[test]
fn test_disconnect_fails_deferred() {
    let clock = TestClock::new(vec![]);
    let mut network = NetworkMockBuilder::new()
        .send_any(2)
        .response("+OK\r\n+QUEUED\r\n")
        .receive_closed()
        .into_mock();

    let mut socket = SocketMock::new(1);
    let session = session();
    let client = create_mocked_client(&mut network, &mut socket, &session, &clock, Resp2 {});

    let multi = client.multi().unwrap();
    let set = client.set("key", "value").unwrap();

    multi.wait().unwrap();
    assert_eq!(CommandErrors::ConnectionClosed, set.wait().unwrap_err());
    assert_eq!(TransactionState::Idle, session.pipeline().transaction_state());
}
