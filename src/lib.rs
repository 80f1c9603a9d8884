//! This crate offers a non-blocking, pipelining Redis client for no_std targets.
//! Both RESP2 and RESP3 protocol are supported.
//!
//! This crate consists of the following parts:
//! * [network module](crate::network) for the request/reply pipeline, connection handling and futures
//! * [commands module](crate::commands) for Redis command abstractions
//! * [transaction module](crate::transaction) for MULTI/EXEC transactions
//! * [subscribe module](crate::subscribe) for Pub/Sub
//! * [value module](crate::value) for the reply representation
//!
//! ```ignore
//! let mut stack = Stack::default();
//! let clock = StandardClock::default();
//!
//! let server_address = SocketAddr::from_str("127.0.0.1:6379").unwrap();
//! let mut connection_handler = ConnectionHandler::resp2(server_address);
//! let client = connection_handler.connect(&mut stack, Some(&clock)).unwrap();
//!
//! let future = client.set("key", "value").unwrap();
//! let response = future.wait().unwrap();
//! ```
//!
//! The request/reply engine itself is transport independent and can be driven by any event loop:
//! ```
//! use resp_pipeline::network::{CompletionSink, ParserLimits, Session};
//!
//! let session = Session::new(ParserLimits::default());
//! session
//!     .pipeline_mut()
//!     .register(b"PING", 0, CompletionSink::Ignore)
//!     .unwrap();
//!
//! // Bytes may arrive in arbitrary chunks
//! session.pipeline_mut().on_data(b"+PO").unwrap();
//! assert_eq!(1, session.pipeline().pending_count());
//!
//! session.pipeline_mut().on_data(b"NG\r\n").unwrap();
//! session.deliver();
//! assert_eq!(0, session.pipeline().pending_count());
//! ```
#![cfg_attr(all(not(test), not(feature = "mock")), no_std)]
#![cfg_attr(feature = "strict", deny(warnings))]

extern crate alloc;

/// # Redis command abstractions
///
/// This crates includes abstractions for some Redis commands like
/// [AUTH](crate::commands::auth),
/// [HELLO](crate::commands::hello),
/// [GET](crate::commands::get),
/// [SET](crate::commands::set),
/// [PUBLISH](crate::commands::publish),
/// [ZCOUNT/ZRANGEBYSCORE/ZLEXCOUNT/ZRANGEBYLEX](crate::commands::zrange), ...
///
/// Each abstraction is implementing the [Command](crate::commands::Command) trait.
///
/// For executing arbitrary (not yet implemented) commands, [CustomCommand](crate::commands::custom)
/// may be used. As alternative you can create new commands by implementing the [Command](crate::commands::Command) trait.
pub mod commands;

/// # Connection and Client logic
///
/// ## Pipeline
///
/// Every connection owns one [Pipeline](crate::network::Pipeline). Requests are registered in
/// issue order and replies are matched strictly by position, so any number of commands may be
/// in flight. Pub/Sub frames are diverted to the [event sinks](crate::network::EventSinks)
/// before matching.
///
/// ## Connection handling
///
/// Redis connection is managed by [ConnectionHandler](crate::network::ConnectionHandler).
/// Both [RESP2](https://redis.io/docs/reference/protocol-spec/) and [RESP3](https://github.com/antirez/RESP3/blob/master/spec.md) protocol
/// are supported.
///
/// Creating a new connection requires the following two things:
/// * A network stack implementing [embedded-nal](<https://docs.rs/embedded-nal/latest/embedded_nal/>)
/// * A clock implementing [embedded-time](<https://docs.rs/embedded-time/latest/embedded_time/>). Optional if no Timeout is configured.
/// ```ignore
/// // RESP2 protocol
/// let mut connection_handler = ConnectionHandler::resp2(SocketAddr::from_str("127.0.0.1:6379").unwrap());
/// let _client = connection_handler.connect(&mut network_stack, Some(&clock)).unwrap();
///
/// // RESP3 protocol
/// let mut connection_handler = ConnectionHandler::resp3(SocketAddr::from_str("127.0.0.1:6379").unwrap());
/// let _client = connection_handler.connect(&mut network_stack, Some(&clock)).unwrap();
/// ```
///
/// ConnectionHandler is caching the connection, so later recreation of new Clients is cheap.
///
/// ### Initialization
///
/// ```ignore
/// let mut connection_handler = ConnectionHandler::resp3(server_address);
/// connection_handler
///     .auth(Credentials::acl("user01", "secret123!"))
///     .timeout(500_000.microseconds());
///
/// // SELECT 2 after authentication
/// connection_handler.database(2);
///
/// // Test cached connections by PING before reuse
/// connection_handler.use_ping();
/// ```
///
/// ## Non-blocking response management
///
/// Redis server responses are managed as [Future](crate::network::Future). This allows executing multiple commands non-blocking
/// simultaneously and handle responses in any order at any point in time:
/// ```ignore
/// let future1 = client.set("key", "value").unwrap();
/// let future2 = client.set("other", "key").unwrap();
///
/// let _ = future2.wait();
/// let _ = future1.wait();
/// ```
///
/// ### Ready
/// In order to check whether a future is ready, (the corresponding response has arrived),
/// the method `ready()` can be used.
/// If `ready()` returns true, then next call to `wait()` is not expected to block.
///
/// ### Callbacks
/// As alternative to futures, [send_with](crate::network::Client::send_with) registers a
/// callback, which is invoked by [poll](crate::network::Client::poll) or while waiting on any
/// other future of the connection.
///
/// ### Timeout error
///
/// A timeout only ends the wait of the affected future. The request stays queued, so its late
/// reply is consumed in order and all other futures remain valid.
pub mod network;

pub mod subscribe;
pub mod transaction;
pub mod value;
