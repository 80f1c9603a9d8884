pub use client::{Client, CommandErrors};
pub use encoder::{encode, encode_into};
pub use future::Future;
pub use handler::{ConnectionError, ConnectionHandler, Credentials, NalClient, RedisConnectionHandler};
pub use parser::{ParserLimits, ProtocolError, ReplyParser};
pub use pending::{CompletionSink, ExpectedAcks, PendingRequest, RawResult, RequestKind, ResponseSlot};
pub use pipeline::{Delivery, Pipeline, Session};
pub use protocol::{Protocol, Resp2, Resp3};
pub use sinks::{Event, EventSinks};
pub use timeout::TimeoutError;
pub use transport::{NalTransport, Transport, TransportError};

pub(crate) mod client;
pub(crate) mod encoder;
pub(crate) mod future;
pub(crate) mod handler;
pub(crate) mod parser;
pub(crate) mod pending;
pub(crate) mod pipeline;
pub(crate) mod protocol;
pub(crate) mod sinks;
pub(crate) mod timeout;
pub(crate) mod transport;

#[cfg(any(test, feature = "mock"))]
pub mod tests;
