//! Abstraction of GET command.
//!
//! For general information about this command, see the [Redis documentation](<https://redis.io/commands/get/>).
//!
//! # Basic usage
//! In case of existing key [`Some(GetResponse)`](GetResponse) is returned.
//! ```
//! use resp_pipeline::commands::get::GetCommand;
//! use resp_pipeline::commands::Command;
//! use resp_pipeline::value::ReplyValue;
//!
//! let command = GetCommand::static_key("test_key");
//! let response = command.eval_response(ReplyValue::bulk("test_value")).unwrap().unwrap();
//! assert_eq!("test_value", response.as_str().unwrap())
//! ```
//! # Missing key (NIL/NULL response)
//! In case of missing key `None` is returned
//! ```
//!# use resp_pipeline::commands::get::GetCommand;
//!# use resp_pipeline::commands::Command;
//!# use resp_pipeline::value::ReplyValue;
//!#
//! let command = GetCommand::static_key("missing_key");
//! let response = command.eval_response(ReplyValue::BulkString(None)).unwrap();
//! assert!(response.is_none())
//! ```
//! # Using Bytes
//! For best performance (instead of &str or String cloning), especially with large amounts of data, it is recommended to use [Bytes](<https://docs.rs/bytes/latest/bytes/>).
//! ```
//!# use bytes::Bytes;
//!# use resp_pipeline::commands::get::GetCommand;
//!#
//! // Using Bytes object as key
//! let _command = GetCommand::new(Bytes::from_static("large_key".as_bytes()));
//! ```
//! # Shorthand
//! [Client](crate::network::Client#method.get) provides a shorthand method for this command.
use crate::commands::builder::CommandBuilder;
use crate::commands::Command;
use crate::network::{Client, CommandErrors, Future, Protocol, Transport};
use crate::value::{ReplyValue, TypeMismatch};
use alloc::string::String;
use bytes::Bytes;
use embedded_time::Clock;

///Abstraction of GET command.
#[derive(Clone, Debug)]
pub struct GetCommand {
    key: Bytes,
}

impl GetCommand {
    pub fn new<K>(key: K) -> Self
    where
        Bytes: From<K>,
    {
        GetCommand { key: key.into() }
    }

    /// Create from static key
    pub fn static_key(key: &'static str) -> Self {
        Self {
            key: Bytes::from_static(key.as_bytes()),
        }
    }
}

///Abstraction of GET response
#[derive(Clone, Debug, PartialEq)]
pub struct GetResponse {
    inner: Bytes,
}

impl GetResponse {
    pub fn new(inner: Bytes) -> Self {
        GetResponse { inner }
    }

    /// Extracts inner value
    pub fn to_bytes(self) -> Bytes {
        self.inner
    }

    /// Tries converting to String by copy, returns None in case of error (wrong UTF8 encoding)
    pub fn as_string(&self) -> Option<String> {
        String::from_utf8(self.inner.to_vec()).ok()
    }

    /// Returns a &str to inner data, returns None in case of invalid UTF8 encoding
    pub fn as_str(&self) -> Option<&str> {
        core::str::from_utf8(self.inner.as_ref()).ok()
    }
}

impl Command for GetCommand {
    type Response = Option<GetResponse>;

    fn encode(&self) -> CommandBuilder {
        CommandBuilder::new("GET").arg(&self.key)
    }

    fn eval_response(&self, reply: ReplyValue) -> Result<Self::Response, TypeMismatch> {
        match reply {
            ReplyValue::BulkString(Some(data)) => Ok(Some(GetResponse::new(data))),
            reply if reply.is_nil() => Ok(None),
            other => Err(TypeMismatch::new("bulk string", &other)),
        }
    }
}

impl<T: Transport, C: Clock, P: Protocol> Client<'_, T, C, P> {
    /// Shorthand for [GetCommand]
    pub fn get<K>(&self, key: K) -> Result<Future<'_, T, C, P, GetCommand>, CommandErrors>
    where
        Bytes: From<K>,
    {
        self.send(GetCommand::new(key))
    }
}
