//! Abstraction of PING command.
//!
//! For general information about this command, see the [Redis documentation](<https://redis.io/commands/ping/>).
//!
//! Used by [ConnectionHandler](crate::network::ConnectionHandler#method.use_ping) for testing
//! cached connections.
//! ```
//! use resp_pipeline::commands::ping::PingCommand;
//! use resp_pipeline::commands::Command;
//! use resp_pipeline::value::ReplyValue;
//!
//! let command = PingCommand::new(None);
//! assert!(command.eval_response(ReplyValue::simple("PONG")).is_ok());
//! ```
use crate::commands::builder::CommandBuilder;
use crate::commands::Command;
use crate::network::{Client, CommandErrors, Future, Protocol, Transport};
use crate::value::{ReplyValue, TypeMismatch};
use bytes::Bytes;
use embedded_time::Clock;

/// Abstraction for PING command
#[derive(Clone, Debug)]
pub struct PingCommand {
    argument: Option<Bytes>,
}

impl PingCommand {
    pub fn new(argument: Option<Bytes>) -> Self {
        PingCommand { argument }
    }
}

static PONG: Bytes = Bytes::from_static(b"PONG");

impl Command for PingCommand {
    type Response = ();

    fn encode(&self) -> CommandBuilder {
        CommandBuilder::new("PING").arg_option(self.argument.as_ref())
    }

    fn eval_response(&self, reply: ReplyValue) -> Result<Self::Response, TypeMismatch> {
        let expected = self.argument.as_ref().unwrap_or(&PONG);

        let echoed = match &reply {
            // RESP2 connections in subscriber mode answer with ["pong", argument]
            ReplyValue::Array(elements) if elements.len() == 2 => match elements[1].as_bytes() {
                Some(data) if data.is_empty() && self.argument.is_none() => PONG.as_ref(),
                Some(data) => data,
                None => return Err(TypeMismatch::new("PONG", &reply)),
            },
            other => other.as_bytes().ok_or(TypeMismatch::new("PONG", &reply))?,
        };

        if echoed != expected.as_ref() {
            return Err(TypeMismatch::new("PONG", &reply));
        }

        Ok(())
    }
}

impl<T: Transport, C: Clock, P: Protocol> Client<'_, T, C, P> {
    /// Shorthand for [PingCommand]
    pub fn ping(&self) -> Result<Future<'_, T, C, P, PingCommand>, CommandErrors> {
        self.send(PingCommand::new(None))
    }
}
