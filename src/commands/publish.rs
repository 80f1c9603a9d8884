//! Abstraction of PUBLISH command.
//!
//! For general information about this command, see the [Redis documentation](<https://redis.io/commands/publish/>).
//!
//! # Using command object
//! ```
//! use resp_pipeline::commands::publish::PublishCommand;
//! use resp_pipeline::commands::Command;
//! use resp_pipeline::value::ReplyValue;
//!
//! let command = PublishCommand::new("channel", "message");
//!
//! // Returns the number of clients that received the message
//! assert_eq!(0, command.eval_response(ReplyValue::Integer(0)).unwrap());
//! ```
//! # Shorthand
//! [Client](crate::network::Client#method.publish) provides a shorthand method.
use crate::commands::builder::CommandBuilder;
use crate::commands::Command;
use crate::network::{Client, CommandErrors, Future, Protocol, Transport};
use crate::value::{FromReply, ReplyValue, TypeMismatch};
use bytes::Bytes;
use embedded_time::Clock;

/// Abstraction for PUBLISH command
#[derive(Clone, Debug)]
pub struct PublishCommand {
    channel: Bytes,
    message: Bytes,
}

impl PublishCommand {
    pub fn new<C, M>(channel: C, message: M) -> Self
    where
        Bytes: From<C>,
        Bytes: From<M>,
    {
        PublishCommand {
            channel: channel.into(),
            message: message.into(),
        }
    }
}

impl Command for PublishCommand {
    /// the number of clients that received the message
    type Response = i64;

    fn encode(&self) -> CommandBuilder {
        CommandBuilder::new("PUBLISH").arg(&self.channel).arg(&self.message)
    }

    fn eval_response(&self, reply: ReplyValue) -> Result<Self::Response, TypeMismatch> {
        i64::from_reply(reply)
    }
}

impl<T: Transport, C: Clock, P: Protocol> Client<'_, T, C, P> {
    /// Shorthand for [PublishCommand]
    pub fn publish<K, V>(&self, channel: K, message: V) -> Result<Future<'_, T, C, P, PublishCommand>, CommandErrors>
    where
        Bytes: From<K>,
        Bytes: From<V>,
    {
        self.send(PublishCommand::new(channel, message))
    }
}
