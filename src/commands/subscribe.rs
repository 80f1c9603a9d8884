//! Abstraction of SUBSCRIBE, UNSUBSCRIBE, PSUBSCRIBE and PUNSUBSCRIBE commands.
//!
//! For general information about these commands, see the [Redis documentation](<https://redis.io/docs/manual/pubsub/>).
//!
//! The server confirms each channel or pattern with a separate acknowledgement. A command completes
//! with its last acknowledgement, every acknowledgement is also reported to the
//! [subscription sink](crate::network::EventSinks::on_subscription).
//! ```
//! use resp_pipeline::commands::subscribe::SubscribeCommand;
//! use resp_pipeline::commands::Command;
//! use resp_pipeline::value::ReplyValue;
//!
//! let command = SubscribeCommand::channels(["news", "weather"]);
//! assert_eq!(2, command.encode().argument_count());
//!
//! let ack = ReplyValue::Array(vec![
//!     ReplyValue::bulk("subscribe"),
//!     ReplyValue::bulk("weather"),
//!     ReplyValue::Integer(2),
//! ]);
//! assert_eq!(2, command.eval_response(ack).unwrap().remaining);
//! ```
//!
//! For receiving messages the [Subscription client](crate::subscribe) is more convenient.
use crate::commands::builder::CommandBuilder;
use crate::commands::Command;
use crate::subscribe::messages::{classify, AckAction, PushMessage, SubscriptionAck};
use crate::subscribe::SubscriptionKind;
use crate::value::{ReplyValue, TypeMismatch};
use alloc::vec::Vec;
use bytes::Bytes;

/// Abstraction of SUBSCRIBE and PSUBSCRIBE commands
#[derive(Clone, Debug)]
pub struct SubscribeCommand {
    kind: SubscriptionKind,
    names: Vec<Bytes>,
}

impl SubscribeCommand {
    /// SUBSCRIBE command for the given channels
    pub fn channels<I, B>(channels: I) -> Self
    where
        I: IntoIterator<Item = B>,
        Bytes: From<B>,
    {
        Self::new(SubscriptionKind::Channel, channels)
    }

    /// PSUBSCRIBE command for the given glob-style patterns
    pub fn patterns<I, B>(patterns: I) -> Self
    where
        I: IntoIterator<Item = B>,
        Bytes: From<B>,
    {
        Self::new(SubscriptionKind::Pattern, patterns)
    }

    fn new<I, B>(kind: SubscriptionKind, names: I) -> Self
    where
        I: IntoIterator<Item = B>,
        Bytes: From<B>,
    {
        Self {
            kind,
            names: names.into_iter().map(Bytes::from).collect(),
        }
    }

    pub fn kind(&self) -> SubscriptionKind {
        self.kind
    }

    pub fn names(&self) -> &[Bytes] {
        &self.names
    }
}

impl Command for SubscribeCommand {
    /// Last acknowledgement
    type Response = SubscriptionAck;

    fn encode(&self) -> CommandBuilder {
        let keyword = match self.kind {
            SubscriptionKind::Channel => "SUBSCRIBE",
            SubscriptionKind::Pattern => "PSUBSCRIBE",
        };

        with_names(CommandBuilder::new(keyword), &self.names)
    }

    fn eval_response(&self, reply: ReplyValue) -> Result<Self::Response, TypeMismatch> {
        expect_ack(reply, AckAction::Subscribe, self.kind)
    }
}

/// Abstraction of UNSUBSCRIBE and PUNSUBSCRIBE commands
///
/// Without names, all subscriptions of the kind are cancelled.
#[derive(Clone, Debug)]
pub struct UnsubscribeCommand {
    kind: SubscriptionKind,
    names: Vec<Bytes>,
}

impl UnsubscribeCommand {
    /// UNSUBSCRIBE command for the given channels
    pub fn channels<I, B>(channels: I) -> Self
    where
        I: IntoIterator<Item = B>,
        Bytes: From<B>,
    {
        Self::new(SubscriptionKind::Channel, channels)
    }

    /// PUNSUBSCRIBE command for the given patterns
    pub fn patterns<I, B>(patterns: I) -> Self
    where
        I: IntoIterator<Item = B>,
        Bytes: From<B>,
    {
        Self::new(SubscriptionKind::Pattern, patterns)
    }

    /// Cancels all subscriptions of the given kind
    pub fn all(kind: SubscriptionKind) -> Self {
        Self {
            kind,
            names: Vec::new(),
        }
    }

    fn new<I, B>(kind: SubscriptionKind, names: I) -> Self
    where
        I: IntoIterator<Item = B>,
        Bytes: From<B>,
    {
        Self {
            kind,
            names: names.into_iter().map(Bytes::from).collect(),
        }
    }
}

impl Command for UnsubscribeCommand {
    /// Last acknowledgement
    type Response = SubscriptionAck;

    fn encode(&self) -> CommandBuilder {
        let keyword = match self.kind {
            SubscriptionKind::Channel => "UNSUBSCRIBE",
            SubscriptionKind::Pattern => "PUNSUBSCRIBE",
        };

        with_names(CommandBuilder::new(keyword), &self.names)
    }

    fn eval_response(&self, reply: ReplyValue) -> Result<Self::Response, TypeMismatch> {
        expect_ack(reply, AckAction::Unsubscribe, self.kind)
    }
}

fn with_names(builder: CommandBuilder, names: &[Bytes]) -> CommandBuilder {
    names.iter().fold(builder, |builder, name| builder.arg(name))
}

fn expect_ack(reply: ReplyValue, action: AckAction, kind: SubscriptionKind) -> Result<SubscriptionAck, TypeMismatch> {
    match classify(&reply) {
        Some(PushMessage::Ack(ack)) if ack.action == action && ack.kind == kind => Ok(ack),
        _ => Err(TypeMismatch::new("subscription acknowledgement", &reply)),
    }
}
