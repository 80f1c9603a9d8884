use crate::commands::subscribe::{SubscribeCommand, UnsubscribeCommand};
use crate::network::{Client, CommandErrors, Protocol, Transport};
use crate::subscribe::SubscriptionKind;
use alloc::collections::VecDeque;
use alloc::rc::Rc;
use alloc::vec::Vec;
use bytes::Bytes;
use core::cell::RefCell;
use core::fmt::{Debug, Formatter};
use embedded_time::Clock;
use tracing::debug;

/// Subscription errors
#[derive(Debug, Eq, PartialEq, Clone, thiserror::Error)]
pub enum Error {
    /// Error while sending (P)SUBSCRIBE or (P)UNSUBSCRIBE command
    #[error("subscription command failed: {0}")]
    CommandError(CommandErrors),
    /// Upstream time error
    #[error("clock error")]
    ClockError,
    /// Network error receiving or sending data
    #[error("network error")]
    TcpError,
    /// Connection was closed
    #[error("connection closed")]
    ConnectionClosed,
    /// Subscription or Unsubscription was not confirmed by Redis within time limit. Its recommended to close/reconnect the socket to avoid
    /// subsequent errors based on invalid state.
    #[error("subscription not confirmed within timeout")]
    Timeout,
}

impl From<CommandErrors> for Error {
    fn from(error: CommandErrors) -> Self {
        match error {
            CommandErrors::Timeout => Error::Timeout,
            CommandErrors::TimerError => Error::ClockError,
            CommandErrors::TcpError => Error::TcpError,
            CommandErrors::ConnectionClosed => Error::ConnectionClosed,
            other => Error::CommandError(other),
        }
    }
}

/// A published subscription message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// The channel the message has been published to
    pub channel: Bytes,

    /// The actual payload
    pub payload: Bytes,

    /// Matching pattern, if received by pattern subscription
    pub pattern: Option<Bytes>,
}

type Inbox = Rc<RefCell<VecDeque<Message>>>;

/// Client for handling subscriptions
///
/// The subscription owns the message sinks of the connection. So there should be only one
/// subscription per connection at a time.
pub struct Subscription<'a, T: Transport, C: Clock, P: Protocol> {
    client: Client<'a, T, C, P>,

    /// Subscribed channels
    channels: Vec<Bytes>,

    /// Subscribed patterns
    patterns: Vec<Bytes>,

    /// Messages received but not yet consumed by receive()
    inbox: Inbox,

    /// Confirmed + active subscription
    subscribed: bool,
}

impl<'a, T: Transport, C: Clock, P: Protocol> Client<'a, T, C, P> {
    /// Subscribes to the given channels and waits for confirmation
    pub fn subscribe<I, B>(self, channels: I) -> Result<Subscription<'a, T, C, P>, Error>
    where
        I: IntoIterator<Item = B>,
        Bytes: From<B>,
    {
        Subscription::new(self).start(SubscribeCommand::channels(channels))
    }

    /// Subscribes to the given glob-style patterns and waits for confirmation
    pub fn psubscribe<I, B>(self, patterns: I) -> Result<Subscription<'a, T, C, P>, Error>
    where
        I: IntoIterator<Item = B>,
        Bytes: From<B>,
    {
        Subscription::new(self).start(SubscribeCommand::patterns(patterns))
    }
}

impl<'a, T: Transport, C: Clock, P: Protocol> Subscription<'a, T, C, P> {
    /// Installs the message sinks
    fn new(client: Client<'a, T, C, P>) -> Self {
        let inbox = Inbox::default();

        let channel_inbox = inbox.clone();
        let pattern_inbox = inbox.clone();
        client
            .sinks()
            .on_message(move |channel, payload| {
                channel_inbox.borrow_mut().push_back(Message {
                    channel,
                    payload,
                    pattern: None,
                })
            })
            .on_pattern_message(move |pattern, channel, payload| {
                pattern_inbox.borrow_mut().push_back(Message {
                    channel,
                    payload,
                    pattern: Some(pattern),
                })
            });

        Self {
            client,
            channels: Vec::new(),
            patterns: Vec::new(),
            inbox,
            subscribed: false,
        }
    }

    /// Sends the subscription and waits for all acknowledgements
    fn start(mut self, command: SubscribeCommand) -> Result<Self, Error> {
        let kind = command.kind();
        let names = command.names().to_vec();

        let ack = match self.client.send(command).and_then(|future| future.wait()) {
            Ok(ack) => ack,
            Err(error) => {
                self.client.sinks().clear_pubsub();
                return Err(error.into());
            }
        };
        debug!(?kind, count = names.len(), remaining = ack.remaining, "Subscription confirmed");

        match kind {
            SubscriptionKind::Channel => self.channels = names,
            SubscriptionKind::Pattern => self.patterns = names,
        }

        self.subscribed = true;
        Ok(self)
    }

    /// Receives a message. Returns None in case no message is pending
    pub fn receive(&mut self) -> Result<Option<Message>, Error> {
        if let Some(message) = self.take_message() {
            return Ok(Some(message));
        }

        self.client.poll()?;
        Ok(self.take_message())
    }

    /// Unsubscribes from all channels and patterns and waits for confirmation
    ///
    /// *If this fails, it's recommended to close the connection to avoid subsequent errors caused by invalid state*
    pub fn unsubscribe(mut self) -> Result<(), Error> {
        self.close()
    }

    /// Channels subscribed by this client
    pub fn channels(&self) -> &[Bytes] {
        &self.channels
    }

    /// Patterns subscribed by this client
    pub fn patterns(&self) -> &[Bytes] {
        &self.patterns
    }

    /// Returns true while the subscription is confirmed and active
    pub fn is_subscribed(&self) -> bool {
        self.subscribed
    }

    /// Underlying client, e.g. for checking the subscription registry
    pub fn client(&self) -> &Client<'a, T, C, P> {
        &self.client
    }

    fn take_message(&self) -> Option<Message> {
        self.inbox.borrow_mut().pop_front()
    }

    /// Unsubscribes from all channels and patterns and waits for confirmation
    fn close(&mut self) -> Result<(), Error> {
        self.subscribed = false;
        let result = self.cancel();

        self.client.sinks().clear_pubsub();
        result
    }

    fn cancel(&mut self) -> Result<(), Error> {
        if !self.channels.is_empty() {
            let channels = core::mem::take(&mut self.channels);
            self.client.send(UnsubscribeCommand::channels(channels))?.wait()?;
        }

        if !self.patterns.is_empty() {
            let patterns = core::mem::take(&mut self.patterns);
            self.client.send(UnsubscribeCommand::patterns(patterns))?.wait()?;
        }

        debug!("Unsubscribed");
        Ok(())
    }

    /// Prevents the automatic unsubscription when client is dropped
    #[cfg(test)]
    pub(crate) fn set_unsubscribed(&mut self) {
        self.subscribed = false;
    }
}

impl<T: Transport, C: Clock, P: Protocol> Drop for Subscription<'_, T, C, P> {
    fn drop(&mut self) {
        if self.subscribed {
            let _ = self.close();
        }
    }
}

impl<T: Transport, C: Clock, P: Protocol> Debug for Subscription<'_, T, C, P> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Subscription")
            .field("channels", &self.channels)
            .field("patterns", &self.patterns)
            .field("pending_messages", &self.inbox.borrow().len())
            .field("subscribed", &self.subscribed)
            .finish()
    }
}
