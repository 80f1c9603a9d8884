use crate::network::client::CommandErrors;
use crate::subscribe::messages::{PushMessage, SubscriptionAck};
use crate::value::ReplyValue;
use alloc::boxed::Box;
use bytes::Bytes;
use core::fmt::{Debug, Formatter};

/// Connection event not bound to a pending request
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Pub/Sub message or subscription acknowledgement
    PubSub(PushMessage),
    /// RESP3 push frame unrelated to Pub/Sub, or a reply received while no request was pending
    Push(ReplyValue),
    /// Connection was closed. All pending requests have been failed already.
    Disconnected,
    /// Fatal connection error, followed by [Event::Disconnected]
    Error(CommandErrors),
}

type MessageSink = Box<dyn FnMut(Bytes, Bytes)>;
type PatternMessageSink = Box<dyn FnMut(Bytes, Bytes, Bytes)>;
type AckSink = Box<dyn FnMut(&SubscriptionAck)>;
type PushSink = Box<dyn FnMut(ReplyValue)>;
type DisconnectSink = Box<dyn FnMut()>;
type ErrorSink = Box<dyn FnMut(&CommandErrors)>;

/// Receivers of connection events
///
/// Every sink is always present and defaults to a no-op. Installing a sink replaces the previous one.
/// ```
/// use resp_pipeline::network::EventSinks;
///
/// let mut sinks = EventSinks::default();
/// sinks
///     .on_message(|channel, payload| {
///         let _ = (channel, payload);
///     })
///     .on_disconnect(|| {});
/// ```
pub struct EventSinks {
    message: MessageSink,
    pattern_message: PatternMessageSink,
    subscription: AckSink,
    push: PushSink,
    disconnect: DisconnectSink,
    error: ErrorSink,
}

impl EventSinks {
    /// Receives (channel, payload) of plain messages
    pub fn on_message<F: FnMut(Bytes, Bytes) + 'static>(&mut self, sink: F) -> &mut Self {
        self.message = Box::new(sink);
        self
    }

    /// Receives (pattern, channel, payload) of pattern messages
    pub fn on_pattern_message<F: FnMut(Bytes, Bytes, Bytes) + 'static>(&mut self, sink: F) -> &mut Self {
        self.pattern_message = Box::new(sink);
        self
    }

    /// Receives subscription acknowledgements
    pub fn on_subscription<F: FnMut(&SubscriptionAck) + 'static>(&mut self, sink: F) -> &mut Self {
        self.subscription = Box::new(sink);
        self
    }

    /// Receives non Pub/Sub push frames and unsolicited replies
    pub fn on_push<F: FnMut(ReplyValue) + 'static>(&mut self, sink: F) -> &mut Self {
        self.push = Box::new(sink);
        self
    }

    pub fn on_disconnect<F: FnMut() + 'static>(&mut self, sink: F) -> &mut Self {
        self.disconnect = Box::new(sink);
        self
    }

    pub fn on_error<F: FnMut(&CommandErrors) + 'static>(&mut self, sink: F) -> &mut Self {
        self.error = Box::new(sink);
        self
    }

    /// Resets the message and ack sinks to no-ops
    pub fn clear_pubsub(&mut self) {
        self.message = Box::new(|_, _| {});
        self.pattern_message = Box::new(|_, _, _| {});
        self.subscription = Box::new(|_| {});
    }

    /// Hands the event to the matching sink
    pub fn dispatch(&mut self, event: Event) {
        match event {
            Event::PubSub(PushMessage::Message { channel, payload }) => (self.message)(channel, payload),
            Event::PubSub(PushMessage::PatternMessage {
                pattern,
                channel,
                payload,
            }) => (self.pattern_message)(pattern, channel, payload),
            Event::PubSub(PushMessage::Ack(ack)) => (self.subscription)(&ack),
            Event::Push(value) => (self.push)(value),
            Event::Disconnected => (self.disconnect)(),
            Event::Error(error) => (self.error)(&error),
        }
    }
}

impl Default for EventSinks {
    fn default() -> Self {
        Self {
            message: Box::new(|_, _| {}),
            pattern_message: Box::new(|_, _, _| {}),
            subscription: Box::new(|_| {}),
            push: Box::new(|_| {}),
            disconnect: Box::new(|| {}),
            error: Box::new(|_| {}),
        }
    }
}

impl Debug for EventSinks {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EventSinks").finish_non_exhaustive()
    }
}
