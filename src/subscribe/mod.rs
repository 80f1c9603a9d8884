//! # Subscription client
//!
//! Supports subscribing to channels and patterns. (s. [Redis Pub/Sub](https://redis.io/docs/manual/pubsub/)).
//!
//! A regular client can be turned to a [Subscription] by [Client::subscribe](crate::network::Client::subscribe)
//! or [Client::psubscribe](crate::network::Client::psubscribe):
//! ```ignore
//! let mut subscription = connection_handler
//!     .connect(&mut stack, Some(&clock))?
//!     .subscribe(["first_channel", "second_channel"])?;
//!
//! loop {
//!     if let Some(message) = subscription.receive()? {
//!         // message.channel, message.payload
//!         break;
//!     }
//! }
//!
//! subscription.unsubscribe()?;
//! ```
//! If the subscription fails, it's recommended to close the connection, as the state of the
//! connection is undefined.
//!
//! *Note: `unsubscribe()` is called automatically when the subscription is dropped*
//!
//! ## Routing
//! Incoming frames are classified by their type tag, see [classify](messages::classify).
//! Published messages are handed to the [event sinks](crate::network::EventSinks), acknowledgements
//! update the [SubscriptionRegistry](registry::SubscriptionRegistry) and answer the pending
//! (P)(UN)SUBSCRIBE command.
pub use client::{Error, Message, Subscription};

pub(crate) mod client;
pub mod messages;
pub mod registry;

#[cfg(test)]
mod tests;

/// Plain channel or glob-style pattern subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubscriptionKind {
    Channel,
    Pattern,
}
