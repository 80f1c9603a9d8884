use crate::subscribe::messages::{AckAction, SubscriptionAck};
use crate::subscribe::SubscriptionKind;
use alloc::collections::BTreeSet;
use bytes::Bytes;
use tracing::debug;

/// Active channel and pattern subscriptions of one connection
///
/// Only changed by subscription acknowledgements, so it always reflects what the server confirmed.
#[derive(Debug, Default, Clone)]
pub struct SubscriptionRegistry {
    channels: BTreeSet<Bytes>,
    patterns: BTreeSet<Bytes>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a confirmation received from the server
    pub fn apply(&mut self, ack: &SubscriptionAck) {
        if let Some(channel) = &ack.channel {
            let set = self.set_mut(ack.kind);
            match ack.action {
                AckAction::Subscribe => set.insert(channel.clone()),
                AckAction::Unsubscribe => set.remove(channel),
            };
        }

        // Server side count covers channels and patterns
        if ack.remaining == 0 {
            self.clear();
        }

        debug!(
            channels = self.channels.len(),
            patterns = self.patterns.len(),
            "Subscriptions changed"
        );
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty() && self.patterns.is_empty()
    }

    pub fn is_subscribed(&self, kind: SubscriptionKind, name: &[u8]) -> bool {
        self.set(kind).contains(name)
    }

    /// Number of subscriptions of the given kind
    pub fn count(&self, kind: SubscriptionKind) -> usize {
        self.set(kind).len()
    }

    pub fn channels(&self) -> impl Iterator<Item = &Bytes> {
        self.channels.iter()
    }

    pub fn patterns(&self) -> impl Iterator<Item = &Bytes> {
        self.patterns.iter()
    }

    pub fn clear(&mut self) {
        self.channels.clear();
        self.patterns.clear();
    }

    fn set(&self, kind: SubscriptionKind) -> &BTreeSet<Bytes> {
        match kind {
            SubscriptionKind::Channel => &self.channels,
            SubscriptionKind::Pattern => &self.patterns,
        }
    }

    fn set_mut(&mut self, kind: SubscriptionKind) -> &mut BTreeSet<Bytes> {
        match kind {
            SubscriptionKind::Channel => &mut self.channels,
            SubscriptionKind::Pattern => &mut self.patterns,
        }
    }
}
