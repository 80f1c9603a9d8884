use crate::subscribe::SubscriptionKind;
use crate::value::ReplyValue;
use bytes::Bytes;

/// Direction of a subscription acknowledgement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckAction {
    Subscribe,
    Unsubscribe,
}

/// Confirmation of a (P)(UN)SUBSCRIBE command, one per channel/pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionAck {
    pub action: AckAction,
    pub kind: SubscriptionKind,

    /// Affected channel or pattern. None signals an empty or failed (un)subscription.
    pub channel: Option<Bytes>,

    /// Number of channels + patterns the connection is still subscribed to
    pub remaining: usize,
}

/// A decoded pub/sub frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushMessage {
    /// Message published to a subscribed channel
    Message { channel: Bytes, payload: Bytes },
    /// Message matched by a pattern subscription
    PatternMessage {
        pattern: Bytes,
        channel: Bytes,
        payload: Bytes,
    },
    Ack(SubscriptionAck),
}

/// Errors related for decoding push messages
#[derive(Debug, PartialEq, Eq)]
pub enum DecodeError {
    /// The given value is neither an array nor a push frame
    NoPushMessage,
    /// Unknown message type tag
    UnknownType,
    /// Known type tag, but invalid element count or element types
    ProtocolViolation,
    /// The given channel count overflows usize
    IntegerOverflow,
}

/// Classifies a top-level reply as pub/sub frame
///
/// Returns None for everything which is not a well-formed pub/sub frame. Such replies are regular
/// data and must be handed to the pending request queue.
pub fn classify(value: &ReplyValue) -> Option<PushMessage> {
    Decoder::new(value).decode().ok()
}

/// Generic push message decoder for RESP2 arrays + RESP3 push frames
struct Decoder<'a> {
    value: &'a ReplyValue,
}

impl<'a> Decoder<'a> {
    pub fn new(value: &'a ReplyValue) -> Self {
        Self { value }
    }

    pub fn decode(self) -> Result<PushMessage, DecodeError> {
        let data = match self.value {
            ReplyValue::Array(data) | ReplyValue::Push(data) => data,
            _ => return Err(DecodeError::NoPushMessage),
        };

        let tag = data.first().ok_or(DecodeError::UnknownType)?;
        match tag_bytes(tag)? {
            b"message" => self.decode_message(data),
            b"pmessage" => self.decode_pattern_message(data),
            b"subscribe" => self.decode_ack(data, AckAction::Subscribe, SubscriptionKind::Channel),
            b"unsubscribe" => self.decode_ack(data, AckAction::Unsubscribe, SubscriptionKind::Channel),
            b"psubscribe" => self.decode_ack(data, AckAction::Subscribe, SubscriptionKind::Pattern),
            b"punsubscribe" => self.decode_ack(data, AckAction::Unsubscribe, SubscriptionKind::Pattern),
            _ => Err(DecodeError::UnknownType),
        }
    }

    /// Decodes and validates a "message" frame
    fn decode_message(&self, data: &[ReplyValue]) -> Result<PushMessage, DecodeError> {
        if data.len() != 3 {
            return Err(DecodeError::ProtocolViolation);
        }

        Ok(PushMessage::Message {
            channel: byte_string(&data[1])?,
            payload: byte_string(&data[2])?,
        })
    }

    /// Decodes and validates a "pmessage" frame
    fn decode_pattern_message(&self, data: &[ReplyValue]) -> Result<PushMessage, DecodeError> {
        if data.len() != 4 {
            return Err(DecodeError::ProtocolViolation);
        }

        Ok(PushMessage::PatternMessage {
            pattern: byte_string(&data[1])?,
            channel: byte_string(&data[2])?,
            payload: byte_string(&data[3])?,
        })
    }

    /// Decodes and validates a (p)(un)subscribe confirmation
    fn decode_ack(
        &self,
        data: &[ReplyValue],
        action: AckAction,
        kind: SubscriptionKind,
    ) -> Result<PushMessage, DecodeError> {
        if data.len() != 3 {
            return Err(DecodeError::ProtocolViolation);
        }

        let channel = match &data[1] {
            value if value.is_nil() => None,
            value => Some(byte_string(value)?),
        };

        let remaining = match &data[2] {
            ReplyValue::Integer(count) => cast_channel_count(*count)?,
            _ => return Err(DecodeError::ProtocolViolation),
        };

        Ok(PushMessage::Ack(SubscriptionAck {
            action,
            kind,
            channel,
            remaining,
        }))
    }
}

/// Type tags are compared case-sensitive
fn tag_bytes(value: &ReplyValue) -> Result<&[u8], DecodeError> {
    match value {
        ReplyValue::SimpleString(data) => Ok(data.as_bytes()),
        ReplyValue::BulkString(Some(data)) => Ok(data.as_ref()),
        _ => Err(DecodeError::UnknownType),
    }
}

fn byte_string(value: &ReplyValue) -> Result<Bytes, DecodeError> {
    match value {
        ReplyValue::BulkString(Some(data)) => Ok(data.clone()),
        ReplyValue::SimpleString(data) => Ok(Bytes::copy_from_slice(data.as_bytes())),
        _ => Err(DecodeError::ProtocolViolation),
    }
}

/// Safe casting of channel count
fn cast_channel_count(count: i64) -> Result<usize, DecodeError> {
    if count.is_negative() {
        return Err(DecodeError::ProtocolViolation);
    }

    usize::try_from(count).map_err(|_| DecodeError::IntegerOverflow)
}
