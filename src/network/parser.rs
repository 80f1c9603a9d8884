use crate::value::{parse_float, ReplyValue};
use alloc::string::String;
use alloc::vec::Vec;
use bytes::{Buf, Bytes, BytesMut};
use tracing::warn;

/// Upper bounds protecting the client against malformed or hostile replies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserLimits {
    /// Max. size of a single reply in bytes. Also caps declared bulk lengths and aggregate counts.
    pub max_frame_size: usize,

    /// Max. nesting level of aggregate replies
    pub max_depth: usize,
}

impl Default for ParserLimits {
    fn default() -> Self {
        Self {
            max_frame_size: 512 * 1024 * 1024,
            max_depth: 128,
        }
    }
}

/// Malformed reply data. The stream can not be resynchronized after this.
#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum ProtocolError {
    #[error("invalid type marker 0x{0:02x}")]
    InvalidTypeMarker(u8),
    #[error("invalid length field")]
    InvalidLength,
    #[error("invalid integer")]
    InvalidInteger,
    #[error("invalid double")]
    InvalidDouble,
    #[error("invalid boolean")]
    InvalidBoolean,
    #[error("payload not terminated by CRLF")]
    MissingTerminator,
    #[error("reply of {size} bytes exceeds limit of {limit} bytes")]
    FrameTooLarge { size: usize, limit: usize },
    #[error("reply nesting exceeds depth of {0}")]
    TooDeep(usize),
}

/// Incremental RESP2/RESP3 reply parser
///
/// Bytes are appended by [feed](ReplyParser::feed), complete replies are taken from the front by
/// [next_reply](ReplyParser::next_reply). A reply is only consumed once all its bytes are
/// buffered, otherwise parsing starts over from the same position on the next call.
#[derive(Debug)]
pub struct ReplyParser {
    /// Unparsed data
    buffer: BytesMut,

    limits: ParserLimits,

    /// Buffer length of the last incomplete attempt. Parsing is skipped until new data arrives.
    stalled_at: Option<usize>,

    /// Fatal error, returned until the parser is cleared
    fault: Option<ProtocolError>,
}

/// Result of one parse step. `None` means more data is needed.
type Step<T> = Result<Option<T>, ProtocolError>;

/// Unwraps a complete step or returns early with `Ok(None)`
macro_rules! complete {
    ($step:expr) => {
        match $step? {
            Some(value) => value,
            None => return Ok(None),
        }
    };
}

impl ReplyParser {
    pub fn new(limits: ParserLimits) -> Self {
        Self {
            buffer: BytesMut::new(),
            limits,
            stalled_at: None,
            fault: None,
        }
    }

    /// Appends received data
    pub fn feed(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Takes the next complete reply from the buffer
    ///
    /// Returns `Ok(None)` if the buffered data does not (yet) contain a complete reply.
    pub fn next_reply(&mut self) -> Result<Option<ReplyValue>, ProtocolError> {
        if let Some(fault) = &self.fault {
            return Err(fault.clone());
        }

        if self.buffer.is_empty() || self.stalled_at == Some(self.buffer.len()) {
            return Ok(None);
        }

        let mut cursor = Cursor {
            data: &self.buffer,
            position: 0,
            limits: self.limits,
        };

        match cursor.value(0) {
            Ok(Some(reply)) => {
                let consumed = cursor.position;
                self.buffer.advance(consumed);
                self.stalled_at = None;
                Ok(Some(reply))
            }
            Ok(None) => {
                if self.buffer.len() > self.limits.max_frame_size {
                    return Err(self.fail(ProtocolError::FrameTooLarge {
                        size: self.buffer.len(),
                        limit: self.limits.max_frame_size,
                    }));
                }

                self.stalled_at = Some(self.buffer.len());
                Ok(None)
            }
            Err(error) => Err(self.fail(error)),
        }
    }

    /// Number of buffered but not yet parsed bytes
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Drops all buffered data and resets a previous protocol error
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.stalled_at = None;
        self.fault = None;
    }

    fn fail(&mut self, error: ProtocolError) -> ProtocolError {
        warn!(%error, buffered = self.buffer.len(), "Received malformed reply");
        self.fault = Some(error.clone());
        error
    }
}

/// Read position over the buffered data
struct Cursor<'a> {
    data: &'a [u8],
    position: usize,
    limits: ParserLimits,
}

impl<'a> Cursor<'a> {
    /// Parses one complete value starting at the current position
    fn value(&mut self, depth: usize) -> Step<ReplyValue> {
        if depth > self.limits.max_depth {
            return Err(ProtocolError::TooDeep(self.limits.max_depth));
        }

        // Attributes annotate the following value, which is the actual reply
        let marker = loop {
            match complete!(self.byte()) {
                b'|' => {
                    complete!(self.pairs(depth));
                }
                marker => break marker,
            }
        };

        let value = match marker {
            b'+' => ReplyValue::SimpleString(text(complete!(self.line()))),
            b'-' => ReplyValue::error(&text(complete!(self.line()))),
            b':' => ReplyValue::Integer(integer(complete!(self.line()))?),
            b'$' => match complete!(self.blob()) {
                Some(data) => ReplyValue::BulkString(Some(data)),
                None => ReplyValue::BulkString(None),
            },
            b'=' => match complete!(self.blob()) {
                Some(data) => ReplyValue::BulkString(Some(strip_format(data))),
                None => ReplyValue::BulkString(None),
            },
            b'!' => match complete!(self.blob()) {
                Some(data) => ReplyValue::error(&text(&data)),
                None => ReplyValue::Nil,
            },
            b'*' => match complete!(self.elements(depth)) {
                Some(elements) => ReplyValue::Array(elements),
                None => ReplyValue::Nil,
            },
            b'>' => ReplyValue::Push(complete!(self.elements(depth)).unwrap_or_default()),
            b'~' => ReplyValue::Set(complete!(self.elements(depth)).unwrap_or_default()),
            b'%' => ReplyValue::Map(complete!(self.pairs(depth)).unwrap_or_default()),
            b'_' => {
                complete!(self.line());
                ReplyValue::Nil
            }
            b'#' => match complete!(self.line()) {
                b"t" => ReplyValue::Boolean(true),
                b"f" => ReplyValue::Boolean(false),
                _ => return Err(ProtocolError::InvalidBoolean),
            },
            b',' => {
                let line = complete!(self.line());
                ReplyValue::Double(parse_float(line).ok_or(ProtocolError::InvalidDouble)?)
            }
            b'(' => ReplyValue::BigNumber(text(complete!(self.line()))),
            other => return Err(ProtocolError::InvalidTypeMarker(other)),
        };

        Ok(Some(value))
    }

    fn byte(&mut self) -> Step<u8> {
        match self.data.get(self.position) {
            Some(byte) => {
                self.position += 1;
                Ok(Some(*byte))
            }
            None => Ok(None),
        }
    }

    /// Returns the data up to the next CRLF and moves behind it
    fn line(&mut self) -> Step<&'a [u8]> {
        let remaining = &self.data[self.position..];
        match remaining.windows(2).position(|window| window == b"\r\n") {
            Some(end) => {
                self.position += end + 2;
                Ok(Some(&remaining[..end]))
            }
            None => Ok(None),
        }
    }

    /// Reads a length header. `None` for the null length `-1`.
    fn length(&mut self) -> Step<Option<usize>> {
        let line = complete!(self.line());
        if line == b"-1" {
            return Ok(Some(None));
        }

        let length: usize = core::str::from_utf8(line)
            .ok()
            .filter(|digits| !digits.starts_with('+'))
            .and_then(|digits| digits.parse().ok())
            .ok_or(ProtocolError::InvalidLength)?;

        if length > self.limits.max_frame_size {
            return Err(ProtocolError::FrameTooLarge {
                size: length,
                limit: self.limits.max_frame_size,
            });
        }

        Ok(Some(Some(length)))
    }

    /// Length prefixed payload followed by CRLF
    fn blob(&mut self) -> Step<Option<Bytes>> {
        let length = match complete!(self.length()) {
            Some(length) => length,
            None => return Ok(Some(None)),
        };

        let end = self.position + length;
        if self.data.len() < end + 2 {
            return Ok(None);
        }

        if &self.data[end..end + 2] != b"\r\n" {
            return Err(ProtocolError::MissingTerminator);
        }

        let payload = Bytes::copy_from_slice(&self.data[self.position..end]);
        self.position = end + 2;
        Ok(Some(Some(payload)))
    }

    fn elements(&mut self, depth: usize) -> Step<Option<Vec<ReplyValue>>> {
        let count = match complete!(self.length()) {
            Some(count) => count,
            None => return Ok(Some(None)),
        };

        let mut elements = Vec::with_capacity(count.min(64));
        for _ in 0..count {
            elements.push(complete!(self.value(depth + 1)));
        }

        Ok(Some(Some(elements)))
    }

    fn pairs(&mut self, depth: usize) -> Step<Option<Vec<(ReplyValue, ReplyValue)>>> {
        let count = match complete!(self.length()) {
            Some(count) => count,
            None => return Ok(Some(None)),
        };

        let mut pairs = Vec::with_capacity(count.min(64));
        for _ in 0..count {
            let key = complete!(self.value(depth + 1));
            let value = complete!(self.value(depth + 1));
            pairs.push((key, value));
        }

        Ok(Some(Some(pairs)))
    }
}

fn text(data: &[u8]) -> String {
    String::from_utf8_lossy(data).into_owned()
}

fn integer(data: &[u8]) -> Result<i64, ProtocolError> {
    core::str::from_utf8(data)
        .ok()
        .and_then(|digits| digits.parse().ok())
        .ok_or(ProtocolError::InvalidInteger)
}

/// Removes the `txt:` like format prefix of verbatim strings
fn strip_format(data: Bytes) -> Bytes {
    if data.len() >= 4 && data[3] == b':' {
        return data.slice(4..);
    }

    data
}
