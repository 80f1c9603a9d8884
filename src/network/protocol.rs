use core::fmt::Debug;

/// Protocol version negotiated for replies
///
/// Requests are always encoded as RESP arrays of bulk strings. The version only decides whether
/// the connection is switched with HELLO during initialization.
pub trait Protocol: Clone + Debug {
    fn version(&self) -> u8;

    /// Returns true if protocol switch, respectively HELLO command, is needed
    fn requires_hello(&self) -> bool {
        false
    }
}

/// RESP2 protocol, default of every Redis server
#[derive(Clone, Debug, Default)]
pub struct Resp2 {}

impl Protocol for Resp2 {
    fn version(&self) -> u8 {
        2
    }
}

/// RESP3 protocol, requires Redis >= 6.0
#[derive(Clone, Debug, Default)]
pub struct Resp3 {}

impl Protocol for Resp3 {
    fn version(&self) -> u8 {
        3
    }

    fn requires_hello(&self) -> bool {
        true
    }
}
