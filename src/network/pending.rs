use crate::network::client::CommandErrors;
use crate::subscribe::SubscriptionKind;
use crate::value::ReplyValue;
use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::RefCell;
use core::fmt::{Debug, Formatter};

/// Raw result handed to a completion sink
pub type RawResult = Result<ReplyValue, CommandErrors>;

/// Shared slot a blocking [Future](crate::network::Future) is waiting on
#[derive(Clone, Default)]
pub struct ResponseSlot {
    inner: Rc<RefCell<Option<RawResult>>>,
}

impl ResponseSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_filled(&self) -> bool {
        self.inner.borrow().is_some()
    }

    pub fn take(&self) -> Option<RawResult> {
        self.inner.borrow_mut().take()
    }

    fn fill(&self, result: RawResult) {
        *self.inner.borrow_mut() = Some(result);
    }
}

/// Receiver of exactly one result
pub enum CompletionSink {
    /// Single-shot callback
    Callback(Box<dyn FnOnce(RawResult)>),
    /// Slot polled by a blocking future
    Slot(ResponseSlot),
    /// Result is not of interest, e.g. fire-and-forget commands
    Ignore,
}

impl CompletionSink {
    pub fn callback<F: FnOnce(RawResult) + 'static>(callback: F) -> Self {
        CompletionSink::Callback(Box::new(callback))
    }

    pub fn complete(self, result: RawResult) {
        match self {
            CompletionSink::Callback(callback) => callback(result),
            CompletionSink::Slot(slot) => slot.fill(result),
            CompletionSink::Ignore => {}
        }
    }
}

impl Debug for CompletionSink {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            CompletionSink::Callback(_) => write!(f, "Callback"),
            CompletionSink::Slot(_) => write!(f, "Slot"),
            CompletionSink::Ignore => write!(f, "Ignore"),
        }
    }
}

/// Number of subscription acknowledgements a (P)(UN)SUBSCRIBE command is answered with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedAcks {
    /// One ack per channel/pattern argument
    Exactly(usize),
    /// Unsubscribe from everything: acks arrive until no subscription of the kind is left
    UntilEmpty,
}

/// How the reply of a request is dispatched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Regular,
    /// MULTI opening a transaction
    Multi,
    /// Command issued inside a transaction, answered by QUEUED
    Queued,
    Exec,
    Discard,
    Subscribe {
        kind: SubscriptionKind,
        acks: ExpectedAcks,
    },
    Unsubscribe {
        kind: SubscriptionKind,
        acks: ExpectedAcks,
    },
}

/// Request written to the wire and waiting for its reply
#[derive(Debug)]
pub struct PendingRequest {
    pub(crate) kind: RequestKind,
    pub(crate) sink: CompletionSink,
}

impl PendingRequest {
    pub fn new(kind: RequestKind, sink: CompletionSink) -> Self {
        Self { kind, sink }
    }

    pub fn kind(&self) -> RequestKind {
        self.kind
    }
}
