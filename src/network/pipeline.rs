use crate::network::client::CommandErrors;
use crate::network::parser::{ParserLimits, ReplyParser};
use crate::network::pending::{CompletionSink, ExpectedAcks, PendingRequest, RawResult, RequestKind};
use crate::network::sinks::{Event, EventSinks};
use crate::subscribe::messages::{classify, AckAction, PushMessage, SubscriptionAck};
use crate::subscribe::registry::SubscriptionRegistry;
use crate::subscribe::SubscriptionKind;
use crate::transaction::{Framing, Transaction, TransactionState};
use crate::value::ReplyValue;
use alloc::collections::VecDeque;
use core::cell::{Ref, RefCell, RefMut};
use tracing::{debug, trace, warn};

/// Output of the pipeline, processed by the caller once the pipeline is no longer borrowed
#[derive(Debug)]
pub enum Delivery {
    /// Final result of a pending request
    Complete(CompletionSink, RawResult),
    Event(Event),
}

impl Delivery {
    /// Completes the sink or dispatches the event
    pub fn run(self, sinks: &mut EventSinks) {
        match self {
            Delivery::Complete(sink, result) => sink.complete(result),
            Delivery::Event(event) => sinks.dispatch(event),
        }
    }
}

/// Transport independent request/reply engine of one connection
///
/// Replies are matched to requests strictly by position: the n-th reply belongs to the n-th
/// registered request. Pub/Sub frames are diverted before matching and transaction framing is
/// resolved on the way out.
///
/// ```
/// use resp_pipeline::network::{CompletionSink, Delivery, EventSinks, ParserLimits, Pipeline};
/// use resp_pipeline::value::ReplyValue;
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// let mut pipeline = Pipeline::new(ParserLimits::default());
/// let results = Rc::new(RefCell::new(Vec::new()));
///
/// for _ in 0..2 {
///     let results = results.clone();
///     let sink = CompletionSink::callback(move |result| results.borrow_mut().push(result));
///     pipeline.register(b"GET", 1, sink).unwrap();
/// }
///
/// pipeline.on_data(b"$3\r\none\r\n$3\r\ntwo\r\n").unwrap();
///
/// let mut sinks = EventSinks::default();
/// while let Some(delivery) = pipeline.next_delivery() {
///     delivery.run(&mut sinks);
/// }
///
/// assert_eq!(Ok(ReplyValue::bulk("one")), results.borrow()[0]);
/// assert_eq!(Ok(ReplyValue::bulk("two")), results.borrow()[1]);
/// ```
#[derive(Debug)]
pub struct Pipeline {
    parser: ReplyParser,

    /// Requests waiting for their reply, in issue order
    queue: VecDeque<PendingRequest>,

    transaction: Transaction,

    subscriptions: SubscriptionRegistry,

    /// Undelivered results and events
    outbox: VecDeque<Delivery>,

    /// Set after disconnect or protocol error
    closed: bool,

    /// A push frame was received, so Pub/Sub traffic never arrives as a plain array
    push_frames: bool,
}

impl Pipeline {
    pub fn new(limits: ParserLimits) -> Self {
        Self {
            parser: ReplyParser::new(limits),
            queue: VecDeque::new(),
            transaction: Transaction::default(),
            subscriptions: SubscriptionRegistry::new(),
            outbox: VecDeque::new(),
            closed: false,
            push_frames: false,
        }
    }

    /// Registers a request which was written to the wire
    ///
    /// The way its reply is dispatched is derived from the command name and the number of arguments.
    pub fn register(&mut self, name: &[u8], arguments: usize, sink: CompletionSink) -> Result<(), CommandErrors> {
        if self.closed {
            return Err(CommandErrors::ConnectionClosed);
        }

        let kind = self.request_kind(name, arguments);
        self.enqueue(PendingRequest::new(kind, sink))
    }

    /// Appends an already classified request to the queue
    pub fn enqueue(&mut self, request: PendingRequest) -> Result<(), CommandErrors> {
        if self.closed {
            return Err(CommandErrors::ConnectionClosed);
        }

        trace!(kind = ?request.kind, pending = self.queue.len() + 1, "Request registered");
        self.queue.push_back(request);
        Ok(())
    }

    /// Feeds received bytes and dispatches all complete replies
    ///
    /// Returns the number of replies processed. A protocol error tears the connection down.
    pub fn on_data(&mut self, data: &[u8]) -> Result<usize, CommandErrors> {
        if self.closed {
            warn!(bytes = data.len(), "Data received on closed connection");
            return Ok(0);
        }

        self.parser.feed(data);

        let mut count = 0;
        loop {
            match self.parser.next_reply() {
                Ok(Some(reply)) => {
                    self.on_reply(reply);
                    count += 1;
                }
                Ok(None) => return Ok(count),
                Err(error) => {
                    let error = CommandErrors::ProtocolViolation(error);
                    self.outbox.push_back(Delivery::Event(Event::Error(error.clone())));
                    self.teardown(&error);
                    return Err(error);
                }
            }
        }
    }

    /// Dispatches one parsed top-level reply
    pub fn on_reply(&mut self, reply: ReplyValue) {
        let reply = match self.divert_push(reply) {
            Some(reply) => reply,
            None => return,
        };

        let request = match self.queue.pop_front() {
            Some(request) => request,
            None => {
                warn!(reply = %reply, "Received reply without pending request");
                self.outbox.push_back(Delivery::Event(Event::Push(reply)));
                return;
            }
        };

        trace!(kind = ?request.kind, reply = reply.kind(), "Reply dispatched");
        match request.kind {
            RequestKind::Multi => self.transaction.on_multi(request.sink, reply, &mut self.outbox),
            RequestKind::Queued => self.transaction.on_queued(request.sink, reply, &mut self.outbox),
            RequestKind::Exec => self.transaction.on_exec(request.sink, reply, &mut self.outbox),
            RequestKind::Discard => self.transaction.on_discard(request.sink, reply, &mut self.outbox),
            _ => self.outbox.push_back(Delivery::Complete(request.sink, Ok(reply))),
        }
    }

    /// Transport reported closure. Fails all pending requests in issue order.
    pub fn on_closed(&mut self) {
        self.teardown(&CommandErrors::ConnectionClosed);
    }

    /// Takes the next result or event to deliver
    pub fn next_delivery(&mut self) -> Option<Delivery> {
        self.outbox.pop_front()
    }

    /// Runs all outstanding deliveries
    pub fn deliver(&mut self, sinks: &mut EventSinks) {
        while let Some(delivery) = self.next_delivery() {
            delivery.run(sinks);
        }
    }

    /// Number of requests waiting for a reply
    pub fn pending_count(&self) -> usize {
        self.queue.len()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn subscriptions(&self) -> &SubscriptionRegistry {
        &self.subscriptions
    }

    pub fn transaction_state(&self) -> TransactionState {
        self.transaction.state()
    }

    /// True if array replies may be Pub/Sub frames
    ///
    /// Only RESP2 servers send Pub/Sub traffic as arrays. A RESP3 server answers the first
    /// SUBSCRIBE with a push frame, after which arrays are regular replies again.
    fn subscriber_mode(&self) -> bool {
        if self.push_frames {
            return false;
        }

        if !self.subscriptions.is_empty() {
            return true;
        }

        matches!(
            self.queue.front().map(|request| request.kind),
            Some(RequestKind::Subscribe { .. } | RequestKind::Unsubscribe { .. })
        )
    }

    /// Routes Pub/Sub and other push frames to the event sinks
    ///
    /// Returns the reply if it is regular data for the next pending request.
    fn divert_push(&mut self, reply: ReplyValue) -> Option<ReplyValue> {
        let is_push = matches!(reply, ReplyValue::Push(_));
        self.push_frames |= is_push;
        if !is_push && !self.subscriber_mode() {
            return Some(reply);
        }

        match classify(&reply) {
            Some(PushMessage::Ack(ack)) => {
                self.on_ack(ack, reply);
                None
            }
            Some(message) => {
                trace!("Pub/Sub message received");
                self.outbox.push_back(Delivery::Event(Event::PubSub(message)));
                None
            }
            None if is_push => {
                trace!("Push frame received");
                self.outbox.push_back(Delivery::Event(Event::Push(reply)));
                None
            }
            None => Some(reply),
        }
    }

    /// Subscription acks are events and replies at the same time
    ///
    /// Every ack updates the registry and is handed to the ack sink. If it answers the pending
    /// (P)(UN)SUBSCRIBE request at the head of the queue, it counts towards the request's expected
    /// acks. The request completes with its last ack.
    fn on_ack(&mut self, ack: SubscriptionAck, reply: ReplyValue) {
        trace!(action = ?ack.action, kind = ?ack.kind, remaining = ack.remaining, "Subscription ack received");
        self.subscriptions.apply(&ack);

        let done = match self.queue.front_mut() {
            Some(request) => match acknowledge(&mut request.kind, &ack, &self.subscriptions) {
                Some(done) => done,
                None => {
                    debug!("Subscription ack without matching request");
                    false
                }
            },
            None => false,
        };

        self.outbox.push_back(Delivery::Event(Event::PubSub(PushMessage::Ack(ack))));

        if done {
            if let Some(request) = self.queue.pop_front() {
                self.outbox.push_back(Delivery::Complete(request.sink, Ok(reply)));
            }
        }
    }

    /// Fails deferred transaction callers and all pending requests, resets the connection state
    fn teardown(&mut self, error: &CommandErrors) {
        if self.closed {
            return;
        }

        debug!(%error, pending = self.queue.len(), "Connection torn down");
        self.closed = true;

        // Deferred transaction callers were issued before anything still queued
        self.transaction.abort(error, &mut self.outbox);
        for request in self.queue.drain(..) {
            self.outbox.push_back(Delivery::Complete(request.sink, Err(error.clone())));
        }

        self.subscriptions.clear();
        self.parser.clear();
        self.outbox.push_back(Delivery::Event(Event::Disconnected));
    }

    /// Derives the dispatch kind of a new request
    fn request_kind(&mut self, name: &[u8], arguments: usize) -> RequestKind {
        if let Some(framing) = self.transaction.on_issue(name) {
            return match framing {
                Framing::Multi => RequestKind::Multi,
                Framing::Queued => RequestKind::Queued,
                Framing::Exec => RequestKind::Exec,
                Framing::Discard => RequestKind::Discard,
            };
        }

        let subscription = |kind| match arguments {
            // Rejected by the server with a regular error
            0 => RequestKind::Regular,
            count => RequestKind::Subscribe {
                kind,
                acks: ExpectedAcks::Exactly(count),
            },
        };

        let unsubscription = |kind| RequestKind::Unsubscribe {
            kind,
            acks: match arguments {
                0 => ExpectedAcks::UntilEmpty,
                count => ExpectedAcks::Exactly(count),
            },
        };

        if name.eq_ignore_ascii_case(b"SUBSCRIBE") {
            subscription(SubscriptionKind::Channel)
        } else if name.eq_ignore_ascii_case(b"PSUBSCRIBE") {
            subscription(SubscriptionKind::Pattern)
        } else if name.eq_ignore_ascii_case(b"UNSUBSCRIBE") {
            unsubscription(SubscriptionKind::Channel)
        } else if name.eq_ignore_ascii_case(b"PUNSUBSCRIBE") {
            unsubscription(SubscriptionKind::Pattern)
        } else {
            RequestKind::Regular
        }
    }
}

/// Counts the ack towards the given request
///
/// Returns None if the ack does not answer this request, otherwise whether the request is done.
fn acknowledge(
    request: &mut RequestKind,
    ack: &SubscriptionAck,
    registry: &SubscriptionRegistry,
) -> Option<bool> {
    let (kind, acks) = match (request, ack.action) {
        (RequestKind::Subscribe { kind, acks }, AckAction::Subscribe) => (*kind, acks),
        (RequestKind::Unsubscribe { kind, acks }, AckAction::Unsubscribe) => (*kind, acks),
        _ => return None,
    };

    if kind != ack.kind {
        return None;
    }

    match acks {
        ExpectedAcks::Exactly(count) => {
            *count = count.saturating_sub(1);
            Some(*count == 0)
        }
        ExpectedAcks::UntilEmpty => Some(ack.channel.is_none() || registry.count(kind) == 0),
    }
}

/// State of one connection shared by all clients created for it
#[derive(Debug)]
pub struct Session {
    pipeline: RefCell<Pipeline>,
    sinks: RefCell<EventSinks>,

    /// Events raised while an event sink was running
    parked: RefCell<VecDeque<Event>>,
}

impl Session {
    pub fn new(limits: ParserLimits) -> Self {
        Self {
            pipeline: RefCell::new(Pipeline::new(limits)),
            sinks: RefCell::new(EventSinks::default()),
            parked: RefCell::new(VecDeque::new()),
        }
    }

    pub fn pipeline(&self) -> Ref<'_, Pipeline> {
        self.pipeline.borrow()
    }

    /// Mutable access to the pipeline. Must not be held while delivering.
    pub fn pipeline_mut(&self) -> RefMut<'_, Pipeline> {
        self.pipeline.borrow_mut()
    }

    /// Event sinks of this connection. Must not be called from within a sink.
    pub fn sinks(&self) -> RefMut<'_, EventSinks> {
        self.sinks.borrow_mut()
    }

    pub fn is_closed(&self) -> bool {
        self.pipeline.borrow().is_closed()
    }

    /// Runs all outstanding deliveries
    ///
    /// Each delivery is taken out before it runs, so callbacks may use the session again. Events
    /// raised while an event sink is running are parked and dispatched by the outer call once
    /// the sink returns.
    pub fn deliver(&self) {
        loop {
            let delivery = self.pipeline.borrow_mut().next_delivery();
            match delivery {
                Some(Delivery::Complete(sink, result)) => sink.complete(result),
                Some(Delivery::Event(event)) => self.dispatch(event),
                None => return,
            }
        }
    }

    fn dispatch(&self, event: Event) {
        let mut sinks = match self.sinks.try_borrow_mut() {
            Ok(sinks) => sinks,
            Err(_) => {
                trace!("Event sink busy, event parked");
                self.parked.borrow_mut().push_back(event);
                return;
            }
        };

        sinks.dispatch(event);
        loop {
            let parked = self.parked.borrow_mut().pop_front();
            match parked {
                Some(event) => sinks.dispatch(event),
                None => return,
            }
        }
    }
}
