use crate::commands::auth::AuthCommand;
use crate::commands::builder::CommandBuilder;
use crate::commands::hello::{HelloCommand, HelloResponse};
use crate::commands::Command;
use crate::network::future::Future;
use crate::network::handler::{ConnectionError, Credentials};
use crate::network::parser::ProtocolError;
use crate::network::pending::{CompletionSink, RawResult, ResponseSlot};
use crate::network::pipeline::Session;
use crate::network::protocol::{Protocol, Resp3};
use crate::network::sinks::EventSinks;
use crate::network::timeout::{Timeout, TimeoutError};
use crate::network::transport::{Transport, TransportError};
use crate::value::{ReplyValue, TypeMismatch};
use alloc::string::String;
use core::cell::{RefCell, RefMut};
use core::fmt::{Debug, Formatter};
use embedded_time::duration::Microseconds;
use embedded_time::Clock;
use tracing::warn;

/// Number of bytes read from the transport at once
const READ_CHUNK: usize = 64;

/// Error handling for command execution
#[derive(Debug, PartialEq, Eq, Clone, thiserror::Error)]
pub enum CommandErrors {
    /// No response within expected time frame
    ///
    /// The request stays queued and its late reply is discarded, so the client remains usable.
    #[error("no reply within timeout")]
    Timeout,
    /// Received data violating the RESP protocol. The connection was torn down.
    #[error("protocol violation: {0}")]
    ProtocolViolation(ProtocolError),
    /// Low level network error. The connection was torn down.
    #[error("network error")]
    TcpError,
    /// Upstream timer/clock failure
    #[error("timer error")]
    TimerError,
    /// Reply shape does not match the command
    #[error("unexpected reply: {0}")]
    TypeMismatch(TypeMismatch),
    /// Received an unexpected response incompatible with the command
    #[error("reply missing in transaction result")]
    CommandResponseViolation,
    /// Redis error response, e.g. `WRONGTYPE` or `NOAUTH`
    #[error("{code} {message}")]
    ErrorResponse { code: String, message: String },
    /// Connection was closed while the request was pending, or before it was sent
    #[error("connection closed")]
    ConnectionClosed,
    /// EXEC returned a null reply, as a watched key was modified
    #[error("transaction aborted")]
    TransactionAborted,
    /// Transaction was cancelled by DISCARD
    #[error("transaction discarded")]
    TransactionDiscarded,
}

impl From<TimeoutError> for CommandErrors {
    fn from(_: TimeoutError) -> Self {
        CommandErrors::TimerError
    }
}

impl From<TransportError> for CommandErrors {
    fn from(error: TransportError) -> Self {
        match error {
            TransportError::Closed => CommandErrors::ConnectionClosed,
            TransportError::Io => CommandErrors::TcpError,
        }
    }
}

/// Converts the raw result of a request to the command response
pub(crate) fn evaluate<Cmd: Command>(command: &Cmd, result: RawResult) -> Result<Cmd::Response, CommandErrors> {
    match result? {
        ReplyValue::Error { code, message } => Err(CommandErrors::ErrorResponse { code, message }),
        reply => command.eval_response(reply).map_err(CommandErrors::TypeMismatch),
    }
}

/// Client to execute Redis commands
///
/// Requests are pipelined: any number of commands may be sent before the first reply is read.
/// The functionality of the client is best explained by a [command example](crate::commands::get).
pub struct Client<'a, T: Transport, C: Clock, P: Protocol> {
    pub(crate) transport: RefCell<T>,
    pub(crate) session: &'a Session,
    pub(crate) clock: Option<&'a C>,

    /// Max. time waiting for response
    pub(crate) timeout_duration: Microseconds,

    pub(crate) protocol: P,

    /// Response to HELLO command, only used for RESP3
    pub(crate) hello_response: Option<&'a HelloResponse>,
}

impl<'a, T: Transport, C: Clock, P: Protocol> Client<'a, T, C, P> {
    /// Creates a client on top of an already initialized connection
    pub fn new(transport: T, session: &'a Session, protocol: P) -> Self {
        Self {
            transport: RefCell::new(transport),
            session,
            clock: None,
            timeout_duration: Microseconds(0),
            protocol,
            hello_response: None,
        }
    }

    /// Sets the clock and the max. duration futures wait for their reply
    pub fn with_timeout(mut self, clock: &'a C, duration: Microseconds) -> Self {
        self.clock = Some(clock);
        self.timeout_duration = duration;
        self
    }

    /// Sends the given command non-blocking
    pub fn send<Cmd: Command>(&self, command: Cmd) -> Result<Future<'_, T, C, P, Cmd>, CommandErrors> {
        let slot = ResponseSlot::new();
        self.dispatch(command.encode(), CompletionSink::Slot(slot.clone()))?;

        Ok(Future::new(
            command,
            slot,
            self,
            Timeout::new(self.clock, self.timeout_duration)?,
        ))
    }

    /// Sends the given command. The callback is invoked once the reply is received.
    ///
    /// Callbacks run while the client reads, so either by [poll](Client::poll) or while waiting on
    /// any future of the same connection.
    pub fn send_with<Cmd, F>(&self, command: Cmd, callback: F) -> Result<(), CommandErrors>
    where
        Cmd: Command + 'static,
        F: FnOnce(Result<Cmd::Response, CommandErrors>) + 'static,
    {
        let builder = command.encode();
        self.dispatch(
            builder,
            CompletionSink::callback(move |result| callback(evaluate(&command, result))),
        )
    }

    /// Sends the given command without interest in its reply
    pub fn send_detached<Cmd: Command>(&self, command: Cmd) -> Result<(), CommandErrors> {
        self.dispatch(command.encode(), CompletionSink::Ignore)
    }

    /// Reads all pending data without blocking and runs callbacks and event sinks
    ///
    /// Returns the number of replies received.
    pub fn poll(&self) -> Result<usize, CommandErrors> {
        let mut total = 0;
        loop {
            match self.receive() {
                Ok(count) => total += count,
                Err(nb::Error::WouldBlock) => return Ok(total),
                Err(nb::Error::Other(error)) => return Err(error),
            }
        }
    }

    /// Hands data received by an external event loop to the pipeline
    pub fn feed(&self, data: &[u8]) -> Result<usize, CommandErrors> {
        let result = self.session.pipeline_mut().on_data(data);
        self.session.deliver();
        result
    }

    /// Signals that the transport was closed by an external event loop
    pub fn on_closed(&self) {
        self.session.pipeline_mut().on_closed();
        self.session.deliver();
    }

    /// Number of requests waiting for a reply
    pub fn pending_count(&self) -> usize {
        self.session.pipeline().pending_count()
    }

    /// Event sinks of the connection, e.g. for receiving Pub/Sub messages or disconnect events
    pub fn sinks(&self) -> RefMut<'_, EventSinks> {
        self.session.sinks()
    }

    pub fn session(&self) -> &Session {
        self.session
    }

    pub fn is_closed(&self) -> bool {
        self.session.is_closed()
    }

    /// Waits until all pending replies are received, so the connection is left in a clean state
    ///
    /// Gives up after the configured timeout. Without timeout this blocks until the last reply
    /// arrives or the connection fails.
    pub fn close(&self) {
        let timer = match Timeout::new(self.clock, self.timeout_duration) {
            Ok(timer) => timer,
            Err(_) => return,
        };

        while self.pending_count() > 0 && !timer.expired().unwrap_or(true) {
            if let Err(nb::Error::Other(_)) = self.receive() {
                return;
            }
        }
    }

    /// Reads one chunk from the transport and delivers all completed replies
    pub(crate) fn receive(&self) -> nb::Result<usize, CommandErrors> {
        let mut buffer = [0_u8; READ_CHUNK];
        let read = self.transport.borrow_mut().read(&mut buffer);

        let result = match read {
            Ok(count) => self.session.pipeline_mut().on_data(&buffer[..count]),
            Err(nb::Error::WouldBlock) => return Err(nb::Error::WouldBlock),
            Err(nb::Error::Other(error)) => {
                warn!(%error, "Receiving failed");
                self.session.pipeline_mut().on_closed();
                Err(CommandErrors::from(error))
            }
        };

        self.session.deliver();
        result.map_err(nb::Error::Other)
    }

    /// Writes the encoded command and registers its sink
    fn dispatch(&self, builder: CommandBuilder, sink: CompletionSink) -> Result<(), CommandErrors> {
        if self.session.is_closed() {
            return Err(CommandErrors::ConnectionClosed);
        }

        let frame = builder.encode();
        let written = self.transport.borrow_mut().write(&frame);
        if let Err(error) = written {
            warn!(%error, "Sending failed");
            self.on_closed();
            return Err(CommandErrors::TcpError);
        }

        self.session
            .pipeline_mut()
            .register(builder.name(), builder.argument_count(), sink)
    }

    /// Authenticates blocking with the given credentials during client initialization
    pub(crate) fn auth(&self, credentials: Option<Credentials>) -> Result<(), ConnectionError> {
        if let Some(credentials) = credentials {
            self.send(AuthCommand::from(&credentials))
                .map_err(ConnectionError::AuthenticationError)?
                .wait()
                .map_err(ConnectionError::AuthenticationError)?;
        }

        Ok(())
    }

    /// Prepares the new client by authenticating, switching protocol (HELLO command) if needed and
    /// selecting the database
    pub(crate) fn init(
        &self,
        credentials: Option<Credentials>,
        database: Option<usize>,
    ) -> Result<Option<HelloResponse>, ConnectionError> {
        self.auth(credentials)?;

        let mut hello_response = None;
        if self.protocol.requires_hello() {
            hello_response = Some(
                self.send(HelloCommand::default())
                    .map_err(ConnectionError::ProtocolSwitchError)?
                    .wait()
                    .map_err(ConnectionError::ProtocolSwitchError)?,
            );
        }

        if let Some(index) = database {
            self.send(CommandBuilder::new("SELECT").arg_uint(index).to_command())
                .map_err(ConnectionError::DatabaseSelectError)?
                .wait()
                .map_err(ConnectionError::DatabaseSelectError)?;
        }

        Ok(hello_response)
    }
}

impl<T: Transport, C: Clock> Client<'_, T, C, Resp3> {
    /// Returns the response to HELLO command executed during connection initialization
    pub fn get_hello_response(&self) -> Option<&HelloResponse> {
        self.hello_response
    }
}

impl<T: Transport, C: Clock, P: Protocol> Debug for Client<'_, T, C, P> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Client")
            .field("protocol", &self.protocol)
            .field("pending", &self.pending_count())
            .field("timeout_duration", &self.timeout_duration)
            .finish()
    }
}
