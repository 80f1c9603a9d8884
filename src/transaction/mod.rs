//! Abstraction of MULTI/EXEC transactions
//!
//! Commands sent between [MULTI](MultiCommand) and [EXEC](ExecCommand) are answered with `QUEUED`
//! by the server. This acknowledgement is swallowed by the client: the caller's future resolves
//! once the EXEC reply arrives, with its own element of the EXEC array.
//!
//! ```
//! use resp_pipeline::commands::Command;
//! use resp_pipeline::transaction::{ExecCommand, ExecResponse};
//! use resp_pipeline::value::ReplyValue;
//!
//! let exec = ExecCommand::default();
//!
//! // Replies to queued commands are handed to their own futures, EXEC just reports the count
//! let response = exec.eval_response(ReplyValue::Integer(2)).unwrap();
//! assert_eq!(ExecResponse::Committed(2), response);
//!
//! // A watched key changed
//! let response = exec.eval_response(ReplyValue::Nil).unwrap();
//! assert_eq!(ExecResponse::Aborted, response);
//! ```
//!
//! # Abort and discard
//! If EXEC returns a null reply (a [watched](WatchCommand) key was modified), all deferred
//! futures fail with [TransactionAborted](crate::network::CommandErrors::TransactionAborted).
//! A [DISCARD](DiscardCommand) lets them fail with
//! [TransactionDiscarded](crate::network::CommandErrors::TransactionDiscarded).
use crate::commands::builder::CommandBuilder;
use crate::commands::Command;
use crate::network::pending::CompletionSink;
use crate::network::pipeline::Delivery;
use crate::network::{Client, CommandErrors, Future, Protocol, Transport};
use crate::value::{ReplyValue, TypeMismatch};
use alloc::collections::VecDeque;
use bytes::Bytes;
use embedded_time::Clock;
use tracing::{debug, warn};

#[cfg(test)]
mod tests;

/// Issue side state of a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransactionState {
    #[default]
    Idle,
    /// MULTI was sent. Inner value is the number of commands queued since.
    Accumulating(usize),
}

/// Transaction bookkeeping of one connection
#[derive(Debug, Default)]
pub(crate) struct Transaction {
    state: TransactionState,

    /// Callers whose command was acknowledged with QUEUED, in issue order
    deferred: VecDeque<CompletionSink>,

    /// Number of framed MULTI commands issued and answered
    multis_issued: usize,
    multis_answered: usize,
}

/// How a request is dispatched with regard to an open transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Framing {
    Multi,
    Queued,
    Exec,
    Discard,
}

impl Transaction {
    pub(crate) fn state(&self) -> TransactionState {
        self.state
    }

    /// Updates the issue state for a command written to the wire
    ///
    /// Returns None for commands outside of any transaction.
    pub(crate) fn on_issue(&mut self, name: &[u8]) -> Option<Framing> {
        if name.eq_ignore_ascii_case(b"MULTI") {
            return match self.state {
                TransactionState::Idle => {
                    debug!("Transaction started");
                    self.state = TransactionState::Accumulating(0);
                    self.multis_issued = self.multis_issued.wrapping_add(1);
                    Some(Framing::Multi)
                }
                // Nested MULTI is rejected by the server with an error, which goes to the caller
                TransactionState::Accumulating(_) => None,
            };
        }

        if name.eq_ignore_ascii_case(b"EXEC") {
            self.state = TransactionState::Idle;
            return Some(Framing::Exec);
        }

        if name.eq_ignore_ascii_case(b"DISCARD") {
            self.state = TransactionState::Idle;
            return Some(Framing::Discard);
        }

        match self.state {
            TransactionState::Idle => None,
            TransactionState::Accumulating(count) => {
                self.state = TransactionState::Accumulating(count + 1);
                Some(Framing::Queued)
            }
        }
    }

    /// Reply to MULTI
    ///
    /// A rejected MULTI (e.g. NOAUTH) opened no transaction on the server. Commands issued since
    /// are executed right away, so their replies are final results.
    pub(crate) fn on_multi(&mut self, sink: CompletionSink, reply: ReplyValue, outbox: &mut VecDeque<Delivery>) {
        self.multis_answered = self.multis_answered.wrapping_add(1);

        if !reply.is_status("OK") {
            warn!(reply = %reply, "MULTI was not acknowledged");

            // Only if no EXEC/DISCARD closed it and no later MULTI opened a new one
            let latest = self.multis_answered == self.multis_issued;
            if latest && matches!(self.state, TransactionState::Accumulating(_)) {
                self.state = TransactionState::Idle;
            }
        }

        outbox.push_back(Delivery::Complete(sink, Ok(reply)));
    }

    /// Reply to a command sent while accumulating
    ///
    /// QUEUED defers the caller until EXEC. Anything else (e.g. a syntax error) is the final
    /// result of the command.
    pub(crate) fn on_queued(&mut self, sink: CompletionSink, reply: ReplyValue, outbox: &mut VecDeque<Delivery>) {
        if reply.is_status("QUEUED") {
            self.deferred.push_back(sink);
            return;
        }

        outbox.push_back(Delivery::Complete(sink, Ok(reply)));
    }

    /// Reply to EXEC. Redistributes the result array to the deferred callers.
    pub(crate) fn on_exec(&mut self, sink: CompletionSink, reply: ReplyValue, outbox: &mut VecDeque<Delivery>) {
        let deferred = core::mem::take(&mut self.deferred);

        match reply {
            ReplyValue::Array(results) => {
                let count = results.len();
                debug!(count, "Transaction committed");

                if count != deferred.len() {
                    warn!(results = count, deferred = deferred.len(), "EXEC result count mismatch");
                }

                let mut results = results.into_iter();
                for caller in deferred {
                    let result = results.next().ok_or(CommandErrors::CommandResponseViolation);
                    outbox.push_back(Delivery::Complete(caller, result));
                }

                outbox.push_back(Delivery::Complete(sink, Ok(ReplyValue::Integer(count as i64))));
            }
            ReplyValue::Error { code, message } => {
                debug!(%code, "Transaction rejected");
                for caller in deferred {
                    let error = CommandErrors::ErrorResponse {
                        code: code.clone(),
                        message: message.clone(),
                    };
                    outbox.push_back(Delivery::Complete(caller, Err(error)));
                }

                outbox.push_back(Delivery::Complete(sink, Ok(ReplyValue::Error { code, message })));
            }
            other => {
                debug!("Transaction aborted");
                for caller in deferred {
                    outbox.push_back(Delivery::Complete(caller, Err(CommandErrors::TransactionAborted)));
                }

                outbox.push_back(Delivery::Complete(sink, Ok(other)));
            }
        }
    }

    /// Reply to DISCARD
    pub(crate) fn on_discard(&mut self, sink: CompletionSink, reply: ReplyValue, outbox: &mut VecDeque<Delivery>) {
        debug!(count = self.deferred.len(), "Transaction discarded");
        for caller in self.deferred.drain(..) {
            outbox.push_back(Delivery::Complete(caller, Err(CommandErrors::TransactionDiscarded)));
        }

        outbox.push_back(Delivery::Complete(sink, Ok(reply)));
    }

    /// Fails all deferred callers and resets the state
    pub(crate) fn abort(&mut self, error: &CommandErrors, outbox: &mut VecDeque<Delivery>) {
        for caller in self.deferred.drain(..) {
            outbox.push_back(Delivery::Complete(caller, Err(error.clone())));
        }

        self.state = TransactionState::Idle;
        self.multis_answered = self.multis_issued;
    }
}

/// Abstraction of MULTI command
#[derive(Debug, Default, Clone)]
pub struct MultiCommand {}

impl Command for MultiCommand {
    type Response = ();

    fn encode(&self) -> CommandBuilder {
        CommandBuilder::new("MULTI")
    }

    fn eval_response(&self, reply: ReplyValue) -> Result<Self::Response, TypeMismatch> {
        expect_ok(reply)
    }
}

/// Result of a EXEC command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecResponse {
    /// All commands were executed. Inner value is the number of results delivered.
    Committed(usize),
    /// A watched key was modified, no command was executed
    Aborted,
}

/// Abstraction of EXEC command
#[derive(Debug, Default, Clone)]
pub struct ExecCommand {}

impl Command for ExecCommand {
    type Response = ExecResponse;

    fn encode(&self) -> CommandBuilder {
        CommandBuilder::new("EXEC")
    }

    fn eval_response(&self, reply: ReplyValue) -> Result<Self::Response, TypeMismatch> {
        match reply {
            ReplyValue::Integer(count) if count >= 0 => Ok(ExecResponse::Committed(count as usize)),
            reply if reply.is_nil() => Ok(ExecResponse::Aborted),
            other => Err(TypeMismatch::new("EXEC result", &other)),
        }
    }
}

/// Abstraction of DISCARD command
#[derive(Debug, Default, Clone)]
pub struct DiscardCommand {}

impl Command for DiscardCommand {
    type Response = ();

    fn encode(&self) -> CommandBuilder {
        CommandBuilder::new("DISCARD")
    }

    fn eval_response(&self, reply: ReplyValue) -> Result<Self::Response, TypeMismatch> {
        expect_ok(reply)
    }
}

/// Abstraction of WATCH command
#[derive(Debug, Clone)]
pub struct WatchCommand {
    keys: alloc::vec::Vec<Bytes>,
}

impl WatchCommand {
    pub fn new<K>(key: K) -> Self
    where
        Bytes: From<K>,
    {
        Self {
            keys: alloc::vec![key.into()],
        }
    }

    /// Watches an additional key
    pub fn key<K>(mut self, key: K) -> Self
    where
        Bytes: From<K>,
    {
        self.keys.push(key.into());
        self
    }
}

impl Command for WatchCommand {
    type Response = ();

    fn encode(&self) -> CommandBuilder {
        self.keys
            .iter()
            .fold(CommandBuilder::new("WATCH"), |builder, key| builder.arg(key))
    }

    fn eval_response(&self, reply: ReplyValue) -> Result<Self::Response, TypeMismatch> {
        expect_ok(reply)
    }
}

/// Abstraction of UNWATCH command
#[derive(Debug, Default, Clone)]
pub struct UnwatchCommand {}

impl Command for UnwatchCommand {
    type Response = ();

    fn encode(&self) -> CommandBuilder {
        CommandBuilder::new("UNWATCH")
    }

    fn eval_response(&self, reply: ReplyValue) -> Result<Self::Response, TypeMismatch> {
        expect_ok(reply)
    }
}

fn expect_ok(reply: ReplyValue) -> Result<(), TypeMismatch> {
    if reply.is_status("OK") {
        return Ok(());
    }

    Err(TypeMismatch::new("OK", &reply))
}

impl<T: Transport, C: Clock, P: Protocol> Client<'_, T, C, P> {
    /// Shorthand for [MultiCommand]
    pub fn multi(&self) -> Result<Future<'_, T, C, P, MultiCommand>, CommandErrors> {
        self.send(MultiCommand::default())
    }

    /// Shorthand for [ExecCommand]
    pub fn exec(&self) -> Result<Future<'_, T, C, P, ExecCommand>, CommandErrors> {
        self.send(ExecCommand::default())
    }

    /// Shorthand for [DiscardCommand]
    pub fn discard(&self) -> Result<Future<'_, T, C, P, DiscardCommand>, CommandErrors> {
        self.send(DiscardCommand::default())
    }
}
