use crate::commands::Command;
use crate::network::client::{evaluate, Client, CommandErrors};
use crate::network::pending::ResponseSlot;
use crate::network::protocol::Protocol;
use crate::network::timeout::Timeout;
use crate::network::transport::Transport;
use core::fmt::{Debug, Formatter};
use embedded_time::Clock;

/// Non-blocking response management
///
/// Dropping a future without waiting is safe: the request stays in the queue and its reply is
/// discarded once received.
pub struct Future<'a, T: Transport, C: Clock, P: Protocol, Cmd: Command> {
    command: Cmd,
    slot: ResponseSlot,
    client: &'a Client<'a, T, C, P>,
    timeout: Timeout<'a, C>,

    /// Cached error during work of ready(). Will be returned on wait() call.
    error: Option<CommandErrors>,
}

impl<'a, T: Transport, C: Clock, P: Protocol, Cmd: Command> Future<'a, T, C, P, Cmd> {
    pub(crate) fn new(
        command: Cmd,
        slot: ResponseSlot,
        client: &'a Client<'a, T, C, P>,
        timeout: Timeout<'a, C>,
    ) -> Self {
        Self {
            command,
            slot,
            client,
            timeout,
            error: None,
        }
    }

    /// Blocks until response is received and returns the response
    /// Throws an error on invalid response or timeout (if configured)
    pub fn wait(mut self) -> Result<Cmd::Response, CommandErrors> {
        if let Some(error) = self.error.take() {
            return Err(error);
        }

        self.process(true)?;

        // Process only returns successfully once the slot is filled
        let result = self.slot.take().ok_or(CommandErrors::ConnectionClosed)?;
        evaluate(&self.command, result)
    }

    /// Non blocking method for checking if data is ready
    /// So if true is returned, wait() is non-blocking
    /// Reads all pending data and returns true if response is ready
    /// Errors are preserved and returned on wait() call
    pub fn ready(&mut self) -> bool {
        if self.error.is_some() || self.slot.is_filled() {
            return true;
        }

        match self.process(false) {
            Ok(()) => self.slot.is_filled(),
            Err(error) => {
                self.error = Some(error);
                true
            }
        }
    }

    /// Processes socket data
    /// If block=false, only pending data is read without blocking
    fn process(&mut self, block: bool) -> Result<(), CommandErrors> {
        while !self.slot.is_filled() {
            match self.client.receive() {
                Ok(_) => {}
                Err(nb::Error::Other(error)) => {
                    // Teardown has completed the slot with the connection error already
                    if self.slot.is_filled() {
                        return Ok(());
                    }

                    return Err(error);
                }
                Err(nb::Error::WouldBlock) => {
                    if self.timeout.expired()? {
                        return Err(CommandErrors::Timeout);
                    }

                    if !block {
                        return Ok(());
                    }
                }
            }
        }

        Ok(())
    }
}

impl<T: Transport, C: Clock, P: Protocol, Cmd: Command> Debug for Future<'_, T, C, P, Cmd> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Future")
            .field("ready", &self.slot.is_filled())
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}
