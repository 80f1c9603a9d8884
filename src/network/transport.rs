use core::fmt::{Debug, Formatter};
use embedded_nal::{TcpClientStack, TcpError, TcpErrorKind};
use tracing::warn;

/// Transport failure. Both variants end the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// Peer closed the connection
    #[error("connection closed by peer")]
    Closed,
    /// Any other network stack error
    #[error("network stack error")]
    Io,
}

/// Byte stream the pipeline is running on
pub trait Transport {
    /// Writes all given bytes
    fn write(&mut self, data: &[u8]) -> Result<(), TransportError>;

    /// Reads available bytes without blocking
    ///
    /// Returns `WouldBlock` if no data is pending.
    fn read(&mut self, buffer: &mut [u8]) -> nb::Result<usize, TransportError>;
}

/// [Transport] on top of an embedded-nal TCP socket
pub struct NalTransport<'a, N: TcpClientStack> {
    stack: &'a mut N,
    socket: &'a mut N::TcpSocket,
}

impl<'a, N: TcpClientStack> NalTransport<'a, N> {
    pub fn new(stack: &'a mut N, socket: &'a mut N::TcpSocket) -> Self {
        Self { stack, socket }
    }
}

impl<N: TcpClientStack> Transport for NalTransport<'_, N> {
    fn write(&mut self, mut data: &[u8]) -> Result<(), TransportError> {
        while !data.is_empty() {
            match self.stack.send(self.socket, data) {
                Ok(sent) => data = &data[sent.min(data.len())..],
                Err(nb::Error::WouldBlock) => continue,
                Err(nb::Error::Other(error)) => return Err(map_error(error)),
            }
        }

        Ok(())
    }

    fn read(&mut self, buffer: &mut [u8]) -> nb::Result<usize, TransportError> {
        match self.stack.receive(self.socket, buffer) {
            Ok(0) => Err(nb::Error::WouldBlock),
            Ok(count) => Ok(count),
            Err(nb::Error::WouldBlock) => Err(nb::Error::WouldBlock),
            Err(nb::Error::Other(error)) => Err(nb::Error::Other(map_error(error))),
        }
    }
}

impl<N: TcpClientStack> Debug for NalTransport<'_, N> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("NalTransport").finish_non_exhaustive()
    }
}

fn map_error<E: TcpError>(error: E) -> TransportError {
    warn!(?error, "TCP error");
    match error.kind() {
        TcpErrorKind::PipeClosed => TransportError::Closed,
        _ => TransportError::Io,
    }
}
