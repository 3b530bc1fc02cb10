//! SPI transport layer abstraction.
//!
//! Defines the `SpiTransport` trait for the duplex byte exchange with the
//! supervisor, allowing different implementations (embedded-hal, mock,
//! simulator).

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Link not ready")]
    NotReady,

    #[error("Exchange failed: {0}")]
    ExchangeFailed(String),

    #[error("Short reply: expected {expected} bytes, got {actual}")]
    ShortReply { expected: usize, actual: usize },

    #[error("Timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("SPI bus error: {0}")]
    Bus(String),
}

/// Abstract duplex exchange with the supervisor.
///
/// One call is one complete bus transaction. The link carries no
/// addressing, so only one transaction may be in flight; `&mut self`
/// enforces that for owned transports.
pub trait SpiTransport {
    /// Clock `request` out and return `reply_len` bytes clocked in.
    ///
    /// `reply_len` is 0 for commands without a reply.
    fn exchange(&mut self, request: &[u8], reply_len: usize) -> Result<Vec<u8>, TransportError>;
}

impl<T: SpiTransport + ?Sized> SpiTransport for &mut T {
    fn exchange(&mut self, request: &[u8], reply_len: usize) -> Result<Vec<u8>, TransportError> {
        (**self).exchange(request, reply_len)
    }
}

impl<T: SpiTransport + ?Sized> SpiTransport for Box<T> {
    fn exchange(&mut self, request: &[u8], reply_len: usize) -> Result<Vec<u8>, TransportError> {
        (**self).exchange(request, reply_len)
    }
}
