//! embedded-hal SPI device transport.
//!
//! Wraps any `embedded_hal::spi::SpiDevice`. Chip select, clock and mode
//! are the device's business; this adapter only moves bytes.

use embedded_hal::spi::{Error as _, SpiDevice};
use tracing::{debug, instrument};

use super::traits::{SpiTransport, TransportError};

/// Transport over an embedded-hal 1.0 SPI device.
pub struct SpiDeviceTransport<D> {
    device: D,
}

impl<D: SpiDevice> SpiDeviceTransport<D> {
    pub fn new(device: D) -> Self {
        Self { device }
    }

    /// Release the underlying device.
    pub fn into_inner(self) -> D {
        self.device
    }
}

impl<D: SpiDevice> SpiTransport for SpiDeviceTransport<D> {
    #[instrument(level = "trace", skip(self, request), fields(len = request.len()))]
    fn exchange(&mut self, request: &[u8], reply_len: usize) -> Result<Vec<u8>, TransportError> {
        if reply_len == 0 {
            self.device
                .write(request)
                .map_err(|e| TransportError::Bus(format!("{:?}", e.kind())))?;
            debug!(bytes_written = request.len(), "Write complete");
            return Ok(Vec::new());
        }

        // Full duplex: the reply is shifted in while the request is shifted out.
        let mut reply = vec![0u8; reply_len];
        self.device
            .transfer(&mut reply, request)
            .map_err(|e| TransportError::Bus(format!("{:?}", e.kind())))?;
        debug!(bytes_read = reply.len(), "Transfer complete");
        Ok(reply)
    }
}
