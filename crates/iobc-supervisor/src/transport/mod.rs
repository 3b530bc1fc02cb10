//! Transport layer module.

pub mod mock;
pub mod simulator;
pub mod spi_device;
pub mod traits;

pub use mock::MockTransport;
pub use simulator::{SimulatedSupervisor, SimulatorConfig};
pub use spi_device::SpiDeviceTransport;
pub use traits::{SpiTransport, TransportError};
