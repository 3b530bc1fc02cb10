//! iobc-supervisor: command/response engine for the iOBC supervisor controller.
//!
//! The supervisor is a small coprocessor that manages power, reset and
//! watchdog functions for the on-board computer. It is reached over a
//! synchronous SPI link with fixed-length frames, no framing bytes and no
//! addressing beyond the command code.
//!
//! # Architecture
//!
//! The crate is organized into layers:
//!
//! - **Protocol**: Constants, CRC-8, command descriptors, typed records, frame codec
//! - **Transport**: Duplex exchange abstraction (embedded-hal, mock, simulator)
//! - **Events**: Observer pattern for UI decoupling
//! - **Supervisor**: The command engine exposing the five operations
//!
//! # Example
//!
//! ```no_run
//! use iobc_supervisor::{SimulatedSupervisor, Supervisor};
//!
//! let mut supervisor = Supervisor::new(SimulatedSupervisor::default());
//! let hk = supervisor.get_housekeeping().expect("housekeeping failed");
//! println!("host uptime: {}s", hk.iobc_uptime);
//! ```

pub mod events;
pub mod protocol;
pub mod supervisor;
pub mod transport;

// Re-exports for convenience
pub use events::{FrameDirection, NullObserver, SupervisorEvent, SupervisorObserver, TracingObserver};
pub use protocol::{
    CommandKind, CommandStatus, Crc8, DecodeError, EnableStatus, FrameCodec, GenericReply,
    HousekeepingRecord, TelemetryRecord, VersionRecord, compute_crc8,
};
pub use supervisor::{Supervisor, SupervisorConfig, SupervisorError};
pub use transport::{
    MockTransport, SimulatedSupervisor, SimulatorConfig, SpiDeviceTransport, SpiTransport,
    TransportError,
};
