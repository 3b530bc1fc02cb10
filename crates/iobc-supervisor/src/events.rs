//! Event system for UI decoupling.
//!
//! Allows the CLI or flight software to observe supervisor traffic
//! without coupling to the engine.

use std::fmt;

use crate::protocol::CommandKind;

/// Frame direction on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameDirection {
    Tx, // Host -> Supervisor
    Rx, // Supervisor -> Host
}

impl fmt::Display for FrameDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameDirection::Tx => write!(f, "TX"),
            FrameDirection::Rx => write!(f, "RX"),
        }
    }
}

/// Events emitted by the command engine.
#[derive(Debug, Clone)]
pub enum SupervisorEvent {
    /// Frame sent or received.
    Frame {
        command: CommandKind,
        direction: FrameDirection,
        data: Vec<u8>,
    },
    /// Command finished successfully.
    CommandCompleted { command: CommandKind },
    /// Command failed.
    CommandFailed { command: CommandKind, error: String },
}

/// Observer trait for receiving supervisor events.
pub trait SupervisorObserver: Send + Sync {
    /// Called when an event occurs.
    fn on_event(&self, event: &SupervisorEvent);
}

/// No-op observer that discards all events.
pub struct NullObserver;

impl SupervisorObserver for NullObserver {
    fn on_event(&self, _event: &SupervisorEvent) {}
}

/// Observer that logs events using tracing.
pub struct TracingObserver;

impl SupervisorObserver for TracingObserver {
    fn on_event(&self, event: &SupervisorEvent) {
        match event {
            SupervisorEvent::Frame {
                command,
                direction,
                data,
            } => {
                tracing::trace!(
                    command = %command,
                    dir = %direction,
                    len = data.len(),
                    data = ?data,
                    "SPI frame"
                );
            }
            SupervisorEvent::CommandCompleted { command } => {
                tracing::debug!(command = %command, "Command complete");
            }
            SupervisorEvent::CommandFailed { command, error } => {
                tracing::warn!(command = %command, "Command failed: {}", error);
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::*;

    /// Observer that keeps every event for inspection.
    #[derive(Default)]
    pub struct RecordingObserver {
        pub events: Mutex<Vec<SupervisorEvent>>,
    }

    impl SupervisorObserver for RecordingObserver {
        fn on_event(&self, event: &SupervisorEvent) {
            self.events.lock().unwrap().push(event.clone());
        }
    }
}
