//! Supervisor command engine.
//!
//! Each operation is one self-contained bus transaction: encode the
//! request, exchange it, and for queries decode and validate the reply.
//! Nothing is retried here; retry policy belongs to the caller.

use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::events::{FrameDirection, SupervisorEvent, SupervisorObserver, TracingObserver};
use crate::protocol::{
    CommandKind, Crc8, DecodeError, FrameCodec, HousekeepingRecord, TelemetryRecord,
    VersionRecord,
};
use crate::transport::{SimulatorConfig, SpiTransport, TransportError};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SupervisorError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),
}

impl SupervisorError {
    pub fn is_transport(&self) -> bool {
        matches!(self, SupervisorError::Transport(_))
    }

    pub fn is_length_mismatch(&self) -> bool {
        matches!(
            self,
            SupervisorError::Decode(DecodeError::LengthMismatch { .. })
        )
    }

    pub fn is_checksum_mismatch(&self) -> bool {
        matches!(
            self,
            SupervisorError::Decode(DecodeError::ChecksumMismatch { .. })
        )
    }
}

/// Configuration for a supervisor link.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupervisorConfig {
    /// CRC-8 algorithm used on the link.
    pub checksum: Crc8,
    /// Telemetry for the simulated supervisor, when one is used.
    pub simulator: Option<SimulatorConfig>,
}

impl SupervisorConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: SupervisorConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Command engine bound to one transport.
///
/// The engine keeps no state between calls. Callers sharing a bus must
/// serialize access themselves (for example behind a `Mutex`).
pub struct Supervisor<T: SpiTransport, O: SupervisorObserver = TracingObserver> {
    transport: T,
    codec: FrameCodec,
    observer: Arc<O>,
}

impl<T: SpiTransport> Supervisor<T, TracingObserver> {
    /// Create an engine with the default checksum and tracing observer.
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, &SupervisorConfig::default())
    }

    pub fn with_config(transport: T, config: &SupervisorConfig) -> Self {
        Self::with_observer(transport, config, Arc::new(TracingObserver))
    }
}

impl<T: SpiTransport, O: SupervisorObserver> Supervisor<T, O> {
    /// Create an engine with a custom observer.
    pub fn with_observer(transport: T, config: &SupervisorConfig, observer: Arc<O>) -> Self {
        Self {
            transport,
            codec: FrameCodec::new(config.checksum),
            observer,
        }
    }

    pub fn codec(&self) -> &FrameCodec {
        &self.codec
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Release the transport.
    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Reset the supervisor MCU immediately, skipping safe shutdown.
    ///
    /// Prefer [`Supervisor::reset`]. Success only means the transport
    /// accepted the frame; the protocol offers no confirmation.
    #[instrument(skip(self), fields(command = "emergency_reset"))]
    pub fn emergency_reset(&mut self) -> Result<(), SupervisorError> {
        self.fire_and_forget(CommandKind::EmergencyReset)
    }

    /// Controlled reset; the supervisor checks pre-reset conditions itself.
    #[instrument(skip(self), fields(command = "reset"))]
    pub fn reset(&mut self) -> Result<(), SupervisorError> {
        self.fire_and_forget(CommandKind::Reset)
    }

    /// Power-cycle the host for a few seconds. Supervisor power is unaffected.
    #[instrument(skip(self), fields(command = "power_cycle"))]
    pub fn power_cycle(&mut self) -> Result<(), SupervisorError> {
        self.fire_and_forget(CommandKind::PowerCycle)
    }

    /// Read version and configuration.
    #[instrument(skip(self), fields(command = "get_version"))]
    pub fn get_version(&mut self) -> Result<VersionRecord, SupervisorError> {
        match self.query(CommandKind::GetVersion)? {
            TelemetryRecord::Version(record) => Ok(record),
            other => unreachable!("version query decoded as {other:?}"),
        }
    }

    /// Read housekeeping telemetry.
    #[instrument(skip(self), fields(command = "get_housekeeping"))]
    pub fn get_housekeeping(&mut self) -> Result<HousekeepingRecord, SupervisorError> {
        match self.query(CommandKind::GetHousekeeping)? {
            TelemetryRecord::Housekeeping(record) => Ok(record),
            other => unreachable!("housekeeping query decoded as {other:?}"),
        }
    }

    /// Run any command and return its decoded reply, if it has one.
    pub fn execute(&mut self, kind: CommandKind) -> Result<Option<TelemetryRecord>, SupervisorError> {
        if kind.descriptor().is_fire_and_forget() {
            self.fire_and_forget(kind).map(|()| None)
        } else {
            self.query(kind).map(Some)
        }
    }

    fn fire_and_forget(&mut self, kind: CommandKind) -> Result<(), SupervisorError> {
        let result = self.exchange(kind).map(|reply| {
            if !reply.is_empty() {
                debug!(command = %kind, len = reply.len(), "Ignoring reply to fire-and-forget command");
            }
        });
        self.finish(kind, result)
    }

    fn query(&mut self, kind: CommandKind) -> Result<TelemetryRecord, SupervisorError> {
        let result = self.exchange(kind).and_then(|reply| {
            self.emit(SupervisorEvent::Frame {
                command: kind,
                direction: FrameDirection::Rx,
                data: reply.clone(),
            });
            Ok(self.codec.decode_reply(kind, &reply)?)
        });
        self.finish(kind, result)
    }

    fn exchange(&mut self, kind: CommandKind) -> Result<Vec<u8>, SupervisorError> {
        let request = self.codec.encode_request(kind);
        self.emit(SupervisorEvent::Frame {
            command: kind,
            direction: FrameDirection::Tx,
            data: request.clone(),
        });
        Ok(self.transport.exchange(&request, kind.reply_len())?)
    }

    fn finish<R>(
        &self,
        kind: CommandKind,
        result: Result<R, SupervisorError>,
    ) -> Result<R, SupervisorError> {
        match &result {
            Ok(_) => self.emit(SupervisorEvent::CommandCompleted { command: kind }),
            Err(e) => self.emit(SupervisorEvent::CommandFailed {
                command: kind,
                error: e.to_string(),
            }),
        }
        result
    }

    fn emit(&self, event: SupervisorEvent) {
        self.observer.on_event(&event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::testing::RecordingObserver;
    use crate::protocol::compute_crc8;
    use crate::transport::{MockTransport, SimulatedSupervisor};

    fn housekeeping_frame() -> Vec<u8> {
        let mut frame = vec![0x00, 0x00, 0b0000_0101];
        frame.extend_from_slice(&1000u32.to_le_bytes());
        frame.extend_from_slice(&500u32.to_le_bytes());
        frame.extend_from_slice(&2u32.to_le_bytes());
        for sample in 0u16..10 {
            frame.extend_from_slice(&sample.to_le_bytes());
        }
        frame.push(1);
        frame.push(compute_crc8(&frame));
        frame
    }

    #[test]
    fn test_get_housekeeping() {
        let mock = MockTransport::new();
        mock.queue_reply(&housekeeping_frame());
        let mut supervisor = Supervisor::new(mock.clone());

        let hk = supervisor.get_housekeeping().unwrap();
        assert!(hk.enable_status.obc_power());
        assert!(!hk.enable_status.rtc_power());
        assert!(hk.enable_status.supervisor_mode());
        assert_eq!(hk.supervisor_uptime, 1000);
        assert_eq!(hk.iobc_uptime, 500);
        assert_eq!(hk.iobc_reset_count, 2);
        assert_eq!(hk.adc_data, [0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);

        let requests = mock.get_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].len(), 37);
        assert_eq!(requests[0][0], CommandKind::GetHousekeeping.code());
    }

    #[test]
    fn test_get_housekeeping_bad_checksum() {
        let mut frame = housekeeping_frame();
        frame[36] ^= 0xFF;
        let mock = MockTransport::new();
        mock.queue_reply(&frame);
        let mut supervisor = Supervisor::new(mock);

        let err = supervisor.get_housekeeping().unwrap_err();
        assert!(err.is_checksum_mismatch(), "{err}");
    }

    #[test]
    fn test_query_length_mismatch() {
        let mock = MockTransport::new();
        mock.queue_reply(&housekeeping_frame()[..36]);
        let mut supervisor = Supervisor::new(mock);

        let err = supervisor.get_housekeeping().unwrap_err();
        assert!(err.is_length_mismatch(), "{err}");
    }

    #[test]
    fn test_fire_and_forget_needs_no_reply() {
        let mock = MockTransport::new();
        let mut supervisor = Supervisor::new(mock.clone());

        supervisor.emergency_reset().unwrap();
        supervisor.reset().unwrap();
        supervisor.power_cycle().unwrap();

        let requests = mock.get_requests();
        let lengths: Vec<usize> = requests.iter().map(Vec::len).collect();
        assert_eq!(lengths, vec![10, 3, 3]);
        assert_eq!(&requests[0][..9], b"EMERGENCY");
        assert_eq!(mock.pending_replies(), 0);
    }

    #[test]
    fn test_fire_and_forget_ignores_queued_garbage() {
        let mock = MockTransport::new();
        mock.queue_reply(&[0xFF, 0xFF, 0xFF]);
        let mut supervisor = Supervisor::new(mock.clone());

        supervisor.reset().unwrap();
        assert_eq!(mock.pending_replies(), 1);
    }

    #[test]
    fn test_transport_failure_propagates() {
        let mock = MockTransport::new();
        mock.disconnect();
        let mut supervisor = Supervisor::new(mock);

        for kind in CommandKind::ALL {
            let err = supervisor.execute(kind).unwrap_err();
            assert_eq!(err, SupervisorError::Transport(TransportError::NotReady));
            assert!(err.is_transport());
        }
    }

    #[test]
    fn test_missing_reply_is_transport_error() {
        let mut supervisor = Supervisor::new(MockTransport::new());
        let err = supervisor.get_version().unwrap_err();
        assert!(err.is_transport(), "{err}");
    }

    #[test]
    fn test_calls_are_independent() {
        let mock = MockTransport::new();
        let mut bad = housekeeping_frame();
        bad[5] ^= 0x01;
        mock.queue_reply(&bad);
        mock.queue_reply(&housekeeping_frame());
        let mut supervisor = Supervisor::new(mock);

        assert!(supervisor.get_housekeeping().is_err());
        assert_eq!(supervisor.get_housekeeping().unwrap().iobc_uptime, 500);
    }

    #[test]
    fn test_execute_table() {
        let mut supervisor = Supervisor::new(SimulatedSupervisor::default());
        for kind in CommandKind::ALL {
            let reply = supervisor.execute(kind).unwrap();
            assert_eq!(reply.is_none(), kind.descriptor().is_fire_and_forget(), "{kind}");
        }
        assert_eq!(supervisor.transport().exchanges(), 5);
    }

    #[test]
    fn test_against_simulator() {
        let sim = SimulatedSupervisor::new(SimulatorConfig {
            major: 3,
            minor: 2,
            patch: 1,
            ..Default::default()
        });
        let mut supervisor = Supervisor::new(sim);

        assert_eq!(supervisor.get_version().unwrap().version_string(), "3.2.1");
        supervisor.transport_mut().advance(60);
        supervisor.power_cycle().unwrap();

        let hk = supervisor.get_housekeeping().unwrap();
        assert_eq!(hk.iobc_reset_count, 1);
        assert_eq!(hk.iobc_uptime, 0);
        assert_eq!(hk.supervisor_uptime, 60);
    }

    #[test]
    fn test_checksum_config_must_match_link() {
        let sim = SimulatedSupervisor::with_checksum(SimulatorConfig::default(), Crc8::MaximDow);
        let config = SupervisorConfig {
            checksum: Crc8::MaximDow,
            ..Default::default()
        };
        let mut supervisor = Supervisor::with_config(sim, &config);
        assert!(supervisor.get_version().is_ok());
        assert!(supervisor.reset().is_ok());
    }

    #[test]
    fn test_observer_sees_frames() {
        let mock = MockTransport::new();
        mock.queue_reply(&housekeeping_frame());
        let observer = Arc::new(RecordingObserver::default());
        let mut supervisor =
            Supervisor::with_observer(mock, &SupervisorConfig::default(), observer.clone());

        supervisor.get_housekeeping().unwrap();
        supervisor.get_version().unwrap_err();

        let events = observer.events.lock().unwrap();
        assert!(matches!(
            events[0],
            SupervisorEvent::Frame {
                direction: FrameDirection::Tx,
                ..
            }
        ));
        assert!(matches!(
            events[1],
            SupervisorEvent::Frame {
                direction: FrameDirection::Rx,
                ..
            }
        ));
        assert!(matches!(
            events[2],
            SupervisorEvent::CommandCompleted {
                command: CommandKind::GetHousekeeping
            }
        ));
        assert!(matches!(
            events.last(),
            Some(SupervisorEvent::CommandFailed {
                command: CommandKind::GetVersion,
                ..
            })
        ));
    }

    #[test]
    fn test_config_toml_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("supervisor.toml");

        let config = SupervisorConfig {
            checksum: Crc8::SaeJ1850,
            simulator: Some(SimulatorConfig {
                serial_number: 77,
                ..Default::default()
            }),
        };
        config.save_to_file(&path).unwrap();
        let loaded = SupervisorConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_config_defaults() {
        let config: SupervisorConfig = toml::from_str("").unwrap();
        assert_eq!(config.checksum, Crc8::Smbus);
        assert!(config.simulator.is_none());

        let config: SupervisorConfig = toml::from_str("checksum = \"maxim-dow\"").unwrap();
        assert_eq!(config.checksum, Crc8::MaximDow);
    }
}
