//! Simulated supervisor controller.
//!
//! Answers every command the way the real controller does on the bus, so
//! the engine and the CLI can be exercised without hardware. Requests are
//! validated byte for byte and resets have their visible effect on the
//! housekeeping counters.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::traits::{SpiTransport, TransportError};
use crate::protocol::constants::*;
use crate::protocol::{
    CommandKind, CommandStatus, Crc8, EnableStatus, FrameCodec, HousekeepingRecord,
    TelemetryRecord, VersionRecord,
};

/// Telemetry reported by the simulated supervisor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    pub subsystem_index: u8,
    pub major: u8,
    pub minor: u8,
    pub patch: u8,
    pub git_head: u32,
    pub serial_number: u16,
    /// Truncated to 19 bytes on the wire.
    pub build_description: String,
    pub clock_speed: u8,
    pub code_type: u8,
    pub enable_status: u8,
    pub supervisor_uptime: u32,
    pub iobc_uptime: u32,
    pub iobc_reset_count: u32,
    pub adc_data: [u16; ADC_CHANNEL_COUNT],
    pub adc_update_flag: u8,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            subsystem_index: 0,
            major: 1,
            minor: 0,
            patch: 0,
            git_head: 0,
            serial_number: 1,
            build_description: "simulated".to_string(),
            clock_speed: 8,
            code_type: 0,
            enable_status: ENABLE_POWER_OBC | ENABLE_POWER_RTC,
            supervisor_uptime: 0,
            iobc_uptime: 0,
            iobc_reset_count: 0,
            adc_data: [0; ADC_CHANNEL_COUNT],
            adc_update_flag: 1,
        }
    }
}

/// In-process stand-in for the supervisor on the SPI bus.
pub struct SimulatedSupervisor {
    config: SimulatorConfig,
    codec: FrameCodec,
    corrupt_remaining: u32,
    exchanges: u64,
}

impl SimulatedSupervisor {
    pub fn new(config: SimulatorConfig) -> Self {
        Self::with_checksum(config, Crc8::default())
    }

    pub fn with_checksum(config: SimulatorConfig, crc: Crc8) -> Self {
        Self {
            config,
            codec: FrameCodec::new(crc),
            corrupt_remaining: 0,
            exchanges: 0,
        }
    }

    /// Current simulated state.
    pub fn state(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Number of exchanges that reached the simulator.
    pub fn exchanges(&self) -> u64 {
        self.exchanges
    }

    /// Age both uptimes by `seconds`.
    pub fn advance(&mut self, seconds: u32) {
        self.config.supervisor_uptime = self.config.supervisor_uptime.wrapping_add(seconds);
        self.config.iobc_uptime = self.config.iobc_uptime.wrapping_add(seconds);
    }

    /// Flip the checksum byte of the next `count` replies.
    pub fn corrupt_next_replies(&mut self, count: u32) {
        self.corrupt_remaining = count;
    }

    fn version_record(&self) -> VersionRecord {
        let mut compile_information = [0u8; LENGTH_COMPILE_INFORMATION];
        let text = self.config.build_description.as_bytes();
        let n = text.len().min(LENGTH_COMPILE_INFORMATION);
        compile_information[..n].copy_from_slice(&text[..n]);

        VersionRecord {
            command_status: CommandStatus(COMMAND_STATUS_OK),
            subsystem_index: self.config.subsystem_index,
            major: self.config.major,
            minor: self.config.minor,
            patch: self.config.patch,
            git_head: self.config.git_head,
            serial_number: self.config.serial_number,
            compile_information,
            clock_speed: self.config.clock_speed,
            code_type: self.config.code_type,
        }
    }

    fn housekeeping_record(&self) -> HousekeepingRecord {
        HousekeepingRecord {
            command_status: CommandStatus(COMMAND_STATUS_OK),
            enable_status: EnableStatus::from_raw(self.config.enable_status),
            supervisor_uptime: self.config.supervisor_uptime,
            iobc_uptime: self.config.iobc_uptime,
            iobc_reset_count: self.config.iobc_reset_count,
            adc_data: self.config.adc_data,
            adc_update_flag: self.config.adc_update_flag,
        }
    }

    fn check_request(&self, kind: CommandKind, request: &[u8]) -> Result<(), TransportError> {
        if request.len() != kind.request_len() {
            return Err(TransportError::Rejected(format!(
                "{kind}: request length {} (expected {})",
                request.len(),
                kind.request_len()
            )));
        }

        match kind {
            CommandKind::EmergencyReset | CommandKind::Reset | CommandKind::PowerCycle => {
                let expected = self.codec.encode_request(kind);
                if request != expected.as_slice() {
                    return Err(TransportError::Rejected(format!(
                        "{kind}: malformed request {request:02X?}"
                    )));
                }
            }
            CommandKind::GetVersion | CommandKind::GetHousekeeping => {}
        }
        Ok(())
    }

    fn host_reset(&mut self, kind: CommandKind) {
        self.config.iobc_uptime = 0;
        self.config.iobc_reset_count = self.config.iobc_reset_count.wrapping_add(1);
        info!(
            command = %kind,
            reset_count = self.config.iobc_reset_count,
            "Simulated host reset"
        );
    }
}

impl Default for SimulatedSupervisor {
    fn default() -> Self {
        Self::new(SimulatorConfig::default())
    }
}

impl SpiTransport for SimulatedSupervisor {
    fn exchange(&mut self, request: &[u8], reply_len: usize) -> Result<Vec<u8>, TransportError> {
        self.exchanges += 1;

        let code = *request
            .first()
            .ok_or_else(|| TransportError::Rejected("empty request".into()))?;
        let kind = CommandKind::from_code(code)
            .ok_or_else(|| TransportError::Rejected(format!("unknown command 0x{code:02X}")))?;
        self.check_request(kind, request)?;
        debug!(command = %kind, reply_len, "Simulator exchange");

        let mut reply = match kind {
            CommandKind::EmergencyReset | CommandKind::Reset | CommandKind::PowerCycle => {
                self.host_reset(kind);
                Vec::new()
            }
            CommandKind::GetVersion => self
                .codec
                .encode_reply(&TelemetryRecord::Version(self.version_record())),
            CommandKind::GetHousekeeping => self
                .codec
                .encode_reply(&TelemetryRecord::Housekeeping(self.housekeeping_record())),
        };

        if !reply.is_empty() && self.corrupt_remaining > 0 {
            self.corrupt_remaining -= 1;
            if let Some(crc) = reply.last_mut() {
                *crc ^= 0xFF;
            }
            warn!(command = %kind, "Injected checksum fault");
        }

        // The bus clocks exactly as many bytes as the master asks for.
        reply.resize(reply_len, 0);
        Ok(reply)
    }
}
