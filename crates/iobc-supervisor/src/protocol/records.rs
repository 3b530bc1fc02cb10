//! Typed reply records.
//!
//! Records are built fresh by the frame codec for every reply and never
//! mutated afterwards. The leading dummy byte and the trailing checksum are
//! consumed during decoding and do not appear here.

use std::fmt;

use serde::Serialize;

use super::constants::*;

/// Status of the previously issued command as reported by the supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct CommandStatus(pub u8);

impl CommandStatus {
    pub fn is_ok(&self) -> bool {
        self.0 == COMMAND_STATUS_OK
    }

    pub fn raw(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for CommandStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02X}", self.0)
    }
}

/// Packed enable-status byte from the housekeeping record.
///
/// Reserved bits (3, 4 and 7) are kept in the raw value but carry no
/// meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EnableStatus(u8);

impl EnableStatus {
    pub const fn from_raw(raw: u8) -> Self {
        Self(raw)
    }

    pub const fn raw(&self) -> u8 {
        self.0
    }

    /// Power to the on-board computer.
    pub fn obc_power(&self) -> bool {
        self.0 & ENABLE_POWER_OBC != 0
    }

    /// Output power to the RTC.
    pub fn rtc_power(&self) -> bool {
        self.0 & ENABLE_POWER_RTC != 0
    }

    pub fn supervisor_mode(&self) -> bool {
        self.0 & ENABLE_SUPERVISOR_MODE != 0
    }

    pub fn rtc_busy(&self) -> bool {
        self.0 & ENABLE_BUSY_RTC != 0
    }

    /// RTC power-down in progress.
    pub fn rtc_power_off(&self) -> bool {
        self.0 & ENABLE_POWEROFF_RTC != 0
    }
}

impl Serialize for EnableStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut s = serializer.serialize_struct("EnableStatus", 6)?;
        s.serialize_field("raw", &self.0)?;
        s.serialize_field("obc_power", &self.obc_power())?;
        s.serialize_field("rtc_power", &self.rtc_power())?;
        s.serialize_field("supervisor_mode", &self.supervisor_mode())?;
        s.serialize_field("rtc_busy", &self.rtc_busy())?;
        s.serialize_field("rtc_power_off", &self.rtc_power_off())?;
        s.end()
    }
}

/// Generic three-byte reply: dummy, command status, CRC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GenericReply {
    pub command_status: CommandStatus,
}

/// Supervisor version and configuration (34-byte reply).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionRecord {
    pub command_status: CommandStatus,
    /// Index of the ISIS subsystem.
    pub subsystem_index: u8,
    pub major: u8,
    pub minor: u8,
    pub patch: u8,
    /// Git head revision of the supervisor firmware.
    pub git_head: u32,
    pub serial_number: u16,
    /// Compile time and date, NUL padded.
    pub compile_information: [u8; LENGTH_COMPILE_INFORMATION],
    /// Clock speed in MHz.
    pub clock_speed: u8,
    /// Flight or test build flag, as reported.
    pub code_type: u8,
}

impl VersionRecord {
    /// `major.minor.patch`
    pub fn version_string(&self) -> String {
        format!("{}.{}.{}", self.major, self.minor, self.patch)
    }

    /// Compile information as text, trimmed at the first NUL.
    pub fn build_description(&self) -> String {
        let end = self
            .compile_information
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(LENGTH_COMPILE_INFORMATION);
        String::from_utf8_lossy(&self.compile_information[..end])
            .trim_end()
            .to_string()
    }
}

/// Supervisor housekeeping telemetry (37-byte reply).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HousekeepingRecord {
    pub command_status: CommandStatus,
    pub enable_status: EnableStatus,
    /// Supervisor controller uptime in seconds.
    pub supervisor_uptime: u32,
    /// Host uptime as measured by the supervisor.
    pub iobc_uptime: u32,
    pub iobc_reset_count: u32,
    pub adc_data: [u16; ADC_CHANNEL_COUNT],
    pub adc_update_flag: u8,
}

impl HousekeepingRecord {
    pub fn adc_channel(&self, channel: usize) -> Option<u16> {
        self.adc_data.get(channel).copied()
    }

    pub fn adc_updated(&self) -> bool {
        self.adc_update_flag != 0
    }
}

/// Any decoded reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TelemetryRecord {
    Generic(GenericReply),
    Version(VersionRecord),
    Housekeeping(HousekeepingRecord),
}

impl TelemetryRecord {
    pub fn command_status(&self) -> CommandStatus {
        match self {
            TelemetryRecord::Generic(r) => r.command_status,
            TelemetryRecord::Version(r) => r.command_status,
            TelemetryRecord::Housekeeping(r) => r.command_status,
        }
    }
}
