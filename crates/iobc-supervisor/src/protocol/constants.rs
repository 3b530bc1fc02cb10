//! Protocol constants for the iOBC supervisor controller SPI link.
//!
//! Lengths and byte offsets follow the supervisor register map. Every
//! multi-byte field on the wire is little-endian.

// ============================================================================
// Command Codes (Host -> Supervisor)
// ============================================================================

/// Emergency reset. The full request spells `EMERGENCY`.
pub const CMD_EMERGENCY_RESET: u8 = b'E';

/// Controlled reset of the host with pre-reset condition checks.
pub const CMD_RESET: u8 = 0xAA;

/// Host power cycle (supervisor power is unaffected).
pub const CMD_POWER_CYCLE: u8 = 0xA0;

/// Version and configuration query.
pub const CMD_GET_VERSION: u8 = 0x50;

/// Housekeeping telemetry query.
pub const CMD_GET_HOUSEKEEPING: u8 = 0x53;

/// Bytes following the command code in an emergency reset request.
pub const EMERGENCY_RESET_PAYLOAD: &[u8] = b"MERGENCY";

// ============================================================================
// Frame Lengths
// ============================================================================

pub const LENGTH_EMERGENCY_RESET: usize = 10;
pub const LENGTH_RESET: usize = 3;
pub const LENGTH_POWER_CYCLE: usize = 3;
pub const LENGTH_GET_VERSION: usize = 34;
pub const LENGTH_GET_HOUSEKEEPING: usize = 37;
pub const LENGTH_GENERIC_REPLY: usize = 3;

/// Length of the compile information string in the version record.
pub const LENGTH_COMPILE_INFORMATION: usize = 19;

/// Number of ADC channels sampled by the supervisor.
pub const ADC_CHANNEL_COUNT: usize = 10;

/// Value clocked out by the supervisor before its first real byte.
pub const DUMMY_BYTE: u8 = 0x00;

// ============================================================================
// Reply Offsets
// ============================================================================

pub const OFFSET_DUMMY: usize = 0;
pub const OFFSET_COMMAND_STATUS: usize = 1;

// Version record
pub const VERSION_OFFSET_SUBSYSTEM_INDEX: usize = 2;
pub const VERSION_OFFSET_MAJOR: usize = 3;
pub const VERSION_OFFSET_GIT_HEAD: usize = 6;
pub const VERSION_OFFSET_SERIAL_NUMBER: usize = 10;
pub const VERSION_OFFSET_COMPILE_INFORMATION: usize = 12;
pub const VERSION_OFFSET_CLOCK_SPEED: usize = 31;
pub const VERSION_OFFSET_CODE_TYPE: usize = 32;

// Housekeeping record
pub const HK_OFFSET_ENABLE_STATUS: usize = 2;
pub const HK_OFFSET_SUPERVISOR_UPTIME: usize = 3;
pub const HK_OFFSET_IOBC_UPTIME: usize = 7;
pub const HK_OFFSET_IOBC_RESET_COUNT: usize = 11;
pub const HK_OFFSET_ADC_DATA: usize = 15;
pub const HK_OFFSET_ADC_UPDATE_FLAG: usize = 35;

// ============================================================================
// Enable Status Bits
// ============================================================================

pub const ENABLE_POWER_OBC: u8 = 1 << 0;
pub const ENABLE_POWER_RTC: u8 = 1 << 1;
pub const ENABLE_SUPERVISOR_MODE: u8 = 1 << 2;
pub const ENABLE_BUSY_RTC: u8 = 1 << 5;
pub const ENABLE_POWEROFF_RTC: u8 = 1 << 6;

/// Command status reported when the supervisor accepted the previous command.
pub const COMMAND_STATUS_OK: u8 = 0x00;
