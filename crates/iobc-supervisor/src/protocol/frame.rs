//! Frame codec: request encoding and reply decoding.
//!
//! Every frame has a fixed length implied by its command. Replies start with
//! a dummy byte and end with a CRC-8 over everything before it. Decoding is
//! all or nothing: a frame with the wrong length or a bad checksum yields a
//! single error and no partial record.

use byteorder::{ByteOrder, LittleEndian};
use thiserror::Error;
use tracing::trace;

use super::checksum::Crc8;
use super::command::{CommandKind, ReplyShape};
use super::constants::*;
use super::records::{
    CommandStatus, EnableStatus, GenericReply, HousekeepingRecord, TelemetryRecord, VersionRecord,
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("{command}: reply length mismatch: expected {expected}, got {actual}")]
    LengthMismatch {
        command: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("{command}: checksum mismatch: frame carries 0x{actual:02X}, computed 0x{expected:02X}")]
    ChecksumMismatch {
        command: &'static str,
        expected: u8,
        actual: u8,
    },

    #[error("{command} has no reply to decode")]
    NoReply { command: &'static str },
}

/// Encodes requests and decodes replies for one link configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameCodec {
    crc: Crc8,
}

impl FrameCodec {
    pub fn new(crc: Crc8) -> Self {
        Self { crc }
    }

    pub fn crc(&self) -> Crc8 {
        self.crc
    }

    /// Build the fixed-length request frame for `kind`.
    pub fn encode_request(&self, kind: CommandKind) -> Vec<u8> {
        let desc = kind.descriptor();
        let mut frame = vec![0u8; desc.request_len];
        frame[0] = desc.code;

        match kind {
            CommandKind::EmergencyReset => {
                let end = 1 + EMERGENCY_RESET_PAYLOAD.len();
                frame[1..end].copy_from_slice(EMERGENCY_RESET_PAYLOAD);
                self.seal(&mut frame);
            }
            CommandKind::Reset | CommandKind::PowerCycle => self.seal(&mut frame),
            // Query requests carry only the command byte; the rest is filler
            // clocked out while the reply is shifted in.
            CommandKind::GetVersion | CommandKind::GetHousekeeping => {}
        }

        trace!(command = %kind, frame = ?frame, "Encoded request");
        frame
    }

    /// Decode and validate the reply to a query command.
    pub fn decode_reply(
        &self,
        kind: CommandKind,
        bytes: &[u8],
    ) -> Result<TelemetryRecord, DecodeError> {
        let shape = kind.descriptor().reply.ok_or(DecodeError::NoReply {
            command: kind.name(),
        })?;
        self.validate(kind.name(), shape.len(), bytes)?;

        let record = match shape {
            ReplyShape::Version => TelemetryRecord::Version(parse_version(bytes)),
            ReplyShape::Housekeeping => TelemetryRecord::Housekeeping(parse_housekeeping(bytes)),
        };
        Ok(record)
    }

    /// Decode the three-byte generic reply.
    pub fn decode_generic_reply(&self, bytes: &[u8]) -> Result<GenericReply, DecodeError> {
        self.validate("generic_reply", LENGTH_GENERIC_REPLY, bytes)?;
        Ok(GenericReply {
            command_status: CommandStatus(bytes[OFFSET_COMMAND_STATUS]),
        })
    }

    /// Build a well-formed reply frame for `record`, dummy byte and CRC included.
    pub fn encode_reply(&self, record: &TelemetryRecord) -> Vec<u8> {
        let mut frame = match record {
            TelemetryRecord::Generic(r) => {
                let mut frame = vec![0u8; LENGTH_GENERIC_REPLY];
                frame[OFFSET_COMMAND_STATUS] = r.command_status.raw();
                frame
            }
            TelemetryRecord::Version(r) => write_version(r),
            TelemetryRecord::Housekeeping(r) => write_housekeeping(r),
        };
        frame[OFFSET_DUMMY] = DUMMY_BYTE;
        self.seal(&mut frame);
        frame
    }

    fn validate(
        &self,
        command: &'static str,
        expected_len: usize,
        bytes: &[u8],
    ) -> Result<(), DecodeError> {
        if bytes.len() != expected_len {
            return Err(DecodeError::LengthMismatch {
                command,
                expected: expected_len,
                actual: bytes.len(),
            });
        }
        // Length is non-zero here, so split_check always yields a pair.
        if let Some((stored, computed)) = self.crc.split_check(bytes)
            && stored != computed
        {
            return Err(DecodeError::ChecksumMismatch {
                command,
                expected: computed,
                actual: stored,
            });
        }
        Ok(())
    }

    /// Overwrite the last byte with the CRC of the preceding ones.
    fn seal(&self, frame: &mut [u8]) {
        if let Some((last, body)) = frame.split_last_mut() {
            *last = self.crc.checksum(body);
        }
    }
}

fn parse_version(bytes: &[u8]) -> VersionRecord {
    let mut compile_information = [0u8; LENGTH_COMPILE_INFORMATION];
    compile_information.copy_from_slice(
        &bytes[VERSION_OFFSET_COMPILE_INFORMATION
            ..VERSION_OFFSET_COMPILE_INFORMATION + LENGTH_COMPILE_INFORMATION],
    );

    VersionRecord {
        command_status: CommandStatus(bytes[OFFSET_COMMAND_STATUS]),
        subsystem_index: bytes[VERSION_OFFSET_SUBSYSTEM_INDEX],
        major: bytes[VERSION_OFFSET_MAJOR],
        minor: bytes[VERSION_OFFSET_MAJOR + 1],
        patch: bytes[VERSION_OFFSET_MAJOR + 2],
        git_head: LittleEndian::read_u32(&bytes[VERSION_OFFSET_GIT_HEAD..]),
        serial_number: LittleEndian::read_u16(&bytes[VERSION_OFFSET_SERIAL_NUMBER..]),
        compile_information,
        clock_speed: bytes[VERSION_OFFSET_CLOCK_SPEED],
        code_type: bytes[VERSION_OFFSET_CODE_TYPE],
    }
}

fn parse_housekeeping(bytes: &[u8]) -> HousekeepingRecord {
    let mut adc_data = [0u16; ADC_CHANNEL_COUNT];
    LittleEndian::read_u16_into(
        &bytes[HK_OFFSET_ADC_DATA..HK_OFFSET_ADC_DATA + ADC_CHANNEL_COUNT * 2],
        &mut adc_data,
    );

    HousekeepingRecord {
        command_status: CommandStatus(bytes[OFFSET_COMMAND_STATUS]),
        enable_status: EnableStatus::from_raw(bytes[HK_OFFSET_ENABLE_STATUS]),
        supervisor_uptime: LittleEndian::read_u32(&bytes[HK_OFFSET_SUPERVISOR_UPTIME..]),
        iobc_uptime: LittleEndian::read_u32(&bytes[HK_OFFSET_IOBC_UPTIME..]),
        iobc_reset_count: LittleEndian::read_u32(&bytes[HK_OFFSET_IOBC_RESET_COUNT..]),
        adc_data,
        adc_update_flag: bytes[HK_OFFSET_ADC_UPDATE_FLAG],
    }
}

fn write_version(r: &VersionRecord) -> Vec<u8> {
    let mut frame = vec![0u8; LENGTH_GET_VERSION];
    frame[OFFSET_COMMAND_STATUS] = r.command_status.raw();
    frame[VERSION_OFFSET_SUBSYSTEM_INDEX] = r.subsystem_index;
    frame[VERSION_OFFSET_MAJOR] = r.major;
    frame[VERSION_OFFSET_MAJOR + 1] = r.minor;
    frame[VERSION_OFFSET_MAJOR + 2] = r.patch;
    LittleEndian::write_u32(&mut frame[VERSION_OFFSET_GIT_HEAD..], r.git_head);
    LittleEndian::write_u16(&mut frame[VERSION_OFFSET_SERIAL_NUMBER..], r.serial_number);
    frame[VERSION_OFFSET_COMPILE_INFORMATION
        ..VERSION_OFFSET_COMPILE_INFORMATION + LENGTH_COMPILE_INFORMATION]
        .copy_from_slice(&r.compile_information);
    frame[VERSION_OFFSET_CLOCK_SPEED] = r.clock_speed;
    frame[VERSION_OFFSET_CODE_TYPE] = r.code_type;
    frame
}

fn write_housekeeping(r: &HousekeepingRecord) -> Vec<u8> {
    let mut frame = vec![0u8; LENGTH_GET_HOUSEKEEPING];
    frame[OFFSET_COMMAND_STATUS] = r.command_status.raw();
    frame[HK_OFFSET_ENABLE_STATUS] = r.enable_status.raw();
    LittleEndian::write_u32(&mut frame[HK_OFFSET_SUPERVISOR_UPTIME..], r.supervisor_uptime);
    LittleEndian::write_u32(&mut frame[HK_OFFSET_IOBC_UPTIME..], r.iobc_uptime);
    LittleEndian::write_u32(&mut frame[HK_OFFSET_IOBC_RESET_COUNT..], r.iobc_reset_count);
    LittleEndian::write_u16_into(
        &r.adc_data,
        &mut frame[HK_OFFSET_ADC_DATA..HK_OFFSET_ADC_DATA + ADC_CHANNEL_COUNT * 2],
    );
    frame[HK_OFFSET_ADC_UPDATE_FLAG] = r.adc_update_flag;
    frame
}
