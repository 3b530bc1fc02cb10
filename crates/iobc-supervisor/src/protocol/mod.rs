//! Protocol module - supervisor SPI protocol definitions.

pub mod checksum;
pub mod command;
pub mod constants;
pub mod frame;
pub mod records;

pub use checksum::{Crc8, compute_crc8};
pub use command::{CommandDescriptor, CommandKind, ReplyShape};
pub use frame::{DecodeError, FrameCodec};
pub use records::{
    CommandStatus, EnableStatus, GenericReply, HousekeepingRecord, TelemetryRecord, VersionRecord,
};
