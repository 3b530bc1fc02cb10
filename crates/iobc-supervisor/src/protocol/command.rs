//! Command descriptors.
//!
//! The link has no framing bytes: the length of every request and reply
//! is implied by the command alone. Each command is described once here
//! and everything else is driven from this table.

use std::fmt;

use serde::Serialize;

use super::constants::*;

/// Shape of the structured reply a query command produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReplyShape {
    Version,
    Housekeeping,
}

impl ReplyShape {
    /// Fixed reply length in bytes, dummy and checksum included.
    pub const fn len(self) -> usize {
        match self {
            ReplyShape::Version => LENGTH_GET_VERSION,
            ReplyShape::Housekeeping => LENGTH_GET_HOUSEKEEPING,
        }
    }
}

/// One of the five supervisor commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CommandKind {
    EmergencyReset,
    Reset,
    PowerCycle,
    GetVersion,
    GetHousekeeping,
}

/// Static description of a command on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandDescriptor {
    pub kind: CommandKind,
    pub code: u8,
    pub request_len: usize,
    pub reply: Option<ReplyShape>,
}

impl CommandDescriptor {
    /// Number of bytes the transport must read back (0 for fire-and-forget).
    pub const fn reply_len(&self) -> usize {
        match self.reply {
            Some(shape) => shape.len(),
            None => 0,
        }
    }

    pub const fn is_fire_and_forget(&self) -> bool {
        self.reply.is_none()
    }
}

static DESCRIPTORS: [CommandDescriptor; 5] = [
    CommandDescriptor {
        kind: CommandKind::EmergencyReset,
        code: CMD_EMERGENCY_RESET,
        request_len: LENGTH_EMERGENCY_RESET,
        reply: None,
    },
    CommandDescriptor {
        kind: CommandKind::Reset,
        code: CMD_RESET,
        request_len: LENGTH_RESET,
        reply: None,
    },
    CommandDescriptor {
        kind: CommandKind::PowerCycle,
        code: CMD_POWER_CYCLE,
        request_len: LENGTH_POWER_CYCLE,
        reply: None,
    },
    CommandDescriptor {
        kind: CommandKind::GetVersion,
        code: CMD_GET_VERSION,
        request_len: LENGTH_GET_VERSION,
        reply: Some(ReplyShape::Version),
    },
    CommandDescriptor {
        kind: CommandKind::GetHousekeeping,
        code: CMD_GET_HOUSEKEEPING,
        request_len: LENGTH_GET_HOUSEKEEPING,
        reply: Some(ReplyShape::Housekeeping),
    },
];

impl CommandKind {
    /// All commands, in descriptor table order.
    pub const ALL: [CommandKind; 5] = [
        CommandKind::EmergencyReset,
        CommandKind::Reset,
        CommandKind::PowerCycle,
        CommandKind::GetVersion,
        CommandKind::GetHousekeeping,
    ];

    pub fn descriptor(self) -> &'static CommandDescriptor {
        match self {
            CommandKind::EmergencyReset => &DESCRIPTORS[0],
            CommandKind::Reset => &DESCRIPTORS[1],
            CommandKind::PowerCycle => &DESCRIPTORS[2],
            CommandKind::GetVersion => &DESCRIPTORS[3],
            CommandKind::GetHousekeeping => &DESCRIPTORS[4],
        }
    }

    /// Look up a command by its first request byte.
    pub fn from_code(code: u8) -> Option<Self> {
        DESCRIPTORS.iter().find(|d| d.code == code).map(|d| d.kind)
    }

    pub fn code(self) -> u8 {
        self.descriptor().code
    }

    pub fn request_len(self) -> usize {
        self.descriptor().request_len
    }

    pub fn reply_len(self) -> usize {
        self.descriptor().reply_len()
    }

    pub const fn name(self) -> &'static str {
        match self {
            CommandKind::EmergencyReset => "emergency_reset",
            CommandKind::Reset => "reset",
            CommandKind::PowerCycle => "power_cycle",
            CommandKind::GetVersion => "get_version",
            CommandKind::GetHousekeeping => "get_housekeeping",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_table() {
        let expected = [
            (CommandKind::EmergencyReset, 10, 0),
            (CommandKind::Reset, 3, 0),
            (CommandKind::PowerCycle, 3, 0),
            (CommandKind::GetVersion, 34, 34),
            (CommandKind::GetHousekeeping, 37, 37),
        ];
        for (kind, request_len, reply_len) in expected {
            let desc = kind.descriptor();
            assert_eq!(desc.kind, kind);
            assert_eq!(desc.request_len, request_len, "{kind}");
            assert_eq!(desc.reply_len(), reply_len, "{kind}");
            assert_eq!(desc.is_fire_and_forget(), reply_len == 0);
        }
    }

    #[test]
    fn test_codes_are_unique() {
        for kind in CommandKind::ALL {
            assert_eq!(CommandKind::from_code(kind.code()), Some(kind));
        }
        assert_eq!(CommandKind::from_code(0x00), None);
    }

    #[test]
    fn test_emergency_code_spells_request() {
        assert_eq!(CMD_EMERGENCY_RESET, b'E');
        assert_eq!(1 + EMERGENCY_RESET_PAYLOAD.len() + 1, LENGTH_EMERGENCY_RESET);
    }
}
