//! CRC-8 checksum used on every supervisor frame.
//!
//! The supervisor appends one CRC byte covering all preceding bytes of a
//! frame. The algorithm is chosen from the `crc` catalogue; SMBus
//! (poly 0x07, init 0x00, no reflection) is the default.

use crc::{CRC_8_MAXIM_DOW, CRC_8_SAE_J1850, CRC_8_SMBUS, Crc};
use serde::{Deserialize, Serialize};

static SMBUS: Crc<u8> = Crc::<u8>::new(&CRC_8_SMBUS);
static MAXIM_DOW: Crc<u8> = Crc::<u8>::new(&CRC_8_MAXIM_DOW);
static SAE_J1850: Crc<u8> = Crc::<u8>::new(&CRC_8_SAE_J1850);

/// CRC-8 variant used on the link.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Crc8 {
    /// Poly 0x07, init 0x00.
    #[default]
    Smbus,
    /// Poly 0x31 reflected (Dallas/Maxim 1-Wire).
    MaximDow,
    /// Poly 0x1D, init 0xFF, xorout 0xFF.
    SaeJ1850,
}

impl Crc8 {
    fn engine(self) -> &'static Crc<u8> {
        match self {
            Crc8::Smbus => &SMBUS,
            Crc8::MaximDow => &MAXIM_DOW,
            Crc8::SaeJ1850 => &SAE_J1850,
        }
    }

    /// Compute the checksum of `bytes`.
    pub fn checksum(self, bytes: &[u8]) -> u8 {
        self.engine().checksum(bytes)
    }

    /// Check a frame whose last byte is the checksum of the rest.
    ///
    /// Returns `(stored, computed)` so callers can report both.
    pub fn split_check(self, frame: &[u8]) -> Option<(u8, u8)> {
        let (&stored, body) = frame.split_last()?;
        Some((stored, self.checksum(body)))
    }

    /// Catalogue check value (CRC of `"123456789"`).
    pub fn check_value(self) -> u8 {
        self.engine().algorithm.check
    }
}

/// Compute the link CRC-8 with the default algorithm.
pub fn compute_crc8(bytes: &[u8]) -> u8 {
    Crc8::default().checksum(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHECK_INPUT: &[u8] = b"123456789";

    #[test]
    fn test_catalogue_check_values() {
        assert_eq!(Crc8::Smbus.checksum(CHECK_INPUT), 0xF4);
        assert_eq!(Crc8::MaximDow.checksum(CHECK_INPUT), 0xA1);
        assert_eq!(Crc8::SaeJ1850.checksum(CHECK_INPUT), 0x4B);

        for variant in [Crc8::Smbus, Crc8::MaximDow, Crc8::SaeJ1850] {
            assert_eq!(variant.checksum(CHECK_INPUT), variant.check_value());
        }
    }

    #[test]
    fn test_default_is_smbus() {
        assert_eq!(compute_crc8(CHECK_INPUT), 0xF4);
        assert_eq!(compute_crc8(&[]), 0x00);
        // Single byte with poly 0x07 and zero init is a plain table lookup.
        assert_eq!(compute_crc8(&[0x01]), 0x07);
    }

    #[test]
    fn test_split_check() {
        let mut frame = vec![0x00, 0x00, 0x05];
        frame.push(compute_crc8(&frame));
        let (stored, computed) = Crc8::Smbus.split_check(&frame).unwrap();
        assert_eq!(stored, computed);

        assert!(Crc8::Smbus.split_check(&[]).is_none());
    }
}
