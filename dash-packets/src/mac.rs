use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A 48-bit hardware address.
///
/// `Display` renders the canonical form: twelve lowercase hex digits with no separators
/// (`ac63beb2a205`). `FromStr` accepts that form as well as the usual separated and
/// mixed-case spellings (`AC:63:BE:B2:A2:05`, `ac-63-be-b2-a2-05`, `ac63.beb2.a205`), so the
/// two together are the only place an address is normalised.
#[derive(Eq, Clone, Copy, Hash, PartialEq, Ord, PartialOrd)]
pub struct MacAddr {
    pub bytes: [u8; 6],
}

impl MacAddr {
    /// ff:ff:ff:ff:ff:ff
    pub const BROADCAST: MacAddr = MacAddr { bytes: [0xff; 6] };

    pub const fn new(bytes: [u8; 6]) -> MacAddr {
        MacAddr { bytes }
    }

    /// Copies the address out of the first six bytes of `slice`, or returns `None` if the slice
    /// is too short.
    pub fn from_slice(slice: &[u8]) -> Option<MacAddr> {
        let bytes = slice.get(..6)?.try_into().ok()?;
        Some(MacAddr { bytes })
    }

    pub fn is_broadcast(&self) -> bool {
        *self == MacAddr::BROADCAST
    }

    /// The canonical string form, identical to `to_string()`.
    pub fn canonical(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.bytes {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl fmt::Debug for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MacAddr({})", self)
    }
}

/// Why a configured address string could not be turned into a `MacAddr`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddrParseError {
    #[error("invalid character {found:?} in hardware address")]
    InvalidCharacter { found: char },

    #[error("hardware address has {found} hex digits, expected 12")]
    WrongLength { found: usize },
}

const SEPARATORS: [char; 3] = [':', '-', '.'];

impl FromStr for MacAddr {
    type Err = AddrParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 6];
        let mut digits = 0usize;

        for c in s.trim().chars() {
            if SEPARATORS.contains(&c) {
                continue;
            }
            let nibble = c
                .to_digit(16)
                .ok_or(AddrParseError::InvalidCharacter { found: c })? as u8;
            if digits < 12 {
                bytes[digits / 2] |= if digits % 2 == 0 { nibble << 4 } else { nibble };
            }
            digits += 1;
        }

        if digits != 12 {
            return Err(AddrParseError::WrongLength { found: digits });
        }
        Ok(MacAddr { bytes })
    }
}

impl From<[u8; 6]> for MacAddr {
    fn from(bytes: [u8; 6]) -> Self {
        MacAddr { bytes }
    }
}

/// Normalises a hardware address string to its canonical form.
pub fn canonicalize(address: &str) -> Result<String, AddrParseError> {
    address.parse::<MacAddr>().map(|mac| mac.canonical())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_form_ignores_case_and_separators() {
        assert_eq!(canonicalize("AC:63:BE:B2:A2:05").unwrap(), "ac63beb2a205");
        assert_eq!(canonicalize("ac63beb2a205").unwrap(), "ac63beb2a205");
        assert_eq!(canonicalize("ac-63-BE-b2-a2-05").unwrap(), "ac63beb2a205");
        assert_eq!(canonicalize("ac63.beb2.a205").unwrap(), "ac63beb2a205");
    }

    #[test]
    fn canonicalize_is_idempotent() {
        let once = canonicalize("AC:63:BE:B2:A2:05").unwrap();
        assert_eq!(canonicalize(&once).unwrap(), once);
    }

    #[test]
    fn frame_bytes_and_config_strings_agree() {
        let from_frame = MacAddr::from_slice(&[0xac, 0x63, 0xbe, 0xb2, 0xa2, 0x05]).unwrap();
        let from_config: MacAddr = "AC:63:BE:B2:A2:05".parse().unwrap();
        assert_eq!(from_frame, from_config);
        assert_eq!(from_frame.canonical(), from_config.canonical());
    }

    #[test]
    fn leading_zero_octets_keep_their_width() {
        let mac = MacAddr::new([0x00, 0x01, 0x0a, 0x10, 0xff, 0x00]);
        assert_eq!(mac.to_string(), "00010a10ff00");
        assert_eq!("0:1:a:10:ff:0".parse::<MacAddr>().unwrap_err(), AddrParseError::WrongLength { found: 8 });
    }

    #[test]
    fn rejects_bad_addresses() {
        assert_eq!(
            "ac:63:be:b2:a2".parse::<MacAddr>().unwrap_err(),
            AddrParseError::WrongLength { found: 10 }
        );
        assert_eq!(
            "ac:63:be:b2:a2:05:01".parse::<MacAddr>().unwrap_err(),
            AddrParseError::WrongLength { found: 14 }
        );
        assert_eq!(
            "zz:63:be:b2:a2:05".parse::<MacAddr>().unwrap_err(),
            AddrParseError::InvalidCharacter { found: 'z' }
        );
        assert!("".parse::<MacAddr>().is_err());
    }

    #[test]
    fn broadcast() {
        assert!(MacAddr::BROADCAST.is_broadcast());
        assert_eq!(MacAddr::BROADCAST.to_string(), "ffffffffffff");
        assert!(!MacAddr::new([0xff, 0xff, 0xff, 0xff, 0xff, 0xfe]).is_broadcast());
    }

    #[test]
    fn from_slice_needs_six_bytes() {
        assert_eq!(MacAddr::from_slice(&[1, 2, 3, 4, 5]), None);
        assert_eq!(
            MacAddr::from_slice(&[1, 2, 3, 4, 5, 6, 7]),
            Some(MacAddr::new([1, 2, 3, 4, 5, 6]))
        );
    }
}
