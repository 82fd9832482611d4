//! Short sender identity derived from the station MAC address.
//!
//! Each of the six octets contributes a single lowercase hex digit: its low nibble.
//! Two nodes whose MACs differ only in high nibbles therefore collide.

use core::fmt;

pub const IDENTITY_LEN: usize = 6;

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceIdentity([u8; IDENTITY_LEN]);

impl DeviceIdentity {
    pub fn from_mac(mac: [u8; 6]) -> Self {
        Self(mac.map(|octet| HEX_DIGITS[usize::from(octet & 0x0f)]))
    }

    pub fn as_bytes(&self) -> &[u8; IDENTITY_LEN] {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        // Only ever built from HEX_DIGITS.
        core::str::from_utf8(&self.0).unwrap_or_default()
    }
}

impl fmt::Display for DeviceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for DeviceIdentity {
    fn format(&self, f: defmt::Formatter<'_>) {
        defmt::write!(f, "{=str}", self.as_str())
    }
}
