//! The fixed 12-byte record a sensor node puts on air.
//!
//! Layout, no padding:
//!
//! | offset | size | field                                   |
//! |--------|------|-----------------------------------------|
//! | 0      | 1    | node class tag (`b'l'`)                 |
//! | 1      | 1    | reading kind tag (`b't'`, `b'l'`, `b'r'`) |
//! | 2      | 4    | reading, `f32` little-endian            |
//! | 6      | 6    | device identity, ASCII hex              |

use crate::identity::{DeviceIdentity, IDENTITY_LEN};

pub const MESSAGE_LEN: usize = 2 + 4 + IDENTITY_LEN;

/// Role of the sender in the receiver's topology. Every node in this firmware is a leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NodeClass {
    Leaf,
}

impl NodeClass {
    pub const fn tag(self) -> u8 {
        match self {
            NodeClass::Leaf => b'l',
        }
    }
}

/// What the value field measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReadingKind {
    /// Degrees Celsius.
    Temperature,
    /// Raw photoresistor ADC counts.
    Light,
    /// Rain class code, see [`crate::sensors::RainClass`].
    Rain,
}

impl ReadingKind {
    pub const fn tag(self) -> u8 {
        match self {
            ReadingKind::Temperature => b't',
            ReadingKind::Light => b'l',
            ReadingKind::Rain => b'r',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorMessage {
    pub node_class: NodeClass,
    pub kind: ReadingKind,
    pub value: f32,
    pub identity: DeviceIdentity,
}

impl SensorMessage {
    pub fn new(kind: ReadingKind, value: f32, identity: DeviceIdentity) -> Self {
        Self {
            node_class: NodeClass::Leaf,
            kind,
            value,
            identity,
        }
    }

    /// Byte image as sent over the radio.
    ///
    /// The value is little-endian, the native order of every target this firmware
    /// runs on, so receivers that reinterpret the packed record keep working.
    pub fn to_bytes(&self) -> [u8; MESSAGE_LEN] {
        let mut buf = [0u8; MESSAGE_LEN];
        buf[0] = self.node_class.tag();
        buf[1] = self.kind.tag();
        buf[2..6].copy_from_slice(&self.value.to_le_bytes());
        buf[6..].copy_from_slice(self.identity.as_bytes());
        buf
    }
}
