#![cfg_attr(not(test), no_std)]
#![allow(async_fn_in_trait)]

// fmt must stay first so its macros are visible to every module below.
#[macro_use]
mod fmt;

pub mod config;
pub mod cycle;
pub mod identity;
pub mod message;
pub mod node;
pub mod novelty;
pub mod profile;
pub mod radio;
pub mod sensors;
pub mod state;

#[cfg(feature = "esp32c6")]
pub mod hal;

pub use cycle::{decide, Action, Decision};
pub use identity::DeviceIdentity;
pub use message::{NodeClass, ReadingKind, SensorMessage, MESSAGE_LEN};
pub use node::{run_wake_cycle, CycleOutcome, PowerControl, Radio, Sensor};
pub use profile::{NodeProfile, TimerArming, LIGHT, RAIN, TEMPERATURE};
pub use state::RetainedState;
