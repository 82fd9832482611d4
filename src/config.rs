//! Compile-time configuration shared by every node variant.

use core::time::Duration;

/// Time spent in deep sleep between two wake cycles.
pub const SLEEP_DURATION: Duration = Duration::from_secs(10);

/// EU868 ISM carrier.
pub const LORA_FREQUENCY_HZ: u32 = 868_000_000;
/// Output power on the PA_BOOST pin, dBm.
pub const LORA_TX_POWER_DBM: i8 = 13;

/// Minimum temperature change, °C, worth a transmission.
pub const TEMPERATURE_THRESHOLD_C: f32 = 0.2;
/// Minimum change on the raw light ADC scale worth a transmission.
pub const LIGHT_THRESHOLD: f32 = 50.0;

// Raindrop sensor calibration: raw ADC span mapped onto the class scale.
pub const RAIN_SENSOR_MIN: i32 = 600;
pub const RAIN_SENSOR_MAX: i32 = 5000;
pub const RAIN_CLASS_MIN: i32 = 0;
pub const RAIN_CLASS_MAX: i32 = 3;
