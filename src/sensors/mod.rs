//! Sensor front ends for the three node variants.

mod analog;
mod dht22;

pub use analog::{map_range, AnalogSource, LightSensor, RainClass, RainSensor};
pub use dht22::{Dht22, Dht22Error, Dht22Reading};
