//! Bit-banged DHT22 / AM2302 driver.
//!
//! The sensor answers a host start pulse with 40 bits, each a ~50 µs low pulse
//! followed by a high pulse of ~26 µs (0) or ~70 µs (1). Pulses are measured in
//! polling ticks rather than microseconds and every bit is decided by comparing its
//! high pulse with the low pulse before it, so loop overhead cancels out.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::node::Sensor;

/// Host start pulse; the datasheet asks for at least 1 ms.
const START_LOW_US: u32 = 1_100;
/// Upper bound on any single pulse, in polling ticks.
const PULSE_TIMEOUT_TICKS: u32 = 1_000;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Dht22Reading {
    /// °C
    pub temperature: f32,
    /// %RH
    pub humidity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Dht22Error {
    /// The GPIO refused a read or write.
    Pin,
    /// The line stopped toggling mid-frame, or the sensor never answered.
    Timeout,
    Checksum { expected: u8, actual: u8 },
}

/// `P` must be an open-drain line with a pull-up: driving it high releases it.
pub struct Dht22<P, D> {
    pin: P,
    delay: D,
}

impl<P, D> Dht22<P, D>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    pub fn new(pin: P, delay: D) -> Self {
        Self { pin, delay }
    }

    pub fn read(&mut self) -> Result<Dht22Reading, Dht22Error> {
        self.pin.set_low().map_err(|_| Dht22Error::Pin)?;
        self.delay.delay_us(START_LOW_US);

        let frame = critical_section::with(|_| self.read_frame())?;
        decode(frame)
    }

    fn read_frame(&mut self) -> Result<[u8; 5], Dht22Error> {
        self.pin.set_high().map_err(|_| Dht22Error::Pin)?;

        // Pull-up until the sensor answers, then its 80 µs low / 80 µs high preamble.
        self.pulse(true)?;
        self.pulse(false)?;
        self.pulse(true)?;

        let mut frame = [0u8; 5];
        for bit in 0..40 {
            let low = self.pulse(false)?;
            let high = self.pulse(true)?;
            if high > low {
                frame[bit / 8] |= 0x80 >> (bit % 8);
            }
        }
        Ok(frame)
    }

    /// Ticks spent while the line stays at `level`.
    fn pulse(&mut self, level: bool) -> Result<u32, Dht22Error> {
        let mut ticks = 0;
        while self.pin.is_high().map_err(|_| Dht22Error::Pin)? == level {
            ticks += 1;
            if ticks > PULSE_TIMEOUT_TICKS {
                return Err(Dht22Error::Timeout);
            }
            self.delay.delay_us(1);
        }
        Ok(ticks)
    }
}

/// Checks and scales a raw 5-byte frame.
pub fn decode(frame: [u8; 5]) -> Result<Dht22Reading, Dht22Error> {
    let actual = frame[..4].iter().fold(0u8, |sum, b| sum.wrapping_add(*b));
    if actual != frame[4] {
        return Err(Dht22Error::Checksum {
            expected: frame[4],
            actual,
        });
    }

    let humidity = f32::from(u16::from_be_bytes([frame[0], frame[1]])) / 10.0;
    let magnitude = f32::from(u16::from_be_bytes([frame[2] & 0x7f, frame[3]])) / 10.0;
    let temperature = if frame[2] & 0x80 != 0 {
        -magnitude
    } else {
        magnitude
    };

    Ok(Dht22Reading {
        temperature,
        humidity,
    })
}

impl<P, D> Sensor for Dht22<P, D>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    type Error = Dht22Error;

    async fn sample(&mut self) -> Result<f32, Dht22Error> {
        let reading = self.read()?;
        info!("temperature={} humidity={}", reading.temperature, reading.humidity);
        Ok(reading.temperature)
    }
}
