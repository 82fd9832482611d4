use crate::config::{RAIN_CLASS_MAX, RAIN_CLASS_MIN, RAIN_SENSOR_MAX, RAIN_SENSOR_MIN};
use crate::node::Sensor;

/// One-shot analog input returning raw ADC counts.
pub trait AnalogSource {
    type Error: core::fmt::Debug;

    fn read_raw(&mut self) -> Result<u16, Self::Error>;
}

/// Linear rescale with truncating integer division and no clamping.
///
/// Inputs outside `in_min..=in_max` extrapolate past the output range.
pub const fn map_range(value: i32, in_min: i32, in_max: i32, out_min: i32, out_max: i32) -> i32 {
    (value - in_min) * (out_max - out_min) / (in_max - in_min) + out_min
}

/// Photoresistor divider; reports raw counts.
pub struct LightSensor<A> {
    input: A,
}

impl<A: AnalogSource> LightSensor<A> {
    pub fn new(input: A) -> Self {
        Self { input }
    }
}

impl<A: AnalogSource> Sensor for LightSensor<A> {
    type Error = A::Error;

    async fn sample(&mut self) -> Result<f32, Self::Error> {
        let raw = self.input.read_raw()?;
        debug!("light raw={}", raw);
        Ok(f32::from(raw))
    }
}

/// Wetness class of the raindrop board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RainClass {
    Flood,
    RainWarning,
    NotRaining,
    /// Reading outside the calibrated span.
    Unmapped(i32),
}

impl RainClass {
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => RainClass::Flood,
            1 => RainClass::RainWarning,
            2 => RainClass::NotRaining,
            other => RainClass::Unmapped(other),
        }
    }
}

/// Raindrop board; reports the class code rather than raw counts.
pub struct RainSensor<A> {
    input: A,
}

impl<A: AnalogSource> RainSensor<A> {
    pub fn new(input: A) -> Self {
        Self { input }
    }

    pub fn classify(raw: u16) -> i32 {
        map_range(
            i32::from(raw),
            RAIN_SENSOR_MIN,
            RAIN_SENSOR_MAX,
            RAIN_CLASS_MIN,
            RAIN_CLASS_MAX,
        )
    }
}

impl<A: AnalogSource> Sensor for RainSensor<A> {
    type Error = A::Error;

    async fn sample(&mut self) -> Result<f32, Self::Error> {
        let raw = self.input.read_raw()?;
        let code = Self::classify(raw);
        info!("rain raw={} class={:?}", raw, RainClass::from_code(code));
        // Class codes are tiny integers, exactly representable.
        Ok(code as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embassy_futures::block_on;

    struct Fixed(u16);

    impl AnalogSource for Fixed {
        type Error = Infallible;

        fn read_raw(&mut self) -> Result<u16, Infallible> {
            Ok(self.0)
        }
    }

    struct Broken;

    impl AnalogSource for Broken {
        type Error = &'static str;

        fn read_raw(&mut self) -> Result<u16, &'static str> {
            Err("adc busy")
        }
    }

    #[test]
    fn rain_scale_low_end_is_flood() {
        for raw in [0, 1, 300, 599, 600] {
            assert_eq!(RainSensor::<Fixed>::classify(raw), 0, "raw {raw}");
        }
    }

    #[test]
    fn rain_scale_is_not_clamped() {
        assert_eq!(RainSensor::<Fixed>::classify(5000), 3);
        assert_eq!(RainSensor::<Fixed>::classify(9400), 6);
    }

    #[test]
    fn rain_scale_interior() {
        assert_eq!(RainSensor::<Fixed>::classify(2066), 0);
        assert_eq!(RainSensor::<Fixed>::classify(2067), 1);
        assert_eq!(RainSensor::<Fixed>::classify(3534), 2);
        assert_eq!(RainSensor::<Fixed>::classify(4095), 2);
    }

    #[test]
    fn map_range_truncates_towards_zero() {
        assert_eq!(map_range(-100, 600, 5000, 0, 3), 0);
        assert_eq!(map_range(-1000, 600, 5000, 0, 3), -1);
    }

    #[test]
    fn rain_class_labels() {
        assert_eq!(RainClass::from_code(0), RainClass::Flood);
        assert_eq!(RainClass::from_code(1), RainClass::RainWarning);
        assert_eq!(RainClass::from_code(2), RainClass::NotRaining);
        assert_eq!(RainClass::from_code(3), RainClass::Unmapped(3));
    }

    #[test]
    fn sensors_report_in_their_units() {
        assert_eq!(block_on(LightSensor::new(Fixed(200)).sample()), Ok(200.0));
        assert_eq!(block_on(RainSensor::new(Fixed(4000)).sample()), Ok(2.0));
    }

    #[test]
    fn adc_errors_surface() {
        assert_eq!(block_on(LightSensor::new(Broken).sample()), Err("adc busy"));
    }
}
