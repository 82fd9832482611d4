// ─────────────────────────────────────────────────────────────────────────────
// ESP32-C6 board support: radio wiring, sensor inputs, RTC-retained state and
// deep sleep.
//
// Wiring:
//   RFM95   SCK GPIO6, MOSI GPIO7, MISO GPIO2, NSS GPIO10, RESET GPIO11 (SPI2)
//   light   ADC1 GPIO3
//   rain    ADC1 GPIO4
//   DHT22   GPIO5, open drain with pull-up
// ─────────────────────────────────────────────────────────────────────────────

use core::ptr::{addr_of, addr_of_mut};
use core::time::Duration;

use embassy_time::Delay;
use embedded_hal_bus::spi::ExclusiveDevice;
use esp_hal::analog::adc::{Adc, AdcChannel, AdcConfig, AdcPin, Attenuation};
use esp_hal::efuse::Efuse;
use esp_hal::gpio::{AnalogPin, DriveMode, Flex, Level, Output, OutputConfig, Pull};
use esp_hal::peripherals::{ADC1, GPIO10, GPIO11, GPIO2, GPIO5, GPIO6, GPIO7, LPWR, SPI2};
use esp_hal::ram;
use esp_hal::rtc_cntl::sleep::TimerWakeupSource;
use esp_hal::rtc_cntl::{wakeup_cause, Rtc, SleepSource};
use esp_hal::spi::master::{Config as SpiConfig, ConfigError, Spi};
use esp_hal::spi::Mode;
use esp_hal::time::Rate;
use esp_hal::{Async, Blocking};

use crate::config::SLEEP_DURATION;
use crate::node::PowerControl;
use crate::radio::Sx127x;
use crate::sensors::AnalogSource;
use crate::state::RetainedState;

const LORA_SPI_FREQUENCY_MHZ: u32 = 1;
/// Conversions finish in microseconds; this only guards against a wedged ADC.
const ADC_POLL_LIMIT: u32 = 10_000;

// ── retained state ──────────────────────────────────────────────────────────

#[ram(rtc_fast, persistent)]
static mut RETAINED: RetainedState = RetainedState::UNSET;

/// Reads back what the previous cycle stored, or the cold-boot state.
pub fn load_retained() -> RetainedState {
    let woke_from_deep_sleep = matches!(wakeup_cause(), SleepSource::Timer);
    // SAFETY: only `main` touches RETAINED, before and after the cycle.
    let stored = unsafe { addr_of!(RETAINED).read_volatile() };
    let state = RetainedState::restore(stored, woke_from_deep_sleep);
    if !woke_from_deep_sleep {
        info!("cold boot, starting from {}", state.last_observed());
    }
    state
}

pub fn store_retained(state: RetainedState) {
    // SAFETY: see `load_retained`.
    unsafe { addr_of_mut!(RETAINED).write_volatile(state) }
}

// ── identity ────────────────────────────────────────────────────────────────

/// Factory base MAC, the same address the Wi-Fi station interface reports.
pub fn mac_address() -> [u8; 6] {
    Efuse::read_base_mac_address()
}

// ── radio ───────────────────────────────────────────────────────────────────

pub type LoraSpi = ExclusiveDevice<Spi<'static, Async>, Output<'static>, Delay>;
pub type LoraRadio = Sx127x<LoraSpi, Output<'static>, Delay>;

pub fn lora_radio(
    spi: SPI2<'static>,
    sck: GPIO6<'static>,
    mosi: GPIO7<'static>,
    miso: GPIO2<'static>,
    nss: GPIO10<'static>,
    reset: GPIO11<'static>,
) -> Result<LoraRadio, ConfigError> {
    let spi_config = SpiConfig::default()
        .with_frequency(Rate::from_mhz(LORA_SPI_FREQUENCY_MHZ))
        .with_mode(Mode::_0);
    let bus = Spi::new(spi, spi_config)?
        .with_sck(sck)
        .with_mosi(mosi)
        .with_miso(miso)
        .into_async();

    let nss = Output::new(nss, Level::High, OutputConfig::default());
    let device = match ExclusiveDevice::new(bus, nss, Delay) {
        Ok(device) => device,
        Err(never) => match never {},
    };
    let reset = Output::new(reset, Level::High, OutputConfig::default());

    Ok(Sx127x::new(device, reset, Delay))
}

// ── sensors ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdcError {
    Timeout,
}

/// ADC1 channel read one conversion at a time, full 0..3.3 V range.
pub struct OneShotInput<PIN> {
    adc: Adc<'static, ADC1<'static>, Blocking>,
    pin: AdcPin<PIN, ADC1<'static>>,
}

impl<PIN> OneShotInput<PIN>
where
    PIN: AdcChannel + AnalogPin,
{
    pub fn new(adc1: ADC1<'static>, pin: PIN) -> Self {
        let mut config = AdcConfig::new();
        let pin = config.enable_pin(pin, Attenuation::_11dB);
        Self {
            adc: Adc::new(adc1, config),
            pin,
        }
    }
}

impl<PIN> AnalogSource for OneShotInput<PIN>
where
    PIN: AdcChannel,
{
    type Error = AdcError;

    fn read_raw(&mut self) -> Result<u16, AdcError> {
        for _ in 0..ADC_POLL_LIMIT {
            if let Ok(raw) = self.adc.read_oneshot(&mut self.pin) {
                return Ok(raw);
            }
        }
        Err(AdcError::Timeout)
    }
}

/// DHT22 data line: open drain, pulled up, released.
pub fn dht22_line(pin: GPIO5<'static>) -> Flex<'static> {
    let mut line = Flex::new(pin);
    line.apply_output_config(
        &OutputConfig::default()
            .with_drive_mode(DriveMode::OpenDrain)
            .with_pull(Pull::Up),
    );
    line.set_high();
    line.set_output_enable(true);
    line.set_input_enable(true);
    line
}

// ── power ───────────────────────────────────────────────────────────────────

pub struct EspPower {
    rtc: Rtc<'static>,
    wake_after: Duration,
    peripherals_off: bool,
}

impl EspPower {
    pub fn new(lpwr: LPWR<'static>) -> Self {
        Self {
            rtc: Rtc::new(lpwr),
            wake_after: SLEEP_DURATION,
            peripherals_off: false,
        }
    }

    /// Enters deep sleep with the timer wake source. The next wake is a reset.
    pub fn deep_sleep(mut self) -> ! {
        info!(
            "going to sleep for {} ms, peripheral domain off: {}",
            self.wake_after.as_millis() as u64,
            self.peripherals_off
        );
        let timer = TimerWakeupSource::new(self.wake_after);
        self.rtc.sleep_deep(&[&timer])
    }
}

impl PowerControl for EspPower {
    fn arm_wake_timer(&mut self, after: Duration) {
        self.wake_after = after;
    }

    fn power_down_peripherals(&mut self) {
        // On the C6, `Rtc::sleep_deep` builds `RtcSleepConfig::deep()`, and its
        // `apply` sets `pd_lp_periph` for every deep sleep. The LP peripheral
        // domain is therefore always off; this only records the request.
        self.peripherals_off = true;
    }
}
