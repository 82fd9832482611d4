#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]

use defmt::{error, info};
use embassy_executor::Spawner;
use embassy_time::Instant;
use esp_hal::clock::CpuClock;
use esp_hal::timer::systimer::SystemTimer;
use lora_sensor_node::hal::{self, EspPower, OneShotInput};
use lora_sensor_node::sensors::LightSensor;
use lora_sensor_node::{run_wake_cycle, LIGHT};
use panic_rtt_target as _;

// This creates a default app-descriptor required by the esp-idf bootloader.
esp_bootloader_esp_idf::esp_app_desc!();

#[esp_hal_embassy::main]
async fn main(_spawner: Spawner) {
    rtt_target::rtt_init_defmt!();

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    let timer0 = SystemTimer::new(peripherals.SYSTIMER);
    esp_hal_embassy::init(timer0.alarm0);
    let woke_at = Instant::now();

    info!("LoRa light node (photoresistor)");

    let mut power = EspPower::new(peripherals.LPWR);
    let previous = hal::load_retained();

    let Ok(mut radio) = hal::lora_radio(
        peripherals.SPI2,
        peripherals.GPIO6,
        peripherals.GPIO7,
        peripherals.GPIO2,
        peripherals.GPIO10,
        peripherals.GPIO11,
    ) else {
        error!("SPI configuration rejected, skipping this cycle");
        power.deep_sleep()
    };
    let mut sensor = LightSensor::new(OneShotInput::new(peripherals.ADC1, peripherals.GPIO3));

    let outcome = run_wake_cycle(
        &LIGHT,
        previous,
        &mut sensor,
        &mut radio,
        &mut power,
        hal::mac_address(),
    )
    .await;
    hal::store_retained(outcome.state);

    if let Some(airtime_ms) = radio.last_airtime_ms() {
        info!("packet on air for {} ms", airtime_ms);
    }

    info!("cycle done in {} ms, sent: {}", woke_at.elapsed().as_millis(), outcome.sent);
    power.deep_sleep()
}
