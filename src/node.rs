//! Wake-sample-decide-send sequence over abstract collaborators.
//!
//! [`run_wake_cycle`] does everything a node does between waking up and going back
//! to sleep, except the deep-sleep entry itself: that call never returns, so the
//! board entry point makes it after storing [`CycleOutcome::state`].
//!
//! No failure aborts the cycle. Each one is logged and the sequence carries on
//! towards sleep, so a bad cycle never costs the next one.

use core::fmt::Debug;
use core::time::Duration;

use crate::config::{LORA_FREQUENCY_HZ, LORA_TX_POWER_DBM, SLEEP_DURATION};
use crate::cycle::{decide, Action};
use crate::fmt::Debug2Format;
use crate::novelty::NoveltyPolicy;
use crate::profile::{NodeProfile, TimerArming};
use crate::state::RetainedState;

/// Source of one reading per cycle, in the unit the node reports.
pub trait Sensor {
    type Error: Debug;

    async fn sample(&mut self) -> Result<f32, Self::Error>;
}

/// Long-range transceiver, used fire-and-forget.
pub trait Radio {
    type Error: Debug;

    async fn init(&mut self) -> Result<(), Self::Error>;
    async fn set_frequency(&mut self, frequency_hz: u32) -> Result<(), Self::Error>;
    async fn set_tx_power(&mut self, dbm: i8) -> Result<(), Self::Error>;
    /// Sends one packet. Returns once the radio reports it on air or gives up.
    async fn send(&mut self, payload: &[u8]) -> Result<(), Self::Error>;
    async fn sleep(&mut self) -> Result<(), Self::Error>;
}

/// Sleep configuration that must be in place before deep-sleep entry.
pub trait PowerControl {
    fn arm_wake_timer(&mut self, after: Duration);
    fn power_down_peripherals(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CycleOutcome {
    /// To be written back to retained memory.
    pub state: RetainedState,
    pub reading: f32,
    pub action: Action,
    /// The radio accepted the packet and reported it sent.
    pub sent: bool,
}

pub async fn run_wake_cycle<N, S, R, P>(
    profile: &NodeProfile<N>,
    previous: RetainedState,
    sensor: &mut S,
    radio: &mut R,
    power: &mut P,
    mac: [u8; 6],
) -> CycleOutcome
where
    N: NoveltyPolicy,
    S: Sensor,
    R: Radio,
    P: PowerControl,
{
    info!("{} node awake, last observed {}", profile.name, previous.last_observed());

    if profile.timer_arming == TimerArming::BeforeSampling {
        configure_sleep(power);
    }

    let reading = match sensor.sample().await {
        Ok(value) => value,
        Err(e) => {
            warn!("sensor read failed: {:?}", Debug2Format(&e));
            f32::NAN
        }
    };

    let decision = decide(profile, previous, reading, mac);
    info!(
        "new={} old={} diff={}",
        reading,
        previous.last_observed(),
        (reading - previous.last_observed()).abs()
    );

    let sent = match decision.action {
        Action::Skip => {
            info!("reading unchanged, not transmitting");
            if profile.timer_arming == TimerArming::BeforeTransmit {
                configure_sleep(power);
            }
            if profile.sleep_radio_on_skip {
                sleep_radio(radio).await;
            }
            false
        }
        Action::Transmit(message) => {
            if let Err(e) = radio.init().await {
                warn!("radio init failed: {:?}", Debug2Format(&e));
            }
            if let Err(e) = radio.set_frequency(LORA_FREQUENCY_HZ).await {
                warn!("radio frequency not applied: {:?}", Debug2Format(&e));
            }
            if let Err(e) = radio.set_tx_power(LORA_TX_POWER_DBM).await {
                warn!("radio power not applied: {:?}", Debug2Format(&e));
            }

            if profile.timer_arming == TimerArming::BeforeTransmit {
                configure_sleep(power);
            }

            let result = match radio.send(&message.to_bytes()).await {
                Ok(()) => {
                    info!(
                        "sent class={:?} kind={:?} value={} device={}",
                        message.node_class,
                        message.kind,
                        message.value,
                        message.identity
                    );
                    true
                }
                Err(e) => {
                    warn!("send failed: {:?}", Debug2Format(&e));
                    false
                }
            };
            sleep_radio(radio).await;
            result
        }
    };

    CycleOutcome {
        state: decision.state,
        reading,
        action: decision.action,
        sent,
    }
}

fn configure_sleep<P: PowerControl>(power: &mut P) {
    power.arm_wake_timer(SLEEP_DURATION);
    power.power_down_peripherals();
    debug!("wake timer armed for {} s", SLEEP_DURATION.as_secs());
}

async fn sleep_radio<R: Radio>(radio: &mut R) {
    if let Err(e) = radio.sleep().await {
        warn!("radio sleep failed: {:?}", Debug2Format(&e));
    }
}
