//! Per-variant parameters of the wake cycle.

use crate::config::{LIGHT_THRESHOLD, TEMPERATURE_THRESHOLD_C};
use crate::message::ReadingKind;
use crate::novelty::{AbsoluteDifference, ExactMatch, NoveltyPolicy};

/// Point in the cycle where the wake timer and sleep power domains get configured.
///
/// Both are idempotent register writes, so the position does not change behaviour;
/// it only mirrors where each variant has always done it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerArming {
    BeforeSampling,
    BeforeTransmit,
}

#[derive(Debug, Clone, Copy)]
pub struct NodeProfile<N> {
    pub name: &'static str,
    pub kind: ReadingKind,
    pub novelty: N,
    pub timer_arming: TimerArming,
    /// Put the radio to sleep even when nothing was sent and the radio was never initialised.
    pub sleep_radio_on_skip: bool,
}

impl<N: NoveltyPolicy> NodeProfile<N> {
    pub fn is_novel(&self, previous: f32, current: f32) -> bool {
        self.novelty.is_novel(previous, current)
    }
}

/// DHT22 air temperature node.
pub const TEMPERATURE: NodeProfile<AbsoluteDifference> = NodeProfile {
    name: "temperature",
    kind: ReadingKind::Temperature,
    novelty: AbsoluteDifference::new(TEMPERATURE_THRESHOLD_C),
    timer_arming: TimerArming::BeforeTransmit,
    sleep_radio_on_skip: false,
};

/// Photoresistor light node.
pub const LIGHT: NodeProfile<AbsoluteDifference> = NodeProfile {
    name: "light",
    kind: ReadingKind::Light,
    novelty: AbsoluteDifference::new(LIGHT_THRESHOLD),
    timer_arming: TimerArming::BeforeSampling,
    sleep_radio_on_skip: true,
};

/// Raindrop node; reports a class code and transmits on every class change.
pub const RAIN: NodeProfile<ExactMatch> = NodeProfile {
    name: "rain",
    kind: ReadingKind::Rain,
    novelty: ExactMatch,
    timer_arming: TimerArming::BeforeSampling,
    sleep_radio_on_skip: true,
};
