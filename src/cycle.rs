//! The decision at the heart of every wake cycle, free of any hardware.

use crate::identity::DeviceIdentity;
use crate::message::SensorMessage;
use crate::novelty::NoveltyPolicy;
use crate::profile::NodeProfile;
use crate::state::RetainedState;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Action {
    Skip,
    Transmit(SensorMessage),
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Decision {
    pub action: Action,
    /// What to write back to retained memory before sleeping.
    pub state: RetainedState,
}

/// Compares `reading` with the last observed value and decides whether to send it.
///
/// The retained value always becomes `reading`, sent or not.
pub fn decide<N: NoveltyPolicy>(
    profile: &NodeProfile<N>,
    previous: RetainedState,
    reading: f32,
    mac: [u8; 6],
) -> Decision {
    let action = if profile.is_novel(previous.last_observed(), reading) {
        Action::Transmit(SensorMessage::new(
            profile.kind,
            reading,
            DeviceIdentity::from_mac(mac),
        ))
    } else {
        Action::Skip
    };

    Decision {
        action,
        state: RetainedState::new(reading),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::ReadingKind;
    use crate::profile::{LIGHT, RAIN, TEMPERATURE};

    const MAC: [u8; 6] = [0x24, 0x0a, 0xc4, 0x1f, 0x3b, 0x9e];

    fn transmitted(decision: &Decision) -> SensorMessage {
        match decision.action {
            Action::Transmit(message) => message,
            Action::Skip => panic!("expected a transmission"),
        }
    }

    #[test]
    fn small_temperature_drift_is_not_sent() {
        let decision = decide(&TEMPERATURE, RetainedState::new(20.0), 20.05, MAC);
        assert_eq!(decision.action, Action::Skip);
        assert_eq!(decision.state.last_observed(), 20.05);
    }

    #[test]
    fn temperature_jump_is_sent() {
        let decision = decide(&TEMPERATURE, RetainedState::new(20.0), 25.0, MAC);
        let message = transmitted(&decision);
        assert_eq!(message.value, 25.0);
        assert_eq!(message.kind, ReadingKind::Temperature);
        assert_eq!(message.to_bytes()[1], b't');
        assert_eq!(decision.state.last_observed(), 25.0);
    }

    #[test]
    fn light_change_over_fifty_is_sent() {
        let decision = decide(&LIGHT, RetainedState::new(100.0), 200.0, MAC);
        let message = transmitted(&decision);
        assert_eq!(message.value, 200.0);
        assert_eq!(message.to_bytes()[1], b'l');
        assert_eq!(decision.state.last_observed(), 200.0);
    }

    #[test]
    fn light_change_under_fifty_is_not_sent() {
        let decision = decide(&LIGHT, RetainedState::new(100.0), 149.0, MAC);
        assert_eq!(decision.action, Action::Skip);
        assert_eq!(decision.state.last_observed(), 149.0);
    }

    #[test]
    fn rain_sends_on_class_change_only() {
        let same = decide(&RAIN, RetainedState::new(2.0), 2.0, MAC);
        assert_eq!(same.action, Action::Skip);
        assert_eq!(same.state.last_observed(), 2.0);

        let changed = decide(&RAIN, RetainedState::new(2.0), 1.0, MAC);
        assert_eq!(transmitted(&changed).to_bytes()[1], b'r');
        assert_eq!(changed.state.last_observed(), 1.0);
    }

    #[test]
    fn first_cycle_after_cold_boot_compares_against_zero() {
        assert_eq!(decide(&TEMPERATURE, RetainedState::COLD, 0.1, MAC).action, Action::Skip);
        assert_eq!(decide(&RAIN, RetainedState::COLD, 0.0, MAC).action, Action::Skip);
        assert!(matches!(
            decide(&LIGHT, RetainedState::COLD, 50.0, MAC).action,
            Action::Transmit(_)
        ));
    }

    #[test]
    fn message_carries_identity_and_leaf_tag() {
        let decision = decide(&TEMPERATURE, RetainedState::COLD, 18.0, MAC);
        let bytes = transmitted(&decision).to_bytes();
        assert_eq!(bytes.len(), 12);
        assert_eq!(bytes[0], b'l');
        assert_eq!(&bytes[6..], b"4a4fbe");
    }

    #[test]
    fn failed_read_is_transmitted_and_retained() {
        let decision = decide(&TEMPERATURE, RetainedState::new(20.0), f32::NAN, MAC);
        assert!(transmitted(&decision).value.is_nan());
        assert!(decision.state.last_observed().is_nan());
    }
}
