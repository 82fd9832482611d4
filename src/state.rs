//! The record that survives deep sleep in RTC memory.

/// Last observed reading plus a marker proving the RTC copy was written by us.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RetainedState {
    magic: u32,
    last_observed: f32,
}

impl RetainedState {
    const MAGIC: u32 = 0x4c6f_5261;

    /// State of a node that has never completed a cycle.
    pub const COLD: Self = Self::new(0.0);

    /// Placeholder for uninitialised storage; never passes [`RetainedState::restore`].
    pub const UNSET: Self = Self {
        magic: 0,
        last_observed: 0.0,
    };

    pub const fn new(last_observed: f32) -> Self {
        Self {
            magic: Self::MAGIC,
            last_observed,
        }
    }

    pub fn last_observed(&self) -> f32 {
        self.last_observed
    }

    pub fn is_valid(&self) -> bool {
        self.magic == Self::MAGIC
    }

    /// Interprets what was found in retained memory at boot.
    ///
    /// Persistent RTC memory holds garbage after power-on, so the stored record is
    /// trusted only when the chip came back from its own deep sleep and the magic
    /// matches. Anything else starts from [`RetainedState::COLD`].
    pub fn restore(stored: Self, woke_from_deep_sleep: bool) -> Self {
        if woke_from_deep_sleep && stored.is_valid() {
            stored
        } else {
            Self::COLD
        }
    }
}

// SAFETY: `repr(C)` over a `u32` and an `f32`: no padding, and every bit
// pattern is a valid value. Garbage left in RTC memory is rejected by `restore`.
#[cfg(feature = "esp32c6")]
unsafe impl esp_hal::Persistable for RetainedState {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cold_boot_starts_at_zero() {
        let restored = RetainedState::restore(RetainedState::new(21.5), false);
        assert_eq!(restored, RetainedState::COLD);
        assert_eq!(restored.last_observed(), 0.0);
    }

    #[test]
    fn wake_keeps_valid_record() {
        let restored = RetainedState::restore(RetainedState::new(21.5), true);
        assert_eq!(restored.last_observed(), 21.5);
    }

    #[test]
    fn wake_rejects_foreign_bytes() {
        let restored = RetainedState::restore(RetainedState::UNSET, true);
        assert_eq!(restored, RetainedState::COLD);
        assert!(!RetainedState::UNSET.is_valid());
    }

    #[test]
    fn layout_has_no_padding() {
        assert_eq!(core::mem::size_of::<RetainedState>(), 8);
        assert_eq!(core::mem::align_of::<RetainedState>(), 4);
    }

    #[test]
    fn garbage_record_is_refused() {
        let garbage = RetainedState {
            magic: 0xdead_beef,
            last_observed: f32::from_bits(0x7fc0_0001),
        };
        assert_eq!(RetainedState::restore(garbage, true), RetainedState::COLD);
        assert_eq!(RetainedState::restore(garbage, false), RetainedState::COLD);
    }
}
