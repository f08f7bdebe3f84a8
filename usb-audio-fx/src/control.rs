//! Freeze/bypass input sampled once per audio-task iteration.
//!
//! The task calls [`BypassInput::is_active`] before each processed quantum
//! and forwards the level to [`EffectEngine::set_enabled`](crate::engine::EffectEngine::set_enabled).
//! The reverb is heard only while the input is active; the granular effect
//! freezes its capture buffer while it is active.

/// A boolean control level.
pub trait BypassInput {
    /// Current level. Called once per task iteration.
    fn is_active(&mut self) -> bool;
}

impl BypassInput for bool {
    fn is_active(&mut self) -> bool {
        *self
    }
}

impl<I: BypassInput + ?Sized> BypassInput for &mut I {
    fn is_active(&mut self) -> bool {
        (**self).is_active()
    }
}

/// Push-button wired to ground with a pull-up: pressed reads low.
///
/// A pin read error counts as "not pressed".
#[cfg(feature = "button")]
pub struct ActiveLowButton<P> {
    pin: P,
}

#[cfg(feature = "button")]
impl<P: embedded_hal::digital::InputPin> ActiveLowButton<P> {
    /// Wrap a pin already configured as a pulled-up input.
    pub fn new(pin: P) -> Self {
        ActiveLowButton { pin }
    }

    /// Give back the pin.
    pub fn release(self) -> P {
        self.pin
    }
}

#[cfg(feature = "button")]
impl<P: embedded_hal::digital::InputPin> BypassInput for ActiveLowButton<P> {
    fn is_active(&mut self) -> bool {
        self.pin.is_low().unwrap_or(false)
    }
}

/// Counter debouncer: a new level is reported only after `threshold`
/// consecutive reads agree on it.
pub struct Debounced<I> {
    inner: I,
    threshold: u8,
    stable: bool,
    count: u8,
}

impl<I: BypassInput> Debounced<I> {
    /// Debounce `inner`, starting from the inactive level.
    ///
    /// A `threshold` of 0 or 1 passes every change through immediately.
    pub fn new(inner: I, threshold: u8) -> Self {
        Debounced {
            inner,
            threshold: threshold.max(1),
            stable: false,
            count: 0,
        }
    }

    /// The wrapped input.
    pub fn inner_mut(&mut self) -> &mut I {
        &mut self.inner
    }
}

impl<I: BypassInput> BypassInput for Debounced<I> {
    fn is_active(&mut self) -> bool {
        if self.inner.is_active() == self.stable {
            self.count = 0;
        } else {
            self.count += 1;
            if self.count >= self.threshold {
                self.stable = !self.stable;
                self.count = 0;
            }
        }
        self.stable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Plays back a scripted sequence of levels, then holds the last one.
    struct Script<'a> {
        levels: &'a [bool],
        pos: usize,
    }

    impl BypassInput for Script<'_> {
        fn is_active(&mut self) -> bool {
            let level = self.levels[self.pos.min(self.levels.len() - 1)];
            self.pos += 1;
            level
        }
    }

    #[test]
    fn bool_is_its_own_level() {
        let mut on = true;
        let mut off = false;
        assert!(on.is_active());
        assert!(!off.is_active());
    }

    #[test]
    fn debounce_rejects_glitches() {
        let levels = [false, true, false, true, true, false, false, false];
        let mut input = Debounced::new(Script { levels: &levels, pos: 0 }, 3);
        let seen: [bool; 8] = core::array::from_fn(|_| input.is_active());
        assert_eq!(seen, [false; 8]);
    }

    #[test]
    fn debounce_follows_stable_change() {
        let levels = [true, true, true, true, false, false, false];
        let mut input = Debounced::new(Script { levels: &levels, pos: 0 }, 3);
        let seen: [bool; 7] = core::array::from_fn(|_| input.is_active());
        assert_eq!(seen, [false, false, true, true, true, true, false]);
    }

    #[test]
    fn zero_threshold_passes_through() {
        let levels = [true, false, true];
        let mut input = Debounced::new(Script { levels: &levels, pos: 0 }, 0);
        let seen: [bool; 3] = core::array::from_fn(|_| input.is_active());
        assert_eq!(seen, levels);
    }

    #[cfg(feature = "button")]
    mod button {
        use super::super::*;
        use core::convert::Infallible;
        use embedded_hal::digital::{ErrorKind, ErrorType, InputPin};

        struct FakePin(bool);

        impl ErrorType for FakePin {
            type Error = Infallible;
        }

        impl InputPin for FakePin {
            fn is_high(&mut self) -> Result<bool, Self::Error> {
                Ok(self.0)
            }

            fn is_low(&mut self) -> Result<bool, Self::Error> {
                Ok(!self.0)
            }
        }

        struct BrokenPin;

        impl ErrorType for BrokenPin {
            type Error = ErrorKind;
        }

        impl InputPin for BrokenPin {
            fn is_high(&mut self) -> Result<bool, Self::Error> {
                Err(ErrorKind::Other)
            }

            fn is_low(&mut self) -> Result<bool, Self::Error> {
                Err(ErrorKind::Other)
            }
        }

        #[test]
        fn pressed_reads_low() {
            assert!(ActiveLowButton::new(FakePin(false)).is_active());
            assert!(!ActiveLowButton::new(FakePin(true)).is_active());
        }

        #[test]
        fn read_error_is_not_pressed() {
            assert!(!ActiveLowButton::new(BrokenPin).is_active());
        }
    }
}
