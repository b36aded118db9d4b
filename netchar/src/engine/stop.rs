use std::sync::atomic::{AtomicBool, Ordering};

/// Stop signal shared between the [`NetChar`](super::NetChar) handle
/// and its worker thread. Once set it stays set: every start of the
/// engine gets a fresh one.
#[derive(Debug, Default)]
pub(crate) struct Stop(AtomicBool);

impl Stop {
    pub(crate) fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    #[inline]
    pub(crate) fn get(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// set the stop signal
    #[inline]
    pub(crate) fn toggle(&self) {
        self.0.store(true, Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // highlight the expected value rather than asserting on the bool
    #[allow(clippy::bool_assert_comparison)]
    #[test]
    fn toggle_is_sticky() {
        let stop = Stop::new();
        assert_eq!(stop.get(), false);
        assert_eq!(Stop::default().get(), false);

        stop.toggle();
        assert_eq!(stop.get(), true);
        stop.toggle();
        assert_eq!(stop.get(), true);
    }
}
