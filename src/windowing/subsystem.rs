use log::info;
use std::sync::atomic::{AtomicUsize, Ordering};

static LIVE_DEVICES: AtomicUsize = AtomicUsize::new(0);

/// Reference to the process-wide native windowing subsystem.
///
/// The guard only counts. Whoever acquires the first guard brings the
/// platform's subsystem up, whoever releases the last one tears it down.
#[derive(Debug)]
pub struct SubsystemGuard {
    first: bool,
    released: bool,
}

impl SubsystemGuard {
    pub fn acquire() -> Self {
        let previous = LIVE_DEVICES.fetch_add(1, Ordering::AcqRel);
        let first = previous == 0;
        if first {
            info!("Initializing native windowing subsystem");
        }
        SubsystemGuard {
            first,
            released: false,
        }
    }

    /// Whether this guard brought the subsystem up.
    pub fn was_first(&self) -> bool {
        self.first
    }

    /// Gives the reference back. Returns `true` if it was the last one.
    pub fn release(mut self) -> bool {
        self.released = true;
        Self::leave()
    }

    pub fn live_devices() -> usize {
        LIVE_DEVICES.load(Ordering::Acquire)
    }

    fn leave() -> bool {
        let last = LIVE_DEVICES.fetch_sub(1, Ordering::AcqRel) == 1;
        if last {
            info!("Shutting down native windowing subsystem");
        }
        last
    }
}

impl Drop for SubsystemGuard {
    fn drop(&mut self) {
        if !self.released {
            Self::leave();
        }
    }
}
