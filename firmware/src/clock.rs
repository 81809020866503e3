//! Millisecond clock driven by the TIM2 update interrupt.

use core::sync::atomic::{AtomicU32, Ordering};

use door_control::Clock;

static MILLIS: AtomicU32 = AtomicU32::new(0);

/// Called once per millisecond from the timer interrupt.
pub fn tick() {
    MILLIS.fetch_add(1, Ordering::Relaxed);
}

pub struct MillisClock;

impl Clock for MillisClock {
    fn now_millis(&self) -> u32 {
        MILLIS.load(Ordering::Relaxed)
    }
}
