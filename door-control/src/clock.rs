//! Millisecond time source.

/// Monotonic millisecond counter.
pub trait Clock {
    /// Milliseconds since an arbitrary epoch, wrapping on overflow.
    fn now_millis(&self) -> u32;
}

/// Whether `deadline` has been reached at `now`.
///
/// Works across counter wraparound as long as `now` and `deadline` are less
/// than 2^31 ms apart.
pub fn reached(now: u32, deadline: u32) -> bool {
    now.wrapping_sub(deadline) as i32 >= 0
}
