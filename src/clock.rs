//! Timestamps for history entries.

/// Milliseconds since the Unix epoch.
#[cfg(feature = "std")]
pub(crate) fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |d| d.as_millis() as u64)
}

/// Without a wall clock, a process-wide logical tick that only moves forward.
#[cfg(not(feature = "std"))]
pub(crate) fn now_millis() -> u64 {
    use core::sync::atomic::{AtomicU64, Ordering};

    static TICK: AtomicU64 = AtomicU64::new(0);
    TICK.fetch_add(1, Ordering::Relaxed)
}
