//! Locking primitives shared by sessions and the registry.
//!
//! With `std` this wraps [`std::sync::Mutex`] and ignores poisoning: a panic
//! inside one session action must not make the session unreachable for the
//! lobby that wants to force-end it. Without `std` it is [`spin::Mutex`].

use alloc::sync::Arc;

/// A mutual exclusion lock whose `lock` never fails.
#[cfg(feature = "std")]
#[derive(Debug, Default)]
pub struct Mutex<T>(std::sync::Mutex<T>);

#[cfg(feature = "std")]
impl<T> Mutex<T> {
    /// Creates an unlocked mutex.
    pub const fn new(value: T) -> Self {
        Self(std::sync::Mutex::new(value))
    }

    /// Blocks until the lock is acquired.
    pub fn lock(&self) -> std::sync::MutexGuard<'_, T> {
        self.0
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[cfg(all(not(feature = "std"), feature = "alloc"))]
pub use spin::Mutex;

/// A value shared between threads behind a [`Mutex`].
pub type Shared<T> = Arc<Mutex<T>>;

/// Wraps a value for sharing.
pub fn shared<T>(value: T) -> Shared<T> {
    Arc::new(Mutex::new(value))
}
