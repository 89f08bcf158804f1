//! Wall-clock source for Alive timestamps

use std::time::{SystemTime, UNIX_EPOCH};

/// Source of the seconds value stamped into Alive frames
pub trait Clock {
    /// Seconds since the Unix epoch
    fn unix_seconds(&self) -> u64;
}

/// Reads the system wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn unix_seconds(&self) -> u64 {
        // A clock set before 1970 reads as zero
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// Always returns the same instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub u64);

impl Clock for FixedClock {
    fn unix_seconds(&self) -> u64 {
        self.0
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn unix_seconds(&self) -> u64 {
        (**self).unix_seconds()
    }
}
