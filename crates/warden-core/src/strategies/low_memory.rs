//! Memory pressure criterion

use crate::{DaemonState, ExpirationStrategy, ExpirationVerdict};
use std::sync::{Arc, Mutex};
use sysinfo::System;

/// Source of host memory readings.
///
/// A probe that cannot take a reading returns None; the criterion then
/// treats the check as "do not expire".
pub trait MemoryProbe: Send + Sync {
    /// Currently available bytes
    fn available_memory(&self) -> Option<u64>;
}

/// Production probe backed by sysinfo
pub struct SystemMemoryProbe {
    system: Mutex<System>,
}

impl SystemMemoryProbe {
    pub fn new() -> Self {
        Self {
            system: Mutex::new(System::new()),
        }
    }
}

impl Default for SystemMemoryProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryProbe for SystemMemoryProbe {
    fn available_memory(&self) -> Option<u64> {
        let mut system = self.system.lock().ok()?;
        system.refresh_memory();
        Some(system.available_memory())
    }
}

/// Expires a daemon when the host's available memory falls below the floor,
/// so an idle daemon gives its pages back under pressure.
pub struct LowMemory {
    probe: Arc<dyn MemoryProbe>,
    min_free_bytes: u64,
}

impl LowMemory {
    pub fn new(probe: Arc<dyn MemoryProbe>, min_free_bytes: u64) -> Self {
        Self {
            probe,
            min_free_bytes,
        }
    }
}

impl ExpirationStrategy for LowMemory {
    fn check_expiration(&self, _daemon: &DaemonState) -> ExpirationVerdict {
        match self.probe.available_memory() {
            Some(available) if available < self.min_free_bytes => ExpirationVerdict::expire(
                false,
                false,
                Some(format!(
                    "to reclaim system memory ({} bytes free, floor is {})",
                    available, self.min_free_bytes
                )),
            ),
            // No reading means no grounds to expire
            _ => ExpirationVerdict::not_expired(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedProbe(Option<u64>);

    impl MemoryProbe for FixedProbe {
        fn available_memory(&self) -> Option<u64> {
            self.0
        }
    }

    fn daemon() -> DaemonState {
        DaemonState::new("0.1.0")
    }

    #[test]
    fn scarce_memory_expires() {
        let strategy = LowMemory::new(Arc::new(FixedProbe(Some(100))), 1024);

        let verdict = strategy.check_expiration(&daemon());
        assert!(verdict.is_expired());
        assert!(verdict.reason().unwrap().contains("reclaim system memory"));
    }

    #[test]
    fn ample_memory_survives() {
        let strategy = LowMemory::new(Arc::new(FixedProbe(Some(4096))), 1024);
        assert!(!strategy.check_expiration(&daemon()).is_expired());
    }

    #[test]
    fn memory_at_floor_survives() {
        let strategy = LowMemory::new(Arc::new(FixedProbe(Some(1024))), 1024);
        assert!(!strategy.check_expiration(&daemon()).is_expired());
    }

    #[test]
    fn unavailable_reading_is_conservative() {
        let strategy = LowMemory::new(Arc::new(FixedProbe(None)), 1024);
        assert_eq!(
            strategy.check_expiration(&daemon()),
            ExpirationVerdict::not_expired()
        );
    }

    #[test]
    fn system_probe_takes_a_reading() {
        let probe = SystemMemoryProbe::new();
        // On any supported host a reading should be available
        assert!(probe.available_memory().is_some());
    }
}
