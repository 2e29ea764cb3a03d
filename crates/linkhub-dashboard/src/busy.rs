//! The busy flag a UI reads to show a progress indicator.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

const COUNT_MASK: u64 = u32::MAX as u64;
const GENERATION_SHIFT: u32 = 32;

/// Set while any command is in flight.
///
/// Commands hold a [`BusyGuard`] for their whole run, so the flag clears on
/// every exit path. Overlapping commands are counted: the flag stays set until
/// the last guard drops. An accepted snapshot clears it outright; guards
/// acquired before that clear no longer count when they drop.
///
/// The state packs a clear generation in the high half and the in-flight
/// count in the low half, so both change in one atomic step.
#[derive(Debug, Default)]
pub struct BusyFlag(AtomicU64);

impl BusyFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.0.load(Ordering::SeqCst) & COUNT_MASK != 0
    }

    /// Number of commands currently holding a guard.
    pub fn in_flight(&self) -> u32 {
        (self.0.load(Ordering::SeqCst) & COUNT_MASK) as u32
    }

    /// Mark busy until the returned guard is dropped.
    pub fn acquire(self: &Arc<Self>) -> BusyGuard {
        let previous = self
            .0
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |state| {
                let count = (state & COUNT_MASK).saturating_add(1).min(COUNT_MASK);
                Some((state & !COUNT_MASK) | count)
            })
            .unwrap_or_else(|state| state);
        BusyGuard {
            flag: Arc::clone(self),
            generation: previous >> GENERATION_SHIFT,
        }
    }

    /// Clear the flag regardless of outstanding guards.
    pub fn clear(&self) {
        let _ = self
            .0
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |state| {
                let generation = (state >> GENERATION_SHIFT).wrapping_add(1);
                Some(generation << GENERATION_SHIFT)
            });
    }

    fn release(&self, generation: u64) {
        // Err means a clear already released this guard.
        let _ = self
            .0
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |state| {
                let count = state & COUNT_MASK;
                (state >> GENERATION_SHIFT == generation && count > 0).then(|| state - 1)
            });
    }
}

/// Releases one hold on the busy flag on drop.
#[derive(Debug)]
pub struct BusyGuard {
    flag: Arc<BusyFlag>,
    generation: u64,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.flag.release(self.generation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_clears_on_drop() {
        let flag = Arc::new(BusyFlag::new());
        assert!(!flag.is_busy());
        {
            let _guard = flag.acquire();
            assert!(flag.is_busy());
        }
        assert!(!flag.is_busy());
    }

    #[test]
    fn clears_on_early_return() {
        fn step(flag: &Arc<BusyFlag>, fail: bool) -> Result<(), &'static str> {
            let _guard = flag.acquire();
            if fail {
                return Err("boom");
            }
            Ok(())
        }
        let flag = Arc::new(BusyFlag::new());
        assert!(step(&flag, true).is_err());
        assert!(!flag.is_busy());
    }

    #[test]
    fn overlapping_commands_stay_busy_until_the_last_finishes() {
        let flag = Arc::new(BusyFlag::new());
        let reorder = flag.acquire();
        let theme = flag.acquire();
        assert_eq!(flag.in_flight(), 2);

        drop(theme);
        assert!(flag.is_busy());
        drop(reorder);
        assert!(!flag.is_busy());
    }

    #[test]
    fn stale_guard_does_not_release_a_newer_command() {
        let flag = Arc::new(BusyFlag::new());
        let old = flag.acquire();
        flag.clear();
        assert!(!flag.is_busy());

        let new = flag.acquire();
        drop(old);
        assert!(flag.is_busy());
        drop(new);
        assert!(!flag.is_busy());
    }
}
