//! Leader selection abstraction
//!
//! When a leader leaves a group that still has members, one of them is promoted. The choice is
//! random in production; the [`LeaderSelector`] trait lets tests pin it down.
//!
//! # Example
//!
//! ```
//! use yspotify::{LeaderSelector, SeededSelector};
//!
//! let a = SeededSelector::new(7);
//! let b = SeededSelector::new(7);
//! assert_eq!(a.pick(5), b.pick(5));
//! ```

use std::fmt::Debug;
use std::sync::Mutex;

use rand::{Rng, SeedableRng, rngs::StdRng};

/// Picks the index of the member to promote.
pub trait LeaderSelector: Send + Sync + Debug {
    /// Return an index in `0..candidates`. Callers never pass zero.
    fn pick(&self, candidates: usize) -> usize;
}

/// Uniform selection backed by the thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomSelector;

impl LeaderSelector for RandomSelector {
    fn pick(&self, candidates: usize) -> usize {
        rand::thread_rng().gen_range(0..candidates)
    }
}

/// Uniform selection from a seeded RNG.
///
/// Two selectors built from the same seed make the same sequence of choices, so leader
/// re-election scenarios replay identically.
#[derive(Debug)]
pub struct SeededSelector {
    rng: Mutex<StdRng>,
}

impl SeededSelector {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl LeaderSelector for SeededSelector {
    fn pick(&self, candidates: usize) -> usize {
        // A poisoned lock still holds a usable RNG state.
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        rng.gen_range(0..candidates)
    }
}
