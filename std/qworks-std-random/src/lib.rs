//!
//! qworks-std-random - Seeded Random Generation
//!
//! Every worker gets its own `StdRng`. All of them are derived from one
//! process-scoped `SeedSource`, so a run is reproducible per worker from a
//! single root seed while no RNG state is ever shared between threads.
//!
//! ## Functions
//!
//! - `SeedSource::worker_rng(id)` - RNG for worker `id`, stable for a given root
//! - `pick_two_distinct(rng, n)` - Two distinct indices in [0, n)
//!

pub mod generators;

pub use generators::{FunctionGenerator, OperandPattern, ValueGenerator};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub type WorkerRng = StdRng;

/// Process-scoped root of all worker RNG seeds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSource {
    root: u64,
}

impl SeedSource {
    pub fn new(root: u64) -> Self {
        Self { root }
    }

    /// Seed the root from OS entropy
    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }

    pub fn root(&self) -> u64 {
        self.root
    }

    pub fn worker_rng(&self, worker_id: u64) -> WorkerRng {
        StdRng::seed_from_u64(mix(self.root ^ worker_id.wrapping_mul(0x9E37_79B9_7F4A_7C15)))
    }
}

/// splitmix64 finaliser
fn mix(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Two distinct indices drawn uniformly without replacement from [0, n).
/// `None` when `n < 2`.
pub fn pick_two_distinct<R: Rng + ?Sized>(rng: &mut R, n: usize) -> Option<(usize, usize)> {
    if n < 2 {
        return None;
    }
    let picked = rand::seq::index::sample(rng, n, 2);
    Some((picked.index(0), picked.index(1)))
}
