//! Per-host deterministic randomness.
//!
//! Each host owns one `SmallRng`, seeded from the run seed and the host ID
//! through a SplitMix64 finalizer.  The stream is touched only by whichever
//! worker is executing the host, so draws are reproducible for a fixed seed
//! and host→worker assignment no matter how threads interleave.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::HostId;

/// SplitMix64 finalizer.  Neighbouring host IDs get unrelated seeds.
fn mix(seed: u64, host: HostId) -> u64 {
    let mut z = seed.wrapping_add((u64::from(host.0) + 1).wrapping_mul(0x9e37_79b9_7f4a_7c15));
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// A host's private random stream, reached through `HostContext::rng`.
pub struct HostRng(SmallRng);

impl HostRng {
    pub fn new(seed: u64, host: HostId) -> Self {
        HostRng(SmallRng::seed_from_u64(mix(seed, host)))
    }

    /// The underlying generator, for `rand` distribution types.
    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    #[inline]
    pub fn random<T>(&mut self) -> T
    where
        rand::distributions::Standard: rand::distributions::Distribution<T>,
    {
        self.0.r#gen()
    }

    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// `true` with probability `p`, clamped to [0, 1].
    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }

    /// `base_ns` plus a uniform extra delay in `[0, spread_ns]`.  Saturates
    /// instead of overflowing.
    pub fn jitter_ns(&mut self, base_ns: u64, spread_ns: u64) -> u64 {
        if spread_ns == 0 {
            return base_ns;
        }
        base_ns.saturating_add(self.0.gen_range(0..=spread_ns))
    }
}
