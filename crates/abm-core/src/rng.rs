//! Deterministic per-entity RNG streams.
//!
//! # Determinism strategy
//!
//! There is no shared generator anywhere in the framework.  Every stochastic
//! decision draws from a fresh `SmallRng` whose seed is a hash of:
//!
//!   (global_seed, agent_id, stream discriminator)
//!
//! where the discriminator names the call site and carries the iteration
//! (and, for teleportation, the leg index).  Consequences:
//!
//! - Results do not depend on the order in which agents are processed, nor
//!   on the number of Rayon worker threads.
//! - Adding or removing agents does not disturb the streams of the others.
//! - Re-running with the same seed reproduces every draw bit for bit.
//!
//! Seeds are mixed with the SplitMix64 finaliser, which spreads consecutive
//! agent ids and iteration numbers uniformly over the seed space.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::AgentId;

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// SplitMix64 finaliser.
#[inline]
fn mix(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

// ── RngStream ─────────────────────────────────────────────────────────────────

/// Call-site discriminator for [`AgentRng::keyed`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RngStream {
    /// Strategy draw of the replanning scheduler.
    Replanning { iteration: u32 },
    /// Draws made inside an innovative strategy or a plan selector.
    Strategy { iteration: u32 },
    /// Travel-time perturbation of one teleported leg.
    Teleportation { iteration: u32, leg: u32 },
}

impl RngStream {
    fn discriminator(self) -> u64 {
        match self {
            RngStream::Replanning { iteration } => mix(1 ^ ((iteration as u64) << 8)),
            RngStream::Strategy { iteration } => mix(2 ^ ((iteration as u64) << 8)),
            RngStream::Teleportation { iteration, leg } => {
                mix(3 ^ ((iteration as u64) << 8) ^ ((leg as u64) << 40))
            }
        }
    }
}

// ── AgentRng ──────────────────────────────────────────────────────────────────

/// Per-agent, per-call-site deterministic RNG.
///
/// Construct one where it is needed and drop it afterwards; the stream is
/// fully determined by its key so nothing has to be stored between
/// iterations.  The type is `!Sync` to prevent accidental sharing across
/// threads.
pub struct AgentRng(SmallRng);

impl AgentRng {
    /// Seed from the run's global seed, an agent and a call-site stream.
    pub fn keyed(global_seed: u64, agent: AgentId, stream: RngStream) -> Self {
        let agent_part = u64::from(agent).wrapping_mul(MIXING_CONSTANT);
        let seed = mix(mix(global_seed) ^ agent_part) ^ stream.discriminator();
        AgentRng(SmallRng::seed_from_u64(mix(seed)))
    }

    /// Expose the inner `SmallRng` for use with `rand` distribution types.
    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    /// Sample a uniformly distributed value of any `Standard`-distributed type.
    #[inline]
    pub fn random<T>(&mut self) -> T
    where
        rand::distributions::Standard: rand::distributions::Distribution<T>,
    {
        self.0.r#gen()
    }

    /// Generate a value uniformly in `range`.
    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// `true` with probability `p` (clamped to [0, 1]).
    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }

    /// Choose a random element from a slice.
    /// Returns `None` if the slice is empty.
    #[inline]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose(&mut self.0)
    }
}
