//! Key-derived random streams for reproducible parameter initialization.
//!
//! A [`SeedKey`] is a small value that can be folded together with extra data
//! (an integer or a string label) to derive independent child keys. Each key
//! turns into a [`KeyedRng`] stream. Training sessions use this to give every
//! entity its own stream, so an entity's initial vector depends only on the
//! session seed and the entity's identity.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use rand::{CryptoRng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

const GOLDEN_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;
const FNV_OFFSET: u64 = 0xCBF2_9CE4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01B3;

/// A derivable seed key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SeedKey {
    state: u64,
}

impl SeedKey {
    /// Create a root key from a 64-bit seed.
    pub fn new(seed: u64) -> Self {
        Self {
            state: mix64(seed.wrapping_add(GOLDEN_GAMMA)),
        }
    }

    /// Raw 64-bit key state.
    pub fn state(self) -> u64 {
        self.state
    }

    /// Deterministically derive a child key from additional data.
    pub fn fold_in(self, data: u64) -> Self {
        let salted = mix64(data.wrapping_mul(GOLDEN_GAMMA) ^ 0xD1B5_4A32_D192_ED03);
        Self {
            state: mix64(self.state ^ salted),
        }
    }

    /// Derive a child key from a string label (an entity id, a collection name).
    pub fn fold_in_str(self, label: &str) -> Self {
        self.fold_in(fnv1a(label.as_bytes()))
    }

    /// Split into `n` independent child keys.
    pub fn split(self, n: usize) -> Vec<Self> {
        (0..n as u64).map(|i| self.fold_in(i)).collect()
    }

    /// Turn the key into a random stream.
    pub fn to_rng(self) -> KeyedRng {
        KeyedRng::new(self)
    }
}

/// Random stream derived from a [`SeedKey`].
#[derive(Clone, Debug)]
pub struct KeyedRng {
    inner: ChaCha8Rng,
}

impl KeyedRng {
    /// Create the stream for a key.
    pub fn new(key: SeedKey) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(key.state),
        }
    }
}

impl RngCore for KeyedRng {
    fn next_u32(&mut self) -> u32 {
        self.inner.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.inner.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.inner.try_fill_bytes(dest)
    }
}

impl CryptoRng for KeyedRng {}

/// SplitMix64 finalizer.
fn mix64(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET, |hash, &b| {
        (hash ^ u64::from(b)).wrapping_mul(FNV_PRIME)
    })
}

/// Common imports for seeded randomness.
pub mod prelude {
    pub use crate::{KeyedRng, SeedKey};
}
