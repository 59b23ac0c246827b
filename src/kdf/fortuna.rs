//! A Fortuna-style AES-256-keyed counter generator, used only to regenerate
//! a [`crate::DualKey`] deterministically from a phrase's seed hash.
//!
//! This is a stable on-wire contract, not a general-purpose CSPRNG: the
//! block cipher, counter width, and reseed rule must never change, or every
//! phrase issued under the old algorithm stops reproducing its key.

use rand_core::RngCore;

use crate::aes::{Aes256, BlockCipher};
use crate::digest::{Digest, SHA256};

const KEY_LEN: usize = 32;
const BLOCK_LEN: usize = 16;

/// Re-key from the generator's own output after this many blocks, bounding
/// how much keystream is ever produced under one key.
const REKEY_INTERVAL_BLOCKS: u64 = 1 << 16;

/// AES-256-CTR-style keystream generator with Fortuna's reseed/rekey rules.
///
/// The counter starts at zero and is only ever bumped to a nonzero value by
/// [`reseed`](Fortuna::reseed) — an un-reseeded generator never emits
/// anything, matching the origin's `Seed(0)` followed immediately by a
/// mandatory `Reseed(seed)`.
pub struct Fortuna {
    key: [u8; KEY_LEN],
    counter: u128,
    blocks_since_rekey: u64,
}

impl Fortuna {
    /// Build a generator seeded with `seed`, ready to produce output.
    ///
    /// Equivalent to the origin's `gen.Seed(0)` followed by
    /// `gen.Reseed(seed)`: the key starts at all-zero and is immediately
    /// folded with `seed`, and the counter is bumped off zero.
    pub fn new(seed: &[u8]) -> Fortuna {
        let mut gen = Fortuna {
            key: [0u8; KEY_LEN],
            counter: 0,
            blocks_since_rekey: 0,
        };
        gen.reseed(seed);
        gen
    }

    /// Fold `seed` into the key (`key' = SHA256(key || seed)`) and reset the
    /// counter to `1`.
    pub fn reseed(&mut self, seed: &[u8]) {
        let mut hasher = SHA256::default();
        hasher.update(&self.key);
        hasher.update(seed);
        self.key.copy_from_slice(hasher.finalize().as_ref());

        self.counter = 1;
        self.blocks_since_rekey = 0;
    }

    fn counter_block(&self) -> [u8; BLOCK_LEN] {
        self.counter.to_be_bytes()
    }

    fn next_block(&mut self) -> [u8; BLOCK_LEN] {
        let cipher = Aes256::new(&self.key);
        let block = cipher.encrypt_block(&self.counter_block());

        self.counter = self.counter.wrapping_add(1);
        self.blocks_since_rekey += 1;

        if self.blocks_since_rekey >= REKEY_INTERVAL_BLOCKS {
            self.rekey(&cipher);
        }

        block
    }

    /// Derive a fresh key from two blocks of the generator's own keystream
    /// and reset the block counter, per Fortuna's key-rotation rule.
    fn rekey(&mut self, cipher: &Aes256) {
        let mut fresh_key = [0u8; KEY_LEN];
        for chunk in fresh_key.chunks_mut(BLOCK_LEN) {
            self.counter = self.counter.wrapping_add(1);
            let block = cipher.encrypt_block(&self.counter_block());
            chunk.copy_from_slice(&block);
        }

        self.key = fresh_key;
        self.blocks_since_rekey = 0;
    }
}

impl RngCore for Fortuna {
    fn next_u32(&mut self) -> u32 {
        let block = self.next_block();
        u32::from_le_bytes(block[0..4].try_into().unwrap())
    }

    fn next_u64(&mut self) -> u64 {
        let block = self.next_block();
        u64::from_le_bytes(block[0..8].try_into().unwrap())
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        let mut filled = 0;
        while filled < dest.len() {
            let block = self.next_block();
            let take = (dest.len() - filled).min(BLOCK_LEN);
            dest[filled..filled + take].copy_from_slice(&block[..take]);
            filled += take;
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::Fortuna;
    use rand_core::RngCore;

    #[test]
    fn is_deterministic_given_the_same_seed() {
        let mut a = Fortuna::new(b"same seed");
        let mut b = Fortuna::new(b"same seed");

        let mut out_a = [0u8; 100];
        let mut out_b = [0u8; 100];
        a.fill_bytes(&mut out_a);
        b.fill_bytes(&mut out_b);

        assert_eq!(out_a, out_b);
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = Fortuna::new(b"seed one");
        let mut b = Fortuna::new(b"seed two");

        let mut out_a = [0u8; 32];
        let mut out_b = [0u8; 32];
        a.fill_bytes(&mut out_a);
        b.fill_bytes(&mut out_b);

        assert_ne!(out_a, out_b);
    }

    #[test]
    fn fill_bytes_is_consistent_across_call_shapes() {
        let mut one_shot = Fortuna::new(b"split test");
        let mut split = Fortuna::new(b"split test");

        let mut whole = [0u8; 48];
        one_shot.fill_bytes(&mut whole);

        let mut first = [0u8; 20];
        let mut rest = [0u8; 28];
        split.fill_bytes(&mut first);
        split.fill_bytes(&mut rest);

        assert_eq!(&whole[..20], &first[..]);
        assert_eq!(&whole[20..], &rest[..]);
    }

    #[test]
    fn rekeys_after_the_configured_block_interval() {
        let mut gen = Fortuna::new(b"rekey test");
        gen.blocks_since_rekey = super::REKEY_INTERVAL_BLOCKS - 1;

        let key_before = gen.key;
        let mut buf = [0u8; 16];
        gen.fill_bytes(&mut buf);

        assert_ne!(gen.key, key_before);
        assert_eq!(gen.blocks_since_rekey, 0);
    }
}
