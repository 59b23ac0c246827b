//! Block cipher primitives: a hand-rolled AES-256 core plus CBC mode.

pub mod aes256;
pub mod cbc;

pub use aes256::Aes256;

/// A 128-bit block cipher.
pub trait BlockCipher {
    fn encrypt_block(&self, block: &[u8; 16]) -> [u8; 16];
    fn decrypt_block(&self, block: &[u8; 16]) -> [u8; 16];
}
