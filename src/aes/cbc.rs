//! CBC chaining on top of a [`BlockCipher`]. Callers are responsible for
//! block-aligning their plaintext beforehand — this crate's envelope format
//! uses a `0x01`-then-zeros scheme rather than PKCS7, so padding lives at the
//! call site, not here.

use super::BlockCipher;

/// Encrypt `plaintext` (must be a multiple of 16 bytes) under `cipher` with
/// chaining initialized from `iv`.
///
/// # Panics
/// Panics if `plaintext.len()` is not a multiple of 16.
pub fn encrypt(cipher: &impl BlockCipher, iv: &[u8; 16], plaintext: &[u8]) -> Vec<u8> {
    assert_eq!(plaintext.len() % 16, 0, "CBC plaintext must be block-aligned");

    let mut out = Vec::with_capacity(plaintext.len());
    let mut prev = *iv;

    for chunk in plaintext.chunks(16) {
        let mut block = [0u8; 16];
        block.copy_from_slice(chunk);

        for i in 0..16 {
            block[i] ^= prev[i];
        }

        let ciphertext_block = cipher.encrypt_block(&block);
        out.extend_from_slice(&ciphertext_block);
        prev = ciphertext_block;
    }

    out
}

/// Decrypt `ciphertext` (must be a multiple of 16 bytes) under `cipher` with
/// chaining initialized from `iv`.
///
/// # Panics
/// Panics if `ciphertext.len()` is not a multiple of 16.
pub fn decrypt(cipher: &impl BlockCipher, iv: &[u8; 16], ciphertext: &[u8]) -> Vec<u8> {
    assert_eq!(
        ciphertext.len() % 16,
        0,
        "CBC ciphertext must be block-aligned"
    );

    let mut out = Vec::with_capacity(ciphertext.len());
    let mut prev = *iv;

    for chunk in ciphertext.chunks(16) {
        let mut block = [0u8; 16];
        block.copy_from_slice(chunk);

        let mut plaintext_block = cipher.decrypt_block(&block);
        for i in 0..16 {
            plaintext_block[i] ^= prev[i];
        }

        out.extend_from_slice(&plaintext_block);
        prev = block;
    }

    out
}

#[cfg(test)]
mod test {
    use super::{decrypt, encrypt};
    use crate::aes::Aes256;

    #[test]
    fn round_trips_multi_block_message() {
        let cipher = Aes256::new(&[9u8; 32]);
        let iv = [3u8; 16];
        let plaintext = b"exactly 48 bytes of plaintext!!!!!!!!!!!!!!!!!!!";
        assert_eq!(plaintext.len() % 16, 0);

        let ciphertext = encrypt(&cipher, &iv, plaintext);
        assert_eq!(ciphertext.len(), plaintext.len());

        let decrypted = decrypt(&cipher, &iv, &ciphertext);
        assert_eq!(&decrypted, plaintext);
    }

    #[test]
    fn different_ivs_produce_different_ciphertexts() {
        let cipher = Aes256::new(&[1u8; 32]);
        let plaintext = [0u8; 32];

        let a = encrypt(&cipher, &[0u8; 16], &plaintext);
        let b = encrypt(&cipher, &[1u8; 16], &plaintext);

        assert_ne!(a, b);
    }
}
