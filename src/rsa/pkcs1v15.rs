//! [PKCS#1 v1.5](https://tools.ietf.org/html/rfc8017#section-8.2) signature
//! padding, fixed to SHA-256 — this crate never negotiates a padding scheme.

use num_bigint::BigUint;

use crate::digest::Digest;
use crate::error::{Error, Result};
use crate::rsa::{RSAPrivateKey, RSAPublicKey};

/// Hash `message` and wrap it in an EMSA-PKCS1-v1_5 block sized for a
/// `block_len`-byte modulus.
fn hash_pad<D: Digest>(block_len: usize, message: &[u8]) -> Option<BigUint> {
    let hash = D::hash(message);
    let hash_len = hash.as_ref().len();
    let prefix_len = D::ASN1_PREFIX.len();

    if block_len < hash_len + prefix_len + 11 {
        return None;
    }

    let mut block = vec![0xff; block_len];

    block[0] = 0x00;
    block[1] = 0x01;
    block[block_len - hash_len - prefix_len - 1] = 0x00;
    block[block_len - hash_len - prefix_len..block_len - hash_len].copy_from_slice(D::ASN1_PREFIX);
    block[block_len - hash_len..].copy_from_slice(hash.as_ref());

    Some(BigUint::from_bytes_be(&block))
}

/// Unpad a signature block and check it against `message`'s hash.
fn unpad_verify<D: Digest>(block_len: usize, message: &[u8], signature: &BigUint) -> bool {
    let block = signature.to_bytes_be();

    // -1 because the leading 0x00 is dropped by `to_bytes_be`.
    if block.len() != block_len - 1 || block[0] != 0x01 {
        return false;
    }

    let hash_len = D::OUTPUT_LENGTH;
    let prefix_len = D::ASN1_PREFIX.len();
    let block_len = block.len();

    if block[block_len - hash_len - prefix_len - 1] != 0x00 {
        return false;
    }

    let padding_len = block_len - hash_len - prefix_len - 2;
    if padding_len < 8 {
        return false;
    }

    if !block[1..1 + padding_len].iter().all(|&x| x == 0xff) {
        return false;
    }

    let asn1_prefix = &block[block_len - hash_len - prefix_len..block_len - hash_len];
    if asn1_prefix != D::ASN1_PREFIX {
        return false;
    }

    let signature_hash = &block[block_len - hash_len..];
    let message_hash = D::hash(message);

    signature_hash == message_hash.as_ref()
}

/// Sign `message`'s digest under `private_key`.
pub fn sign<D: Digest>(private_key: &RSAPrivateKey, message: &[u8]) -> Result<BigUint> {
    let block_len = (private_key.n().bits() as usize + 7) / 8;
    let padded = hash_pad::<D>(block_len, message).ok_or(Error::BadParameters)?;

    private_key
        .textbook_process(&padded)
        .ok_or(Error::BadParameters)
}

/// Verify `signature` over `message`'s digest under `public_key`.
#[must_use]
pub fn verify<D: Digest>(public_key: &RSAPublicKey, message: &[u8], signature: &BigUint) -> bool {
    let block_len = (public_key.n().bits() as usize + 7) / 8;

    match public_key.textbook_process(signature) {
        Some(padded) => unpad_verify::<D>(block_len, message, &padded),
        None => false,
    }
}
