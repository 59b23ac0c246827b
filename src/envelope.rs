//! Signed-and-encrypted envelopes: RSA-OAEP key wrapping, AES-256-CBC bulk
//! encryption, and a PKCS#1-v1.5 signature over the whole framed body.
//!
//! Wire format (all multi-byte integers little-endian `u32`):
//!
//! ```text
//! offset   size   field
//!   0       4     siglen
//!   4       4     L0 = len(info)                  \
//!   8       4     L1 = len(encrypted OTK)           } signed region starts here
//!  12       4     L2 = len(ciphertext)             /
//!  16       L0    info == b"version 1"
//!  16+L0    L1    RSA-OAEP(E0, OTK, label = "otk")
//!  16+L0+L1 L2    AES-256-CBC(key=OTK, IV=0) over padded plaintext
//!  end-L3   L3    RSA-PKCS#1-v1.5(SHA-256) signature over bytes [4..end-L3)
//! ```

use byteorder::{ByteOrder, LittleEndian};
use rand::RngCore;
use zeroize::Zeroize;

use crate::aes::{cbc, Aes256};
use crate::digest::SHA256;
use crate::dualkey::{DualKey, DualPublicKey};
use crate::error::{Error, Result};
use crate::rsa::{oaep, pkcs1v15};

const OTK_LEN: usize = 32;
const BLOCK_SIZE: usize = 16;
const INFO: &[u8] = b"version 1";
const OTK_LABEL: &[u8] = b"otk";
const ZERO_IV: [u8; 16] = [0u8; 16];

fn pad(plaintext: &[u8]) -> Vec<u8> {
    let mut padded = Vec::with_capacity(plaintext.len() + BLOCK_SIZE);
    padded.extend_from_slice(plaintext);
    padded.push(0x01);

    while padded.len() % BLOCK_SIZE != 0 {
        padded.push(0x00);
    }

    padded
}

fn unpad(mut buf: Vec<u8>) -> Result<Vec<u8>> {
    loop {
        match buf.pop() {
            None => return Err(Error::verified_but_malformed("padding without terminator")),
            Some(0x01) => return Ok(buf),
            Some(0x00) => continue,
            Some(_) => return Err(Error::verified_but_malformed("non-padding trailing byte")),
        }
    }
}

/// Seal `plaintext` for `recipient`, signed by `sender`.
pub fn seal(
    rng: &mut impl RngCore,
    sender: &DualKey,
    recipient: &DualPublicKey,
    plaintext: &[u8],
) -> Result<Vec<u8>> {
    let mut otk = [0u8; OTK_LEN];
    rng.fill_bytes(&mut otk);

    let padded = pad(plaintext);
    let cipher = Aes256::new(&otk);
    let ciphertext = cbc::encrypt(&cipher, &ZERO_IV, &padded);

    let encrypted_otk = oaep::encrypt::<SHA256>(
        rng,
        recipient.encryption_key().e(),
        recipient.encryption_key().n(),
        OTK_LABEL,
        &otk,
    )
    .ok_or(Error::BadParameters)?;

    otk.zeroize();

    let mut body = Vec::with_capacity(12 + INFO.len() + encrypted_otk.len() + ciphertext.len());

    let mut len_prefix = [0u8; 4];
    for chunk in [INFO.len(), encrypted_otk.len(), ciphertext.len()] {
        LittleEndian::write_u32(&mut len_prefix, chunk as u32);
        body.extend_from_slice(&len_prefix);
    }

    body.extend_from_slice(INFO);
    body.extend_from_slice(&encrypted_otk);
    body.extend_from_slice(&ciphertext);

    let signature = pkcs1v15::sign::<SHA256>(sender.signature_key(), &body)?;
    let signature_bytes = signature.to_bytes_be();

    let mut envelope = Vec::with_capacity(4 + body.len() + signature_bytes.len());
    let mut siglen = [0u8; 4];
    LittleEndian::write_u32(&mut siglen, signature_bytes.len() as u32);
    envelope.extend_from_slice(&siglen);
    envelope.extend_from_slice(&body);
    envelope.extend_from_slice(&signature_bytes);

    Ok(envelope)
}

/// Open an envelope produced by [`seal`], verifying it was signed by
/// `sender` before trusting any of its contents.
pub fn open(recipient: &DualKey, sender: &DualPublicKey, envelope: &[u8]) -> Result<Vec<u8>> {
    if envelope.len() < 32 {
        return Err(Error::unable_to_verify("envelope shorter than minimum size"));
    }

    let siglen = LittleEndian::read_u32(&envelope[0..4]) as usize;
    let rest = &envelope[4..];

    if siglen > rest.len() {
        return Err(Error::unable_to_verify("siglen exceeds envelope length"));
    }

    let (body, signature_bytes) = rest.split_at(rest.len() - siglen);
    let signature = num_bigint::BigUint::from_bytes_be(signature_bytes);

    if !pkcs1v15::verify::<SHA256>(&sender.verification_key(), body, &signature) {
        return Err(Error::unable_to_verify("signature check failed"));
    }

    // The signature has verified: everything past this point treats `body`
    // as trustworthy framing, and any further failure is a malformed-buffer
    // error rather than an authentication failure.
    if body.len() < 12 {
        return Err(Error::verified_but_malformed("body shorter than length header"));
    }

    let info_len = LittleEndian::read_u32(&body[0..4]) as usize;
    let otk_len = LittleEndian::read_u32(&body[4..8]) as usize;
    let cipher_len = LittleEndian::read_u32(&body[8..12]) as usize;

    let tail = &body[12..];
    let total = info_len
        .checked_add(otk_len)
        .and_then(|x| x.checked_add(cipher_len))
        .ok_or_else(|| Error::verified_but_malformed("length fields overflow"))?;

    if total != tail.len() {
        return Err(Error::verified_but_malformed("length fields don't sum to body size"));
    }

    let (info, tail) = tail.split_at(info_len);
    let (encrypted_otk, ciphertext) = tail.split_at(otk_len);
    let _ = info;

    let mut otk_bytes = oaep::decrypt::<SHA256>(
        recipient.decryption_key().d(),
        recipient.decryption_key().n(),
        OTK_LABEL,
        encrypted_otk,
    )
    .ok_or_else(|| Error::verified_but_malformed("OTK unwrap failed"))?;

    if otk_bytes.len() != OTK_LEN || ciphertext.len() % BLOCK_SIZE != 0 {
        otk_bytes.zeroize();
        return Err(Error::verified_but_malformed("OTK or ciphertext malformed"));
    }

    let mut otk = [0u8; OTK_LEN];
    otk.copy_from_slice(&otk_bytes);
    otk_bytes.zeroize();

    let cipher = Aes256::new(&otk);
    otk.zeroize();

    let padded_plaintext = cbc::decrypt(&cipher, &ZERO_IV, ciphertext);
    unpad(padded_plaintext)
}
