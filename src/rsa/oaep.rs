//! [RSA-OAEP](https://datatracker.ietf.org/doc/html/rfc8017#section-7.1)
//! encryption, fixed to SHA-256 for both the label hash and MGF1 — this
//! crate never negotiates a padding scheme.

use num_bigint::BigUint;
use rand_core::RngCore;

use crate::digest::Digest;

/// [MGF1](https://datatracker.ietf.org/doc/html/rfc8017#appendix-B.2) mask
/// generation function.
fn mgf1<D: Digest>(seed: &[u8], mask_len: usize) -> Vec<u8> {
    let hash_len = D::OUTPUT_LENGTH;
    let mut output = Vec::with_capacity(mask_len + hash_len);
    let mut counter: u32 = 0;

    while output.len() < mask_len {
        let mut block = D::default();
        block.update(seed);
        block.update(&counter.to_be_bytes());
        output.extend_from_slice(block.finalize().as_ref());
        counter += 1;
    }

    output.truncate(mask_len);
    output
}

fn xor_in_place(buf: &mut [u8], mask: &[u8]) {
    for (b, m) in buf.iter_mut().zip(mask.iter()) {
        *b ^= m;
    }
}

/// Encode and RSA-encrypt `message` under `(e, n)`, with `label` bound into
/// the OAEP encoding. `k` is the modulus size in octets.
///
/// Returns `None` if `message` is too long for the modulus, as RFC 8017
/// §7.1.1 step 1 requires.
#[must_use]
pub fn encrypt<D: Digest>(
    rng: &mut impl RngCore,
    e: &BigUint,
    n: &BigUint,
    label: &[u8],
    message: &[u8],
) -> Option<Vec<u8>> {
    let k = (n.bits() as usize + 7) / 8;
    let h_len = D::OUTPUT_LENGTH;

    if message.len() > k.checked_sub(2 * h_len + 2)? {
        return None;
    }

    let l_hash = D::hash(label);
    let ps_len = k - message.len() - 2 * h_len - 2;

    let mut db = Vec::with_capacity(k - h_len - 1);
    db.extend_from_slice(l_hash.as_ref());
    db.extend(std::iter::repeat(0u8).take(ps_len));
    db.push(0x01);
    db.extend_from_slice(message);

    let mut seed = vec![0u8; h_len];
    rng.fill_bytes(&mut seed);

    let db_mask = mgf1::<D>(&seed, k - h_len - 1);
    xor_in_place(&mut db, &db_mask);
    let masked_db = db;

    let seed_mask = mgf1::<D>(&masked_db, h_len);
    let mut masked_seed = seed;
    xor_in_place(&mut masked_seed, &seed_mask);

    let mut em = Vec::with_capacity(k);
    em.push(0x00);
    em.extend_from_slice(&masked_seed);
    em.extend_from_slice(&masked_db);

    let m = BigUint::from_bytes_be(&em);
    let c = m.modpow(e, n);

    let mut ciphertext = c.to_bytes_be();
    while ciphertext.len() < k {
        ciphertext.insert(0, 0);
    }

    Some(ciphertext)
}

/// RSA-decrypt and OAEP-decode `ciphertext` under `(d, n)`, checking it was
/// bound to `label`.
///
/// Returns `None` on any padding or label mismatch — all such failures are
/// deliberately indistinguishable from each other (and from a decryption
/// failure) to the caller, per OAEP's chosen-ciphertext-attack defense.
#[must_use]
pub fn decrypt<D: Digest>(d: &BigUint, n: &BigUint, label: &[u8], ciphertext: &[u8]) -> Option<Vec<u8>> {
    let k = (n.bits() as usize + 7) / 8;
    let h_len = D::OUTPUT_LENGTH;

    if ciphertext.len() != k || k < 2 * h_len + 2 {
        return None;
    }

    let c = BigUint::from_bytes_be(ciphertext);
    if &c >= n {
        return None;
    }

    let m = c.modpow(d, n);
    let mut em = m.to_bytes_be();
    while em.len() < k {
        em.insert(0, 0);
    }

    let y = em[0];
    let masked_seed = &em[1..1 + h_len];
    let masked_db = &em[1 + h_len..];

    let seed_mask = mgf1::<D>(masked_db, h_len);
    let mut seed = masked_seed.to_vec();
    xor_in_place(&mut seed, &seed_mask);

    let db_mask = mgf1::<D>(&seed, k - h_len - 1);
    let mut db = masked_db.to_vec();
    xor_in_place(&mut db, &db_mask);

    let l_hash = D::hash(label);
    let (db_lhash, rest) = db.split_at(h_len);

    let one_index = rest.iter().position(|&b| b != 0);

    let well_formed = y == 0
        && db_lhash == l_hash.as_ref()
        && one_index.map(|i| rest[i] == 0x01).unwrap_or(false);

    if !well_formed {
        return None;
    }

    let one_index = one_index.unwrap();
    Some(rest[one_index + 1..].to_vec())
}

#[cfg(test)]
mod test {
    use super::{decrypt, encrypt};
    use crate::digest::SHA256;
    use crate::rsa::{gen_prime, inv_mod};
    use num_bigint::BigUint;
    use rand::thread_rng;

    fn keypair(bits: u32) -> (BigUint, BigUint, BigUint) {
        let mut rng = thread_rng();
        let p = gen_prime(&mut rng, bits / 2);
        let q = gen_prime(&mut rng, bits / 2);
        let n = &p * &q;
        let totient = (&p - BigUint::from(1_usize)) * (&q - BigUint::from(1_usize));
        let e = BigUint::from(65537_usize);
        let d = inv_mod(e.clone(), &totient).unwrap();
        (e, d, n)
    }

    #[test]
    fn round_trips_a_message() {
        let (e, d, n) = keypair(1024);
        let mut rng = thread_rng();

        let ciphertext = encrypt::<SHA256>(&mut rng, &e, &n, b"otk", b"thirty-two bytes of secret key!").unwrap();
        let plaintext = decrypt::<SHA256>(&d, &n, b"otk", &ciphertext).unwrap();

        assert_eq!(plaintext, b"thirty-two bytes of secret key!");
    }

    #[test]
    fn rejects_wrong_label() {
        let (e, d, n) = keypair(1024);
        let mut rng = thread_rng();

        let ciphertext = encrypt::<SHA256>(&mut rng, &e, &n, b"otk", b"message").unwrap();
        assert_eq!(decrypt::<SHA256>(&d, &n, b"challenge", &ciphertext), None);
    }

    #[test]
    fn rejects_corrupted_ciphertext() {
        let (e, d, n) = keypair(1024);
        let mut rng = thread_rng();

        let mut ciphertext = encrypt::<SHA256>(&mut rng, &e, &n, b"otk", b"message").unwrap();
        let last = ciphertext.len() - 1;
        ciphertext[last] ^= 0x01;

        assert_eq!(decrypt::<SHA256>(&d, &n, b"otk", &ciphertext), None);
    }

    #[test]
    fn rejects_oversized_message() {
        let (e, _, n) = keypair(1024);
        let mut rng = thread_rng();

        let too_long = vec![0u8; 1024];
        assert_eq!(encrypt::<SHA256>(&mut rng, &e, &n, b"otk", &too_long), None);
    }
}
