//! Dual-exponent RSA key pairs: one modulus, two private exponents — `D0`
//! for decrypting incoming envelopes, `D1` for signing outgoing ones.

use std::fmt;
use std::str::FromStr;

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::One;
use rand::RngCore;

use crate::error::{Error, Result};
use crate::rsa::{gen_prime, inv_mod, RSAPrivateKey, RSAPublicKey, CANDIDATE_EXPONENTS};

const OUTER_ATTEMPTS: usize = 10;

/// A dual-exponent RSA private key: `D0` decrypts, `D1` signs, both modulo
/// the same `N = P*Q`.
///
/// The two derived [`RSAPrivateKey`] adapters are materialized eagerly at
/// construction time (and on deserialization) rather than lazily cached on
/// first use, so a `DualKey` carries no internal mutability and can be
/// shared across threads without synchronization.
#[derive(Debug, Clone)]
pub struct DualKey {
    d0: BigUint,
    d1: BigUint,
    p: BigUint,
    q: BigUint,
    decryption_key: RSAPrivateKey,
    signature_key: RSAPrivateKey,
}

/// The public half of a [`DualKey`]: `{E0, E1, N}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DualPublicKey {
    e0: BigUint,
    e1: BigUint,
    n: BigUint,
}

impl DualKey {
    fn from_parts(d0: BigUint, d1: BigUint, p: BigUint, q: BigUint) -> DualKey {
        let decryption_key = RSAPrivateKey::from_p_q_d(p.clone(), q.clone(), d0.clone());
        let signature_key = RSAPrivateKey::from_p_q_d(p.clone(), q.clone(), d1.clone());

        DualKey {
            d0,
            d1,
            p,
            q,
            decryption_key,
            signature_key,
        }
    }

    /// Generate a fresh dual key of `bits` total modulus bits, drawing
    /// primes from `rng`.
    ///
    /// Follows the amortized-prime-reuse algorithm: a fresh `bits/2`-bit
    /// prime is drawn each outer attempt and tried against every
    /// previously-retained prime before being added to the working set
    /// itself, so primality testing already spent on earlier candidates is
    /// never wasted.
    pub fn generate(rng: &mut impl RngCore, bits: u32) -> Result<DualKey> {
        if bits % 2 == 1 || bits < 128 {
            return Err(Error::BadParameters);
        }

        let mut primes = vec![gen_prime(rng, bits / 2)];

        for attempt in 1..=OUTER_ATTEMPTS {
            let q = gen_prime(rng, bits / 2);

            for p in &primes {
                if &q == p {
                    continue;
                }

                let n = p * &q;
                if n.bits() as u32 != bits {
                    continue;
                }

                let totient = (p - BigUint::one()) * (&q - BigUint::one());

                if let Some((d0, d1)) = first_two_coprime_exponents(&totient) {
                    log::debug!(
                        "dual key generated after {} outer attempt(s), {} bits",
                        attempt,
                        bits
                    );
                    return Ok(DualKey::from_parts(d0, d1, p.clone(), q));
                }
            }

            primes.push(q);
        }

        log::warn!(
            "dual key generation exhausted {} attempts at {} bits",
            OUTER_ATTEMPTS,
            bits
        );
        Err(Error::KeyGeneration)
    }

    /// Materialize the public half, double-checking that the two derived
    /// private keys agree on their modulus (a sanity check against
    /// implementation bugs, not a security property).
    pub fn make_public_key(&self) -> Result<DualPublicKey> {
        if self.decryption_key.n() != self.signature_key.n() {
            return Err(Error::BadParameters);
        }

        let e0 = self
            .decryption_key
            .recover_public_exponent()
            .ok_or(Error::BadParameters)?;
        let e1 = self
            .signature_key
            .recover_public_exponent()
            .ok_or(Error::BadParameters)?;

        Ok(DualPublicKey {
            e0,
            e1,
            n: self.decryption_key.n().clone(),
        })
    }

    /// The RSA private key used to decrypt OAEP-wrapped one-time keys.
    pub fn decryption_key(&self) -> &RSAPrivateKey {
        &self.decryption_key
    }

    /// The RSA private key used to sign outgoing envelopes.
    pub fn signature_key(&self) -> &RSAPrivateKey {
        &self.signature_key
    }

    pub fn p(&self) -> &BigUint {
        &self.p
    }

    pub fn q(&self) -> &BigUint {
        &self.q
    }

    pub fn d0(&self) -> &BigUint {
        &self.d0
    }

    pub fn d1(&self) -> &BigUint {
        &self.d1
    }
}

impl PartialEq for DualKey {
    fn eq(&self, other: &Self) -> bool {
        self.d0 == other.d0 && self.d1 == other.d1 && self.p == other.p && self.q == other.q
    }
}

impl Eq for DualKey {}

/// Scan the fixed exponent list in order and return the modular inverses
/// (positive, mod `totient`) of the first two that are coprime with it.
fn first_two_coprime_exponents(totient: &BigUint) -> Option<(BigUint, BigUint)> {
    let mut found = Vec::with_capacity(2);

    for &e in &CANDIDATE_EXPONENTS {
        let e = BigUint::from(e);

        if e.gcd(totient) != BigUint::one() {
            continue;
        }

        let d = inv_mod(e % totient, totient)?;
        found.push(d);

        if found.len() == 2 {
            let d1 = found.pop().unwrap();
            let d0 = found.pop().unwrap();
            return Some((d0, d1));
        }
    }

    None
}

impl DualPublicKey {
    pub fn new(e0: BigUint, e1: BigUint, n: BigUint) -> DualPublicKey {
        DualPublicKey { e0, e1, n }
    }

    /// The conventional RSA public key used to OAEP-encrypt to this
    /// identity.
    pub fn encryption_key(&self) -> RSAPublicKey {
        RSAPublicKey::new(self.e0.clone(), self.n.clone())
    }

    /// The conventional RSA public key used to PKCS#1-v1.5-verify this
    /// identity's signatures.
    pub fn verification_key(&self) -> RSAPublicKey {
        RSAPublicKey::new(self.e1.clone(), self.n.clone())
    }

    pub fn n(&self) -> &BigUint {
        &self.n
    }

    pub fn e0(&self) -> &BigUint {
        &self.e0
    }

    pub fn e1(&self) -> &BigUint {
        &self.e1
    }
}

/// Parse one `field: decimal-digits` line out of a serialized key record.
fn parse_field(line: &str, expected_name: &str) -> Result<BigUint> {
    let (name, value) = line.split_once(':').ok_or(Error::BadParameters)?;

    if name.trim() != expected_name {
        return Err(Error::BadParameters);
    }

    BigUint::from_str(value.trim()).map_err(|_| Error::BadParameters)
}

impl fmt::Display for DualKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "D0: {}", self.d0)?;
        writeln!(f, "D1: {}", self.d1)?;
        writeln!(f, "P: {}", self.p)?;
        write!(f, "Q: {}", self.q)
    }
}

impl FromStr for DualKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<DualKey> {
        let mut lines = s.lines();

        let d0 = parse_field(lines.next().ok_or(Error::BadParameters)?, "D0")?;
        let d1 = parse_field(lines.next().ok_or(Error::BadParameters)?, "D1")?;
        let p = parse_field(lines.next().ok_or(Error::BadParameters)?, "P")?;
        let q = parse_field(lines.next().ok_or(Error::BadParameters)?, "Q")?;

        Ok(DualKey::from_parts(d0, d1, p, q))
    }
}

impl fmt::Display for DualPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "E0: {}", self.e0)?;
        writeln!(f, "E1: {}", self.e1)?;
        write!(f, "N: {}", self.n)
    }
}

impl FromStr for DualPublicKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<DualPublicKey> {
        let mut lines = s.lines();

        let e0 = parse_field(lines.next().ok_or(Error::BadParameters)?, "E0")?;
        let e1 = parse_field(lines.next().ok_or(Error::BadParameters)?, "E1")?;
        let n = parse_field(lines.next().ok_or(Error::BadParameters)?, "N")?;

        Ok(DualPublicKey { e0, e1, n })
    }
}

#[cfg(test)]
mod test {
    use super::DualKey;
    use num_bigint::BigUint;
    use num_integer::Integer;
    use rand::thread_rng;
    use std::str::FromStr;

    #[test]
    fn generates_valid_dual_key() {
        let _ = env_logger::try_init();

        let mut rng = thread_rng();
        let key = DualKey::generate(&mut rng, 256).unwrap();

        let n = key.p() * key.q();
        assert_eq!(n.bits() as u32, 256);
        assert_ne!(key.p(), key.q());

        let public = key.make_public_key().unwrap();
        assert_ne!(public.e0(), public.e1());
        assert_eq!(public.n(), &n);
    }

    #[test]
    fn rejects_odd_or_small_bits() {
        let mut rng = thread_rng();
        assert!(DualKey::generate(&mut rng, 129).is_err());
        assert!(DualKey::generate(&mut rng, 64).is_err());
    }

    #[test]
    fn private_key_round_trips_through_text() {
        let mut rng = thread_rng();
        let key = DualKey::generate(&mut rng, 256).unwrap();

        let text = key.to_string();
        let parsed = DualKey::from_str(&text).unwrap();

        assert_eq!(key, parsed);
    }

    #[test]
    fn public_key_round_trips_through_text() {
        let mut rng = thread_rng();
        let key = DualKey::generate(&mut rng, 256).unwrap();
        let public = key.make_public_key().unwrap();

        let text = public.to_string();
        let parsed = super::DualPublicKey::from_str(&text).unwrap();

        assert_eq!(public, parsed);
    }

    #[test]
    fn encryption_and_verification_keys_share_modulus() {
        let mut rng = thread_rng();
        let key = DualKey::generate(&mut rng, 256).unwrap();
        let public = key.make_public_key().unwrap();

        assert_eq!(
            public.encryption_key().n(),
            public.verification_key().n()
        );
        assert_eq!(public.encryption_key().n(), &BigUint::from(1_usize) * (key.p() * key.q()));
    }
}
