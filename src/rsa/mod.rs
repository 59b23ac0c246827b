//! [RSA](https://en.wikipedia.org/wiki/RSA_(cryptosystem)) public-key cryptosystem.
//!
//! Provides the conventional (single-exponent) key objects that the OAEP and
//! PKCS#1 v1.5 padding schemes operate on. The dual-exponent key pair that
//! the rest of this crate actually uses is built in [`crate::dualkey`] on top
//! of these adapters.

pub mod oaep;
pub mod pkcs1v15;
mod primes;
mod util;

use num_bigint::{BigInt, BigUint, ToBigInt};
use num_traits::One;

pub use primes::gen_prime;
pub use util::{egcd, inv_mod};

/// The fixed list of small public exponents dual keys are drawn from, in the
/// order they're tried.
pub const CANDIDATE_EXPONENTS: [u32; 5] = [3, 5, 9, 17, 33];

/// An RSA public key.
///
/// Allows encrypting a message (that can be decrypted with its corresponding
/// private key) or verifying a signature (that was generated with its
/// corresponding private key).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RSAPublicKey {
    pub(crate) e: BigUint,
    pub(crate) n: BigUint,
}

impl RSAPublicKey {
    pub fn new(e: BigUint, n: BigUint) -> RSAPublicKey {
        RSAPublicKey { e, n }
    }

    pub fn n(&self) -> &BigUint {
        &self.n
    }

    pub fn e(&self) -> &BigUint {
        &self.e
    }

    /// Process a message with [textbook RSA](https://crypto.stackexchange.com/questions/1448/definition-of-textbook-rsa).
    #[must_use]
    pub fn textbook_process(&self, message: &BigUint) -> Option<BigUint> {
        if message > &self.n {
            return None;
        }

        Some(message.modpow(&self.e, &self.n))
    }
}

/// An RSA private key, with CRT precomputations for faster `modpow`.
///
/// Allows decrypting a message (that was encrypted with its corresponding
/// public key) or generating a signature (to be validated with its
/// corresponding public key).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RSAPrivateKey {
    d: BigUint,
    n: BigUint,
    p: BigUint,
    q: BigUint,
    dp: BigUint,
    dq: BigUint,
    qinv: BigUint,
}

impl RSAPrivateKey {
    /// Build the CRT form of a private key from its primes and private
    /// exponent.
    ///
    /// # Panics
    /// Panics if `p == q`.
    #[must_use]
    pub fn from_p_q_d(p: BigUint, q: BigUint, d: BigUint) -> RSAPrivateKey {
        assert_ne!(p, q, "RSA primes must be distinct");

        let n = &p * &q;
        let dp = &d % (&p - BigUint::one());
        let dq = &d % (&q - BigUint::one());
        let qinv = inv_mod(&q % &p, &p).expect("q must be invertible mod p for distinct primes");

        RSAPrivateKey {
            d,
            n,
            p,
            q,
            dp,
            dq,
            qinv,
        }
    }

    pub fn n(&self) -> &BigUint {
        &self.n
    }

    pub fn d(&self) -> &BigUint {
        &self.d
    }

    /// Process a message with [textbook RSA](https://crypto.stackexchange.com/questions/1448/definition-of-textbook-rsa),
    /// via the [Chinese remainder theorem](https://en.wikipedia.org/wiki/RSA_(cryptosystem)#Using_the_Chinese_remainder_algorithm)
    /// speedup.
    #[must_use]
    pub fn textbook_process(&self, message: &BigUint) -> Option<BigUint> {
        if message > &self.n {
            return None;
        }

        let m1 = message.modpow(&self.dp, &self.p);
        let m2 = message.modpow(&self.dq, &self.q);

        let p_int = self.p.to_bigint().unwrap();
        let q_int = self.q.to_bigint().unwrap();

        let mut h = (&self.qinv.to_bigint().unwrap() * (m1.to_bigint().unwrap() - m2.to_bigint().unwrap()))
            % &p_int;
        if h < BigInt::from(0) {
            h += &p_int;
        }

        let result = (m2.to_bigint().unwrap() + h * &q_int) % (&p_int * &q_int);

        Some(result.to_biguint().expect("CRT result must be non-negative"))
    }

    /// Recover the public exponent `e` such that `e*d ≡ 1 (mod φ)`, by
    /// extended GCD against `φ = (p-1)(q-1)`. Used only to sanity-check a
    /// freshly generated dual key's two private halves against each other.
    #[must_use]
    pub fn recover_public_exponent(&self) -> Option<BigUint> {
        let totient = (&self.p - BigUint::one()) * (&self.q - BigUint::one());
        inv_mod(&self.d % &totient, &totient)
    }
}

#[cfg(test)]
mod test {
    use num_bigint::{BigUint, RandBigInt};
    use rand::thread_rng;

    use super::{egcd, inv_mod, RSAPrivateKey, RSAPublicKey};

    fn keypair(e: &BigUint, p: &BigUint, q: &BigUint) -> (RSAPublicKey, RSAPrivateKey) {
        let totient = (p - BigUint::from(1_usize)) * (q - BigUint::from(1_usize));
        let d = inv_mod(e.clone(), &totient).unwrap();

        (
            RSAPublicKey::new(e.clone(), p * q),
            RSAPrivateKey::from_p_q_d(p.clone(), q.clone(), d),
        )
    }

    #[test]
    fn test_rsa_full() {
        let (public_key, private_key) = keypair(
            &BigUint::from(3_usize),
            &BigUint::from(11_usize),
            &BigUint::from(23_usize),
        );

        let plaintext = thread_rng().gen_biguint_range(&BigUint::from(0_usize), public_key.n());
        let ciphertext = public_key.textbook_process(&plaintext).unwrap();

        assert_eq!(private_key.textbook_process(&ciphertext), Some(plaintext));
    }

    #[test]
    fn test_rsa_full_big_primes() {
        let mut rng = thread_rng();
        let p = super::gen_prime(&mut rng, 512);
        let q = super::gen_prime(&mut rng, 512);
        let (public_key, private_key) = keypair(&BigUint::from(3_usize), &p, &q);

        let plaintext = thread_rng().gen_biguint_range(&BigUint::from(0_usize), public_key.n());
        let ciphertext = public_key.textbook_process(&plaintext).unwrap();

        assert_eq!(private_key.textbook_process(&ciphertext), Some(plaintext));
    }

    #[test]
    fn test_recover_public_exponent() {
        let e = BigUint::from(17_usize);
        let (_, private_key) = keypair(&e, &BigUint::from(61_usize), &BigUint::from(53_usize));

        assert_eq!(private_key.recover_public_exponent(), Some(e));
    }

    #[test]
    fn egcd_sanity() {
        let (gcd, _, _) = egcd(
            num_bigint::BigInt::from(240_usize),
            num_bigint::BigInt::from(46_usize),
        );
        assert_eq!(gcd, num_bigint::BigInt::from(2_usize));
    }
}
