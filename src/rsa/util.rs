use num_bigint::{BigInt, BigUint, ToBigInt};
use num_traits::{One, Zero};

/// Does mathematical modulo (similar to remainder `%`).
///
/// The difference is that `-1 % 5 = -1`, but `-1 mod 5 = 4`.
fn math_mod(x: &BigInt, n: &BigUint) -> BigUint {
    let n_bigint = n.to_bigint().unwrap();

    (((x % &n_bigint) + &n_bigint) % &n_bigint)
        .to_biguint()
        .unwrap()
}

/// [Extended Euclidean algorithm](https://en.wikipedia.org/wiki/Extended_Euclidean_algorithm)
///
/// Iterative implementation — the recursive form this grew from blows the
/// stack on the 1024+ bit inputs RSA key generation feeds it.
#[allow(clippy::many_single_char_names)]
pub fn egcd(a: BigInt, b: BigInt) -> (BigInt, BigInt, BigInt) {
    let (mut old_r, mut r) = (a, b);
    let (mut old_s, mut s) = (BigInt::one(), BigInt::zero());
    let (mut old_t, mut t) = (BigInt::zero(), BigInt::one());

    while !r.is_zero() {
        let quotient = &old_r / &r;

        let new_r = &old_r - &quotient * &r;
        old_r = std::mem::replace(&mut r, new_r);

        let new_s = &old_s - &quotient * &s;
        old_s = std::mem::replace(&mut s, new_s);

        let new_t = &old_t - &quotient * &t;
        old_t = std::mem::replace(&mut t, new_t);
    }

    (old_r, old_s, old_t)
}

/// [Modular multiplicative inverse](https://en.wikipedia.org/wiki/Modular_multiplicative_inverse)
pub fn inv_mod(a: BigUint, n: &BigUint) -> Option<BigUint> {
    assert!(&a < n);

    let (g, x, _) = egcd(BigInt::from(a), n.to_bigint().unwrap());

    if !g.is_one() {
        return None;
    }

    Some(math_mod(&x, n))
}

#[cfg(test)]
mod test {
    use num_bigint::{BigInt, BigUint};

    use super::{egcd, inv_mod};

    #[test]
    fn test_egcd() {
        let a = BigInt::from(3_usize);
        let b = BigInt::from(26_usize);
        let (gcd, x, y) = egcd(a.clone(), b.clone());

        assert_eq!(gcd, BigInt::from(1_usize));
        assert_eq!(x, BigInt::from(9_usize));
        assert_eq!(y, BigInt::from(-1_isize));
        assert_eq!(a * x + b * y, gcd);
    }
    #[test]
    fn test_inv_mod() {
        assert_eq!(
            inv_mod(BigUint::from(17_usize), &BigUint::from(3120_usize)),
            Some(BigUint::from(2753_usize)),
        );
    }
}
