//! Unified error type for the dual-exponent RSA core.
//!
//! `UnableToVerify` and `VerifiedButMalformed` must stay distinguishable to
//! tests but must never be distinguishable to a remote caller who only sees
//! the `Display` string — see `spec.md` §7/§9.

use thiserror::Error;

/// Every failure mode exposed by this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Key generation inputs were out of range (e.g. odd or too-small bit
    /// length).
    #[error("bad key generation parameters")]
    BadParameters,

    /// An envelope was rejected before its contents could be trusted:
    /// signature failure, truncation, or a length-prefix sanity check
    /// failing. Carries a debug-only tag so tests can tell failure modes
    /// apart without the tag ever reaching a `Display`d message.
    #[error("envelope rejected")]
    UnableToVerify {
        #[doc(hidden)]
        reason: &'static str,
    },

    /// The envelope's signature verified, but its inner framing, wrapped
    /// key, or padding was corrupt. Indicates a logic bug or an adversary
    /// with a signing oracle, never a routine transport error. Shares its
    /// `Display` string with `UnableToVerify` on purpose: a remote caller
    /// must not learn whether a rejected envelope failed signature
    /// verification or failed after verifying.
    #[error("envelope rejected")]
    VerifiedButMalformed {
        #[doc(hidden)]
        reason: &'static str,
    },

    /// A word in a passphrase was not within edit distance 1 of any known
    /// word.
    #[error("{0:?} is not a valid word")]
    InvalidWord(String),

    /// A corrected phrase did not contain any version word.
    #[error("phrase did not encode a version")]
    NoVersion,

    /// A corrected phrase contained more than one version word.
    #[error("phrase encoded more than one version: {0:?} and {1:?}")]
    MultipleVersions(String, String),

    /// `MakeDualKey` exhausted its retry budget without finding a usable
    /// `(P, Q)` pair with two qualifying exponents.
    #[error("unable to generate a dual key after exhausting retries")]
    KeyGeneration,
}

impl Error {
    pub(crate) fn unable_to_verify(reason: &'static str) -> Error {
        Error::UnableToVerify { reason }
    }

    pub(crate) fn verified_but_malformed(reason: &'static str) -> Error {
        Error::VerifiedButMalformed { reason }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
