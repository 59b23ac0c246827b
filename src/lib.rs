//! Dual-exponent RSA envelopes and passphrase-derived keys for the xault
//! messaging prototype.
//!
//! Each identity holds one [`dualkey::DualKey`]: two private exponents over
//! a shared modulus, one for decrypting incoming [`envelope`]s and one for
//! signing outgoing ones. [`kdf`] lets a key be regenerated deterministically
//! from a memorable word phrase instead of stored on disk.
//!
//! This crate implements its own RSA, AES and SHA-256 rather than pulling in
//! an existing crypto library — treat it as a real-world exercise, not a
//! general-purpose crypto toolkit.

#![deny(clippy::correctness)]
#![warn(clippy::style)]
#![warn(clippy::complexity)]
#![warn(clippy::perf)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::use_self)]
#![allow(clippy::unreadable_literal)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::needless_range_loop)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::module_name_repetitions)]

pub mod aes;
pub mod digest;
pub mod dualkey;
pub mod envelope;
pub mod error;
pub mod kdf;
pub mod rsa;

pub use dualkey::{DualKey, DualPublicKey};
pub use error::{Error, Result};
