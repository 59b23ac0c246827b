//! [Message digest](https://en.wikipedia.org/wiki/Message_digest) implementations
//! and related utilities.

pub mod sha256;

pub use sha256::SHA256;

/// Trait for [message digest](https://en.wikipedia.org/wiki/Message_digest)
/// implementations used by the RSA padding schemes in this crate.
pub trait Digest: Default {
    /// Length in bytes of the digest output.
    const OUTPUT_LENGTH: usize;

    /// Length in bytes of the digest's internal block.
    const BLOCK_LENGTH: usize;

    /// DER encoding of the digest algorithm identifier, prepended to the
    /// hash inside a PKCS#1 v1.5 signature.
    const ASN1_PREFIX: &'static [u8];

    type Output: AsRef<[u8]> + Clone;

    /// Update the digest with `message` bytes
    fn update(&mut self, message: &[u8]);

    /// Finalize the digest and get its value
    fn finalize(self) -> Self::Output;

    /// Convenience method to update the digest with `message` bytes in a
    /// chainable fashion
    fn chain(mut self, message: &[u8]) -> Self
    where
        Self: Sized,
    {
        self.update(message);
        self
    }

    /// Convenience method to update the digest with `message` bytes and
    /// immediately finalize it
    fn digest(mut self, message: &[u8]) -> Self::Output
    where
        Self: Sized,
    {
        self.update(message);
        self.finalize()
    }

    /// Hash `message` in one call, starting from a fresh instance.
    fn hash(message: &[u8]) -> Self::Output
    where
        Self: Sized,
    {
        Self::default().digest(message)
    }
}
