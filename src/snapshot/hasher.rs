//! Hashing primitive for snapshot digests
//!
//! Folding only needs an accumulator that can append a raw digest, append a
//! string, and finish into a fixed-width digest. BLAKE3 backs the default
//! implementation; any other function can be injected through [`HashFunction`]
//! without touching the fold logic.

use crate::types::Hash;

/// Signature tag mixed into every directory digest
pub const DIRECTORY_SIGNATURE: &str = "DIR";

/// Signature tag used as the digest of a missing file
pub const MISSING_FILE_SIGNATURE: &str = "MISSING_FILE";

const SIGNATURE_PREFIX: &str = "SIGNATURE";

/// Streaming hash accumulator
pub trait Hasher {
    /// Append a finished digest as raw bytes.
    fn put_hash(&mut self, hash: &Hash);

    /// Append a string, prefixed with its byte length.
    fn put_string(&mut self, value: &str);

    /// Append raw bytes without any framing.
    fn put_bytes(&mut self, bytes: &[u8]);

    /// Finalize into a digest.
    fn hash(self) -> Hash
    where
        Self: Sized;
}

/// Factory for hash accumulators
///
/// One accumulator is created per fold and dropped right after; accumulators
/// are never shared between directories or builders.
pub trait HashFunction {
    type Hasher: Hasher;

    fn new_hasher(&self) -> Self::Hasher;

    /// Hash a byte buffer in one go (used for file contents).
    fn hash_bytes(&self, bytes: &[u8]) -> Hash {
        let mut hasher = self.new_hasher();
        hasher.put_bytes(bytes);
        hasher.hash()
    }

    /// Compute the fixed signature digest for a kind of node.
    ///
    /// signature(thing) = hash("SIGNATURE" || thing), both length-prefixed.
    fn signature(&self, thing: &str) -> Hash {
        let mut hasher = self.new_hasher();
        hasher.put_string(SIGNATURE_PREFIX);
        hasher.put_string(thing);
        hasher.hash()
    }
}

/// BLAKE3 hash function, the default for every builder
#[derive(Debug, Clone, Copy, Default)]
pub struct Blake3;

/// BLAKE3 accumulator
#[derive(Debug, Clone, Default)]
pub struct Blake3Hasher {
    inner: blake3::Hasher,
}

impl Hasher for Blake3Hasher {
    fn put_hash(&mut self, hash: &Hash) {
        self.inner.update(hash);
    }

    fn put_string(&mut self, value: &str) {
        let bytes = value.as_bytes();
        // Length (8 bytes, big-endian) keeps ("ab", "c") apart from ("a", "bc")
        self.inner.update(&(bytes.len() as u64).to_be_bytes());
        self.inner.update(bytes);
    }

    fn put_bytes(&mut self, bytes: &[u8]) {
        self.inner.update(bytes);
    }

    fn hash(self) -> Hash {
        *self.inner.finalize().as_bytes()
    }
}

impl HashFunction for Blake3 {
    type Hasher = Blake3Hasher;

    fn new_hasher(&self) -> Blake3Hasher {
        Blake3Hasher::default()
    }
}

/// Compute a directory digest from its children in final order
///
/// digest = hash(dir_signature || for each child: name || child_digest)
///
/// Callers are responsible for ordering; this function hashes in the order given.
pub fn compute_directory_hash<'a, H, I>(hash_function: &H, dir_signature: &Hash, children: I) -> Hash
where
    H: HashFunction,
    I: IntoIterator<Item = (&'a str, &'a Hash)>,
{
    let mut hasher = hash_function.new_hasher();
    hasher.put_hash(dir_signature);
    for (name, hash) in children {
        hasher.put_string(name);
        hasher.put_hash(hash);
    }
    hasher.hash()
}

/// Compute content hash for file bytes with the default function
pub fn compute_content_hash(content: &[u8]) -> Hash {
    Blake3.hash_bytes(content)
}
