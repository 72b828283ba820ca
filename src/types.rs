//! Core types shared across the snapshot engine.

/// Hash: fixed-width 256-bit digest produced by a hash function
pub type Hash = [u8; 32];

/// Render a digest the way it is shown in logs and CLI output.
pub fn hash_to_hex(hash: &Hash) -> String {
    hex::encode(hash)
}
