//! The sha1hash module provides the SHA-1 message digest and a small value
//! type, [Sha1Hash], to carry its result around.
//!
//! The [Sha1Hash] is internally a 160-bit value stored as 5 u32, one per
//! SHA-1 state register.
//!
//! A default constructor is provided to make the hash of 0s.
//! ```ignore
//! // creates a default hash value of all 0s
//! let hash = Sha1Hash::default();
//! ```
//!
//! [compute_sha1_hash] computes a hash from a slice of bytes. It is a pure
//! function and is safe to call from any number of threads at once.
//! ```ignore
//! let string = "hello world";
//! let hash = compute_sha1_hash(string.as_bytes());
//! ```
//!
//! When the input arrives in pieces, [Sha1Hasher] computes the same hash
//! incrementally, and [HashedWrite] hashes everything written through a
//! [std::io::Write].

#![cfg_attr(feature = "strict", deny(warnings))]

mod engine;
pub mod sha1_hash;

pub use engine::{compute_sha1_hash, HashedWrite, Sha1Hasher, BLOCK_SIZE_BYTES};
pub use sha1_hash::*;
