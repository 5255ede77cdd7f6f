use serde::{Deserialize, Serialize};
use std::cmp::{Eq, Ord, Ordering, PartialEq, PartialOrd};
use std::error::Error;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::num::ParseIntError;
use std::ops::Deref;

/// Number of 32-bit words in a SHA-1 digest.
pub const SHA1_HASH_WORDS: usize = 5;

/// Number of bytes in a SHA-1 digest.
pub const SHA1_HASH_BYTES: usize = SHA1_HASH_WORDS * 4;

/**************************************************************************/
/*                                                                        */
/*                                Sha1Hash                                */
/*                                                                        */
/**************************************************************************/

/// The Sha1Hash is a transparent 160-bit value stored as `[u32; 5]`.
///
/// Word `i` is the final value of the i-th SHA-1 state register. The
/// canonical byte form (see [Sha1Hash::to_bytes]) is the big-endian
/// concatenation of the five words, which is also what the hex printout
/// shows, so the hex of a Sha1Hash matches every other SHA-1 tool.
///
/// [compute_sha1_hash](crate::compute_sha1_hash) is the main way in which
/// a hash is produced.
///
/// ```ignore
/// let hash = compute_sha1_hash(b"abc");
/// println!("Hello Hash {}", hash);
/// ```
#[derive(Clone, Copy, Serialize, Deserialize)]
pub struct Sha1Hash([u32; SHA1_HASH_WORDS]);

impl Deref for Sha1Hash {
    type Target = [u32; SHA1_HASH_WORDS];
    #[inline(always)]
    fn deref(&self) -> &[u32; SHA1_HASH_WORDS] {
        &self.0
    }
}

impl From<[u32; SHA1_HASH_WORDS]> for Sha1Hash {
    fn from(value: [u32; SHA1_HASH_WORDS]) -> Self {
        Sha1Hash(value)
    }
}

impl From<[u8; SHA1_HASH_BYTES]> for Sha1Hash {
    fn from(value: [u8; SHA1_HASH_BYTES]) -> Self {
        Self::from(&value)
    }
}

impl From<&[u8; SHA1_HASH_BYTES]> for Sha1Hash {
    fn from(value: &[u8; SHA1_HASH_BYTES]) -> Self {
        let mut words = [0u32; SHA1_HASH_WORDS];
        for (word, chunk) in words.iter_mut().zip(value.chunks_exact(4)) {
            *word = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        Sha1Hash(words)
    }
}

impl Default for Sha1Hash {
    /// The default constructor returns a Sha1Hash of 0s
    fn default() -> Sha1Hash {
        Sha1Hash([0; SHA1_HASH_WORDS])
    }
}

impl PartialEq for Sha1Hash {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Sha1Hash {}

impl Ord for Sha1Hash {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl PartialOrd for Sha1Hash {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The error type that is returned if [Sha1Hash::from_hex] fails.
#[derive(Debug, Clone)]
pub struct Sha1HashHexParseError;

impl Error for Sha1HashHexParseError {}

impl fmt::Display for Sha1HashHexParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Invalid hex input for Sha1Hash")
    }
}

impl From<ParseIntError> for Sha1HashHexParseError {
    fn from(_err: ParseIntError) -> Self {
        Sha1HashHexParseError {}
    }
}

impl Sha1Hash {
    /// Returns the hexadecimal printout of the hash.
    pub fn hex(&self) -> String {
        format!(
            "{:08x}{:08x}{:08x}{:08x}{:08x}",
            self.0[0], self.0[1], self.0[2], self.0[3], self.0[4]
        )
    }

    /// Parses a hexadecimal string as a Sha1Hash, returning
    /// Err(Sha1HashHexParseError) on failure.
    pub fn from_hex(h: &str) -> Result<Sha1Hash, Sha1HashHexParseError> {
        if h.len() != 2 * SHA1_HASH_BYTES {
            return Err(Sha1HashHexParseError {});
        }
        let good = h.as_bytes().iter().all(|c| c.is_ascii_hexdigit());
        if !good {
            return Err(Sha1HashHexParseError {});
        }
        let mut ret: Sha1Hash = Default::default();
        for (i, word) in ret.0.iter_mut().enumerate() {
            *word = u32::from_str_radix(&h[(8 * i)..(8 * (i + 1))], 16)?;
        }
        Ok(ret)
    }

    /// Returns the hash in its canonical big-endian byte form.
    pub fn to_bytes(&self) -> [u8; SHA1_HASH_BYTES] {
        let mut bytes = [0u8; SHA1_HASH_BYTES];
        for (chunk, word) in bytes.chunks_exact_mut(4).zip(self.0.iter()) {
            chunk.copy_from_slice(&word.to_be_bytes());
        }
        bytes
    }

    pub fn from_slice(value: &[u8]) -> Result<Self, Sha1HashBytesParseError> {
        let bytes: &[u8; SHA1_HASH_BYTES] =
            value.try_into().map_err(|_| Sha1HashBytesParseError)?;
        Ok(Self::from(bytes))
    }
}

/// The error type that is returned if TryFrom<&[u8]> fails.
#[derive(Debug, Clone)]
pub struct Sha1HashBytesParseError;

impl Error for Sha1HashBytesParseError {}

impl fmt::Display for Sha1HashBytesParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Invalid bytes input for Sha1Hash")
    }
}

impl TryFrom<&[u8]> for Sha1Hash {
    type Error = Sha1HashBytesParseError;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        Self::from_slice(value)
    }
}

impl From<Sha1Hash> for Vec<u8> {
    fn from(val: Sha1Hash) -> Self {
        val.to_bytes().into()
    }
}

impl From<&Sha1Hash> for Vec<u8> {
    fn from(val: &Sha1Hash) -> Self {
        val.to_bytes().into()
    }
}

// The digest is already well mixed; the first word is plenty for hashtables.
impl Hash for Sha1Hash {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u32(self.0[0]);
    }
}

impl fmt::LowerHex for Sha1Hash {
    /// Allow the Sha1Hash to be printed with
    /// `println!("{:x}", hash)`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}", self.hex())
    }
}

impl fmt::Display for Sha1Hash {
    /// Allow the Sha1Hash to be printed with
    /// `println!("{}", hash)`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}", self.hex())
    }
}

impl fmt::Debug for Sha1Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}", self.hex())
    }
}
