use std::io::Write;

use crate::sha1_hash::{Sha1Hash, SHA1_HASH_WORDS};

/// Size of one message block in bytes (512 bits).
pub const BLOCK_SIZE_BYTES: usize = 64;

/// Number of big-endian words read out of one block.
const BLOCK_SIZE_WORDS: usize = BLOCK_SIZE_BYTES / 4;

/// Number of words in the expanded message schedule, one per round.
const SCHEDULE_WORDS: usize = 80;

/// Bytes reserved at the end of the final block for the bit length.
const LENGTH_FIELD_BYTES: usize = 8;

const INITIAL_STATE: [u32; SHA1_HASH_WORDS] =
    [0x67452301, 0xEFCDAB89, 0x98BADCFE, 0x10325476, 0xC3D2E1F0];

const ROUND_CONSTANTS: [u32; 4] = [0x5A827999, 0x6ED9EBA1, 0x8F1BBCDC, 0xCA62C1D6];

/// Computes the SHA-1 hash of a byte slice.
///
/// This is a pure function: it keeps no state between calls and accepts
/// any input length, including the empty slice.
///
/// Example:
/// ```ignore
/// let hash = compute_sha1_hash(b"abc");
/// assert_eq!(hash.hex(), "a9993e364706816aba3e25717850c26c9cd0d89d");
/// ```
pub fn compute_sha1_hash(slice: &[u8]) -> Sha1Hash {
    let mut hasher = Sha1Hasher::new();
    hasher.update(slice);
    hasher.finalize()
}

/// Incremental SHA-1 hasher.
///
/// Feeding a message through any sequence of [Sha1Hasher::update] calls
/// produces the same hash as a single [compute_sha1_hash] over the whole
/// message.
#[derive(Clone, Debug)]
pub struct Sha1Hasher {
    state: [u32; SHA1_HASH_WORDS],
    buffer: [u8; BLOCK_SIZE_BYTES],
    buffer_len: usize,
    /// Total message length in bytes; wraps like the 64-bit length field.
    message_len: u64,
}

impl Default for Sha1Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Sha1Hasher {
    pub fn new() -> Self {
        Self {
            state: INITIAL_STATE,
            buffer: [0u8; BLOCK_SIZE_BYTES],
            buffer_len: 0,
            message_len: 0,
        }
    }

    pub fn update(&mut self, mut data: &[u8]) {
        self.message_len = self.message_len.wrapping_add(data.len() as u64);

        // top up a partially filled block first
        if self.buffer_len > 0 {
            let take = (BLOCK_SIZE_BYTES - self.buffer_len).min(data.len());
            self.buffer[self.buffer_len..self.buffer_len + take].copy_from_slice(&data[..take]);
            self.buffer_len += take;
            data = &data[take..];

            if self.buffer_len < BLOCK_SIZE_BYTES {
                return;
            }
            let block = self.buffer;
            process_block(&mut self.state, &block);
            self.buffer_len = 0;
        }

        let mut blocks = data.chunks_exact(BLOCK_SIZE_BYTES);
        for block in &mut blocks {
            process_block(&mut self.state, block);
        }

        let rest = blocks.remainder();
        self.buffer[..rest.len()].copy_from_slice(rest);
        self.buffer_len = rest.len();
    }

    /// Pads the buffered tail of the message and returns the final hash.
    ///
    /// Padding is a single `0x80` byte, zeros, then the message length in
    /// bits as a big-endian u64 closing out a 64-byte block. When the
    /// length field no longer fits behind the `0x80` byte, the padding
    /// spills into one extra block.
    pub fn finalize(mut self) -> Sha1Hash {
        let bit_len = self.message_len.wrapping_mul(8);

        self.buffer[self.buffer_len] = 0x80;
        self.buffer_len += 1;

        if BLOCK_SIZE_BYTES - self.buffer_len < LENGTH_FIELD_BYTES {
            self.buffer[self.buffer_len..].fill(0);
            let block = self.buffer;
            process_block(&mut self.state, &block);
            self.buffer_len = 0;
        }

        self.buffer[self.buffer_len..BLOCK_SIZE_BYTES - LENGTH_FIELD_BYTES].fill(0);
        self.buffer[BLOCK_SIZE_BYTES - LENGTH_FIELD_BYTES..].copy_from_slice(&bit_len.to_be_bytes());
        let block = self.buffer;
        process_block(&mut self.state, &block);

        Sha1Hash::from(self.state)
    }
}

/// Runs the 80-round compression function over one 64-byte block and adds
/// the result into the running state.
fn process_block(state: &mut [u32; SHA1_HASH_WORDS], block: &[u8]) {
    debug_assert_eq!(block.len(), BLOCK_SIZE_BYTES);

    let mut w = [0u32; SCHEDULE_WORDS];
    for (word, chunk) in w[..BLOCK_SIZE_WORDS].iter_mut().zip(block.chunks_exact(4)) {
        *word = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    for t in BLOCK_SIZE_WORDS..SCHEDULE_WORDS {
        w[t] = (w[t - 3] ^ w[t - 8] ^ w[t - 14] ^ w[t - 16]).rotate_left(1);
    }

    let [mut a, mut b, mut c, mut d, mut e] = *state;

    for (t, &word) in w.iter().enumerate() {
        let f = match t {
            0..=19 => (b & c) | (!b & d),
            20..=39 => b ^ c ^ d,
            40..=59 => (b & c) | (b & d) | (c & d),
            _ => b ^ c ^ d,
        };
        let temp = a
            .rotate_left(5)
            .wrapping_add(f)
            .wrapping_add(e)
            .wrapping_add(ROUND_CONSTANTS[t / 20])
            .wrapping_add(word);
        e = d;
        d = c;
        c = b.rotate_left(30);
        b = a;
        a = temp;
    }

    for (s, v) in state.iter_mut().zip([a, b, c, d, e]) {
        *s = s.wrapping_add(v);
    }
}

/// Wrapper around a Write trait that allows computation of the hash at the end.
///
/// ```ignore
/// let mut hashed_write = HashedWrite::new(out_file);
/// hashed_write.write_all(b"some data")?;
/// let h = hashed_write.hash();
/// ```
pub struct HashedWrite<W: Write> {
    hasher: Sha1Hasher,
    writer: W,
}

impl<W: Write> HashedWrite<W> {
    pub fn new(writer: W) -> Self {
        Self {
            hasher: Sha1Hasher::new(),
            writer,
        }
    }

    /// Hash of everything written so far. Does not consume the writer.
    pub fn hash(&self) -> Sha1Hash {
        self.hasher.clone().finalize()
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Write for HashedWrite<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        // only hash what the inner writer actually accepted
        let written = self.writer.write(buf)?;
        self.hasher.update(&buf[..written]);
        Ok(written)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}
