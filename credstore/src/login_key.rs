use std::fmt;

use crate::constants::LOGIN_LENGTH;
use crate::error::{Result, StoreError};

/// A login identifier in its fixed-width table form.
///
/// The key is always [LOGIN_LENGTH] bytes: the login followed by NUL
/// padding. Equality and hashing look at the full width, and every
/// constructor guarantees that nothing but NULs follows the first NUL, so
/// two keys are equal exactly when their logins are equal.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct LoginKey([u8; LOGIN_LENGTH]);

impl LoginKey {
    /// Validates `login` and pads it out to [LOGIN_LENGTH] bytes.
    ///
    /// Logins longer than the key width are rejected rather than truncated,
    /// so two different logins can never end up sharing a key. A NUL byte
    /// would be indistinguishable from padding and is rejected as well.
    pub fn new(login: &[u8]) -> Result<Self> {
        if login.len() > LOGIN_LENGTH {
            return Err(StoreError::InvalidLoginLength(login.len()));
        }
        if login.contains(&0) {
            return Err(StoreError::LoginContainsNul);
        }
        let mut key = [0u8; LOGIN_LENGTH];
        key[..login.len()].copy_from_slice(login);
        Ok(LoginKey(key))
    }

    /// Builds a key from a raw fixed-width buffer, as read from a C style
    /// `char[LOGIN_LENGTH]`. Everything after the first NUL is treated as
    /// padding and cleared.
    pub fn from_raw(mut raw: [u8; LOGIN_LENGTH]) -> Self {
        if let Some(end) = raw.iter().position(|&b| b == 0) {
            raw[end..].fill(0);
        }
        LoginKey(raw)
    }

    /// The full fixed-width buffer, padding included.
    pub fn as_bytes(&self) -> &[u8; LOGIN_LENGTH] {
        &self.0
    }

    /// The login without its padding.
    pub fn login(&self) -> &[u8] {
        let end = self.0.iter().position(|&b| b == 0).unwrap_or(LOGIN_LENGTH);
        &self.0[..end]
    }

    /// Sum of the raw byte values over the full width; input to the
    /// table's placement hash.
    pub(crate) fn byte_sum(&self) -> u32 {
        self.0.iter().map(|&b| b as u32).sum()
    }
}

impl TryFrom<&str> for LoginKey {
    type Error = StoreError;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value.as_bytes())
    }
}

impl TryFrom<&[u8]> for LoginKey {
    type Error = StoreError;

    fn try_from(value: &[u8]) -> Result<Self> {
        Self::new(value)
    }
}

impl From<[u8; LOGIN_LENGTH]> for LoginKey {
    fn from(value: [u8; LOGIN_LENGTH]) -> Self {
        Self::from_raw(value)
    }
}

impl fmt::Display for LoginKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(self.login()))
    }
}

impl fmt::Debug for LoginKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LoginKey({:?})", String::from_utf8_lossy(self.login()))
    }
}
