use sha1hash::compute_sha1_hash;
use tracing::info;

use crate::config::StoreConfig;
use crate::error::Result;
use crate::error_printer::ErrorPrinter;
use crate::login_key::LoginKey;
use crate::probing_table::{CredentialTable, ProbingTable};

/// Result of a login attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    Accepted,
    /// The login exists but the password hash does not match.
    WrongPassword,
    UnknownLogin,
}

/// Registration and login on top of a [CredentialTable].
///
/// Passwords are stored as their SHA-1 hash, keyed by the login. There is
/// no salting and the comparison is a plain equality check.
#[derive(Debug, Default)]
pub struct CredentialService {
    users: CredentialTable,
}

impl CredentialService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(users: CredentialTable) -> Self {
        Self { users }
    }

    /// Builds a service whose table starts at the configured capacity.
    pub fn from_config(cfg: &StoreConfig) -> Result<Self> {
        Ok(Self::with_table(ProbingTable::with_capacity(
            cfg.table.capacity,
        )?))
    }

    /// Stores the hash of `password` for `login`, replacing any earlier
    /// registration of the same login.
    pub fn register(&mut self, login: &str, password: &[u8]) -> Result<()> {
        let key = LoginKey::try_from(login)
            .warn_error(|| format!("Rejected registration of {login:?}"))?;
        self.users.add(key, compute_sha1_hash(password))?;
        info!("Registered {key}");
        Ok(())
    }

    /// Checks `password` against the hash stored for `login`.
    pub fn login(&self, login: &str, password: &[u8]) -> Result<LoginOutcome> {
        let key = LoginKey::try_from(login)
            .warn_error(|| format!("Rejected login of {login:?}"))?;
        let outcome = match self.users.find(&key) {
            None => LoginOutcome::UnknownLogin,
            Some(stored) if *stored == compute_sha1_hash(password) => LoginOutcome::Accepted,
            Some(_) => LoginOutcome::WrongPassword,
        };
        Ok(outcome)
    }

    /// Removes the account for `login`. Returns whether it existed.
    pub fn remove(&mut self, login: &str) -> Result<bool> {
        let key = LoginKey::try_from(login)
            .warn_error(|| format!("Rejected removal of {login:?}"))?;
        let removed = self.users.del(&key);
        if removed {
            info!("Removed {key}");
        }
        Ok(removed)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn table(&self) -> &CredentialTable {
        &self.users
    }
}
