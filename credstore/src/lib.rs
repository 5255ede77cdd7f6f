//! An in-memory credential store: logins mapped to the SHA-1 hash of their
//! password.
//!
//! The core is [ProbingTable], an open addressing hash table keyed by
//! fixed-width [LoginKey]s that owns the value stored in each slot.
//! [CredentialService] is a thin layer on top of it that hashes passwords
//! with [sha1hash::compute_sha1_hash] on registration and login.
//!
//! ```ignore
//! let mut service = CredentialService::new();
//! service.register("user", b"1234")?;
//! assert_eq!(service.login("user", b"1234")?, LoginOutcome::Accepted);
//! assert_eq!(service.login("user", b"1111")?, LoginOutcome::WrongPassword);
//! ```

#![cfg_attr(feature = "strict", deny(warnings))]

pub mod config;
pub mod constants;
mod error;
pub mod error_printer;
pub mod log;
mod login_key;
mod metrics;
mod probing_table;
mod service;

pub use config::{LogCfg, StoreConfig, TableCfg};
pub use error::{Result, StoreError};
pub use login_key::LoginKey;
pub use metrics::set_metrics_service_name;
pub use probing_table::{CredentialTable, ProbingTable, TableStats, MIN_TABLE_CAPACITY};
pub use service::{CredentialService, LoginOutcome};
pub use sha1hash::{compute_sha1_hash, Sha1Hash};
