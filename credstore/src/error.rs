use std::collections::TryReserveError;
use std::io;

use thiserror::Error;

use crate::constants::LOGIN_LENGTH;

#[non_exhaustive]
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Login is {0} bytes long, at most {} are allowed", LOGIN_LENGTH)]
    InvalidLoginLength(usize),

    #[error("Login contains a NUL byte")]
    LoginContainsNul,

    #[error("Table capacity must be a power of two of at least 2, got {0}")]
    InvalidCapacity(usize),

    #[error("Table capacity overflowed while growing from {0}")]
    CapacityOverflow(usize),

    #[error("Couldn't allocate table storage: {0}")]
    OutOfMemory(#[from] TryReserveError),

    #[error("Invariant violated in the function: {0}")]
    InvariantViolated(String),

    #[error("Config parsing error: {0}")]
    ConfigParse(#[from] config::ConfigError),

    #[error("Couldn't serialize config due to: {0}")]
    ConfigSerialization(#[from] toml::ser::Error),

    #[error("Issue with disk: {0}")]
    IO(#[from] io::Error),

    #[error("Invalid log filter: {0}")]
    LogFilter(#[from] tracing_subscriber::filter::ParseError),

    #[error("Couldn't install log subscriber: {0}")]
    LogInit(String),
}

// Define our own result type here (this seems to be the standard).
pub type Result<T> = std::result::Result<T, StoreError>;

// For error checking
impl PartialEq for StoreError {
    fn eq(&self, other: &StoreError) -> bool {
        match (self, other) {
            (StoreError::InvalidLoginLength(a), StoreError::InvalidLoginLength(b)) => a == b,
            (StoreError::LoginContainsNul, StoreError::LoginContainsNul) => true,
            (StoreError::InvalidCapacity(a), StoreError::InvalidCapacity(b)) => a == b,
            (StoreError::CapacityOverflow(a), StoreError::CapacityOverflow(b)) => a == b,
            (StoreError::IO(e1), StoreError::IO(e2)) => e1.kind() == e2.kind(),
            _ => false,
        }
    }
}
