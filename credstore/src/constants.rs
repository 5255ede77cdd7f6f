/// Width in bytes of every login key. Shorter logins are null padded.
pub const LOGIN_LENGTH: usize = 10;

/// Capacity of a table built with `ProbingTable::new`.
pub const DEFAULT_TABLE_CAPACITY: usize = 8;

/// Fractional part of the golden ratio, the multiplier of the placement hash.
pub const GOLDEN_RATIO_FRACTION: f64 = 0.6180339887;

/// Default `EnvFilter` directive when neither config nor `RUST_LOG` sets one.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Prefix of the environment variables that override the config file.
pub const CONFIG_ENV_PREFIX: &str = "CREDSTORE";
