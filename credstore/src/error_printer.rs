use std::fmt::{Debug, Display};

use tracing::{error, warn};

/// Logs the error side of a `Result` on its way through and hands the
/// result back untouched. The message is only built when there is an error
/// to report.
pub trait ErrorPrinter {
    /// Logs `"{message}, error: {e:?}"` at the error level.
    fn log_error<M: Display>(self, message: impl FnOnce() -> M) -> Self;

    /// Same as [ErrorPrinter::log_error], at the warn level. Used for
    /// rejected input, which the caller is expected to handle.
    fn warn_error<M: Display>(self, message: impl FnOnce() -> M) -> Self;
}

impl<T, E: Debug> ErrorPrinter for Result<T, E> {
    fn log_error<M: Display>(self, message: impl FnOnce() -> M) -> Self {
        if let Err(e) = &self {
            error!("{}, error: {:?}", message(), e);
        }
        self
    }

    fn warn_error<M: Display>(self, message: impl FnOnce() -> M) -> Self {
        if let Err(e) = &self {
            warn!("{}, error: {:?}", message(), e);
        }
        self
    }
}
