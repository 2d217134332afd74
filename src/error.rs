use std::{io, result};
use thiserror::Error;

/// The result type of meter operations.
pub type Result<T> = result::Result<T, MeterError>;

/// The errors of the allocation rate meter.
#[derive(Debug, Error)]
pub enum MeterError {
    /// A runtime counter could not be read. Fatal to the sampling loop.
    #[error("counter {counter} is unavailable, {reason}")]
    CounterUnavailable {
        counter: &'static str,
        reason: String,
    },
    #[error("configuration is invalid, {0}")]
    InvalidConfig(String),
    #[error("the meter is no longer idle")]
    NotIdle,
    #[error("an io error occurred, {0}")]
    Io(io::Error),
}

impl MeterError {
    pub fn counter_unavailable(counter: &'static str, reason: impl Into<String>) -> Self {
        MeterError::CounterUnavailable {
            counter,
            reason: reason.into(),
        }
    }
}

impl PartialEq for MeterError {
    fn eq(&self, other: &MeterError) -> bool {
        match (self, other) {
            (
                MeterError::CounterUnavailable { counter: a, .. },
                MeterError::CounterUnavailable { counter: b, .. },
            ) => a == b,
            (MeterError::InvalidConfig(_), MeterError::InvalidConfig(_)) => true,
            (MeterError::NotIdle, MeterError::NotIdle) => true,
            (MeterError::Io(_), MeterError::Io(_)) => true,
            _ => false,
        }
    }
}

impl From<io::Error> for MeterError {
    fn from(err: io::Error) -> MeterError {
        MeterError::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_eq() {
        assert_eq!(
            MeterError::counter_unavailable("heap_used", "foo"),
            MeterError::counter_unavailable("heap_used", "bar")
        );
        assert_ne!(
            MeterError::counter_unavailable("heap_used", "foo"),
            MeterError::counter_unavailable("gc_cycles", "foo")
        );
        assert_eq!(MeterError::NotIdle, MeterError::NotIdle);
        assert_ne!(
            MeterError::NotIdle,
            MeterError::InvalidConfig("zero".to_string())
        );
    }

    #[test]
    fn test_from_io() {
        let err = MeterError::from(io::Error::from(io::ErrorKind::WouldBlock));

        assert_eq!(
            MeterError::Io(io::Error::from(io::ErrorKind::Other)),
            err
        );
    }

    #[test]
    fn test_display_counter_unavailable() {
        let err = MeterError::counter_unavailable("gc_cycles", "collector bean missing");

        assert_eq!(
            "counter gc_cycles is unavailable, collector bean missing",
            err.to_string()
        );
    }
}
