//! Core type definitions with validation.

use std::fmt;

use rand::RngCore;
use rusqlite::ToSql;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of characters in a log identifier.
pub const LOG_ID_LENGTH: usize = 8;

/// Symbols a log identifier is drawn from.
pub const LOG_ID_ALPHABET: &[u8; 36] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Largest multiple of the alphabet size that fits in a byte (36 * 7).
/// Bytes at or above it are discarded so every symbol is equally likely.
const UNBIASED_BYTE_LIMIT: u8 = 252;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// The value is not a well-formed log identifier.
    #[error("invalid log id {value:?}: expected 8 characters from [a-z0-9]")]
    InvalidLogId { value: String },
}

/// Identifier of a task log entry.
///
/// Always exactly [`LOG_ID_LENGTH`] characters from [`LOG_ID_ALPHABET`].
/// Uniqueness is enforced by the store, which checks candidates inside the
/// transaction that inserts the row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LogId(String);

impl LogId {
    /// Creates a log ID after validation.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if !Self::is_valid(&id) {
            return Err(ValidationError::InvalidLogId { value: id });
        }
        Ok(Self(id))
    }

    /// Returns true if `id` is a well-formed log identifier.
    pub fn is_valid(id: &str) -> bool {
        id.len() == LOG_ID_LENGTH && id.bytes().all(|b| LOG_ID_ALPHABET.contains(&b))
    }

    /// Draws a random identifier from `rng`.
    ///
    /// Callers that need collision-free identifiers should use an OS-backed
    /// generator and check the result against the target table.
    pub fn random<R: RngCore + ?Sized>(rng: &mut R) -> Result<Self, rand::Error> {
        let mut id = String::with_capacity(LOG_ID_LENGTH);
        let mut buf = [0_u8; LOG_ID_LENGTH * 2];
        while id.len() < LOG_ID_LENGTH {
            rng.try_fill_bytes(&mut buf)?;
            for byte in buf {
                if id.len() == LOG_ID_LENGTH {
                    break;
                }
                if byte < UNBIASED_BYTE_LIMIT {
                    let symbol = LOG_ID_ALPHABET[usize::from(byte) % LOG_ID_ALPHABET.len()];
                    id.push(char::from(symbol));
                }
            }
        }
        Ok(Self(id))
    }

    /// Returns the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for LogId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<LogId> for String {
    fn from(id: LogId) -> Self {
        id.0
    }
}

impl std::str::FromStr for LogId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for LogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for LogId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl ToSql for LogId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0.as_str()))
    }
}

impl FromSql for LogId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let raw = value.as_str()?;
        Self::new(raw).map_err(|err| FromSqlError::Other(Box::new(err)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rand::rngs::mock::StepRng;

    #[test]
    fn log_id_accepts_lowercase_alphanumeric() {
        assert!(LogId::new("a1b2c3d4").is_ok());
        assert!(LogId::new("zzzzzzzz").is_ok());
        assert!(LogId::new("01234567").is_ok());
    }

    #[test]
    fn log_id_rejects_malformed_values() {
        assert!(LogId::new("").is_err());
        assert!(LogId::new("a1b2c3d").is_err());
        assert!(LogId::new("a1b2c3d4e").is_err());
        assert!(LogId::new("A1B2C3D4").is_err());
        assert!(LogId::new("a1b2-3d4").is_err());
        assert!(LogId::new("42").is_err());
    }

    #[test]
    fn log_id_error_names_the_value() {
        let err = LogId::new("BAD").unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidLogId {
                value: "BAD".to_string()
            }
        );
        assert!(err.to_string().contains("\"BAD\""));
    }

    #[test]
    fn random_log_ids_are_well_formed() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let id = LogId::random(&mut rng).unwrap();
            assert_eq!(id.as_str().len(), LOG_ID_LENGTH);
            assert!(LogId::is_valid(id.as_str()), "bad id {id}");
        }
    }

    #[test]
    fn random_log_id_is_deterministic_for_constant_source() {
        // A source that only yields zero bytes maps every symbol to 'a'.
        let mut rng = StepRng::new(0, 0);
        let id = LogId::random(&mut rng).unwrap();
        assert_eq!(id.as_str(), "aaaaaaaa");
    }

    #[test]
    fn random_log_id_skips_biased_bytes() {
        // 0xFF bytes sit above the unbiased limit and must never be used, so a
        // source of nothing else runs until it fails.
        let mut rng = FailingAfter {
            inner: StepRng::new(u64::MAX, 0),
            remaining: 4,
        };
        assert!(LogId::random(&mut rng).is_err());
    }

    /// Wraps an RNG and fails after a fixed number of fills.
    struct FailingAfter {
        inner: StepRng,
        remaining: usize,
    }

    impl RngCore for FailingAfter {
        fn next_u32(&mut self) -> u32 {
            self.inner.next_u32()
        }

        fn next_u64(&mut self) -> u64 {
            self.inner.next_u64()
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            self.inner.fill_bytes(dest);
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
            if self.remaining == 0 {
                return Err(rand::Error::new(std::io::Error::other("entropy exhausted")));
            }
            self.remaining -= 1;
            self.inner.fill_bytes(dest);
            Ok(())
        }
    }

    #[test]
    fn log_id_serde_roundtrip() {
        let id = LogId::new("k3x9p0qa").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"k3x9p0qa\"");
        let parsed: LogId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn log_id_serde_rejects_malformed() {
        let result: Result<LogId, _> = serde_json::from_str("\"not-an-id\"");
        assert!(result.is_err());
    }

    #[test]
    fn log_id_parses_from_str() {
        let id: LogId = "abcd1234".parse().unwrap();
        assert_eq!(id.as_ref(), "abcd1234");
        assert!("abcd123".parse::<LogId>().is_err());
    }
}
