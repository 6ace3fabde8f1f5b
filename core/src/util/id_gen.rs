use std::sync::atomic::{AtomicU64, Ordering};

use uuid::Uuid;

use crate::error::ExecutorError;

/// Identifiers are 128 random bits.
pub const ID_BYTES: usize = 16;

/// Source of the random identifiers used for branch and file names.
///
/// Passed explicitly to the executor so tests can substitute a deterministic
/// source. An error is fatal to the whole run.
pub trait IdSource: Send + Sync {
    fn random_bytes(&self) -> Result<[u8; ID_BYTES], ExecutorError>;

    /// Next identifier as 32 lowercase hex characters.
    fn next_id(&self) -> Result<String, ExecutorError> {
        let bytes = self.random_bytes()?;
        Ok(Uuid::from_bytes(bytes).simple().to_string())
    }
}

/// Operating system CSPRNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsIdSource;

impl IdSource for OsIdSource {
    fn random_bytes(&self) -> Result<[u8; ID_BYTES], ExecutorError> {
        let mut buf = [0u8; ID_BYTES];
        getrandom::getrandom(&mut buf).map_err(|e| ExecutorError::Randomness(e.to_string()))?;
        Ok(buf)
    }
}

/// Deterministic counter-based source: 1, 2, 3, ... encoded big-endian.
#[derive(Debug, Default)]
pub struct SequenceIdSource {
    next: AtomicU64,
}

impl SequenceIdSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(start: u64) -> Self {
        Self {
            next: AtomicU64::new(start),
        }
    }
}

impl IdSource for SequenceIdSource {
    fn random_bytes(&self) -> Result<[u8; ID_BYTES], ExecutorError> {
        let n = self.next.fetch_add(1, Ordering::Relaxed) + 1;
        Ok((n as u128).to_be_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;
    use std::collections::HashSet;

    #[test]
    fn test_os_id_format() {
        let id = OsIdSource.next_id().unwrap();
        let re = Regex::new(r"^[a-f0-9]{32}$").unwrap();
        assert!(re.is_match(&id), "Generated ID: {}", id);
    }

    #[test]
    fn test_os_id_uniqueness() {
        let mut ids = HashSet::new();
        for _ in 0..200 {
            let id = OsIdSource.next_id().unwrap();
            assert!(ids.insert(id.clone()), "Duplicate ID: {}", id);
        }
    }

    #[test]
    fn test_sequence_source_is_deterministic() {
        let src = SequenceIdSource::new();
        assert_eq!(src.next_id().unwrap(), format!("{:032x}", 1));
        assert_eq!(src.next_id().unwrap(), format!("{:032x}", 2));

        let src = SequenceIdSource::starting_at(0xff);
        assert_eq!(src.next_id().unwrap(), format!("{:032x}", 0x100));
    }
}
