//! Deterministic cache keys.

use std::fmt;

/// Number of snapshot characters folded into a fingerprint.
pub const SNAPSHOT_PREFIX_CHARS: usize = 200;

/// Cache key: the instruction followed by the first
/// [`SNAPSHOT_PREFIX_CHARS`] characters of the snapshot.
///
/// Characters are counted as `char`s so the key never splits a UTF-8 sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Compute the fingerprint for an instruction and a raw snapshot.
    pub fn new(instruction: &str, snapshot: &str) -> Self {
        let end = snapshot
            .char_indices()
            .nth(SNAPSHOT_PREFIX_CHARS)
            .map(|(i, _)| i)
            .unwrap_or(snapshot.len());

        let mut key = String::with_capacity(instruction.len() + end);
        key.push_str(instruction);
        key.push_str(&snapshot[..end]);
        Self(key)
    }

    /// Wrap a key read back from a cache file.
    pub fn from_key(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The key string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the key string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Fingerprint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_prefix() {
        let snapshot = "x".repeat(500);
        let fp = Fingerprint::new("click login", &snapshot);
        assert_eq!(fp.as_str().len(), "click login".len() + SNAPSHOT_PREFIX_CHARS);
        assert!(fp.as_str().starts_with("click login"));
    }

    #[test]
    fn test_fingerprint_short_snapshot() {
        let fp = Fingerprint::new("fill username", "<html></html>");
        assert_eq!(fp.as_str(), "fill username<html></html>");
    }

    #[test]
    fn test_fingerprint_deterministic() {
        let a = Fingerprint::new("fill username", "<input id=\"user-name\">");
        let b = Fingerprint::new("fill username", "<input id=\"user-name\">");
        assert_eq!(a, b);
    }

    #[test]
    fn test_fingerprint_tail_changes_ignored() {
        let head = "a".repeat(SNAPSHOT_PREFIX_CHARS);
        let a = Fingerprint::new("click", &format!("{head}<p>one</p>"));
        let b = Fingerprint::new("click", &format!("{head}<p>two</p>"));
        assert_eq!(a, b);
    }

    #[test]
    fn test_fingerprint_multibyte_boundary() {
        let snapshot = "é".repeat(300);
        let fp = Fingerprint::new("", &snapshot);
        assert_eq!(fp.as_str().chars().count(), SNAPSHOT_PREFIX_CHARS);
    }
}
