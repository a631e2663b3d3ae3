//! Experience Cloud ID.

use core::fmt;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Number of decimal digits in a generated ECID.
pub const ECID_LENGTH: usize = 38;

/// Experience Cloud ID: the primary device identifier.
///
/// Generated values are 38 decimal digits built from a random v4 UUID. Each
/// 64-bit half is shifted right by one bit so it is a non-negative 63-bit
/// value, then printed zero-padded to 19 digits. Values adopted from the
/// legacy component or from persistence are kept verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ecid(String);

impl Default for Ecid {
    fn default() -> Self {
        Self::new()
    }
}

impl Ecid {
    /// Generate a fresh ECID.
    pub fn new() -> Self {
        let (high, low) = Uuid::new_v4().as_u64_pair();
        Self(format!("{:019}{:019}", high >> 1, low >> 1))
    }

    /// The ECID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the ECID, returning its string value.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for Ecid {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Ecid {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl AsRef<str> for Ecid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ecid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generated_ecid_is_38_digits() {
        let ecid = Ecid::new();
        assert_eq!(ecid.as_str().len(), ECID_LENGTH);
        assert!(ecid.as_str().bytes().all(|b| b.is_ascii_digit()));
    }

    #[test]
    fn test_generated_ecids_are_unique() {
        let ecids: HashSet<Ecid> = (0..1000).map(|_| Ecid::new()).collect();
        assert_eq!(ecids.len(), 1000);
    }

    #[test]
    fn test_from_string_is_verbatim() {
        let ecid = Ecid::from("legacy-ecid".to_string());
        assert_eq!(ecid.as_str(), "legacy-ecid");
        assert_eq!(ecid.to_string(), "legacy-ecid");
        assert_eq!(ecid, Ecid::from("legacy-ecid"));
        assert_ne!(ecid, Ecid::from("LEGACY-ECID"));
    }

    #[test]
    fn test_serde_is_transparent() {
        let ecid = Ecid::from("1234");
        assert_eq!(serde_json::to_string(&ecid).unwrap(), "\"1234\"");
        let back: Ecid = serde_json::from_str("\"1234\"").unwrap();
        assert_eq!(back, ecid);
    }
}
