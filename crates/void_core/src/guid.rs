//! Globally unique object identifiers.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::error::{GuidError, Result};

/// A 128-bit identifier that names one persistent object.
///
/// Distinct from a blueprint reference: a `Guid` says *which* instance,
/// never *what kind* of thing it is.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Guid(Uuid);

impl Guid {
    /// The all-zero identifier. Hosts use it for "no object".
    pub const NIL: Self = Self(Uuid::nil());

    /// Generate a fresh random identifier.
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }

    /// Build from raw bytes
    #[inline]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }

    /// Parse the hyphenated, braced or simple textual form.
    pub fn parse(value: &str) -> Result<Self> {
        Uuid::parse_str(value.trim())
            .map(Self)
            .map_err(|e| GuidError::Malformed {
                value: value.to_string(),
                reason: e.to_string(),
            })
    }

    #[inline]
    pub const fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }

    #[inline]
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }

    #[inline]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for Guid {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl FromStr for Guid {
    type Err = GuidError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl fmt::Debug for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Guid({})", self.0.hyphenated())
    }
}

// Hosts exchange guids as strings, so serialize the textual form.
impl Serialize for Guid {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Guid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> core::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Guid::parse(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "123e4567-e89b-12d3-a456-426614174000";

    #[test]
    fn test_parse_hyphenated() {
        let guid = Guid::parse(SAMPLE).unwrap();
        assert_eq!(guid.to_string(), SAMPLE);
        assert!(!guid.is_nil());
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        let lower = Guid::parse(SAMPLE).unwrap();
        let upper = Guid::parse(&SAMPLE.to_uppercase()).unwrap();
        assert_eq!(lower, upper);
    }

    #[test]
    fn test_parse_braced() {
        let guid = Guid::parse(&format!("{{{}}}", SAMPLE)).unwrap();
        assert_eq!(guid, Guid::parse(SAMPLE).unwrap());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = Guid::parse("not-a-guid").unwrap_err();
        assert!(matches!(err, GuidError::Malformed { .. }));
    }

    #[test]
    fn test_new_v4_is_unique() {
        assert_ne!(Guid::new_v4(), Guid::new_v4());
    }

    #[test]
    fn test_serde_uses_string_form() {
        let guid = Guid::parse(SAMPLE).unwrap();
        let json = serde_json::to_string(&guid).unwrap();
        assert_eq!(json, format!("\"{}\"", SAMPLE));
        let back: Guid = serde_json::from_str(&json).unwrap();
        assert_eq!(back, guid);
    }
}
