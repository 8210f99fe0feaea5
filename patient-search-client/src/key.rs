use crate::Error;
use std::fmt;

/// A trimmed, non-empty family name used as the cache key.
///
/// Keys are case-sensitive: `"Smith"` and `"SMITH"` are cached separately.
#[derive(Hash, Eq, PartialEq, Clone, Debug)]
pub struct LookupKey(String);

impl LookupKey {
    pub fn new(raw: &str) -> Result<Self, Error> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidKey);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Like [`LookupKey::new`], treating a missing key as invalid.
    pub fn parse(raw: Option<&str>) -> Result<Self, Error> {
        raw.map_or(Err(Error::InvalidKey), Self::new)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for LookupKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LookupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
