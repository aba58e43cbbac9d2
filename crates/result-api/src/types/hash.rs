use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

const SHA1_PREFIX: &str = "urn:sha1:";
const SHA1_BASE32_LEN: usize = 32;

/// A SHA-1 content URN identifying the exact bytes of a shared file.
///
/// Stored in canonical form (`urn:sha1:` followed by 32 upper-case base32
/// characters) so equality is a plain string comparison.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentHash(String);

impl ContentHash {
    /// Parse a hash from either a full URN or a bare base32 digest.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidHash`] when the digest has the wrong
    /// length or contains characters outside the base32 alphabet.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        let trimmed = value.trim();
        let digest = match trimmed.get(..SHA1_PREFIX.len()) {
            Some(prefix) if prefix.eq_ignore_ascii_case(SHA1_PREFIX) => {
                &trimmed[SHA1_PREFIX.len()..]
            }
            _ => trimmed,
        };

        if digest.len() != SHA1_BASE32_LEN {
            return Err(ValidationError::InvalidHash {
                value: value.to_string(),
                reason: "expected 32 base32 characters",
            });
        }

        let digest = digest.to_ascii_uppercase();
        if !digest
            .bytes()
            .all(|b| b.is_ascii_uppercase() || (b'2'..=b'7').contains(&b))
        {
            return Err(ValidationError::InvalidHash {
                value: value.to_string(),
                reason: "digest is not base32",
            });
        }

        Ok(Self(format!("{SHA1_PREFIX}{digest}")))
    }

    /// The canonical URN text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ContentHash {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ContentHash> for String {
    fn from(hash: ContentHash) -> Self {
        hash.0
    }
}
