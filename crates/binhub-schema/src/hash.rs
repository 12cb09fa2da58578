use anyhow::Result;
use serde::{Deserialize, Deserializer, Serialize};

/// A validated SHA256 digest (64 hex characters, stored lowercase).
///
/// This newtype ensures that all digests in the system are validated at
/// deserialization time, preventing invalid hex strings from propagating
/// through the codebase. Because the stored form is normalized to lowercase,
/// comparing a computed lowercase-hex digest against a declared one is
/// effectively case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Sha256Digest(String);

impl Sha256Digest {
    /// Create a new `Sha256Digest`, validating the input.
    ///
    /// Accepts strings with or without a `sha256:` prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if the hex portion is not exactly 64 ASCII hex
    /// characters.
    pub fn new(s: impl Into<String>) -> Result<Self> {
        let s = s.into();
        let hex = s.strip_prefix("sha256:").unwrap_or(&s);

        if hex.len() != 64 {
            anyhow::bail!(
                "Invalid SHA256 digest: expected 64 hex characters, got {} in '{s}'",
                hex.len(),
            );
        }

        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            anyhow::bail!("Invalid SHA256 digest: contains non-hex characters in '{s}'");
        }

        Ok(Self(hex.to_lowercase()))
    }

    /// Get the digest as a lowercase hex string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this digest matches a computed lowercase-hex digest string.
    pub fn matches(&self, computed_hex: &str) -> bool {
        self.0 == computed_hex.to_lowercase()
    }
}

impl<'de> Deserialize<'de> for Sha256Digest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for Sha256Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Sha256Digest {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JQ_DIGEST: &str = "af986793a515d500ab2d35f8d2aecd656e764504b789b66d7e1a0b727a124c44";

    #[test]
    fn accepts_64_hex_chars() {
        let digest = Sha256Digest::new(JQ_DIGEST).unwrap();
        assert_eq!(digest.as_str(), JQ_DIGEST);
    }

    #[test]
    fn normalizes_to_lowercase() {
        let digest = Sha256Digest::new(JQ_DIGEST.to_uppercase()).unwrap();
        assert_eq!(digest.as_str(), JQ_DIGEST);
        assert!(digest.matches(&JQ_DIGEST.to_uppercase()));
    }

    #[test]
    fn strips_sha256_prefix() {
        let digest = Sha256Digest::new(format!("sha256:{JQ_DIGEST}")).unwrap();
        assert_eq!(digest.as_str(), JQ_DIGEST);
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(Sha256Digest::new("abc123").is_err());
        assert!(Sha256Digest::new(format!("{JQ_DIGEST}00")).is_err());
    }

    #[test]
    fn rejects_non_hex() {
        let bad = format!("{}zz", &JQ_DIGEST[..62]);
        assert!(Sha256Digest::new(bad).is_err());
    }

    #[test]
    fn deserializes_and_validates() {
        let ok: Sha256Digest = serde_json::from_str(&format!("\"{JQ_DIGEST}\"")).unwrap();
        assert_eq!(ok.as_str(), JQ_DIGEST);

        let err: Result<Sha256Digest, _> = serde_json::from_str("\"not-a-digest\"");
        assert!(err.is_err());
    }
}
