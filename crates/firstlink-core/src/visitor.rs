use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt::Display;

/// Best-effort identity of a caller, used by the per-visitor policy.
///
/// Derived from request headers that the caller controls, so it is an
/// approximation and never a security boundary.
///
/// Identities longer than [`MAX_IDENTITY_LEN`] bytes are replaced by
/// `sha256:<hex digest>`, so every identity fits the ledger key column and
/// distinct long identities stay distinct.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct VisitorId(String);

/// Identity used when no forwarding header is present.
pub const LOOPBACK_IDENTITY: &str = "127.0.0.1";

/// Longest identity stored verbatim.
pub const MAX_IDENTITY_LEN: usize = 64;

const DIGEST_PREFIX: &str = "sha256:";

impl VisitorId {
    pub fn new(identity: impl Into<String>) -> Self {
        let identity = identity.into();
        if identity.len() <= MAX_IDENTITY_LEN {
            return Self(identity);
        }

        let mut hasher = Sha256::new();
        hasher.update(identity.as_bytes());
        Self(format!("{DIGEST_PREFIX}{}", hex::encode(hasher.finalize())))
    }

    /// The loopback sentinel.
    pub fn loopback() -> Self {
        Self(LOOPBACK_IDENTITY.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for VisitorId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<VisitorId> for String {
    fn from(value: VisitorId) -> Self {
        value.0
    }
}

impl Display for VisitorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
