use subtle::ConstantTimeEq;

/// Header carrying the shared API secret.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Why a request was refused by the API key guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unauthorized {
    /// The server has no `OUTPOST_API_KEY` configured.
    NotConfigured,
    /// The caller sent no key, or the wrong one.
    InvalidKey,
}

impl std::fmt::Display for Unauthorized {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Unauthorized::NotConfigured => write!(f, "OUTPOST_API_KEY not configured"),
            Unauthorized::InvalidKey => write!(f, "Invalid API key"),
        }
    }
}

/// Check a provided key against the configured secret.
pub fn authorize(expected: Option<&str>, provided: Option<&str>) -> Result<(), Unauthorized> {
    let expected = expected.ok_or(Unauthorized::NotConfigured)?;
    let provided = provided.ok_or(Unauthorized::InvalidKey)?;

    if bool::from(expected.as_bytes().ct_eq(provided.as_bytes())) {
        Ok(())
    } else {
        Err(Unauthorized::InvalidKey)
    }
}
