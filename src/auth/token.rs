//! Caller identity as presented on a request
//!
//! Tokens are carried through to the access policy and breadcrumbs as-is;
//! issuing and verifying them happens elsewhere.

/// Bearer token presented by the caller, if any
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActorToken(Option<String>);

impl ActorToken {
    pub fn anonymous() -> Self {
        Self(None)
    }

    pub fn bearer(token: impl Into<String>) -> Self {
        Self(Some(token.into()))
    }

    /// Build from an `Authorization` header value
    pub fn from_header(header: Option<&str>) -> Self {
        match header.and_then(extract_token_from_header) {
            Some(token) => Self::bearer(token),
            None => Self::anonymous(),
        }
    }

    pub fn is_anonymous(&self) -> bool {
        self.0.is_none()
    }

    /// Short identity for audit breadcrumbs; never the full token
    pub fn subject(&self) -> Option<String> {
        self.0.as_ref().map(|t| {
            let prefix: String = t.chars().take(8).collect();
            format!("token:{}", prefix)
        })
    }
}

/// Strip the `Bearer ` scheme from an `Authorization` header
pub fn extract_token_from_header(header: &str) -> Option<&str> {
    let token = header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}
