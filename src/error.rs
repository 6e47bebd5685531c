use std::fmt;

/// Errors produced by the authorization pipeline.
///
/// Callers must be able to tell "not permitted" apart from "the system
/// failed": only [`Error::AccessDenied`] means a policy said no.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A decision manager (or the interceptor itself) refused access.
    #[error("Access denied: {0}")]
    AccessDenied(#[from] AccessDenied),

    /// A secured invocation ran with no `Authentication` in the context.
    #[error("Authentication credentials not found: {0}")]
    AuthenticationCredentialsNotFound(String),

    /// A constructor or builder received an argument that violates its invariants.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The decision infrastructure failed for a reason other than denial.
    #[error("Authorization infrastructure failure: {0}")]
    Infrastructure(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Creates an [`Error::InvalidArgument`].
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Error::InvalidArgument(message.into())
    }

    /// Wraps an arbitrary failure as [`Error::Infrastructure`].
    pub fn infrastructure(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Error::Infrastructure(err.into())
    }

    /// Returns `true` when this error is an access denial.
    pub fn is_access_denied(&self) -> bool {
        matches!(self, Error::AccessDenied(_))
    }
}

/// An access denial with details about why it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessDenied {
    /// The kind of denial
    pub kind: DenialKind,
    /// Human-readable message explaining the denial
    pub message: String,
}

impl AccessDenied {
    /// Creates a new denial.
    pub fn new(kind: DenialKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// A plain "access is denied" outcome from voting.
    pub fn denied() -> Self {
        Self::new(DenialKind::Denied, "Access is denied")
    }
}

impl fmt::Display for AccessDenied {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for AccessDenied {}

/// The kind of access denial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialKind {
    /// At least one voter or policy refused access
    Denied,
    /// Every voter abstained and abstention is not treated as a grant
    AllAbstained,
    /// The resource has no security metadata and public invocations are rejected
    PublicInvocationRejected,
}

impl fmt::Display for DenialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenialKind::Denied => write!(f, "Denied"),
            DenialKind::AllAbstained => write!(f, "All voters abstained"),
            DenialKind::PublicInvocationRejected => write!(f, "Public invocation rejected"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_denied_display_includes_kind() {
        let err = Error::from(AccessDenied::denied());
        assert_eq!(err.to_string(), "Access denied: Denied: Access is denied");
        assert!(err.is_access_denied());
    }

    #[test]
    fn infrastructure_error_is_not_a_denial() {
        let err = Error::infrastructure("voter backend offline");
        assert!(!err.is_access_denied());
        assert!(err.to_string().contains("voter backend offline"));
    }
}
