use std::fmt;
use std::sync::Arc;

use sha2::{Digest, Sha256};

use crate::authority::{authority_list, GrantedAuthority};
use crate::error::Error;
use crate::secret::Secret;

/// SHA-256 digest of a shared key.
///
/// Anonymous and run-as authentications remember which key minted them so
/// that a consumer holding the same key can recognise them. Only the digest
/// is kept.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyDigest([u8; 32]);

impl KeyDigest {
    /// Hashes a key.
    pub fn of(key: &str) -> Self {
        Self(Sha256::digest(key.as_bytes()).into())
    }
}

impl fmt::Debug for KeyDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyDigest({:02x}{:02x}..)", self.0[0], self.0[1])
    }
}

/// How an [`Authentication`] came to exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthenticationKind {
    /// Produced by an identity provider (or a test)
    Standard,
    /// Installed by the anonymous fallback when no one is logged in
    Anonymous(KeyDigest),
    /// A temporary identity substituted for one secured invocation
    RunAs(KeyDigest),
}

/// A security principal together with its granted authorities.
///
/// # Invariants
///
/// - Authorities are ordered by insertion and contain no duplicates.
/// - [`Authentication::new`] marks the token authenticated exactly when at
///   least one authority is granted.
/// - Apart from [`erase_credentials`](Self::erase_credentials) the value is
///   immutable; a changed identity is a new `Authentication`.
///
/// # Examples
///
/// ```
/// use access_core::Authentication;
///
/// let auth = Authentication::new("scott", "password", ["ROLE_USER"]);
/// assert!(auth.is_authenticated());
/// assert_eq!(auth.name(), "scott");
///
/// let pending = Authentication::new("scott", "password", Vec::<String>::new());
/// assert!(!pending.is_authenticated());
/// ```
#[derive(Clone)]
pub struct Authentication {
    principal: Option<String>,
    credentials: Option<Arc<Secret<String>>>,
    authorities: Vec<GrantedAuthority>,
    authenticated: bool,
    kind: AuthenticationKind,
}

impl Authentication {
    /// Creates an authentication; it is authenticated iff `authorities` is non-empty.
    pub fn new<I, A>(principal: impl Into<String>, credentials: impl Into<String>, authorities: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<GrantedAuthority>,
    {
        Self::builder()
            .principal(principal)
            .credentials(credentials)
            .authorities(authorities)
            .build()
    }

    /// Creates an authentication request that carries no authorities.
    pub fn unauthenticated(principal: impl Into<String>, credentials: impl Into<String>) -> Self {
        Self::new(principal, credentials, Vec::<GrantedAuthority>::new())
    }

    /// Starts building an authentication, for cases such as a missing principal.
    pub fn builder() -> AuthenticationBuilder {
        AuthenticationBuilder::default()
    }

    /// Creates an anonymous authentication minted with `key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the key or principal is empty or
    /// no authority is given.
    pub fn anonymous<I, A>(key: &str, principal: impl Into<String>, authorities: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = A>,
        A: Into<GrantedAuthority>,
    {
        let principal = principal.into();
        if key.is_empty() {
            return Err(Error::invalid_argument("Anonymous key cannot be empty"));
        }
        if principal.is_empty() {
            return Err(Error::invalid_argument("Anonymous principal cannot be empty"));
        }
        let authorities = authority_list(authorities);
        if authorities.is_empty() {
            return Err(Error::invalid_argument(
                "Anonymous authorities cannot be empty",
            ));
        }

        Ok(Self {
            principal: Some(principal),
            credentials: None,
            authorities,
            authenticated: true,
            kind: AuthenticationKind::Anonymous(KeyDigest::of(key)),
        })
    }

    /// Creates a run-as authentication for `original`'s principal and credentials.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the key is empty.
    pub fn run_as<I, A>(key: &str, original: &Authentication, authorities: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = A>,
        A: Into<GrantedAuthority>,
    {
        if key.is_empty() {
            return Err(Error::invalid_argument("Run-as key cannot be empty"));
        }
        Ok(Self::run_as_minted(KeyDigest::of(key), original, authorities))
    }

    /// Creates a run-as authentication from an already hashed key.
    pub fn run_as_minted<I, A>(digest: KeyDigest, original: &Authentication, authorities: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<GrantedAuthority>,
    {
        Self {
            principal: original.principal.clone(),
            credentials: original.credentials.clone(),
            authorities: authority_list(authorities),
            authenticated: true,
            kind: AuthenticationKind::RunAs(digest),
        }
    }

    /// Returns the principal, if any.
    pub fn principal(&self) -> Option<&str> {
        self.principal.as_deref()
    }

    /// Returns the principal name, or `""` when there is no principal.
    pub fn name(&self) -> &str {
        self.principal.as_deref().unwrap_or("")
    }

    /// Returns the credentials unless they have been erased.
    pub fn credentials(&self) -> Option<&Secret<String>> {
        self.credentials.as_deref()
    }

    /// Returns the granted authorities in insertion order.
    pub fn authorities(&self) -> &[GrantedAuthority] {
        &self.authorities
    }

    /// Returns `true` if the given authority has been granted.
    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.iter().any(|a| a.authority() == authority)
    }

    /// Returns whether this token is authenticated.
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Returns how this authentication was produced.
    pub fn kind(&self) -> &AuthenticationKind {
        &self.kind
    }

    /// Returns `true` for anonymous authentications.
    pub fn is_anonymous(&self) -> bool {
        matches!(self.kind, AuthenticationKind::Anonymous(_))
    }

    /// Returns `true` for run-as authentications.
    pub fn is_run_as(&self) -> bool {
        matches!(self.kind, AuthenticationKind::RunAs(_))
    }

    /// Returns `true` when this anonymous or run-as token was minted with `key`.
    pub fn key_matches(&self, key: &str) -> bool {
        self.minted_by(&KeyDigest::of(key))
    }

    /// Returns `true` when this anonymous or run-as token carries `digest`.
    pub fn minted_by(&self, digest: &KeyDigest) -> bool {
        match &self.kind {
            AuthenticationKind::Anonymous(minted) | AuthenticationKind::RunAs(minted) => minted == digest,
            AuthenticationKind::Standard => false,
        }
    }

    /// Drops the credentials once they are no longer needed.
    pub fn erase_credentials(&mut self) {
        self.credentials = None;
    }
}

impl PartialEq for Authentication {
    fn eq(&self, other: &Self) -> bool {
        let same_credentials = match (&self.credentials, &other.credentials) {
            (None, None) => true,
            (Some(a), Some(b)) => a.expose() == b.expose(),
            _ => false,
        };
        self.principal == other.principal
            && same_credentials
            && self.authorities == other.authorities
            && self.authenticated == other.authenticated
            && self.kind == other.kind
    }
}

impl Eq for Authentication {}

impl fmt::Debug for Authentication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authentication")
            .field("principal", &self.principal)
            .field("credentials", &self.credentials.as_ref().map(|_| "[PROTECTED]"))
            .field("authorities", &self.authorities)
            .field("authenticated", &self.authenticated)
            .field("kind", &self.kind)
            .finish()
    }
}

/// Builder for [`Authentication`] values with optional parts.
#[derive(Debug, Default)]
pub struct AuthenticationBuilder {
    principal: Option<String>,
    credentials: Option<String>,
    authorities: Vec<GrantedAuthority>,
}

impl AuthenticationBuilder {
    /// Sets the principal.
    pub fn principal(mut self, principal: impl Into<String>) -> Self {
        self.principal = Some(principal.into());
        self
    }

    /// Sets the credentials.
    pub fn credentials(mut self, credentials: impl Into<String>) -> Self {
        self.credentials = Some(credentials.into());
        self
    }

    /// Replaces the granted authorities.
    pub fn authorities<I, A>(mut self, authorities: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<GrantedAuthority>,
    {
        self.authorities = authority_list(authorities);
        self
    }

    /// Builds the authentication, authenticated iff any authority was granted.
    pub fn build(self) -> Authentication {
        let authenticated = !self.authorities.is_empty();
        Authentication {
            principal: self.principal,
            credentials: self.credentials.map(|c| Arc::new(Secret::new(c))),
            authorities: self.authorities,
            authenticated,
            kind: AuthenticationKind::Standard,
        }
    }
}
