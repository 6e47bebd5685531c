use std::fmt;

/// Credential material that never shows up in formatted output.
///
/// `Authentication` keeps its credentials in a `Secret` so that logging an
/// authentication, a security context or an observation cannot leak a
/// password. The value is reachable only through [`expose`](Self::expose).
///
/// # Examples
///
/// ```
/// use access_core::Secret;
///
/// let password = Secret::new("hunter2".to_string());
/// assert_eq!(format!("{:?}", password), "[REDACTED]");
/// assert_eq!(password.expose(), "hunter2");
/// ```
// Do NOT derive Clone: authentications share credentials through `Arc<Secret<_>>`.
pub struct Secret<T> {
    inner: T,
}

impl<T> Secret<T> {
    /// Wraps a sensitive value.
    pub fn new(value: T) -> Self {
        Self { inner: value }
    }

    /// Returns the wrapped value.
    ///
    /// Callers must not log or display what they get back.
    pub fn expose(&self) -> &T {
        &self.inner
    }
}

impl<T> fmt::Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl<T> fmt::Display for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_redacts_debug_and_display() {
        let password = Secret::new("hunter2".to_string());

        let debug_output = format!("{:?}", password);
        assert_eq!(debug_output, "[REDACTED]");
        assert!(!debug_output.contains("String"));

        assert_eq!(password.to_string(), "[REDACTED]");
    }

    #[test]
    fn secret_exposes_when_explicit() {
        let secret = Secret::new(42);
        assert_eq!(*secret.expose(), 42);
    }
}
