use super::ConfigAttribute;
use crate::authentication::{Authentication, KeyDigest};
use crate::error::Error;

/// Attribute prefix that requests a run-as replacement.
pub const RUN_AS_PREFIX: &str = "RUN_AS_";

/// Builds a temporary identity for the duration of one secured invocation.
pub trait RunAsManager<O: ?Sized>: Send + Sync {
    /// Returns a replacement authentication, or `None` to keep the caller's.
    fn build_run_as(
        &self,
        authentication: &Authentication,
        object: &O,
        attributes: &[ConfigAttribute],
    ) -> Option<Authentication>;
}

/// Never substitutes an identity.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRunAsManager;

impl<O: ?Sized> RunAsManager<O> for NullRunAsManager {
    fn build_run_as(&self, _: &Authentication, _: &O, _: &[ConfigAttribute]) -> Option<Authentication> {
        None
    }
}

/// Substitutes a run-as identity when an attribute starts with `RUN_AS_`.
///
/// Each such attribute becomes an authority named `role_prefix + attribute`
/// (so `RUN_AS_SERVER` grants `ROLE_RUN_AS_SERVER`), followed by the
/// caller's own authorities. Principal and credentials are carried over.
///
/// # Examples
///
/// ```
/// use access_core::{Authentication, ConfigAttribute, RunAsManager, RunAsManagerImpl};
///
/// let manager = RunAsManagerImpl::new("my_run_as_key").unwrap();
/// let user = Authentication::new("alice", "pw", ["ROLE_USER"]);
///
/// let run_as = RunAsManager::<str>::build_run_as(
///     &manager, &user, "/reports", &ConfigAttribute::list("ROLE_USER,RUN_AS_REPORTER"))
///     .unwrap();
/// assert!(run_as.has_authority("ROLE_RUN_AS_REPORTER"));
/// assert!(run_as.has_authority("ROLE_USER"));
/// assert!(run_as.is_run_as());
/// ```
#[derive(Debug)]
pub struct RunAsManagerImpl {
    key: KeyDigest,
    role_prefix: String,
}

impl RunAsManagerImpl {
    /// Creates a manager that mints run-as identities with `key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `key` is empty.
    pub fn new(key: impl Into<String>) -> Result<Self, Error> {
        let key = key.into();
        if key.is_empty() {
            return Err(Error::invalid_argument(
                "A key is required and should match a RunAsImplAuthenticationProvider key",
            ));
        }
        Ok(Self {
            key: KeyDigest::of(&key),
            role_prefix: "ROLE_".to_string(),
        })
    }

    /// Overrides the prefix prepended to each `RUN_AS_` attribute.
    pub fn role_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.role_prefix = prefix.into();
        self
    }

    /// Returns `true` if `authentication` was minted by this manager's key.
    pub fn minted(&self, authentication: &Authentication) -> bool {
        authentication.is_run_as() && authentication.minted_by(&self.key)
    }
}

impl<O: ?Sized> RunAsManager<O> for RunAsManagerImpl {
    fn build_run_as(
        &self,
        authentication: &Authentication,
        _object: &O,
        attributes: &[ConfigAttribute],
    ) -> Option<Authentication> {
        let mut authorities: Vec<String> = attributes
            .iter()
            .map(ConfigAttribute::attribute)
            .filter(|a| a.starts_with(RUN_AS_PREFIX))
            .map(|a| format!("{}{}", self.role_prefix, a))
            .collect();
        if authorities.is_empty() {
            return None;
        }
        authorities.extend(
            authentication
                .authorities()
                .iter()
                .map(|a| a.authority().to_string()),
        );

        let run_as = Authentication::run_as_minted(self.key.clone(), authentication, authorities);
        tracing::debug!(
            principal = %authentication.name(),
            authorities = ?run_as.authorities(),
            "Built run-as authentication"
        );
        Some(run_as)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> Authentication {
        Authentication::new("user", "pw", ["ROLE_ONE", "ROLE_TWO"])
    }

    #[test]
    fn null_manager_never_substitutes() {
        let attrs = ConfigAttribute::list("RUN_AS_X");
        assert!(RunAsManager::<str>::build_run_as(&NullRunAsManager, &user(), "/", &attrs).is_none());
        assert!(RunAsManager::<u32>::build_run_as(&NullRunAsManager, &user(), &7, &attrs).is_none());
    }

    #[test]
    fn empty_key_is_rejected() {
        assert!(matches!(RunAsManagerImpl::new(""), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn no_run_as_attribute_means_no_substitute() {
        let manager = RunAsManagerImpl::new("key").unwrap();
        let attrs = ConfigAttribute::list("ROLE_ONE");
        assert!(RunAsManager::<str>::build_run_as(&manager, &user(), "/", &attrs).is_none());
    }

    #[test]
    fn run_as_authorities_come_first() {
        let manager = RunAsManagerImpl::new("key").unwrap();
        let attrs = ConfigAttribute::list("SOMETHING_WE_IGNORE,RUN_AS_SERVER");
        let run_as = RunAsManager::<str>::build_run_as(&manager, &user(), "/", &attrs).unwrap();

        let names: Vec<&str> = run_as.authorities().iter().map(|a| a.authority()).collect();
        assert_eq!(names, ["ROLE_RUN_AS_SERVER", "ROLE_ONE", "ROLE_TWO"]);
        assert_eq!(run_as.name(), "user");
        assert!(manager.minted(&run_as));
        assert!(!manager.minted(&user()));
    }

    #[test]
    fn custom_role_prefix() {
        let manager = RunAsManagerImpl::new("key").unwrap().role_prefix("FOOBAR_");
        let attrs = ConfigAttribute::list("RUN_AS_SERVER");
        let run_as = RunAsManager::<str>::build_run_as(&manager, &user(), "/", &attrs).unwrap();
        assert!(run_as.has_authority("FOOBAR_RUN_AS_SERVER"));
    }

    #[test]
    fn substitute_is_built_even_without_principal() {
        let manager = RunAsManagerImpl::new("key").unwrap();
        let nameless = Authentication::builder().authorities(["ROLE_ONE"]).build();
        let attrs = ConfigAttribute::list("RUN_AS_SERVER");

        let run_as = RunAsManager::<str>::build_run_as(&manager, &nameless, "/", &attrs).unwrap();
        assert_eq!(run_as.name(), "");
        assert!(manager.minted(&run_as));
        assert!(!RunAsManagerImpl::new("other").unwrap().minted(&run_as));
    }

    #[test]
    fn debug_output_hides_key() {
        let manager = RunAsManagerImpl::new("super-secret-key").unwrap();
        assert!(!format!("{:?}", manager).contains("super-secret-key"));
    }
}
