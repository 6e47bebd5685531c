use std::fmt;
use std::sync::Arc;

use super::{AccessDecisionVoter, ConfigAttribute, Vote};
use crate::authentication::Authentication;
use crate::error::{AccessDenied, DenialKind, Error};

/// Makes the final access-control decision for a secured object of type `O`.
///
/// `decide` returns `Ok(())` to grant access and `Err(Error::AccessDenied(_))`
/// to refuse it. Any other error means the decision could not be made and
/// must never be read as a denial.
pub trait AccessDecisionManager<O: ?Sized>: Send + Sync {
    /// Grants access or fails.
    fn decide(
        &self,
        authentication: &Authentication,
        object: &O,
        attributes: &[ConfigAttribute],
    ) -> Result<(), Error>;

    /// Returns `true` if this manager can process `attribute`.
    fn supports(&self, _attribute: &ConfigAttribute) -> bool {
        true
    }
}

impl<O, F> AccessDecisionManager<O> for F
where
    O: ?Sized,
    F: Fn(&Authentication, &O, &[ConfigAttribute]) -> Result<(), Error> + Send + Sync,
{
    fn decide(
        &self,
        authentication: &Authentication,
        object: &O,
        attributes: &[ConfigAttribute],
    ) -> Result<(), Error> {
        self(authentication, object, attributes)
    }
}

type Voters<O> = Vec<Arc<dyn AccessDecisionVoter<O>>>;

fn require_voters<O: ?Sized>(voters: &Voters<O>) -> Result<(), Error> {
    if voters.is_empty() {
        return Err(Error::invalid_argument(
            "A list of AccessDecisionVoters is required",
        ));
    }
    Ok(())
}

fn all_abstained(allow_if_all_abstain: bool) -> Result<(), Error> {
    if allow_if_all_abstain {
        Ok(())
    } else {
        Err(AccessDenied::new(DenialKind::AllAbstained, "Access is denied").into())
    }
}

fn voters_support<O: ?Sized>(voters: &Voters<O>, attribute: &ConfigAttribute) -> bool {
    voters.iter().any(|v| v.supports(attribute))
}

/// Grants access if any voter grants; denies if none grants and any denies.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use access_core::{AccessDecisionManager, AffirmativeBased, Authentication, ConfigAttribute, RoleVoter};
///
/// let manager = AffirmativeBased::<str>::new(vec![Arc::new(RoleVoter::new())]).unwrap();
/// let user = Authentication::new("user", "pw", ["ROLE_USER"]);
///
/// assert!(manager.decide(&user, "/home", &ConfigAttribute::list("ROLE_USER")).is_ok());
/// assert!(manager.decide(&user, "/admin", &ConfigAttribute::list("ROLE_ADMIN")).is_err());
/// ```
pub struct AffirmativeBased<O: ?Sized> {
    voters: Voters<O>,
    allow_if_all_abstain: bool,
}

impl<O: ?Sized> AffirmativeBased<O> {
    /// Creates a manager over `voters`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `voters` is empty.
    pub fn new(voters: Voters<O>) -> Result<Self, Error> {
        require_voters(&voters)?;
        Ok(Self {
            voters,
            allow_if_all_abstain: false,
        })
    }

    /// Treats unanimous abstention as a grant.
    pub fn allow_if_all_abstain(mut self, allow: bool) -> Self {
        self.allow_if_all_abstain = allow;
        self
    }
}

impl<O: ?Sized> AccessDecisionManager<O> for AffirmativeBased<O> {
    fn decide(
        &self,
        authentication: &Authentication,
        object: &O,
        attributes: &[ConfigAttribute],
    ) -> Result<(), Error> {
        let mut deny = 0usize;
        for voter in &self.voters {
            match voter.vote(authentication, object, attributes) {
                Vote::Granted => return Ok(()),
                Vote::Denied => deny += 1,
                Vote::Abstain => {}
            }
        }
        if deny > 0 {
            return Err(AccessDenied::denied().into());
        }
        all_abstained(self.allow_if_all_abstain)
    }

    fn supports(&self, attribute: &ConfigAttribute) -> bool {
        voters_support(&self.voters, attribute)
    }
}

impl<O: ?Sized> fmt::Debug for AffirmativeBased<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AffirmativeBased")
            .field("voters", &self.voters.len())
            .field("allow_if_all_abstain", &self.allow_if_all_abstain)
            .finish()
    }
}

/// Grants access when more voters grant than deny.
///
/// A non-zero tie is decided by `allow_if_equal_granted_denied`, which
/// defaults to `true`.
pub struct ConsensusBased<O: ?Sized> {
    voters: Voters<O>,
    allow_if_all_abstain: bool,
    allow_if_equal_granted_denied: bool,
}

impl<O: ?Sized> ConsensusBased<O> {
    /// Creates a manager over `voters`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `voters` is empty.
    pub fn new(voters: Voters<O>) -> Result<Self, Error> {
        require_voters(&voters)?;
        Ok(Self {
            voters,
            allow_if_all_abstain: false,
            allow_if_equal_granted_denied: true,
        })
    }

    /// Treats unanimous abstention as a grant.
    pub fn allow_if_all_abstain(mut self, allow: bool) -> Self {
        self.allow_if_all_abstain = allow;
        self
    }

    /// Decides how a tie between grants and denials resolves.
    pub fn allow_if_equal_granted_denied(mut self, allow: bool) -> Self {
        self.allow_if_equal_granted_denied = allow;
        self
    }
}

impl<O: ?Sized> AccessDecisionManager<O> for ConsensusBased<O> {
    fn decide(
        &self,
        authentication: &Authentication,
        object: &O,
        attributes: &[ConfigAttribute],
    ) -> Result<(), Error> {
        let (mut grant, mut deny) = (0usize, 0usize);
        for voter in &self.voters {
            match voter.vote(authentication, object, attributes) {
                Vote::Granted => grant += 1,
                Vote::Denied => deny += 1,
                Vote::Abstain => {}
            }
        }

        if grant > deny {
            return Ok(());
        }
        if deny > grant {
            return Err(AccessDenied::denied().into());
        }
        if grant > 0 {
            return if self.allow_if_equal_granted_denied {
                Ok(())
            } else {
                Err(AccessDenied::denied().into())
            };
        }
        all_abstained(self.allow_if_all_abstain)
    }

    fn supports(&self, attribute: &ConfigAttribute) -> bool {
        voters_support(&self.voters, attribute)
    }
}

impl<O: ?Sized> fmt::Debug for ConsensusBased<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsensusBased")
            .field("voters", &self.voters.len())
            .field("allow_if_all_abstain", &self.allow_if_all_abstain)
            .field(
                "allow_if_equal_granted_denied",
                &self.allow_if_equal_granted_denied,
            )
            .finish()
    }
}

/// Requires every voter to grant (or abstain on) every attribute.
///
/// Attributes are voted on one at a time, so a single denying attribute
/// refuses access even when another attribute is granted.
pub struct UnanimousBased<O: ?Sized> {
    voters: Voters<O>,
    allow_if_all_abstain: bool,
}

impl<O: ?Sized> UnanimousBased<O> {
    /// Creates a manager over `voters`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `voters` is empty.
    pub fn new(voters: Voters<O>) -> Result<Self, Error> {
        require_voters(&voters)?;
        Ok(Self {
            voters,
            allow_if_all_abstain: false,
        })
    }

    /// Treats unanimous abstention as a grant.
    pub fn allow_if_all_abstain(mut self, allow: bool) -> Self {
        self.allow_if_all_abstain = allow;
        self
    }
}

impl<O: ?Sized> AccessDecisionManager<O> for UnanimousBased<O> {
    fn decide(
        &self,
        authentication: &Authentication,
        object: &O,
        attributes: &[ConfigAttribute],
    ) -> Result<(), Error> {
        let mut grant = 0usize;
        for attribute in attributes {
            let single = std::slice::from_ref(attribute);
            for voter in &self.voters {
                match voter.vote(authentication, object, single) {
                    Vote::Granted => grant += 1,
                    Vote::Denied => {
                        tracing::trace!(%attribute, "Attribute denied by voter");
                        return Err(AccessDenied::denied().into());
                    }
                    Vote::Abstain => {}
                }
            }
        }

        if grant > 0 {
            return Ok(());
        }
        all_abstained(self.allow_if_all_abstain)
    }

    fn supports(&self, attribute: &ConfigAttribute) -> bool {
        voters_support(&self.voters, attribute)
    }
}

impl<O: ?Sized> fmt::Debug for UnanimousBased<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnanimousBased")
            .field("voters", &self.voters.len())
            .field("allow_if_all_abstain", &self.allow_if_all_abstain)
            .finish()
    }
}
