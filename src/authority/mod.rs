//! Granted authorities, role hierarchies and authority mapping.

mod hierarchy;
mod mapping;

use std::fmt;

pub use hierarchy::{NullRoleHierarchy, RoleHierarchy, RoleHierarchyImpl};
pub use mapping::{SimpleAuthorityMapper, SimpleMappableAttributesRetriever};

/// A permission held by an authenticated principal, such as `ROLE_USER`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GrantedAuthority(String);

impl GrantedAuthority {
    /// Creates an authority from its string form.
    pub fn new(authority: impl Into<String>) -> Self {
        Self(authority.into())
    }

    /// Returns the authority string.
    pub fn authority(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GrantedAuthority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GrantedAuthority {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for GrantedAuthority {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&String> for GrantedAuthority {
    fn from(value: &String) -> Self {
        Self(value.clone())
    }
}

impl From<&GrantedAuthority> for GrantedAuthority {
    fn from(value: &GrantedAuthority) -> Self {
        value.clone()
    }
}

/// Builds an ordered, duplicate-free authority list.
///
/// The first occurrence of an authority wins; later duplicates are dropped.
///
/// # Examples
///
/// ```
/// use access_core::authority::authority_list;
///
/// let authorities = authority_list(["ROLE_A", "ROLE_B", "ROLE_A"]);
/// assert_eq!(authorities.len(), 2);
/// assert_eq!(authorities[1].authority(), "ROLE_B");
/// ```
pub fn authority_list<I, A>(authorities: I) -> Vec<GrantedAuthority>
where
    I: IntoIterator<Item = A>,
    A: Into<GrantedAuthority>,
{
    let mut list: Vec<GrantedAuthority> = Vec::new();
    for authority in authorities {
        let authority = authority.into();
        if !list.contains(&authority) {
            list.push(authority);
        }
    }
    list
}

/// Splits a comma-delimited string into authorities, trimming whitespace.
pub fn comma_separated_authorities(value: &str) -> Vec<GrantedAuthority> {
    authority_list(
        value
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authority_list_preserves_insertion_order() {
        let list = authority_list(["C", "A", "B"]);
        let names: Vec<&str> = list.iter().map(GrantedAuthority::authority).collect();
        assert_eq!(names, vec!["C", "A", "B"]);
    }

    #[test]
    fn authority_list_drops_duplicates() {
        let list = authority_list(vec!["A".to_string(), "A".to_string()]);
        assert_eq!(list, vec![GrantedAuthority::new("A")]);
    }

    #[test]
    fn comma_separated_authorities_trims_entries() {
        let list = comma_separated_authorities(" ROLE_A , ROLE_B,,");
        assert_eq!(
            list,
            vec![GrantedAuthority::new("ROLE_A"), GrantedAuthority::new("ROLE_B")]
        );
    }
}
