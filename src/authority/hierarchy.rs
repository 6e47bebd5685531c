use std::collections::{HashMap, HashSet};
use std::fmt;

use super::GrantedAuthority;
use crate::error::Error;

/// Expands a set of authorities into every authority they transitively imply.
pub trait RoleHierarchy: Send + Sync + fmt::Debug {
    /// Returns the directly granted authorities followed by everything they reach.
    ///
    /// Implementations may drop duplicates but must keep every directly
    /// granted authority.
    fn reachable_authorities(&self, authorities: &[GrantedAuthority]) -> Vec<GrantedAuthority>;
}

/// A hierarchy where no role implies any other.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRoleHierarchy;

impl RoleHierarchy for NullRoleHierarchy {
    fn reachable_authorities(&self, authorities: &[GrantedAuthority]) -> Vec<GrantedAuthority> {
        authorities.to_vec()
    }
}

/// A role hierarchy parsed from `ROLE_A > ROLE_B` declarations.
///
/// Each line declares that the left-hand role includes the right-hand one;
/// chains (`ROLE_A > ROLE_B > ROLE_C`) are allowed. Reachability is
/// transitive and computed once at construction.
///
/// # Examples
///
/// ```
/// use access_core::authority::{authority_list, RoleHierarchy, RoleHierarchyImpl};
///
/// let hierarchy = RoleHierarchyImpl::from_hierarchy(
///     "ROLE_ADMIN > ROLE_STAFF\nROLE_STAFF > ROLE_USER",
/// )
/// .unwrap();
///
/// let reachable = hierarchy.reachable_authorities(&authority_list(["ROLE_ADMIN"]));
/// let names: Vec<&str> = reachable.iter().map(|a| a.authority()).collect();
/// assert_eq!(names, vec!["ROLE_ADMIN", "ROLE_STAFF", "ROLE_USER"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RoleHierarchyImpl {
    // role -> every role it reaches, in discovery order
    reachable: HashMap<String, Vec<String>>,
}

impl RoleHierarchyImpl {
    /// Parses a hierarchy declaration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for malformed lines or cycles.
    pub fn from_hierarchy(declaration: &str) -> Result<Self, Error> {
        let mut direct: HashMap<String, Vec<String>> = HashMap::new();

        for line in declaration.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let roles: Vec<&str> = line.split('>').map(str::trim).collect();
            let malformed = roles
                .iter()
                .any(|r| r.is_empty() || r.contains(char::is_whitespace));
            if roles.len() < 2 || malformed {
                return Err(Error::invalid_argument(format!(
                    "Invalid role hierarchy declaration '{}'",
                    line
                )));
            }
            for pair in roles.windows(2) {
                let includes = direct.entry(pair[0].to_string()).or_default();
                if !includes.iter().any(|r| r == pair[1]) {
                    includes.push(pair[1].to_string());
                }
            }
        }

        let mut reachable = HashMap::with_capacity(direct.len());
        for role in direct.keys() {
            let closure = Self::closure_of(role, &direct)?;
            reachable.insert(role.clone(), closure);
        }

        tracing::debug!(roles = reachable.len(), "Built role hierarchy");
        Ok(Self { reachable })
    }

    fn closure_of(role: &str, direct: &HashMap<String, Vec<String>>) -> Result<Vec<String>, Error> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut order = Vec::new();
        let mut stack: Vec<&str> = direct
            .get(role)
            .map(|v| v.iter().rev().map(String::as_str).collect())
            .unwrap_or_default();

        while let Some(next) = stack.pop() {
            if next == role {
                return Err(Error::invalid_argument(format!(
                    "Cycle in role hierarchy: '{}' reaches itself",
                    role
                )));
            }
            if !seen.insert(next) {
                continue;
            }
            order.push(next.to_string());
            if let Some(children) = direct.get(next) {
                stack.extend(children.iter().rev().map(String::as_str));
            }
        }
        Ok(order)
    }
}

impl RoleHierarchy for RoleHierarchyImpl {
    fn reachable_authorities(&self, authorities: &[GrantedAuthority]) -> Vec<GrantedAuthority> {
        let mut result: Vec<GrantedAuthority> = Vec::with_capacity(authorities.len());
        let mut push = |authority: GrantedAuthority| {
            if !result.contains(&authority) {
                result.push(authority);
            }
        };

        for authority in authorities {
            push(authority.clone());
        }
        for authority in authorities {
            if let Some(reached) = self.reachable.get(authority.authority()) {
                for role in reached {
                    push(GrantedAuthority::new(role.as_str()));
                }
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authority::authority_list;

    fn names(list: &[GrantedAuthority]) -> Vec<&str> {
        list.iter().map(GrantedAuthority::authority).collect()
    }

    #[test]
    fn null_hierarchy_returns_input() {
        let input = authority_list(["A", "B"]);
        assert_eq!(NullRoleHierarchy.reachable_authorities(&input), input);
    }

    #[test]
    fn chained_declaration_is_transitive() {
        let hierarchy = RoleHierarchyImpl::from_hierarchy("ROLE_A > ROLE_B > ROLE_C").unwrap();
        let reachable = hierarchy.reachable_authorities(&authority_list(["ROLE_A"]));
        assert_eq!(names(&reachable), vec!["ROLE_A", "ROLE_B", "ROLE_C"]);
    }

    #[test]
    fn overlapping_paths_are_deduplicated() {
        let hierarchy = RoleHierarchyImpl::from_hierarchy(
            "ROLE_A > ROLE_B\nROLE_A > ROLE_C\nROLE_B > ROLE_D\nROLE_C > ROLE_D",
        )
        .unwrap();
        let reachable = hierarchy.reachable_authorities(&authority_list(["ROLE_A", "ROLE_D"]));
        assert_eq!(names(&reachable), vec!["ROLE_A", "ROLE_D", "ROLE_B", "ROLE_C"]);
    }

    #[test]
    fn granted_authorities_precede_implied_ones() {
        let hierarchy = RoleHierarchyImpl::from_hierarchy("ROLE_A > ROLE_B\nROLE_B > ROLE_C").unwrap();
        let reachable = hierarchy.reachable_authorities(&authority_list(["ROLE_A", "ROLE_X", "ROLE_C"]));
        assert_eq!(names(&reachable), vec!["ROLE_A", "ROLE_X", "ROLE_C", "ROLE_B"]);
    }

    #[test]
    fn directly_granted_authorities_are_kept() {
        let hierarchy = RoleHierarchyImpl::from_hierarchy("ROLE_A > ROLE_B").unwrap();
        let reachable = hierarchy.reachable_authorities(&authority_list(["ROLE_X", "ROLE_B"]));
        assert_eq!(names(&reachable), vec!["ROLE_X", "ROLE_B"]);
    }

    #[test]
    fn cycles_are_rejected() {
        let result = RoleHierarchyImpl::from_hierarchy("ROLE_A > ROLE_B\nROLE_B > ROLE_A");
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn malformed_lines_are_rejected() {
        assert!(RoleHierarchyImpl::from_hierarchy("ROLE_A >").is_err());
        assert!(RoleHierarchyImpl::from_hierarchy("ROLE_A ROLE_B").is_err());
    }
}
