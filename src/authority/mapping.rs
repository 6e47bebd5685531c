use std::collections::BTreeSet;

use super::{authority_list, GrantedAuthority};
use crate::error::Error;

/// Maps raw attribute names (group names, claims) to granted authorities.
///
/// Names receive the configured prefix unless they already carry it, are
/// optionally case-converted, and an optional default authority is appended.
///
/// # Examples
///
/// ```
/// use access_core::authority::SimpleAuthorityMapper;
///
/// let mapper = SimpleAuthorityMapper::new().convert_to_upper_case(true);
/// let mapped = mapper.map_authorities(["admin", "ROLE_USER"]).unwrap();
/// let names: Vec<&str> = mapped.iter().map(|a| a.authority()).collect();
/// assert_eq!(names, vec!["ROLE_ADMIN", "ROLE_USER"]);
/// ```
#[derive(Debug, Clone)]
pub struct SimpleAuthorityMapper {
    prefix: String,
    convert_to_upper_case: bool,
    convert_to_lower_case: bool,
    default_authority: Option<GrantedAuthority>,
}

impl SimpleAuthorityMapper {
    /// Creates a mapper with the `ROLE_` prefix and no case conversion.
    pub fn new() -> Self {
        Self {
            prefix: "ROLE_".to_string(),
            convert_to_upper_case: false,
            convert_to_lower_case: false,
            default_authority: None,
        }
    }

    /// Sets the prefix added to unprefixed names.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Upper-cases names before prefixing.
    pub fn convert_to_upper_case(mut self, enabled: bool) -> Self {
        self.convert_to_upper_case = enabled;
        self
    }

    /// Lower-cases names before prefixing.
    pub fn convert_to_lower_case(mut self, enabled: bool) -> Self {
        self.convert_to_lower_case = enabled;
        self
    }

    /// Appends this authority to every mapping result.
    pub fn default_authority(mut self, authority: impl Into<GrantedAuthority>) -> Self {
        self.default_authority = Some(authority.into());
        self
    }

    /// Maps names to authorities, preserving order and dropping duplicates.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] when both case conversions are enabled.
    pub fn map_authorities<I, S>(&self, names: I) -> Result<Vec<GrantedAuthority>, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if self.convert_to_upper_case && self.convert_to_lower_case {
            return Err(Error::invalid_argument(
                "Either convert_to_upper_case or convert_to_lower_case can be set, not both",
            ));
        }

        let mapped = names.into_iter().map(|name| self.map_one(name.as_ref()));
        let mut authorities = authority_list(mapped);
        if let Some(default) = &self.default_authority {
            if !authorities.contains(default) {
                authorities.push(default.clone());
            }
        }
        Ok(authorities)
    }

    fn map_one(&self, name: &str) -> GrantedAuthority {
        let name = if self.convert_to_upper_case {
            name.to_uppercase()
        } else if self.convert_to_lower_case {
            name.to_lowercase()
        } else {
            name.to_string()
        };

        if !self.prefix.is_empty() && !name.starts_with(&self.prefix) {
            GrantedAuthority::new(format!("{}{}", self.prefix, name))
        } else {
            GrantedAuthority::new(name)
        }
    }
}

impl Default for SimpleAuthorityMapper {
    fn default() -> Self {
        Self::new()
    }
}

/// Holds the fixed set of attribute names that may be mapped to authorities.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimpleMappableAttributesRetriever {
    mappable: BTreeSet<String>,
}

impl SimpleMappableAttributesRetriever {
    /// Creates a retriever over the given names.
    pub fn new<I, S>(attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            mappable: attributes.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates a retriever from a comma-delimited list.
    pub fn from_comma_delimited(value: &str) -> Self {
        Self::new(value.split(',').map(str::trim).filter(|s| !s.is_empty()))
    }

    /// Returns the mappable attribute names.
    pub fn mappable_attributes(&self) -> &BTreeSet<String> {
        &self.mappable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapper_prefixes_and_keeps_existing_prefix() {
        let mapper = SimpleAuthorityMapper::new();
        let mapped = mapper.map_authorities(["user", "ROLE_admin"]).unwrap();
        assert_eq!(
            mapped,
            vec![GrantedAuthority::new("ROLE_user"), GrantedAuthority::new("ROLE_admin")]
        );
    }

    #[test]
    fn mapper_lower_cases_and_adds_default() {
        let mapper = SimpleAuthorityMapper::new()
            .prefix("")
            .convert_to_lower_case(true)
            .default_authority("user");
        let mapped = mapper.map_authorities(["ADMIN"]).unwrap();
        assert_eq!(
            mapped,
            vec![GrantedAuthority::new("admin"), GrantedAuthority::new("user")]
        );
    }

    #[test]
    fn mapper_rejects_both_case_conversions() {
        let mapper = SimpleAuthorityMapper::new()
            .convert_to_upper_case(true)
            .convert_to_lower_case(true);
        assert!(mapper.map_authorities(["x"]).is_err());
    }

    #[test]
    fn retriever_returns_configured_roles() {
        let retriever = SimpleMappableAttributesRetriever::from_comma_delimited("Role1,Role2");
        let expected: BTreeSet<String> = ["Role1", "Role2"].iter().map(|s| s.to_string()).collect();
        assert_eq!(retriever.mappable_attributes(), &expected);
    }
}
