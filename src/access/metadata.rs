use std::collections::HashMap;
use std::fmt;

use super::ConfigAttribute;

/// Resolves the attributes that protect a secured object.
///
/// `None` or an empty list means the object is public.
pub trait SecurityMetadataSource<O: ?Sized>: Send + Sync {
    /// Returns the attributes for `object`, in configuration order.
    fn attributes(&self, object: &O) -> Option<Vec<ConfigAttribute>>;

    /// Returns every attribute this source can produce, without duplicates.
    fn all_attributes(&self) -> Vec<ConfigAttribute>;
}

/// Looks attributes up by the object's display form.
///
/// # Examples
///
/// ```
/// use access_core::{ConfigAttribute, MapSecurityMetadataSource, SecurityMetadataSource};
///
/// let mut source = MapSecurityMetadataSource::new();
/// source.insert("transfer_funds", ConfigAttribute::list("ROLE_TELLER"));
///
/// assert_eq!(source.attributes("transfer_funds"), Some(ConfigAttribute::list("ROLE_TELLER")));
/// assert_eq!(SecurityMetadataSource::<str>::attributes(&source, "balance"), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MapSecurityMetadataSource {
    entries: HashMap<String, Vec<ConfigAttribute>>,
    order: Vec<String>,
}

impl MapSecurityMetadataSource {
    /// Creates an empty source; every object is public.
    pub fn new() -> Self {
        Self::default()
    }

    /// Protects `object` with `attributes`, replacing any previous entry.
    pub fn insert(&mut self, object: impl Into<String>, attributes: Vec<ConfigAttribute>) {
        let object = object.into();
        if self.entries.insert(object.clone(), attributes).is_none() {
            self.order.push(object);
        }
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, object: impl Into<String>, attributes: Vec<ConfigAttribute>) -> Self {
        self.insert(object, attributes);
        self
    }
}

impl<O: ?Sized + fmt::Display> SecurityMetadataSource<O> for MapSecurityMetadataSource {
    fn attributes(&self, object: &O) -> Option<Vec<ConfigAttribute>> {
        self.entries.get(&object.to_string()).cloned()
    }

    fn all_attributes(&self) -> Vec<ConfigAttribute> {
        let mut all: Vec<ConfigAttribute> = Vec::new();
        for attribute in self.order.iter().filter_map(|k| self.entries.get(k)).flatten() {
            if !all.contains(attribute) {
                all.push(attribute.clone());
            }
        }
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_object_is_public() {
        let source = MapSecurityMetadataSource::new();
        assert!(SecurityMetadataSource::<str>::attributes(&source, "anything").is_none());
    }

    #[test]
    fn insert_replaces_existing_entry() {
        let mut source = MapSecurityMetadataSource::new();
        source.insert("op", ConfigAttribute::list("ROLE_A"));
        source.insert("op", ConfigAttribute::list("ROLE_B"));
        assert_eq!(
            SecurityMetadataSource::<str>::attributes(&source, "op"),
            Some(ConfigAttribute::list("ROLE_B"))
        );
    }

    #[test]
    fn all_attributes_in_insertion_order_without_duplicates() {
        let source = MapSecurityMetadataSource::new()
            .with("b", ConfigAttribute::list("ROLE_B,ROLE_SHARED"))
            .with("a", ConfigAttribute::list("ROLE_SHARED,ROLE_A"));
        assert_eq!(
            SecurityMetadataSource::<str>::all_attributes(&source),
            ConfigAttribute::list("ROLE_B,ROLE_SHARED,ROLE_A")
        );
    }

    #[test]
    fn non_string_objects_use_display() {
        let source = MapSecurityMetadataSource::new().with("42", ConfigAttribute::list("ROLE_X"));
        assert!(source.attributes(&42u32).is_some());
    }
}
