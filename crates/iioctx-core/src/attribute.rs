//! Attribute-name lists and the collector that fills them

use serde::Serialize;
use tracing::error;

use crate::builder::{try_push, BuildSession, Owner};
use crate::document::Element;
use crate::error::BuildError;

/// Ordered attribute names of a device or channel. Duplicates are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AttributeList(Vec<String>);

impl AttributeList {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|a| a == name)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub(crate) fn push(&mut self, name: String) -> Result<(), BuildError> {
        try_push(&mut self.0, name)
    }
}

impl<'a> IntoIterator for &'a AttributeList {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Read one `<attribute name="..."/>` node and append its name to `attrs`.
///
/// Properties other than `name` are warned about and ignored. A node with
/// no `name` fails, leaving `attrs` untouched.
pub(crate) fn collect_attribute(
    attrs: &mut AttributeList,
    node: &Element,
    owner: Owner<'_>,
    session: &mut BuildSession,
) -> Result<(), BuildError> {
    let mut name = None;

    for prop in &node.properties {
        if prop.name == "name" {
            name = Some(prop.value.clone());
        } else {
            session.warn_unknown_property("attribute", &prop.name, Some(owner));
        }
    }

    let Some(name) = name else {
        error!(%owner, "Incomplete attribute");
        return Err(BuildError::MissingField {
            element: "attribute",
            field: "name",
            owner: owner.to_string(),
        });
    };

    attrs.push(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::Warning;

    #[test]
    fn test_collect_appends_in_order() {
        let mut session = BuildSession::new();
        let mut attrs = AttributeList::new();
        let owner = Owner::Channel("voltage0");

        for name in ["raw", "scale", "raw"] {
            let node = Element::new("attribute").with_property("name", name);
            collect_attribute(&mut attrs, &node, owner, &mut session).unwrap();
        }

        assert_eq!(attrs.iter().collect::<Vec<_>>(), vec!["raw", "scale", "raw"]);
        assert!(session.into_warnings().is_empty());
    }

    #[test]
    fn test_extra_property_warns_but_succeeds() {
        let mut session = BuildSession::new();
        let mut attrs = AttributeList::new();
        let node = Element::new("attribute")
            .with_property("filename", "in_voltage0_raw")
            .with_property("name", "raw");

        collect_attribute(&mut attrs, &node, Owner::Device("iio:device0"), &mut session).unwrap();

        assert_eq!(attrs.get(0), Some("raw"));
        let warnings = session.into_warnings();
        assert_eq!(warnings.len(), 1);
        assert!(matches!(
            &warnings[0],
            Warning::UnknownProperty { property, owner: Some(o), .. }
                if property == "filename" && o == "device iio:device0"
        ));
    }

    #[test]
    fn test_missing_name_fails_without_appending() {
        let mut session = BuildSession::new();
        let mut attrs = AttributeList::new();
        attrs.push("sampling_frequency".to_string()).unwrap();

        let node = Element::new("attribute").with_property("value", "1000");
        let err = collect_attribute(&mut attrs, &node, Owner::Channel("altvoltage0"), &mut session)
            .unwrap_err();

        assert!(matches!(
            err,
            BuildError::MissingField { field: "name", ref owner, .. } if owner == "channel altvoltage0"
        ));
        assert_eq!(attrs.len(), 1);
    }
}
