//! Channels: one signal path of a device

use serde::Serialize;
use tracing::{debug, error};

use crate::attribute::{collect_attribute, AttributeList};
use crate::builder::{BuildSession, Owner, Warning};
use crate::device::DeviceHandle;
use crate::document::Element;
use crate::error::BuildError;

/// Direction of a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Input,
    Output,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Input => "input",
            Direction::Output => "output",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A channel of a device
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Channel {
    id: String,
    name: Option<String>,
    direction: Direction,
    attrs: AttributeList,
    #[serde(skip)]
    device: DeviceHandle,
}

impl Channel {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn is_output(&self) -> bool {
        self.direction == Direction::Output
    }

    pub fn attrs(&self) -> &AttributeList {
        &self.attrs
    }

    /// Look up an attribute name
    pub fn find_attr(&self, name: &str) -> Option<&str> {
        self.attrs.iter().find(|a| *a == name)
    }

    /// Handle of the owning device
    pub fn device(&self) -> DeviceHandle {
        self.device
    }

    /// Build a channel from a `<channel>` element.
    ///
    /// Properties are read first (`id` is required), then the children;
    /// any failure drops the partially built channel.
    pub(crate) fn from_element(
        node: &Element,
        device: DeviceHandle,
        device_id: &str,
        session: &mut BuildSession,
    ) -> Result<Self, BuildError> {
        let mut id = None;
        let mut name = None;
        let mut kind = None;

        for prop in &node.properties {
            match prop.name.as_str() {
                "name" => name = Some(prop.value.clone()),
                "id" => id = Some(prop.value.clone()),
                "type" => kind = Some(prop.value.as_str()),
                other => session.warn_unknown_property("channel", other, None),
            }
        }

        let Some(id) = id else {
            error!(device = device_id, "Incomplete <channel>: missing id");
            return Err(BuildError::IncompleteChannel {
                device: device_id.to_string(),
            });
        };

        let direction = match kind {
            None | Some("input") => Direction::Input,
            Some("output") => Direction::Output,
            Some(other) => {
                session.warn(Warning::UnknownChannelType {
                    channel: id.clone(),
                    value: other.to_string(),
                });
                Direction::Input
            }
        };

        let mut channel = Channel {
            id,
            name,
            direction,
            attrs: AttributeList::new(),
            device,
        };

        for child in node.elements() {
            if child.name == "attribute" {
                collect_attribute(
                    &mut channel.attrs,
                    child,
                    Owner::Channel(&channel.id),
                    session,
                )?;
            } else {
                session.warn_unknown_child("channel", &child.name);
            }
        }

        debug!(
            device = device_id,
            channel = %channel.id,
            direction = %channel.direction,
            attrs = channel.attrs.len(),
            "Built channel"
        );
        Ok(channel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextId;
    use crate::document::Node;

    fn handle() -> DeviceHandle {
        DeviceHandle {
            context: ContextId::new(),
            index: 0,
        }
    }

    fn build(node: &Element) -> (Result<Channel, BuildError>, Vec<Warning>) {
        let mut session = BuildSession::new();
        let result = Channel::from_element(node, handle(), "iio:device0", &mut session);
        (result, session.into_warnings())
    }

    #[test]
    fn test_build_channel_with_attributes() {
        let node = Element::new("channel")
            .with_property("id", "voltage0")
            .with_property("name", "rx")
            .with_child(Element::new("attribute").with_property("name", "raw"))
            .with_child(Element::new("attribute").with_property("name", "scale"));

        let (result, warnings) = build(&node);
        let channel = result.unwrap();
        assert_eq!(channel.id(), "voltage0");
        assert_eq!(channel.name(), Some("rx"));
        assert_eq!(channel.direction(), Direction::Input);
        assert_eq!(channel.attrs().iter().collect::<Vec<_>>(), vec!["raw", "scale"]);
        assert_eq!(channel.find_attr("scale"), Some("scale"));
        assert_eq!(channel.device().index, 0);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_direction_from_type() {
        let output = Element::new("channel")
            .with_property("id", "altvoltage0")
            .with_property("type", "output");
        assert!(build(&output).0.unwrap().is_output());

        let input = Element::new("channel")
            .with_property("id", "voltage0")
            .with_property("type", "input");
        assert_eq!(build(&input).0.unwrap().direction(), Direction::Input);

        let untyped = Element::new("channel").with_property("id", "temp0");
        assert_eq!(build(&untyped).0.unwrap().direction(), Direction::Input);
    }

    #[test]
    fn test_unknown_type_warns_and_defaults_to_input() {
        let node = Element::new("channel")
            .with_property("id", "voltage1")
            .with_property("type", "bidirectional");

        let (result, warnings) = build(&node);
        assert_eq!(result.unwrap().direction(), Direction::Input);
        assert_eq!(
            warnings,
            vec![Warning::UnknownChannelType {
                channel: "voltage1".to_string(),
                value: "bidirectional".to_string(),
            }]
        );
    }

    #[test]
    fn test_missing_id_fails() {
        let node = Element::new("channel")
            .with_property("name", "orphan")
            .with_child(Element::new("attribute").with_property("name", "raw"));

        let (result, _) = build(&node);
        assert!(matches!(
            result,
            Err(BuildError::IncompleteChannel { ref device }) if device == "iio:device0"
        ));
    }

    #[test]
    fn test_bad_attribute_aborts_channel() {
        let node = Element::new("channel")
            .with_property("id", "voltage0")
            .with_child(Element::new("attribute").with_property("name", "raw"))
            .with_child(Element::new("attribute"));

        let (result, _) = build(&node);
        assert!(matches!(result, Err(BuildError::MissingField { .. })));
    }

    #[test]
    fn test_unknown_properties_and_children_warn() {
        let mut node = Element::new("channel")
            .with_property("id", "voltage0")
            .with_property("scan_index", "0")
            .with_child(Element::new("scan-element"));
        node.children.push(Node::Text("  ".to_string()));
        node.children.push(Node::Comment("ignored".to_string()));

        let (result, warnings) = build(&node);
        assert!(result.is_ok());
        assert_eq!(warnings.len(), 2);
        assert!(matches!(&warnings[0], Warning::UnknownProperty { property, .. } if property == "scan_index"));
        assert!(matches!(&warnings[1], Warning::UnknownChild { tag, .. } if tag == "scan-element"));
    }
}
