//! Devices: one hardware unit with its channels and attributes

use serde::Serialize;
use tracing::{debug, error};

use crate::attribute::{collect_attribute, AttributeList};
use crate::builder::{try_push, BuildSession, Owner};
use crate::channel::{Channel, Direction};
use crate::context::ContextId;
use crate::document::Element;
use crate::error::BuildError;

/// Non-owning reference to a device: its owning context and its position
/// in that context's device list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceHandle {
    pub context: ContextId,
    pub index: usize,
}

/// A device of a context
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Device {
    id: String,
    name: Option<String>,
    channels: Vec<Channel>,
    attrs: AttributeList,
    #[serde(skip)]
    context: ContextId,
}

impl Device {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn channel(&self, index: usize) -> Option<&Channel> {
        self.channels.get(index)
    }

    pub fn attrs(&self) -> &AttributeList {
        &self.attrs
    }

    /// Identifier of the owning context
    pub fn context(&self) -> ContextId {
        self.context
    }

    /// Find a channel by identifier or display name with the given direction
    pub fn find_channel(&self, name: &str, output: bool) -> Option<&Channel> {
        let direction = if output {
            Direction::Output
        } else {
            Direction::Input
        };
        self.channels.iter().find(|c| {
            c.direction() == direction && (c.id() == name || c.name() == Some(name))
        })
    }

    /// Look up a device attribute name
    pub fn find_attr(&self, name: &str) -> Option<&str> {
        self.attrs.iter().find(|a| *a == name)
    }

    /// Build a device from a `<device>` element.
    ///
    /// `index` is the position the device will take in its context. A single
    /// failing channel or attribute fails the whole device; everything built
    /// for it so far is dropped with it.
    pub(crate) fn from_element(
        node: &Element,
        context: ContextId,
        index: usize,
        session: &mut BuildSession,
    ) -> Result<Self, BuildError> {
        let mut id = None;
        let mut name = None;

        for prop in &node.properties {
            match prop.name.as_str() {
                "name" => name = Some(prop.value.clone()),
                "id" => id = Some(prop.value.clone()),
                other => session.warn_unknown_property("device", other, None),
            }
        }

        let Some(id) = id else {
            error!(index, "Unable to read device ID");
            return Err(BuildError::IncompleteDevice);
        };

        let mut device = Device {
            id,
            name,
            channels: Vec::new(),
            attrs: AttributeList::new(),
            context,
        };
        let handle = DeviceHandle { context, index };

        for child in node.elements() {
            match child.name.as_str() {
                "channel" => {
                    let channel = Channel::from_element(child, handle, &device.id, session)
                        .map_err(|e| {
                            error!(device = %device.id, "Unable to create channel");
                            BuildError::Channel {
                                device: device.id.clone(),
                                source: Box::new(e),
                            }
                        })?;
                    try_push(&mut device.channels, channel)?;
                }
                "attribute" => {
                    collect_attribute(&mut device.attrs, child, Owner::Device(&device.id), session)?;
                }
                other => session.warn_unknown_child("device", other),
            }
        }

        debug!(
            device = %device.id,
            channels = device.channels.len(),
            attrs = device.attrs.len(),
            "Built device"
        );
        Ok(device)
    }
}
