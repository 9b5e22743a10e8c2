//! Serialization of a context back into its XML document form

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use thiserror::Error;

use crate::channel::Channel;
use crate::context::{Context, CONTEXT_TAG};
use crate::device::Device;

#[derive(Error, Debug)]
pub enum WriteError {
    #[error("Failed to serialize context: {0}")]
    SerializeError(String),
    #[error("Serialized context is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

struct XmlWriter {
    inner: Writer<Vec<u8>>,
}

impl XmlWriter {
    fn new() -> Self {
        Self {
            inner: Writer::new_with_indent(Vec::new(), b' ', 4),
        }
    }

    fn write(&mut self, event: Event<'_>) -> Result<(), WriteError> {
        self.inner
            .write_event(event)
            .map_err(|e| WriteError::SerializeError(e.to_string()))
    }

    /// Write `start` as an empty element when there are no children,
    /// otherwise wrap the children between start and end tags
    fn element<F>(&mut self, start: BytesStart<'_>, has_children: bool, children: F) -> Result<(), WriteError>
    where
        F: FnOnce(&mut Self) -> Result<(), WriteError>,
    {
        if !has_children {
            return self.write(Event::Empty(start));
        }
        let end = BytesEnd::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
        self.write(Event::Start(start))?;
        children(self)?;
        self.write(Event::End(end))
    }

    fn attributes<'a>(&mut self, names: impl Iterator<Item = &'a str>) -> Result<(), WriteError> {
        for name in names {
            let mut attr = BytesStart::new("attribute");
            attr.push_attribute(("name", name));
            self.write(Event::Empty(attr))?;
        }
        Ok(())
    }

    fn channel(&mut self, channel: &Channel) -> Result<(), WriteError> {
        let mut start = BytesStart::new("channel");
        start.push_attribute(("id", channel.id()));
        if let Some(name) = channel.name() {
            start.push_attribute(("name", name));
        }
        start.push_attribute(("type", channel.direction().as_str()));

        self.element(start, !channel.attrs().is_empty(), |w| {
            w.attributes(channel.attrs().iter())
        })
    }

    fn device(&mut self, device: &Device) -> Result<(), WriteError> {
        let mut start = BytesStart::new("device");
        start.push_attribute(("id", device.id()));
        if let Some(name) = device.name() {
            start.push_attribute(("name", name));
        }

        let has_children = !device.channels().is_empty() || !device.attrs().is_empty();
        self.element(start, has_children, |w| {
            for channel in device.channels() {
                w.channel(channel)?;
            }
            w.attributes(device.attrs().iter())
        })
    }
}

impl Context {
    /// Serialize to an XML document that builds back into an equal context
    pub fn to_xml(&self) -> Result<String, WriteError> {
        let mut w = XmlWriter::new();
        w.write(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

        let start = BytesStart::new(CONTEXT_TAG);
        w.element(start, !self.devices().is_empty(), |w| {
            for device in self.devices() {
                w.device(device)?;
            }
            Ok(())
        })?;

        Ok(String::from_utf8(w.inner.into_inner())?)
    }
}
