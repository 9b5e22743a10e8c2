//! iioctx Core - Context model and XML context builder
//!
//! This crate turns an XML description of an instrumentation context into
//! an owned object graph:
//! - Document parsing into a tree of elements, properties and children
//! - Context, device and channel model types with attribute-name lists
//! - Builders that validate required fields and link the model together
//! - Serialization of a context back into the same document format
//!
//! ```xml
//! <context>
//!   <device id="iio:device0" name="ad7476">
//!     <channel id="voltage0" type="input">
//!       <attribute name="raw"/>
//!     </channel>
//!     <attribute name="sampling_frequency"/>
//!   </device>
//! </context>
//! ```

pub mod attribute;
pub mod builder;
pub mod channel;
pub mod context;
pub mod device;
pub mod document;
pub mod error;
pub mod xml;

use std::path::Path;

pub use attribute::AttributeList;
pub use builder::Warning;
pub use channel::{Channel, Direction};
pub use context::{BackendOps, Context, ContextBuilder, ContextId, XmlBackend, XML_CONTEXT_NAME};
pub use device::{Device, DeviceHandle};
pub use document::{Document, DocumentParser, Element, Node, ParserConfig, Property};
pub use error::{BuildError, ParseError};
pub use xml::WriteError;

/// Create a context from the XML file at `path`
pub fn create_xml_context(path: impl AsRef<Path>) -> Result<Context, BuildError> {
    ContextBuilder::default().load_file(path.as_ref())
}

/// Create a context from an XML document held in memory
pub fn create_xml_context_mem(xml: &[u8]) -> Result<Context, BuildError> {
    ContextBuilder::default().load_bytes(xml)
}
