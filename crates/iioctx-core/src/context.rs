//! Contexts and the builder that produces them from a document

use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use crate::builder::{try_push, BuildSession, Warning};
use crate::channel::Channel;
use crate::device::Device;
use crate::document::{Document, DocumentParser, ParserConfig};
use crate::error::BuildError;

/// Name given to every context built from a document
pub const XML_CONTEXT_NAME: &str = "xml";

/// Root element every context document must have
pub const CONTEXT_TAG: &str = "context";

/// Unique identifier of one built context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ContextId(Uuid);

impl ContextId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ContextId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ContextId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Backend operations attached to a context
pub trait BackendOps: std::fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;
}

/// Backend of document-derived contexts. It exposes no operations.
#[derive(Debug, Default)]
pub struct XmlBackend;

impl BackendOps for XmlBackend {
    fn name(&self) -> &'static str {
        XML_CONTEXT_NAME
    }
}

/// A context: the devices of one instrumentation environment
#[derive(Debug, Clone, Serialize)]
pub struct Context {
    id: ContextId,
    name: &'static str,
    #[serde(skip)]
    ops: Arc<dyn BackendOps>,
    devices: Vec<Device>,
}

impl Context {
    pub fn id(&self) -> ContextId {
        self.id
    }

    pub fn name(&self) -> &str {
        self.name
    }

    pub fn ops(&self) -> &dyn BackendOps {
        self.ops.as_ref()
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn device(&self, index: usize) -> Option<&Device> {
        self.devices.get(index)
    }

    /// Find a device by identifier, falling back to its display name
    pub fn find_device(&self, name: &str) -> Option<&Device> {
        self.devices
            .iter()
            .find(|d| d.id() == name)
            .or_else(|| self.devices.iter().find(|d| d.name() == Some(name)))
    }

    /// Resolve the device a channel belongs to
    pub fn device_of(&self, channel: &Channel) -> Option<&Device> {
        let handle = channel.device();
        if handle.context != self.id {
            return None;
        }
        self.devices.get(handle.index)
    }
}

/// Builds contexts from documents, keeping the warnings of the last build
#[derive(Debug, Default)]
pub struct ContextBuilder {
    parser: DocumentParser,
    warnings: Vec<Warning>,
}

impl ContextBuilder {
    pub fn new(config: ParserConfig) -> Self {
        Self {
            parser: DocumentParser::new(config),
            warnings: Vec::new(),
        }
    }

    /// Warnings emitted by the most recent build
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Parse the file at `path` and build a context from it
    pub fn load_file(&mut self, path: &Path) -> Result<Context, BuildError> {
        self.warnings.clear();
        let document = self.parser.parse_file(path).map_err(|e| {
            error!(path = %path.display(), error = %e, "Unable to parse XML file");
            e
        })?;
        self.build(&document)
    }

    /// Parse an in-memory document and build a context from it
    pub fn load_bytes(&mut self, xml: &[u8]) -> Result<Context, BuildError> {
        self.warnings.clear();
        let document = self.parser.parse_bytes(xml).map_err(|e| {
            error!(error = %e, "Unable to parse XML file");
            e
        })?;
        self.build(&document)
    }

    /// Build a context from an already parsed document.
    ///
    /// Either every device under the root is built, or nothing is returned.
    pub fn build(&mut self, document: &Document) -> Result<Context, BuildError> {
        let mut session = BuildSession::new();
        let result = build_context(document, &mut session);
        self.warnings = session.into_warnings();
        result
    }
}

fn build_context(document: &Document, session: &mut BuildSession) -> Result<Context, BuildError> {
    let root = &document.root;
    if root.name != CONTEXT_TAG {
        error!(root = %root.name, "Unrecognized XML file");
        return Err(BuildError::UnrecognizedDocument(root.name.clone()));
    }

    let mut context = Context {
        id: ContextId::new(),
        name: XML_CONTEXT_NAME,
        ops: Arc::new(XmlBackend),
        devices: Vec::new(),
    };

    for prop in &root.properties {
        session.warn_unknown_property(CONTEXT_TAG, &prop.name, None);
    }

    for child in root.elements() {
        if child.name != "device" {
            session.warn_unknown_child(CONTEXT_TAG, &child.name);
            continue;
        }

        let index = context.devices.len();
        let device = Device::from_element(child, context.id, index, session).map_err(|e| {
            error!(index, "Unable to create device");
            BuildError::Device {
                index,
                source: Box::new(e),
            }
        })?;
        try_push(&mut context.devices, device)?;
    }

    info!(
        context = %context.id,
        devices = context.devices.len(),
        warnings = session.warning_count(),
        "Created XML context"
    );
    Ok(context)
}
