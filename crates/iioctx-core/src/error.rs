//! Error types for document parsing and context building

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed XML: {0}")]
    Xml(String),
    #[error("Invalid UTF-8 in document: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("Document has no root element")]
    NoRoot,
    #[error("Element <{0}> is never closed")]
    UnclosedElement(String),
    #[error("Unexpected content outside the root element")]
    ContentOutsideRoot,
    #[error("DOCTYPE declares <{declared}> but the root element is <{root}>")]
    DoctypeMismatch { declared: String, root: String },
}

impl From<quick_xml::Error> for ParseError {
    fn from(e: quick_xml::Error) -> Self {
        ParseError::Xml(e.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for ParseError {
    fn from(e: quick_xml::events::attributes::AttrError) -> Self {
        ParseError::Xml(e.to_string())
    }
}

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Unable to parse XML file: {0}")]
    Parse(#[from] ParseError),
    #[error("Unrecognized XML file: root element is <{0}>")]
    UnrecognizedDocument(String),
    #[error("Incomplete <{element}> in {owner}: missing required field '{field}'")]
    MissingField {
        element: &'static str,
        field: &'static str,
        owner: String,
    },
    #[error("Incomplete channel definition in device {device}")]
    IncompleteChannel { device: String },
    #[error("Incomplete device definition: unable to read device ID")]
    IncompleteDevice,
    #[error("Unable to create channel in device {device}: {source}")]
    Channel {
        device: String,
        #[source]
        source: Box<BuildError>,
    },
    #[error("Unable to create device #{index}: {source}")]
    Device {
        index: usize,
        #[source]
        source: Box<BuildError>,
    },
    #[error("Unable to allocate memory")]
    OutOfMemory(#[from] std::collections::TryReserveError),
}

impl BuildError {
    /// Innermost error of a nested device/channel failure chain
    pub fn root_cause(&self) -> &BuildError {
        match self {
            BuildError::Channel { source, .. } | BuildError::Device { source, .. } => {
                source.root_cause()
            }
            other => other,
        }
    }
}
