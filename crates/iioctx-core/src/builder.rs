//! Build session shared by the context, device and channel builders
//!
//! A session lives for exactly one top-level build. It records every
//! recoverable warning (unknown property, unknown child element, unknown
//! channel type) after emitting it through `tracing`, so callers and tests
//! can inspect what was ignored.

use std::fmt;
use tracing::warn;

use crate::error::BuildError;

/// Who a piece of the document belongs to, for diagnostics
#[derive(Debug, Clone, Copy)]
pub(crate) enum Owner<'a> {
    Device(&'a str),
    Channel(&'a str),
}

impl fmt::Display for Owner<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Owner::Device(id) => write!(f, "device {}", id),
            Owner::Channel(id) => write!(f, "channel {}", id),
        }
    }
}

/// A recoverable problem found while building
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// Property not recognized on an element; the property is ignored
    UnknownProperty {
        element: String,
        property: String,
        owner: Option<String>,
    },
    /// Child element not recognized; the child is skipped
    UnknownChild { parent: String, tag: String },
    /// Channel `type` other than `input` or `output`; direction stays input
    UnknownChannelType { channel: String, value: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::UnknownProperty {
                element,
                property,
                owner: Some(owner),
            } => write!(f, "Unknown field '{}' in <{}> of {}", property, element, owner),
            Warning::UnknownProperty {
                element, property, ..
            } => write!(f, "Unknown attribute '{}' in <{}>", property, element),
            Warning::UnknownChild { parent, tag } => {
                write!(f, "Unknown children '{}' in <{}>", tag, parent)
            }
            Warning::UnknownChannelType { channel, value } => {
                write!(f, "Unknown channel type '{}' for channel {}", value, channel)
            }
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct BuildSession {
    warnings: Vec<Warning>,
}

impl BuildSession {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn warn(&mut self, warning: Warning) {
        warn!("{}", warning);
        self.warnings.push(warning);
    }

    pub(crate) fn warn_unknown_property(&mut self, element: &str, property: &str, owner: Option<Owner<'_>>) {
        self.warn(Warning::UnknownProperty {
            element: element.to_string(),
            property: property.to_string(),
            owner: owner.map(|o| o.to_string()),
        });
    }

    pub(crate) fn warn_unknown_child(&mut self, parent: &str, tag: &str) {
        self.warn(Warning::UnknownChild {
            parent: parent.to_string(),
            tag: tag.to_string(),
        });
    }

    pub(crate) fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    pub(crate) fn into_warnings(self) -> Vec<Warning> {
        self.warnings
    }
}

/// Append to a collection, failing instead of aborting when it cannot grow
pub(crate) fn try_push<T>(items: &mut Vec<T>, item: T) -> Result<(), BuildError> {
    items.try_reserve(1)?;
    items.push(item);
    Ok(())
}
