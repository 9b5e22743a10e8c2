//! Document tree and the parser session that materializes it
//!
//! The builders never see raw bytes. A [`DocumentParser`] reads the whole
//! input with `quick-xml`, checks that it is well formed, and hands back an
//! owned [`Document`]: named elements carrying an ordered property list and
//! an ordered child list. Text, CDATA, comments and processing instructions
//! stay in the child list as non-element nodes.

use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

use crate::error::ParseError;

/// Parser options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Reject documents whose DOCTYPE names a different root element
    #[serde(default = "default_true")]
    pub validate: bool,
    /// Trim leading and trailing whitespace of every text node, dropping
    /// nodes that end up empty
    #[serde(default = "default_true")]
    pub trim_text: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            validate: true,
            trim_text: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// A single `name="value"` property of an element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub name: String,
    pub value: String,
}

/// A child of an element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    CData(String),
    Comment(String),
    ProcessingInstruction(String),
}

impl Node {
    /// Returns the element if this node is one
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(e) => Some(e),
            _ => None,
        }
    }
}

/// A named element with its properties and children, in document order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    pub name: String,
    pub properties: Vec<Property>,
    pub children: Vec<Node>,
}

impl Element {
    /// Create an element with no properties or children
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Add a property
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.push(Property {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Add a child element
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    /// Iterate over child elements, skipping text and other pass-through nodes
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }
}

/// A fully parsed document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Root name declared by `<!DOCTYPE ...>`, if any
    pub doctype: Option<String>,
    pub root: Element,
}

/// One parse of one input. Owns nothing beyond its options; every
/// intermediate buffer lives on the stack of a single `parse_*` call.
#[derive(Debug, Clone, Default)]
pub struct DocumentParser {
    config: ParserConfig,
}

impl DocumentParser {
    pub fn new(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Read and parse a document from a file
    pub fn parse_file(&self, path: &Path) -> Result<Document, ParseError> {
        let content = std::fs::read(path)?;
        debug!(path = %path.display(), bytes = content.len(), "Read document");
        self.parse_bytes(&content)
    }

    /// Parse a document held in memory
    pub fn parse_bytes(&self, input: &[u8]) -> Result<Document, ParseError> {
        let mut reader = Reader::from_reader(input);
        reader.config_mut().trim_text(self.config.trim_text);

        let mut buf = Vec::new();
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;
        let mut doctype: Option<String> = None;
        let mut entities: HashMap<String, String> = HashMap::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(ref e) => {
                    if root.is_some() {
                        return Err(ParseError::ContentOutsideRoot);
                    }
                    stack.push(element_from_start(e, &entities)?);
                }
                Event::Empty(ref e) => {
                    let element = element_from_start(e, &entities)?;
                    attach(&mut stack, &mut root, Node::Element(element))?;
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| ParseError::Xml("unmatched closing tag".to_string()))?;
                    attach(&mut stack, &mut root, Node::Element(element))?;
                }
                Event::Text(ref e) => {
                    let text = e.unescape_with(|ent| resolve_entity(&entities, ent))?.into_owned();
                    if stack.is_empty() {
                        if !text.trim().is_empty() {
                            return Err(ParseError::ContentOutsideRoot);
                        }
                    } else {
                        attach(&mut stack, &mut root, Node::Text(text))?;
                    }
                }
                Event::CData(e) => {
                    let text = std::str::from_utf8(&e.into_inner())?.to_string();
                    attach(&mut stack, &mut root, Node::CData(text))?;
                }
                Event::Comment(ref e) => {
                    if !stack.is_empty() {
                        let text = std::str::from_utf8(e)?.to_string();
                        attach(&mut stack, &mut root, Node::Comment(text))?;
                    }
                }
                Event::PI(ref e) => {
                    if !stack.is_empty() {
                        let text = std::str::from_utf8(e)?.to_string();
                        attach(&mut stack, &mut root, Node::ProcessingInstruction(text))?;
                    }
                }
                Event::DocType(ref e) => {
                    let decl = std::str::from_utf8(e)?;
                    doctype = doctype_name(decl);
                    entities = internal_entities(decl);
                }
                Event::Decl(_) => {}
                Event::Eof => break,
            }
            buf.clear();
        }

        if let Some(open) = stack.pop() {
            return Err(ParseError::UnclosedElement(open.name));
        }
        let root = root.ok_or(ParseError::NoRoot)?;

        if self.config.validate {
            if let Some(declared) = &doctype {
                if *declared != root.name {
                    return Err(ParseError::DoctypeMismatch {
                        declared: declared.clone(),
                        root: root.name,
                    });
                }
            }
        }

        Ok(Document { doctype, root })
    }
}

fn element_from_start(
    e: &BytesStart<'_>,
    entities: &HashMap<String, String>,
) -> Result<Element, ParseError> {
    let name = std::str::from_utf8(e.name().as_ref())?.to_string();
    let mut element = Element::new(name);
    for attr in e.attributes() {
        let attr = attr?;
        let key = std::str::from_utf8(attr.key.as_ref())?.to_string();
        let value = attr
            .unescape_value_with(|ent| resolve_entity(entities, ent))?
            .into_owned();
        element.properties.push(Property { name: key, value });
    }
    Ok(element)
}

/// Root element name of a DOCTYPE declaration. The name may be followed
/// directly by the internal subset, as in `<!DOCTYPE context[...]>`.
fn doctype_name(decl: &str) -> Option<String> {
    decl.trim_start()
        .split(|c: char| c.is_whitespace() || c == '[' || c == '>')
        .next()
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

/// General entities with literal values declared in the internal subset.
/// Parameter entities and external entities are ignored, and the first
/// declaration of a name is binding.
fn internal_entities(decl: &str) -> HashMap<String, String> {
    let mut entities = HashMap::new();
    let mut rest = decl;
    while let Some(pos) = rest.find("<!ENTITY") {
        rest = rest[pos + "<!ENTITY".len()..].trim_start();
        if rest.starts_with('%') {
            continue;
        }
        let Some(name_end) = rest.find(char::is_whitespace) else {
            break;
        };
        let (name, tail) = rest.split_at(name_end);
        let tail = tail.trim_start();
        let Some(quote) = tail.chars().next().filter(|c| *c == '"' || *c == '\'') else {
            continue;
        };
        let Some(len) = tail[1..].find(quote) else {
            break;
        };
        entities
            .entry(name.to_string())
            .or_insert_with(|| tail[1..1 + len].to_string());
        rest = &tail[1 + len..];
    }
    entities
}

fn resolve_entity<'a>(entities: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    resolve_predefined_entity(name).or_else(|| entities.get(name).map(String::as_str))
}

/// Append a finished node to the innermost open element, or make it the root
fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    node: Node,
) -> Result<(), ParseError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
        return Ok(());
    }
    match node {
        Node::Element(element) if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        _ => Err(ParseError::ContentOutsideRoot),
    }
}
