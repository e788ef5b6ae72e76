//! Conversion inputs and root-node resolution

use tracing::debug;

use crate::error::{Error, Result};
use crate::xml::{Config, Content, Document, Element, NodeKind, Parser, XmlNode};

/// Something the converter can start from: XML text or an already-parsed node
#[derive(Clone, Copy)]
pub enum Source<'a> {
    Text(&'a str),
    Bytes(&'a [u8]),
    Node(&'a dyn XmlNode),
}

impl std::fmt::Debug for Source<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(text) => f.debug_tuple("Text").field(&text.len()).finish(),
            Self::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            Self::Node(node) => f
                .debug_tuple("Node")
                .field(&node.kind())
                .field(&node.name())
                .finish(),
        }
    }
}

impl<'a> From<&'a str> for Source<'a> {
    fn from(text: &'a str) -> Self {
        Self::Text(text)
    }
}

impl<'a> From<&'a String> for Source<'a> {
    fn from(text: &'a String) -> Self {
        Self::Text(text)
    }
}

impl<'a> From<&'a [u8]> for Source<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Self::Bytes(bytes)
    }
}

impl<'a> From<&'a dyn XmlNode> for Source<'a> {
    fn from(node: &'a dyn XmlNode) -> Self {
        Self::Node(node)
    }
}

impl<'a> From<&'a Document> for Source<'a> {
    fn from(doc: &'a Document) -> Self {
        Self::Node(doc)
    }
}

impl<'a> From<&'a Element> for Source<'a> {
    fn from(element: &'a Element) -> Self {
        Self::Node(element)
    }
}

impl<'a> From<&'a Content> for Source<'a> {
    fn from(content: &'a Content) -> Self {
        Self::Node(content)
    }
}

/// The node conversion starts at: parsed here, or borrowed from the caller
pub enum Root<'a> {
    Parsed(Element),
    Borrowed(&'a dyn XmlNode),
}

impl Root<'_> {
    pub fn node(&self) -> &dyn XmlNode {
        match self {
            Self::Parsed(element) => element,
            Self::Borrowed(node) => *node,
        }
    }
}

/// Resolve the root element of a source
///
/// Text and bytes are parsed with `config`, so bytes that are not UTF-8 fail
/// as a parse error. Nodes are used as given, except that a document
/// resolves to its root element.
pub fn get_root<'a>(source: Source<'a>, config: &Config) -> Result<Root<'a>> {
    match source {
        Source::Text(text) => parse_root(text.as_bytes(), config),
        Source::Bytes(bytes) => parse_root(bytes, config),
        Source::Node(node) => match node.kind() {
            NodeKind::Element => Ok(Root::Borrowed(node)),
            NodeKind::Document => Ok(Root::Borrowed(
                node.children()
                    .find(|child| child.kind() == NodeKind::Element)
                    .unwrap_or(node),
            )),
            kind => Err(Error::unsupported(format!(
                "{kind:?} node cannot be a conversion root"
            ))),
        },
    }
}

fn parse_root<'a>(input: &[u8], config: &Config) -> Result<Root<'a>> {
    debug!(bytes = input.len(), "parsing xml text");
    let doc = Parser::with_config(input, *config).parse()?;
    debug!(root = %doc.root.name, "parsed xml document");
    Ok(Root::Parsed(doc.root))
}
