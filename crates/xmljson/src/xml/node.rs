//! The node contract the converter walks
//!
//! Anything that can answer these questions can be converted, so a DOM from
//! another XML library only needs an `XmlNode` impl to plug in.

use crate::xml::model::{Content, Document, Element};

/// Node type discriminator
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Element,
    Text,
    CData,
    Comment,
    ProcessingInstruction,
}

impl NodeKind {
    /// Text and CDATA both carry character data
    pub const fn is_character_data(self) -> bool {
        matches!(self, Self::Text | Self::CData)
    }
}

/// Read-only view over a parsed XML node
pub trait XmlNode {
    fn kind(&self) -> NodeKind;

    /// Tag name for elements, target for processing instructions, empty otherwise
    fn name(&self) -> &str;

    /// Attributes in document order
    fn attributes(&self) -> Box<dyn Iterator<Item = (&str, &str)> + '_>;

    /// Child nodes in document order
    fn children(&self) -> Box<dyn Iterator<Item = &dyn XmlNode> + '_>;

    /// Character content for text, CDATA, comment and PI nodes, empty otherwise
    fn text(&self) -> &str;
}

fn as_node(content: &Content) -> &dyn XmlNode {
    content
}

impl XmlNode for Element {
    fn kind(&self) -> NodeKind {
        NodeKind::Element
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn attributes(&self) -> Box<dyn Iterator<Item = (&str, &str)> + '_> {
        Box::new(
            self.attributes
                .iter()
                .map(|(name, value)| (name.as_str(), value.as_str())),
        )
    }

    fn children(&self) -> Box<dyn Iterator<Item = &dyn XmlNode> + '_> {
        Box::new(self.children.iter().map(as_node))
    }

    fn text(&self) -> &str {
        ""
    }
}

impl XmlNode for Content {
    fn kind(&self) -> NodeKind {
        match self {
            Self::Element(_) => NodeKind::Element,
            Self::Text(_) => NodeKind::Text,
            Self::CData(_) => NodeKind::CData,
            Self::Comment(_) => NodeKind::Comment,
            Self::ProcessingInstruction { .. } => NodeKind::ProcessingInstruction,
        }
    }

    fn name(&self) -> &str {
        match self {
            Self::Element(element) => &element.name,
            Self::ProcessingInstruction { target, .. } => target,
            _ => "",
        }
    }

    fn attributes(&self) -> Box<dyn Iterator<Item = (&str, &str)> + '_> {
        match self {
            Self::Element(element) => element.attributes(),
            _ => Box::new(std::iter::empty()),
        }
    }

    fn children(&self) -> Box<dyn Iterator<Item = &dyn XmlNode> + '_> {
        match self {
            Self::Element(element) => element.children(),
            _ => Box::new(std::iter::empty()),
        }
    }

    fn text(&self) -> &str {
        match self {
            Self::Element(_) => "",
            Self::Text(text) | Self::CData(text) | Self::Comment(text) => text,
            Self::ProcessingInstruction { data, .. } => data,
        }
    }
}

impl XmlNode for Document {
    fn kind(&self) -> NodeKind {
        NodeKind::Document
    }

    fn name(&self) -> &str {
        ""
    }

    fn attributes(&self) -> Box<dyn Iterator<Item = (&str, &str)> + '_> {
        Box::new(std::iter::empty())
    }

    fn children(&self) -> Box<dyn Iterator<Item = &dyn XmlNode> + '_> {
        Box::new(std::iter::once::<&dyn XmlNode>(&self.root))
    }

    fn text(&self) -> &str {
        ""
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_exposes_attributes_in_order() {
        let element = Element::new("person")
            .with_attribute("id", "7")
            .with_attribute("lang", "en");
        let attrs: Vec<_> = element.attributes().collect();
        assert_eq!(attrs, vec![("id", "7"), ("lang", "en")]);
        assert_eq!(element.kind(), NodeKind::Element);
        assert_eq!(element.text(), "");
    }

    #[test]
    fn test_content_kinds() {
        let nodes = [
            Content::Element(Element::new("a")),
            Content::Text("t".to_string()),
            Content::CData("c".to_string()),
            Content::Comment("x".to_string()),
            Content::ProcessingInstruction {
                target: "pi".to_string(),
                data: "d".to_string(),
            },
        ];
        let kinds: Vec<_> = nodes.iter().map(XmlNode::kind).collect();
        assert_eq!(
            kinds,
            vec![
                NodeKind::Element,
                NodeKind::Text,
                NodeKind::CData,
                NodeKind::Comment,
                NodeKind::ProcessingInstruction,
            ]
        );
        let names: Vec<_> = nodes.iter().map(XmlNode::name).collect();
        assert_eq!(names, vec!["a", "", "", "", "pi"]);
        assert!(NodeKind::CData.is_character_data());
        assert!(!NodeKind::Comment.is_character_data());
    }

    #[test]
    fn test_document_child_is_root() {
        let doc = Document {
            root: Element::new("root").with_text("hi"),
        };
        let children: Vec<_> = doc.children().collect();
        assert_eq!(children.len(), 1);
        assert_eq!(children.first().map(|c| c.name()), Some("root"));
        let grandchildren: Vec<_> = children
            .iter()
            .flat_map(|c| c.children())
            .map(|c| c.text().to_string())
            .collect();
        assert_eq!(grandchildren, vec!["hi".to_string()]);
    }
}
