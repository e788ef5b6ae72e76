//! XML to value conversion
//!
//! Each element becomes a fresh accumulator: attributes first, then child
//! elements grouped by tag name, then its own text under the `"value"` key.
//! Once the element's children are done the accumulator is reduced:
//!
//! 1. every single-item group collapses to that item,
//! 2. an object whose only key is `"value"` collapses to what it holds.
//!
//! So `<age>30</age>` becomes `"30"`, `<p lang="en">hi</p>` becomes
//! `{"lang":"en","value":"hi"}` and repeated tags become arrays.

use indexmap::IndexMap;
use tracing::{debug, instrument, trace};

use crate::error::Result;
use crate::source::{get_root, Source};
use crate::value::{Object, Value};
use crate::xml::{Config, NodeKind, XmlNode};

/// Key an element's own text is stored under
pub const TEXT_KEY: &str = "value";

/// How multiple non-blank text segments of one element combine
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextMode {
    /// The last segment wins
    #[default]
    Last,
    /// Segments are joined in document order
    Concat,
}

/// Conversion options
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Limits applied when the input is XML text
    pub parser: Config,
    pub text: TextMode,
}

impl ConvertOptions {
    pub const fn new(parser: Config, text: TextMode) -> Self {
        Self { parser, text }
    }
}

/// Convert XML text or a parsed node into a value
///
/// ```
/// # fn main() -> Result<(), xmljson::Error> {
/// let value = xmljson::convert(r#"<person id="7"><name>Ada</name></person>"#)?;
/// assert_eq!(value.to_json(), r#"{"id":"7","name":"Ada"}"#);
/// # Ok(())
/// # }
/// ```
pub fn convert<'a>(input: impl Into<Source<'a>>) -> Result<Value> {
    convert_with_options(input, &ConvertOptions::default())
}

/// Convert with custom parser limits and text handling
#[instrument(level = "debug", skip_all)]
pub fn convert_with_options<'a>(
    input: impl Into<Source<'a>>,
    options: &ConvertOptions,
) -> Result<Value> {
    let source = input.into();
    debug!(?source, text_mode = ?options.text, "converting");
    let root = get_root(source, &options.parser)?;
    Ok(walk(root.node(), options.text))
}

/// Convert an already-resolved node; never fails
pub fn convert_node(node: &dyn XmlNode) -> Value {
    walk(node, TextMode::Last)
}

/// Convert and render as compact JSON
pub fn to_json<'a>(input: impl Into<Source<'a>>) -> Result<String> {
    convert(input).map(|value| value.to_json())
}

/// Convert and render as indented JSON
pub fn to_json_pretty<'a>(input: impl Into<Source<'a>>) -> Result<String> {
    convert(input).map(|value| value.to_json_pretty())
}

/// Accumulated attributes, child elements and text of one element
#[derive(Debug, Default)]
struct Fields {
    groups: IndexMap<String, Vec<Value>>,
    /// Position of the text entry inside the `"value"` group
    text_slot: Option<usize>,
}

impl Fields {
    fn from_attributes(node: &dyn XmlNode) -> Self {
        let mut fields = Self::default();
        for (name, value) in node.attributes() {
            fields
                .groups
                .insert(name.to_string(), vec![Value::from(value)]);
        }
        fields
    }

    fn push_element(&mut self, name: &str, value: Value) {
        self.groups.entry(name.to_string()).or_default().push(value);
    }

    /// Record non-blank text; an earlier text entry is replaced or extended,
    /// an attribute or element that happens to be named `value` is kept
    fn push_text(&mut self, text: &str, mode: TextMode) {
        let group = self.groups.entry(TEXT_KEY.to_string()).or_default();
        match self.text_slot.and_then(|slot| group.get_mut(slot)) {
            Some(Value::String(existing)) => match mode {
                TextMode::Last => text.clone_into(existing),
                TextMode::Concat => existing.push_str(text),
            },
            _ => {
                self.text_slot = Some(group.len());
                group.push(Value::from(text));
            }
        }
    }

    fn reduce(self) -> Value {
        let mut obj = Object::with_capacity(self.groups.len());
        for (key, values) in self.groups {
            obj.insert(key, collapse(values));
        }

        if obj.len() == 1 {
            if let Some(text) = obj.remove(TEXT_KEY) {
                return text;
            }
        }
        Value::Object(obj)
    }
}

fn collapse(mut values: Vec<Value>) -> Value {
    if values.len() == 1 {
        if let Some(only) = values.pop() {
            return only;
        }
    }
    Value::from(values)
}

fn is_blank(text: &str) -> bool {
    text.chars().all(char::is_whitespace)
}

/// An element whose children are still being visited
struct Frame<'a> {
    name: &'a str,
    children: Box<dyn Iterator<Item = &'a dyn XmlNode> + 'a>,
    fields: Fields,
}

impl<'a> Frame<'a> {
    fn open(node: &'a dyn XmlNode) -> Self {
        Self {
            name: node.name(),
            children: node.children(),
            fields: Fields::from_attributes(node),
        }
    }
}

/// Depth-first walk over an explicit stack, so deep trees cannot exhaust
/// the call stack
fn walk(root: &dyn XmlNode, mode: TextMode) -> Value {
    let mut stack = vec![Frame::open(root)];

    while let Some(frame) = stack.last_mut() {
        let Some(child) = frame.children.next() else {
            if let Some(done) = stack.pop() {
                let value = done.fields.reduce();
                trace!(element = done.name, depth = stack.len(), "converted element");
                match stack.last_mut() {
                    Some(parent) => parent.fields.push_element(done.name, value),
                    None => return value,
                }
            }
            continue;
        };

        match child.kind() {
            NodeKind::Element => stack.push(Frame::open(child)),
            kind if kind.is_character_data() => {
                let text = child.text();
                if !is_blank(text) {
                    frame.fields.push_text(text, mode);
                }
            }
            _ => {}
        }
    }

    Value::default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Array;
    use crate::xml::{Content, Element};

    fn strings(items: &[&str]) -> Value {
        items.iter().map(|s| Value::from(*s)).collect::<Array>().into()
    }

    #[test]
    fn test_text_only_element_is_scalar() {
        let element = Element::new("age").with_text("30");
        assert_eq!(convert_node(&element), "30");
    }

    #[test]
    fn test_empty_element_is_empty_object() {
        assert_eq!(convert_node(&Element::new("e")), Value::default());
    }

    #[test]
    fn test_attributes_become_keys() {
        let element = Element::new("e")
            .with_attribute("a", "1")
            .with_attribute("b", "2");
        assert_eq!(convert_node(&element).to_json(), r#"{"a":"1","b":"2"}"#);
    }

    #[test]
    fn test_single_child_is_not_wrapped() {
        let element = Element::new("r").with_child(Element::new("y").with_text("v"));
        assert_eq!(convert_node(&element).to_json(), r#"{"y":"v"}"#);
    }

    #[test]
    fn test_repeated_children_group_into_array() {
        let element = Element::new("r")
            .with_child(Element::new("x").with_text("1"))
            .with_child(Element::new("other"))
            .with_child(Element::new("x").with_text("2"))
            .with_child(Element::new("x").with_attribute("k", "3"));
        let value = convert_node(&element);
        let expected = Value::from(vec![
            Value::from("1"),
            Value::from("2"),
            convert_node(&Element::new("x").with_attribute("k", "3")),
        ]);
        assert_eq!(value.get("x"), Some(&expected));
        assert_eq!(value.get("other"), Some(&Value::default()));
    }

    #[test]
    fn test_last_text_segment_wins() {
        let element = Element::new("p")
            .with_text("first")
            .with_child(Element::new("br"))
            .with_text("second");
        assert_eq!(convert_node(&element).to_json(), r#"{"value":"second","br":{}}"#);
    }

    #[test]
    fn test_concat_text_mode() {
        let element = Element::new("p")
            .with_text("a")
            .with_child(Content::CData("b".to_string()))
            .with_text("c");
        assert_eq!(walk(&element, TextMode::Concat), "abc");
        assert_eq!(walk(&element, TextMode::Last), "c");
    }

    #[test]
    fn test_blank_text_and_comments_are_ignored() {
        let element = Element::new("r")
            .with_text("\n  ")
            .with_child(Content::Comment("note".to_string()))
            .with_child(Content::CData("\t".to_string()))
            .with_child(Content::ProcessingInstruction {
                target: "pi".to_string(),
                data: "x".to_string(),
            });
        assert_eq!(convert_node(&element), Value::default());
    }

    #[test]
    fn test_text_collides_with_value_attribute() {
        let element = Element::new("opt").with_attribute("value", "a").with_text("b");
        assert_eq!(convert_node(&element), strings(&["a", "b"]));
    }

    #[test]
    fn test_text_collides_with_value_element() {
        let element = Element::new("r")
            .with_child(Element::new("value").with_text("x"))
            .with_text("y")
            .with_text("z");
        assert_eq!(convert_node(&element), strings(&["x", "z"]));
    }

    #[test]
    fn test_deep_tree_does_not_recurse() {
        let mut element = Element::new("leaf").with_text("bottom");
        for _ in 0..2_000 {
            element = Element::new("n").with_child(element);
        }
        let mut value = &convert_node(&element);
        let mut depth = 0;
        while let Some(next) = value.get("n") {
            value = next;
            depth += 1;
        }
        assert_eq!(depth, 1_999);
        assert_eq!(value.get("leaf"), Some(&Value::from("bottom")));
    }

    #[test]
    fn test_is_blank() {
        assert!(is_blank(""));
        assert!(is_blank(" \t\r\n"));
        assert!(!is_blank(" x "));
    }
}
