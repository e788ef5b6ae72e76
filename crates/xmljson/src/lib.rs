//! xmljson - convert XML into plain JSON-shaped values
//!
//! Attributes and child elements become object keys, repeated child tags
//! become arrays, and elements holding nothing but text become bare strings.
//!
//! # Quick Start
//!
//! ```
//! use xmljson::convert;
//! # fn main() -> Result<(), xmljson::Error> {
//! let value = convert(r#"<person id="7"><name>Ada</name><tag>x</tag><tag>y</tag></person>"#)?;
//! assert_eq!(value.to_json(), r#"{"id":"7","name":"Ada","tag":["x","y"]}"#);
//!
//! assert_eq!(convert("<age>30</age>")?, "30");
//! assert_eq!(convert(r#"<p lang="en">hi</p>"#)?.to_json(), r#"{"lang":"en","value":"hi"}"#);
//! # Ok(())
//! # }
//! ```
//!
//! Already-parsed trees convert without re-parsing; any DOM can take part by
//! implementing [`XmlNode`].

#![forbid(unsafe_code)]

pub mod error;
pub use error::{Error, ErrorKind, Pos, Result, Span};

pub mod lexer;

pub mod value;
pub use value::{Array, Object, Value};

pub mod xml;
pub use xml::{
    Config, Content as XmlContent, Document as XmlDocument, Element as XmlElement, NodeKind,
    Parser as XmlParser, XmlNode,
};

pub mod source;
pub use source::{get_root, Root, Source};

pub mod convert;
pub use convert::{
    convert, convert_node, convert_with_options, to_json, to_json_pretty, ConvertOptions,
    TextMode, TEXT_KEY,
};

/// Parse XML from string
pub fn from_xml_str(s: &str) -> Result<XmlDocument> {
    let mut parser = XmlParser::new(s.as_bytes());
    parser.parse()
}

/// Parse XML from bytes
pub fn from_xml_bytes(bytes: &[u8]) -> Result<XmlDocument> {
    let mut parser = XmlParser::new(bytes);
    parser.parse()
}

/// Parse XML with custom limits
pub fn from_xml_str_with_config(s: &str, config: Config) -> Result<XmlDocument> {
    let mut parser = XmlParser::with_config(s.as_bytes(), config);
    parser.parse()
}
