//! XML node model, node contract and parser

pub mod model;
pub mod node;
pub mod parser;

pub use model::{Content, Document, Element};
pub use node::{NodeKind, XmlNode};
pub use parser::{Config, Parser};
