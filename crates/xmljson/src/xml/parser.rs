//! XML parser implementation

use indexmap::IndexMap;

use crate::error::{Error, ErrorKind, Pos, Result, Span};
use crate::lexer::Cursor;
use crate::xml::model::{Content, Document, Element};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Configuration for the XML parser
///
/// Parsing and conversion keep open elements on the heap, so no limit is
/// needed for them to finish. The default depth limit bounds what callers
/// do next: derived trait impls (`Clone`, `PartialEq`, `Debug`) and serde
/// serialization of the result recurse once per level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Maximum element nesting depth (0 means unlimited)
    pub max_depth: u16,
    /// Maximum input size in bytes (0 means unlimited)
    pub max_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_depth: 1024,
            max_size: 10 * 1024 * 1024, // 10 MB default
        }
    }
}

impl Config {
    /// Create a new config with unlimited depth and size
    pub const fn unlimited() -> Self {
        Self {
            max_depth: 0,
            max_size: 0,
        }
    }

    /// Create a new config with specific limits
    pub const fn new(max_depth: u16, max_size: usize) -> Self {
        Self {
            max_depth,
            max_size,
        }
    }
}

/// XML parser
#[derive(Debug)]
pub struct Parser<'a> {
    cursor: Cursor<'a>,
    config: Config,
}

/// A start tag, either self-closing or waiting for its content
enum StartTag {
    Empty(Element),
    Open(Element),
}

impl<'a> Parser<'a> {
    /// Create a new XML parser with default configuration
    pub fn new(input: &'a [u8]) -> Self {
        Self::with_config(input, Config::default())
    }

    /// Create a new XML parser with custom configuration
    pub const fn with_config(input: &'a [u8], config: Config) -> Self {
        Self {
            cursor: Cursor::new(input),
            config,
        }
    }

    /// Parse an XML document
    pub fn parse(&mut self) -> Result<Document> {
        let size = self.cursor.remaining().len();
        if self.config.max_size > 0 && size > self.config.max_size {
            return Err(Error::at(
                ErrorKind::MaxSizeExceeded {
                    max: self.config.max_size,
                },
                0,
                1,
                1,
            ));
        }

        if let Err(err) = std::str::from_utf8(self.cursor.remaining()) {
            let mut at = self.cursor.clone();
            at.advance_by(err.valid_up_to());
            return Err(Error::new(ErrorKind::InvalidUtf8, Span::at(at.position())));
        }

        if self.cursor.starts_with(UTF8_BOM) {
            self.cursor.advance_by(UTF8_BOM.len());
        }

        self.skip_misc(true)?;
        if self.cursor.is_eof() {
            return Err(self.error_kind_here(ErrorKind::UnexpectedEof, "missing root element"));
        }

        let root = self.parse_element()?;
        self.skip_misc(false)?;

        if !self.cursor.is_eof() {
            return Err(self.error_here("unexpected content after root element"));
        }

        Ok(Document { root })
    }

    /// Skip comments, processing instructions and (in the prolog) the doctype
    fn skip_misc(&mut self, in_prolog: bool) -> Result<()> {
        loop {
            self.cursor.skip_whitespace();
            if self.cursor.starts_with(b"<?") {
                self.parse_processing_instruction()?;
            } else if self.cursor.starts_with(b"<!--") {
                self.parse_comment()?;
            } else if in_prolog && self.cursor.starts_with(b"<!DOCTYPE") {
                self.skip_doctype()?;
            } else {
                return Ok(());
            }
        }
    }

    /// Parse an element and all of its content
    ///
    /// Elements whose closing tag is still ahead are kept on `open`, so
    /// nesting depth costs heap, not call stack.
    fn parse_element(&mut self) -> Result<Element> {
        let mut open = match self.parse_start_tag(1)? {
            StartTag::Empty(element) => return Ok(element),
            StartTag::Open(element) => vec![element],
        };

        while let Some(parent) = open.last_mut() {
            match self.cursor.current() {
                None => {
                    return Err(self.error_kind_here(
                        ErrorKind::UnexpectedEof,
                        format!("unterminated element <{}>", parent.name),
                    ));
                }
                Some(b'<') => {
                    if self.cursor.starts_with(b"</") {
                        self.parse_closing_tag(&parent.name)?;
                        let Some(done) = open.pop() else { break };
                        match open.last_mut() {
                            Some(grandparent) => grandparent.children.push(done.into()),
                            None => return Ok(done),
                        }
                    } else if self.cursor.starts_with(b"<!--") {
                        parent.children.push(Content::Comment(self.parse_comment()?));
                    } else if self.cursor.starts_with(b"<![CDATA[") {
                        parent.children.push(Content::CData(self.parse_cdata()?));
                    } else if self.cursor.starts_with(b"<?") {
                        let (target, data) = self.parse_processing_instruction()?;
                        parent
                            .children
                            .push(Content::ProcessingInstruction { target, data });
                    } else if self.cursor.starts_with(b"<!") {
                        return Err(self.error_here("unexpected markup declaration in content"));
                    } else {
                        let depth = open.len() + 1;
                        match self.parse_start_tag(depth)? {
                            StartTag::Empty(element) => {
                                if let Some(parent) = open.last_mut() {
                                    parent.children.push(element.into());
                                }
                            }
                            StartTag::Open(element) => open.push(element),
                        }
                    }
                }
                Some(_) => parent.children.push(Content::Text(self.parse_text()?)),
            }
        }

        Err(self.error_here("unbalanced element tags"))
    }

    /// Parse `<name attr="...">` or `<name/>` for an element at `depth`
    fn parse_start_tag(&mut self, depth: usize) -> Result<StartTag> {
        self.check_depth(depth)?;
        self.expect_byte(b'<')?;

        let name = self.parse_name()?;
        let attributes = self.parse_attributes()?;
        let element = Element {
            name,
            attributes,
            children: Vec::new(),
        };

        if self.cursor.consume(b'/') {
            self.expect_byte(b'>')?;
            return Ok(StartTag::Empty(element));
        }
        self.expect_byte(b'>')?;
        Ok(StartTag::Open(element))
    }

    fn parse_closing_tag(&mut self, name: &str) -> Result<()> {
        let start = self.cursor.position();
        self.cursor.advance_by(2);
        let close_name = self.parse_name()?;
        if close_name != name {
            return Err(Error::new(
                ErrorKind::MismatchedTag {
                    expected: name.to_string(),
                    found: close_name,
                },
                Span::new(start, self.cursor.position()),
            ));
        }
        self.cursor.skip_whitespace();
        self.expect_byte(b'>')
    }

    fn parse_attributes(&mut self) -> Result<IndexMap<String, String>> {
        let mut attrs = IndexMap::new();

        loop {
            self.cursor.skip_whitespace();
            match self.cursor.current() {
                Some(b'/') | Some(b'>') => break,
                Some(_) => {}
                None => {
                    return Err(self.error_kind_here(ErrorKind::UnexpectedEof, "unterminated tag"));
                }
            }

            let start = self.cursor.position();
            let name = self.parse_name()?;
            self.cursor.skip_whitespace();
            self.expect_byte(b'=')?;
            self.cursor.skip_whitespace();
            let value = self.parse_attribute_value()?;

            if attrs.contains_key(&name) {
                return Err(Error::new(
                    ErrorKind::DuplicateAttribute { name },
                    Span::new(start, self.cursor.position()),
                ));
            }
            attrs.insert(name, value);
        }

        Ok(attrs)
    }

    fn parse_attribute_value(&mut self) -> Result<String> {
        let quote = match self.cursor.current() {
            Some(b'"') => b'"',
            Some(b'\'') => b'\'',
            _ => return Err(self.error_here("expected quoted attribute value")),
        };
        self.cursor.advance();

        let start_pos = self.cursor.position();
        let start = self.cursor.pos();
        while let Some(b) = self.cursor.current() {
            if b == quote {
                let raw = self.cursor.slice_from(start);
                self.cursor.advance();
                let text = bytes_to_string(raw, start_pos)?;
                return decode_entities(&normalize_attribute(&text), start_pos);
            }
            if b == b'<' {
                return Err(self.error_here("'<' not allowed in attribute value"));
            }
            self.cursor.advance();
        }

        Err(self.error_kind_here(ErrorKind::UnexpectedEof, "unterminated attribute value"))
    }

    fn parse_text(&mut self) -> Result<String> {
        let start_pos = self.cursor.position();
        let start = self.cursor.pos();
        while let Some(b) = self.cursor.current() {
            if b == b'<' {
                break;
            }
            self.cursor.advance();
        }

        let raw = self.cursor.slice_from(start);
        let text = bytes_to_string(raw, start_pos)?;
        decode_entities(&normalize_newlines(&text), start_pos)
    }

    fn parse_comment(&mut self) -> Result<String> {
        let start = self.cursor.position();
        self.cursor.advance_by(4);
        let body = self.take_until(b"-->", "comment")?;
        bytes_to_string(body, start)
    }

    fn parse_cdata(&mut self) -> Result<String> {
        let start = self.cursor.position();
        self.cursor.advance_by(9);
        let body = self.take_until(b"]]>", "CDATA section")?;
        bytes_to_string(body, start).map(|text| normalize_newlines(&text))
    }

    fn parse_processing_instruction(&mut self) -> Result<(String, String)> {
        let start = self.cursor.position();
        self.cursor.advance_by(2);
        let target = self.parse_name()?;
        let body = self.take_until(b"?>", "processing instruction")?;
        let data = bytes_to_string(body, start)?;
        Ok((target, data.trim_start().to_string()))
    }

    fn skip_doctype(&mut self) -> Result<()> {
        let mut brackets = 0usize;
        let mut quote: Option<u8> = None;
        while let Some(b) = self.cursor.current() {
            self.cursor.advance();
            match (quote, b) {
                (Some(q), _) if b == q => quote = None,
                (Some(_), _) => {}
                (None, b'"' | b'\'') => quote = Some(b),
                (None, b'[') => brackets += 1,
                (None, b']') => brackets = brackets.saturating_sub(1),
                (None, b'>') if brackets == 0 => return Ok(()),
                _ => {}
            }
        }
        Err(self.error_kind_here(ErrorKind::UnexpectedEof, "unterminated doctype"))
    }

    /// Consume input up to `pattern`, returning what came before it
    fn take_until(&mut self, pattern: &[u8], what: &str) -> Result<&'a [u8]> {
        let start = self.cursor.pos();
        while !self.cursor.is_eof() {
            if self.cursor.starts_with(pattern) {
                let body = self.cursor.slice_from(start);
                self.cursor.advance_by(pattern.len());
                return Ok(body);
            }
            self.cursor.advance();
        }
        Err(self.error_kind_here(ErrorKind::UnexpectedEof, format!("unterminated {what}")))
    }

    fn parse_name(&mut self) -> Result<String> {
        let start_pos = self.cursor.position();
        let start = self.cursor.pos();

        let Some(first) = self.cursor.current() else {
            return Err(self.error_kind_here(ErrorKind::UnexpectedEof, "expected name"));
        };
        if !is_name_start(first) {
            return Err(Error::with_message(
                ErrorKind::InvalidToken,
                Span::at(start_pos),
                "expected name",
            ));
        }

        self.cursor.advance();
        while let Some(b) = self.cursor.current() {
            if is_name_char(b) {
                self.cursor.advance();
            } else {
                break;
            }
        }

        let raw = self.cursor.slice_from(start);
        bytes_to_string(raw, start_pos)
    }

    fn check_depth(&self, depth: usize) -> Result<()> {
        let max = self.config.max_depth;
        if max > 0 && depth > usize::from(max) {
            return Err(self.error_kind_here(
                ErrorKind::MaxDepthExceeded { max },
                format!("element nesting exceeds {max} levels"),
            ));
        }
        Ok(())
    }

    fn expect_byte(&mut self, expected: u8) -> Result<()> {
        if self.cursor.consume(expected) {
            Ok(())
        } else if self.cursor.is_eof() {
            Err(self.error_kind_here(
                ErrorKind::UnexpectedEof,
                format!("expected '{}'", char::from(expected)),
            ))
        } else {
            Err(self.error_here(&format!("expected '{}'", char::from(expected))))
        }
    }

    fn error_here(&self, message: &str) -> Error {
        self.error_kind_here(ErrorKind::InvalidToken, message)
    }

    fn error_kind_here(&self, kind: ErrorKind, message: impl Into<String>) -> Error {
        Error::with_message(kind, Span::at(self.cursor.position()), message)
    }
}

fn bytes_to_string(bytes: &[u8], pos: Pos) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|_| Error::new(ErrorKind::InvalidUtf8, Span::at(pos)))
}

fn is_name_start(b: u8) -> bool {
    matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'_' | b':') || b >= 0x80
}

fn is_name_char(b: u8) -> bool {
    is_name_start(b) || matches!(b, b'0'..=b'9' | b'-' | b'.')
}

/// Line-end handling: `\r\n` and lone `\r` become `\n`
fn normalize_newlines(input: &str) -> String {
    if input.contains('\r') {
        input.replace("\r\n", "\n").replace('\r', "\n")
    } else {
        input.to_string()
    }
}

/// Attribute-value normalization for literal whitespace characters
fn normalize_attribute(input: &str) -> String {
    normalize_newlines(input).replace(['\n', '\t'], " ")
}

fn decode_entities(input: &str, pos: Pos) -> Result<String> {
    if !input.contains('&') {
        return Ok(input.to_string());
    }

    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(ch) = chars.next() {
        if ch != '&' {
            result.push(ch);
            continue;
        }

        let mut entity = String::new();
        let mut terminated = false;
        for next in chars.by_ref() {
            if next == ';' {
                terminated = true;
                break;
            }
            entity.push(next);
        }

        let decoded = if terminated {
            match entity.as_str() {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => decode_numeric_entity(&entity),
            }
        } else {
            None
        };

        match decoded {
            Some(ch) => result.push(ch),
            None => {
                return Err(Error::new(ErrorKind::InvalidEntity { entity }, Span::at(pos)));
            }
        }
    }

    Ok(result)
}

fn decode_numeric_entity(entity: &str) -> Option<char> {
    if let Some(hex) = entity.strip_prefix("#x") {
        u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
    } else if let Some(dec) = entity.strip_prefix('#') {
        dec.parse::<u32>().ok().and_then(char::from_u32)
    } else {
        None
    }
}
