use super::{IndexParser, RawElement, normalize, read_file};
use crate::error::{IndexError, Result};
use crate::model::{DEFAULT_SEPARATOR, IndexTree};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::path::Path;
use tracing::info;

/// Parser for cppreference index files:
///
/// ```xml
/// <index>
///   <class name="std::vector" link="cpp/container/vector">
///     <constructor/>
///     <function name="push_back"/>
///     <inherits name="std::_Vector_base"/>
///   </class>
///   <typedef name="std::string" link="cpp/string/basic_string" alias="std::basic_string"/>
/// </index>
/// ```
#[derive(Debug, Clone)]
pub struct XmlIndexParser {
    separator: String,
}

impl Default for XmlIndexParser {
    fn default() -> Self {
        Self::new()
    }
}

impl XmlIndexParser {
    pub fn new() -> Self {
        Self::with_separator(DEFAULT_SEPARATOR)
    }

    pub fn with_separator(separator: &str) -> Self {
        Self {
            separator: separator.to_string(),
        }
    }

    /// Parses an in-memory document. Syntax errors are reported against `origin`.
    pub fn parse_str(&self, source: &str, origin: &Path) -> Result<IndexTree> {
        let root = read_document(source).map_err(|reason| IndexError::load(origin, reason))?;
        normalize(root, &self.separator)
    }
}

impl IndexParser for XmlIndexParser {
    fn parse(&self, path: &Path) -> Result<IndexTree> {
        let source = read_file(path)?;
        let tree = self.parse_str(&source, path)?;
        info!(
            "Loaded XML index {} ({} elements)",
            path.display(),
            tree.element_count()
        );
        Ok(tree)
    }
}

fn read_document(source: &str) -> std::result::Result<RawElement, String> {
    let mut reader = Reader::from_str(source);
    reader.config_mut().trim_text(true);

    // Open elements, innermost last.
    let mut open: Vec<RawElement> = Vec::new();
    let mut root = None;

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => return Err(format!("at byte {}: {e}", reader.buffer_position())),
        };
        match event {
            Event::Start(start) => open.push(raw_element(&start)?),
            Event::Empty(start) => {
                let element = raw_element(&start)?;
                attach(&mut open, &mut root, element)?;
            }
            Event::End(_) => {
                let element = open
                    .pop()
                    .ok_or_else(|| "unexpected closing tag".to_string())?;
                attach(&mut open, &mut root, element)?;
            }
            Event::Eof => break,
            // Text, comments, declarations and processing instructions carry
            // nothing the index needs.
            _ => {}
        }
    }

    if let Some(unclosed) = open.last() {
        return Err(format!("unexpected end of document inside <{}>", unclosed.kind));
    }
    root.ok_or_else(|| "document has no root element".to_string())
}

fn raw_element(start: &BytesStart<'_>) -> std::result::Result<RawElement, String> {
    let mut raw = RawElement {
        kind: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
        name: None,
        link: None,
        alias: None,
        children: Vec::new(),
    };
    for attr in start.attributes() {
        let attr = attr.map_err(|e| e.to_string())?;
        let value = attr.unescape_value().map_err(|e| e.to_string())?.into_owned();
        match attr.key.as_ref() {
            b"name" => raw.name = Some(value),
            b"link" => raw.link = Some(value),
            b"alias" => raw.alias = Some(value),
            _ => {}
        }
    }
    Ok(raw)
}

fn attach(
    open: &mut [RawElement],
    root: &mut Option<RawElement>,
    element: RawElement,
) -> std::result::Result<(), String> {
    match open.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_some() => return Err("multiple root elements".to_string()),
        None => *root = Some(element),
    }
    Ok(())
}
