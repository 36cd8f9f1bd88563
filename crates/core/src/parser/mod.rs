//! The index parser collaborators.
//!
//! Both on-disk formats are first read into [`RawElement`]s and then go
//! through the same [`normalize`] step, which fills in defaulted names and
//! links and rejects trees that break the [`IndexElement`] invariants.

pub mod json;
pub mod xml;

pub use json::JsonIndexParser;
pub use xml::XmlIndexParser;

use crate::error::{IndexError, Result};
use crate::model::{DEFAULT_SEPARATOR, ElementKind, IndexElement, IndexTree};
use serde::Deserialize;
use std::path::Path;

/// Tag of the anonymous container at the top of every index.
pub const ROOT_TAG: &str = "index";

/// Loads an index file into an [`IndexTree`].
///
/// Unreadable or syntactically invalid files fail with [`IndexError::Load`];
/// trees that decode but violate the model fail with [`IndexError::Malformed`].
pub trait IndexParser {
    fn parse(&self, path: &Path) -> Result<IndexTree>;
}

/// Picks the parser from the file extension: `.json` is read as JSON,
/// everything else as cppreference XML.
#[derive(Debug, Clone)]
pub struct AutoParser {
    xml: XmlIndexParser,
    json: JsonIndexParser,
}

impl Default for AutoParser {
    fn default() -> Self {
        Self::new()
    }
}

impl AutoParser {
    pub fn new() -> Self {
        Self::with_separator(DEFAULT_SEPARATOR)
    }

    pub fn with_separator(separator: &str) -> Self {
        Self {
            xml: XmlIndexParser::with_separator(separator),
            json: JsonIndexParser::with_separator(separator),
        }
    }
}

impl IndexParser for AutoParser {
    fn parse(&self, path: &Path) -> Result<IndexTree> {
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            self.json.parse(path)
        } else {
            self.xml.parse(path)
        }
    }
}

/// An index node as it appears on disk, before defaults and validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawElement {
    pub kind: String,
    pub name: Option<String>,
    pub link: Option<String>,
    pub alias: Option<String>,
    #[serde(default)]
    pub children: Vec<RawElement>,
}

impl Drop for RawElement {
    // Flattens the subtree so deep documents do not exhaust the stack.
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut raw) = pending.pop() {
            pending.append(&mut raw.children);
        }
    }
}

pub(crate) fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| IndexError::load(path, e))
}

/// Turns a raw `index` root into a validated tree.
///
/// `separator` is used to derive constructor and destructor names from the
/// last segment of the enclosing element's name. Works over an explicit
/// stack of open elements, so nesting depth is bounded by memory only.
pub fn normalize(mut root: RawElement, separator: &str) -> Result<IndexTree> {
    if root.kind != ROOT_TAG {
        return Err(IndexError::Malformed(format!(
            "root element must be <{ROOT_TAG}>, found <{}>",
            root.kind
        )));
    }
    let normalizer = Normalizer { separator };
    let mut top_level = Vec::new();
    let mut pending_top = std::mem::take(&mut root.children).into_iter();
    let mut open: Vec<Frame> = Vec::new();

    loop {
        let (next, parent_name, in_linkable) = match open.last_mut() {
            Some(frame) => (
                frame.pending.next(),
                Some(frame.head.name.as_str()),
                frame.in_linkable,
            ),
            None => (pending_top.next(), None, false),
        };

        match next {
            Some(raw) => {
                let (head, children) = normalizer.head(raw, parent_name, in_linkable)?;
                let in_linkable = in_linkable || head.link.is_some();
                open.push(Frame {
                    head,
                    in_linkable,
                    pending: children.into_iter(),
                    built: Vec::new(),
                });
            }
            None => match open.pop() {
                Some(done) => {
                    let element = done.head.build(done.built);
                    match open.last_mut() {
                        Some(parent) => parent.built.push(element),
                        None => top_level.push(element),
                    }
                }
                None => return Ok(IndexTree::new(top_level)),
            },
        }
    }
}

/// A validated element whose children are still being normalized.
struct Head {
    kind: ElementKind,
    name: String,
    /// Present exactly for linkable kinds.
    link: Option<String>,
    alias: Option<String>,
}

impl Head {
    fn build(self, children: Vec<IndexElement>) -> IndexElement {
        let Head {
            kind,
            name,
            link,
            alias,
        } = self;
        match link {
            Some(link) => {
                let element = IndexElement::linkable(kind, name, link, children);
                match alias {
                    Some(alias) => element.with_alias(alias),
                    None => element,
                }
            }
            None if kind == ElementKind::Inherits => IndexElement::inherits(name),
            None => IndexElement::scope(name, children),
        }
    }
}

struct Frame {
    head: Head,
    /// Whether this element or one of its ancestors is linkable.
    in_linkable: bool,
    pending: std::vec::IntoIter<RawElement>,
    built: Vec<IndexElement>,
}

struct Normalizer<'s> {
    separator: &'s str,
}

impl Normalizer<'_> {
    /// Validates `raw` and splits off its children for later processing.
    fn head(
        &self,
        mut raw: RawElement,
        parent_name: Option<&str>,
        in_linkable: bool,
    ) -> Result<(Head, Vec<RawElement>)> {
        let kind = ElementKind::from_tag(&raw.kind)
            .ok_or_else(|| IndexError::Malformed(format!("unknown element <{}>", raw.kind)))?;
        let name = self.local_name(kind, raw.name.take(), parent_name)?;
        let children = std::mem::take(&mut raw.children);

        let link = match kind {
            ElementKind::Namespace => {
                reject_link(kind, &name, raw.link.as_deref())?;
                None
            }
            ElementKind::Inherits => {
                reject_link(kind, &name, raw.link.as_deref())?;
                if !children.is_empty() {
                    return Err(IndexError::Malformed(format!(
                        "<inherits name=\"{name}\"> cannot have children"
                    )));
                }
                None
            }
            _ => {
                let link = raw.link.take().unwrap_or_else(|| name.clone());
                if link.is_empty() {
                    return Err(IndexError::Malformed(format!(
                        "<{kind} name=\"{name}\"> has an empty link"
                    )));
                }
                if link == "." && !in_linkable {
                    return Err(IndexError::Malformed(format!(
                        "<{kind} name=\"{name}\"> links to \".\" outside of any linkable element"
                    )));
                }
                Some(link)
            }
        };
        let alias = raw.alias.take().filter(|_| kind == ElementKind::Typedef);

        Ok((
            Head {
                kind,
                name,
                link,
                alias,
            },
            children,
        ))
    }

    fn local_name(
        &self,
        kind: ElementKind,
        name: Option<String>,
        parent_name: Option<&str>,
    ) -> Result<String> {
        if let Some(name) = name.filter(|n| !n.is_empty()) {
            return Ok(name);
        }
        if !kind.is_special_member() {
            return Err(IndexError::Malformed(format!("<{kind}> element without a name")));
        }
        let parent = parent_name.ok_or_else(|| {
            IndexError::Malformed(format!("<{kind}> without a name outside of a class"))
        })?;
        let base = parent.rsplit(self.separator).next().unwrap_or(parent);
        Ok(match kind {
            ElementKind::Destructor => format!("~{base}"),
            _ => base.to_string(),
        })
    }
}

fn reject_link(kind: ElementKind, name: &str, link: Option<&str>) -> Result<()> {
    match link {
        Some(link) => Err(IndexError::Malformed(format!(
            "<{kind} name=\"{name}\"> cannot have a link (found \"{link}\")"
        ))),
        None => Ok(()),
    }
}
