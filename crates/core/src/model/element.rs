use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of an index entry, named after the tags of the index format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Namespace,
    Class,
    Enum,
    Function,
    Const,
    Variable,
    Typedef,
    Specialization,
    Overload,
    Constructor,
    Destructor,
    Inherits,
}

impl ElementKind {
    pub fn from_tag(tag: &str) -> Option<Self> {
        let kind = match tag {
            "namespace" => ElementKind::Namespace,
            "class" => ElementKind::Class,
            "enum" => ElementKind::Enum,
            "function" => ElementKind::Function,
            "const" => ElementKind::Const,
            "variable" => ElementKind::Variable,
            "typedef" => ElementKind::Typedef,
            "specialization" => ElementKind::Specialization,
            "overload" => ElementKind::Overload,
            "constructor" => ElementKind::Constructor,
            "destructor" => ElementKind::Destructor,
            "inherits" => ElementKind::Inherits,
            _ => return None,
        };
        Some(kind)
    }

    pub fn as_tag(&self) -> &'static str {
        match self {
            ElementKind::Namespace => "namespace",
            ElementKind::Class => "class",
            ElementKind::Enum => "enum",
            ElementKind::Function => "function",
            ElementKind::Const => "const",
            ElementKind::Variable => "variable",
            ElementKind::Typedef => "typedef",
            ElementKind::Specialization => "specialization",
            ElementKind::Overload => "overload",
            ElementKind::Constructor => "constructor",
            ElementKind::Destructor => "destructor",
            ElementKind::Inherits => "inherits",
        }
    }

    /// Whether entries of this kind have a destination page. Namespaces are
    /// pure scopes and `inherits` only references another class.
    pub fn is_linkable(&self) -> bool {
        !matches!(self, ElementKind::Namespace | ElementKind::Inherits)
    }

    /// Members of these kinds are never pulled into a derived class or alias.
    pub fn is_special_member(&self) -> bool {
        matches!(self, ElementKind::Constructor | ElementKind::Destructor)
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// One node of a parsed index.
///
/// Built only through [`IndexElement::scope`], [`IndexElement::linkable`] and
/// [`IndexElement::inherits`], so `link` is present exactly when the kind is
/// linkable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexElement {
    kind: ElementKind,
    local_name: String,
    link: Option<String>,
    alias: Option<String>,
    children: Vec<IndexElement>,
}

impl IndexElement {
    pub fn scope(name: impl Into<String>, children: Vec<IndexElement>) -> Self {
        Self {
            kind: ElementKind::Namespace,
            local_name: name.into(),
            link: None,
            alias: None,
            children,
        }
    }

    /// # Panics
    /// If `kind` is not linkable.
    pub fn linkable(
        kind: ElementKind,
        name: impl Into<String>,
        link: impl Into<String>,
        children: Vec<IndexElement>,
    ) -> Self {
        assert!(kind.is_linkable(), "{kind} elements cannot carry a link");
        Self {
            kind,
            local_name: name.into(),
            link: Some(link.into()),
            alias: None,
            children,
        }
    }

    /// Reference to a base class by its fully-qualified name.
    pub fn inherits(base: impl Into<String>) -> Self {
        Self {
            kind: ElementKind::Inherits,
            local_name: base.into(),
            link: None,
            alias: None,
            children: Vec::new(),
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    /// Link relative to the enclosing linkable element; `"."` means the
    /// enclosing element's own page.
    pub fn link(&self) -> Option<&str> {
        self.link.as_deref()
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    pub fn children(&self) -> &[IndexElement] {
        &self.children
    }

    pub fn is_linkable(&self) -> bool {
        self.link.is_some()
    }

    /// Number of linkable elements in this subtree, including `self`.
    pub fn linkable_count(&self) -> usize {
        pre_order(std::slice::from_ref(self))
            .filter(|el| el.is_linkable())
            .count()
    }
}

impl Drop for IndexElement {
    // Flattens the subtree so deep indexes do not exhaust the stack.
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut el) = pending.pop() {
            pending.append(&mut el.children);
        }
    }
}

/// Pre-order iterator over a forest, driven by an explicit stack.
fn pre_order(roots: &[IndexElement]) -> impl Iterator<Item = &IndexElement> {
    let mut stack: Vec<&IndexElement> = roots.iter().rev().collect();
    std::iter::from_fn(move || {
        let el = stack.pop()?;
        stack.extend(el.children.iter().rev());
        Some(el)
    })
}

/// A parsed index: the anonymous root container and its top-level entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexTree {
    elements: Vec<IndexElement>,
}

impl IndexTree {
    pub fn new(elements: Vec<IndexElement>) -> Self {
        Self { elements }
    }

    pub fn elements(&self) -> &[IndexElement] {
        &self.elements
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn linkable_count(&self) -> usize {
        pre_order(&self.elements).filter(|el| el.is_linkable()).count()
    }

    /// Total number of elements, linkable or not.
    pub fn element_count(&self) -> usize {
        pre_order(&self.elements).count()
    }
}
