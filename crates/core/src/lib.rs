//! Flattens a hierarchical documentation index into a `name => link`
//! lookup table.
//!
//! The [`transform::IndexTransform`] walks an [`model::IndexTree`] produced by
//! an [`parser::IndexParser`], and hands every linkable element to an
//! [`transform::IndexVisitor`] together with its fully-qualified name and
//! resolved link. [`export::SearchExporter`] is the visitor that writes the
//! search table.

pub mod error;
pub mod export;
pub mod logging;
pub mod model;
pub mod parser;
pub mod transform;

pub use error::{IndexError, Result};
pub use export::SearchExporter;
pub use model::{ElementKind, IndexElement, IndexTree, ScopeStack};
pub use parser::{AutoParser, IndexParser, JsonIndexParser, XmlIndexParser};
pub use transform::{IndexTransform, IndexVisitor, TransformOptions, TransformStats};
