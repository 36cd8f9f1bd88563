pub mod element;
pub mod scope;

pub use element::{ElementKind, IndexElement, IndexTree};
pub use scope::{DEFAULT_SEPARATOR, ScopeStack};
