use super::{IndexParser, RawElement, normalize, read_file};
use crate::error::{IndexError, Result};
use crate::model::{DEFAULT_SEPARATOR, IndexTree};
use std::path::Path;
use tracing::info;

/// Parser for indexes serialized as JSON, one object per node:
///
/// ```json
/// {"kind": "index", "children": [
///   {"kind": "namespace", "name": "std", "children": [
///     {"kind": "class", "name": "vector", "link": "vector.html"}
///   ]}
/// ]}
/// ```
#[derive(Debug, Clone)]
pub struct JsonIndexParser {
    separator: String,
}

impl Default for JsonIndexParser {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonIndexParser {
    pub fn new() -> Self {
        Self::with_separator(DEFAULT_SEPARATOR)
    }

    pub fn with_separator(separator: &str) -> Self {
        Self {
            separator: separator.to_string(),
        }
    }

    pub fn parse_str(&self, source: &str, origin: &Path) -> Result<IndexTree> {
        let root: RawElement =
            serde_json::from_str(source).map_err(|e| IndexError::load(origin, e))?;
        normalize(root, &self.separator)
    }
}

impl IndexParser for JsonIndexParser {
    fn parse(&self, path: &Path) -> Result<IndexTree> {
        let source = read_file(path)?;
        let tree = self.parse_str(&source, path)?;
        info!(
            "Loaded JSON index {} ({} elements)",
            path.display(),
            tree.element_count()
        );
        Ok(tree)
    }
}
