/// Separator used by the cppreference index when none is configured.
pub const DEFAULT_SEPARATOR: &str = "::";

/// Enclosing names of the current traversal position.
///
/// The joined name is kept in one buffer, so `push`/`pop` cost the length of
/// the name rather than the depth of the stack.
#[derive(Debug, Clone)]
pub struct ScopeStack {
    separator: String,
    joined: String,
    marks: Vec<usize>,
}

impl ScopeStack {
    pub fn new(separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
            joined: String::new(),
            marks: Vec::new(),
        }
    }

    pub fn push(&mut self, name: &str) {
        self.marks.push(self.joined.len());
        if self.marks.len() > 1 {
            self.joined.push_str(&self.separator);
        }
        self.joined.push_str(name);
    }

    pub fn pop(&mut self) {
        if let Some(mark) = self.marks.pop() {
            self.joined.truncate(mark);
        }
    }

    /// All entries joined with the separator.
    pub fn full_name(&self) -> &str {
        &self.joined
    }
}
