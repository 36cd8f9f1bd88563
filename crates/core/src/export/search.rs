use crate::error::Result;
use crate::model::IndexElement;
use crate::transform::IndexVisitor;
use std::io::Write;

/// Writes one `<full_name> => <full_link>` line per linkable element.
///
/// Neither field is escaped, so names containing ` => ` produce ambiguous
/// lines. Output is flushed in [`IndexVisitor::finish`].
pub struct SearchExporter<W: Write> {
    out: W,
    lines: usize,
}

impl<W: Write> SearchExporter<W> {
    pub fn new(out: W) -> Self {
        Self { out, lines: 0 }
    }

    pub fn lines(&self) -> usize {
        self.lines
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> IndexVisitor for SearchExporter<W> {
    fn on_item(&mut self, _element: &IndexElement, full_name: &str, full_link: &str) -> Result<()> {
        writeln!(self.out, "{} => {}", full_name, full_link)?;
        self.lines += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}
