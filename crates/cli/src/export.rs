use docindex_core::{AutoParser, IndexTransform, Result, SearchExporter, TransformOptions};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::{info, warn};

/// Writes the search table for `index` to `destination`.
///
/// The index is parsed before `destination` is created, so a bad index
/// leaves no output file behind. A failed write leaves a truncated one.
pub fn run(index: &Path, destination: &Path) -> Result<()> {
    let transform = IndexTransform::new(AutoParser::new(), TransformOptions::default());

    info!("Loading index {}...", index.display());
    let tree = transform.load(index)?;
    if tree.is_empty() {
        warn!("Index {} has no entries", index.display());
    }

    let out = BufWriter::new(File::create(destination)?);
    let mut exporter = SearchExporter::new(out);
    let stats = transform.run(&tree, &mut exporter)?;

    info!(
        "Wrote {} entries to {}",
        exporter.lines(),
        destination.display()
    );
    if stats.expanded > 0 {
        info!("{} entries came from base classes and typedef aliases", stats.expanded);
    }
    Ok(())
}
