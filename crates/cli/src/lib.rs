mod export;

use clap::Parser;
use std::path::PathBuf;

pub use export::run as export;

#[derive(Parser)]
#[command(
    name = "index2search",
    version,
    about = "Flatten a documentation index into a search lookup table",
    long_about = "Reads a cppreference-style symbol index and writes one `<full name> => <link>` \
                  line per documented entry, in index order. Files ending in .json are read as \
                  JSON indexes, everything else as XML."
)]
pub struct Cli {
    /// Path to index file to process
    #[arg(value_name = "INDEX")]
    pub index: PathBuf,
    /// Path to destination file to store results to
    #[arg(value_name = "DESTINATION")]
    pub destination: PathBuf,
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let _guard = docindex_core::logging::init_logging("index2search");

    export::run(&cli.index, &cli.destination)?;
    Ok(())
}
