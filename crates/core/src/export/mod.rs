pub mod search;

pub use search::SearchExporter;
