//! Source discovery, CSV parsing and per-source metadata.

mod discovery;
mod parser;
mod source;

pub use discovery::SourceDiscovery;
pub use parser::{ParsedSource, Parser, ParserConfig};
pub use source::{DataTable, SkippedRow, SourceMetadata};
