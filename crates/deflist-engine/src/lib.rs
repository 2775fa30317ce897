pub mod editing;
pub mod error;
pub mod formatting;
pub mod parsing;

// Re-export key types for easier usage
pub use editing::{
    Applied, Decoration, DecorationSet, LiveEngine, RescanReason, Style, UpdateReport,
};
pub use error::EngineError;
pub use formatting::{
    FormatOutcome, FormatSummary, Fragment, NodeBuilder, format_tree, render_markdown,
};
pub use parsing::blocks::{Block, LineRole};
pub use parsing::oracle::{LineKind, LineTableOracle, Oracle, TreeSitterOracle};
pub use parsing::rope::{Span, TextLine};
