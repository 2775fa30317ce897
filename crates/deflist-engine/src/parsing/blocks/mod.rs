//! # Block Parsing
//!
//! Two-phase classification of the scanned lines.
//!
//! ## Phases
//!
//! 1. **Boundary scan** (`scanner`): a `BlockScanner` consumes lines with their
//!    oracle kind and cuts them into `Block`s, tracking marker and list lines
//!
//! 2. **Line roles** (`classify`): inside definition-list blocks each line is a
//!    term, definition text or definition list item
//!
//! ## Key Invariants
//!
//! - Blocks partition the scanned lines, ordered by strictly increasing `first_line`
//! - A special region only ends at a `BlockEnd` line (or when prose resumes
//!   after a region that never reported an end)
//! - Special blocks are never definition lists, whatever their text

pub mod classify;
pub mod scanner;
pub mod types;

pub use classify::{LineRole, TERM_MAX_CHARS, classify_line, role_of};
pub use scanner::{BlockScanner, ScannedLine, scan_lines};
pub use types::{Block, block_index_for_line, check_partition};
