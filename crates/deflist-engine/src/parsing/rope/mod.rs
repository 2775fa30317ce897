pub mod changes;
pub mod lines;
pub mod slice;
pub mod span;

pub use changes::{Change, changes_from_delta};
pub use lines::{TextLine, all_lines, line, line_at, line_count, lines_in};
pub use slice::{preview, slice_to_string};
pub use span::Span;
