//! The definition marker: a colon followed by three spaces at column 0.

/// Marker literal that opens a definition-text line.
pub const MARKER: &str = ":   ";

/// Length of [`MARKER`] in bytes (and characters).
pub const MARKER_LEN: usize = MARKER.len();

/// True when `text` starts with the marker at column 0.
pub fn is_marker_line(text: &str) -> bool {
    text.starts_with(MARKER)
}

/// Returns the definition content after the marker, if the line carries one.
pub fn strip_marker(text: &str) -> Option<&str> {
    text.strip_prefix(MARKER)
}

/// True when `offset` falls inside the marker zone of a line starting at `line_from`.
pub fn in_marker_zone(line_from: usize, offset: usize) -> bool {
    offset < line_from + MARKER_LEN
}
