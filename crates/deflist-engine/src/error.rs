use thiserror::Error;

/// Failures that can occur while setting up an engine or feeding it edits.
///
/// Classification itself never fails: oracle misses degrade to `Normal` and
/// inconsistent incremental state escalates to a full rescan.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Failed to load the Markdown grammar: {0}")]
    Language(#[from] tree_sitter::LanguageError),

    #[error("Document is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("Edit range {start}..{end} is outside the document (length {len})")]
    EditOutOfBounds { start: usize, end: usize, len: usize },

    #[error("Edit offset {offset} is not on a character boundary")]
    NotCharBoundary { offset: usize },

    #[error("Delta was built for a document of length {base_len}, current length is {len}")]
    StaleDelta { base_len: usize, len: usize },
}
