use thiserror::Error;

/// Failures that abort a split.
///
/// End of input is never an error; the splitter turns it into a final flush.
/// Malformed SQL (unterminated quotes, comments or dollar bodies) is not an
/// error either, it is returned as-is in the last statement.
#[derive(Debug, Error)]
pub enum SplitError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid UTF-8 in input at byte offset {offset}")]
    InvalidUtf8 { offset: usize },
}
