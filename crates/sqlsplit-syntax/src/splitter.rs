//! # Splitter - Assembling Statements
//!
//! The splitter turns a script into the ordered list of statements it
//! contains. It runs in one of two modes, chosen by the active delimiter:
//!
//! - **Standard** (`;`): tokens come from the [`Lexer`]. A `;` ends the
//!   statement only when no `BEGIN` block is open.
//! - **Raw scan** (anything else, after `DELIMITER //` and the like): the
//!   splitter reads characters straight from the stream until the buffer ends
//!   with the delimiter, or with a `DELIMITER` directive that switches it
//!   again.
//!
//! Both modes drive the same [`RuneStream`], borrowed from the lexer, so a
//! mode switch never loses or repeats input.
//!
//! ```
//! use sqlsplit_syntax::split;
//!
//! let statements = split("SELECT 1; SELECT 2;").unwrap();
//! assert_eq!(statements, vec!["SELECT 1;", " SELECT 2;"]);
//! ```

use std::io::{BufRead, BufReader, Read};

use crate::error::SplitError;
use crate::lexer::{Lexer, TokenKind, read_delimiter_directive};
use crate::stream::RuneStream;

/// The delimiter scripts start with; it selects the lexer-driven mode.
pub const DEFAULT_DELIMITER: &str = ";";

const DELIMITER_KEYWORD: &str = "DELIMITER";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitOptions {
    /// What to do with text collected before a `DELIMITER` directive in
    /// standard mode. When set, non-blank text is emitted as a statement;
    /// otherwise it is discarded.
    pub flush_before_directive: bool,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            flush_before_directive: true,
        }
    }
}

/// Result of one raw-scan pass.
#[derive(Debug, PartialEq, Eq)]
enum RawScan {
    /// The active delimiter was found; text before it, delimiter stripped.
    Statement(String),
    /// A `DELIMITER` directive; text before the keyword and the new delimiter.
    Directive { preceding: String, delimiter: String },
    /// Input ended; whatever was read since the last boundary.
    End(String),
}

/// Per-call splitting state. Nothing survives past [`Splitter::split`].
pub struct Splitter<R> {
    lexer: Lexer<R>,
    options: SplitOptions,
    delimiter: String,
    depth: usize,
    buffer: String,
    statements: Vec<String>,
}

impl<R: BufRead> Splitter<R> {
    pub fn new(stream: RuneStream<R>) -> Self {
        Self::with_options(stream, SplitOptions::default())
    }

    pub fn with_options(stream: RuneStream<R>, options: SplitOptions) -> Self {
        Self {
            lexer: Lexer::new(stream),
            options,
            delimiter: DEFAULT_DELIMITER.to_string(),
            depth: 0,
            buffer: String::new(),
            statements: Vec::new(),
        }
    }

    /// Consume the whole input and return its statements in source order.
    pub fn split(mut self) -> Result<Vec<String>, SplitError> {
        loop {
            let more = if self.delimiter == DEFAULT_DELIMITER {
                self.standard_step()?
            } else {
                self.raw_step()?
            };
            if !more {
                break;
            }
        }

        if !self.buffer.is_empty() {
            self.emit();
        }
        Ok(self.statements)
    }

    /// Handle one lexer token. Returns `false` at end of input.
    fn standard_step(&mut self) -> Result<bool, SplitError> {
        let Some(token) = self.lexer.next_token()? else {
            return Ok(false);
        };

        match token.kind {
            TokenKind::Text => self.buffer.push_str(&token.value),
            TokenKind::BlockOpen => {
                self.buffer.push_str(&token.value);
                self.depth += 1;
            }
            TokenKind::BlockClose => {
                self.buffer.push_str(&token.value);
                // A stray END is just text.
                self.depth = self.depth.saturating_sub(1);
            }
            TokenKind::StatementEnd => {
                self.buffer.push_str(&token.value);
                if self.depth == 0 {
                    self.emit();
                }
            }
            TokenKind::DelimiterDirective => {
                if self.options.flush_before_directive {
                    self.emit_if_not_blank();
                }
                self.buffer.clear();
                self.set_delimiter(token.delimiter.unwrap_or_default());
            }
        }
        Ok(true)
    }

    /// Handle one raw-scan pass. Returns `false` at end of input.
    fn raw_step(&mut self) -> Result<bool, SplitError> {
        match scan_raw(self.lexer.stream_mut(), &self.delimiter)? {
            RawScan::Statement(text) => {
                self.buffer = text;
                self.emit_if_not_blank();
                Ok(true)
            }
            RawScan::Directive {
                preceding,
                delimiter,
            } => {
                self.buffer = preceding;
                self.emit_if_not_blank();
                self.set_delimiter(delimiter);
                Ok(true)
            }
            RawScan::End(rest) => {
                self.buffer = rest;
                Ok(false)
            }
        }
    }

    fn set_delimiter(&mut self, delimiter: String) {
        if delimiter.is_empty() {
            log::warn!(
                "DELIMITER directive without a delimiter near character {}, keeping {:?}",
                self.lexer.stream_mut().position(),
                self.delimiter
            );
            return;
        }
        log::debug!(
            "statement delimiter changed from {:?} to {:?}",
            self.delimiter,
            delimiter
        );
        self.delimiter = delimiter;
    }

    fn emit(&mut self) {
        self.statements.push(std::mem::take(&mut self.buffer));
    }

    fn emit_if_not_blank(&mut self) {
        if self.buffer.trim().is_empty() {
            self.buffer.clear();
        } else {
            self.emit();
        }
    }
}

/// Read characters until the active delimiter, a `DELIMITER` directive or
/// end of input.
///
/// A `DELIMITER` only counts when it starts the buffer or follows `;` or
/// whitespace, and is itself followed by `;` or whitespace. Otherwise it is
/// part of an identifier such as `CALLDELIMITER` or `DELIMITER33`.
fn scan_raw<R: BufRead>(
    stream: &mut RuneStream<R>,
    delimiter: &str,
) -> Result<RawScan, SplitError> {
    let mut buf = String::new();

    while let Some(c) = stream.next()? {
        buf.push(c);

        // Both strings are valid UTF-8, so a suffix match is char-aligned.
        if buf.ends_with(delimiter) {
            buf.truncate(buf.len() - delimiter.len());
            return Ok(RawScan::Statement(buf));
        }

        let Some(start) = directive_start(&buf) else {
            continue;
        };
        match stream.next()? {
            None => {
                buf.truncate(start);
                return Ok(RawScan::End(buf));
            }
            Some(';') => {
                buf.truncate(start);
                return Ok(RawScan::Directive {
                    preceding: buf,
                    delimiter: DEFAULT_DELIMITER.to_string(),
                });
            }
            Some(next) if next.is_whitespace() => {
                let keyword = buf.split_off(start);
                let token = read_delimiter_directive(stream, &keyword, Some(next))?;
                return Ok(RawScan::Directive {
                    preceding: buf,
                    delimiter: token.delimiter.unwrap_or_default(),
                });
            }
            Some(next) => stream.unread(next),
        }
    }

    Ok(RawScan::End(buf))
}

/// Byte offset of a trailing `DELIMITER` keyword that sits on a token
/// boundary, if the buffer ends with one.
fn directive_start(buf: &str) -> Option<usize> {
    let start = buf.len().checked_sub(DELIMITER_KEYWORD.len())?;
    if !buf.is_char_boundary(start) || !buf[start..].eq_ignore_ascii_case(DELIMITER_KEYWORD) {
        return None;
    }
    match buf[..start].chars().next_back() {
        None => Some(start),
        Some(c) if c == ';' || c.is_whitespace() => Some(start),
        Some(_) => None,
    }
}

/// Split an in-memory script with default options.
pub fn split(input: &str) -> Result<Vec<String>, SplitError> {
    split_with_options(input, SplitOptions::default())
}

pub fn split_with_options(input: &str, options: SplitOptions) -> Result<Vec<String>, SplitError> {
    Splitter::with_options(RuneStream::from_text(input), options).split()
}

/// Split a script read from any source, decoding it as UTF-8.
pub fn split_reader<R: Read>(reader: R) -> Result<Vec<String>, SplitError> {
    Splitter::new(RuneStream::new(BufReader::new(reader))).split()
}
