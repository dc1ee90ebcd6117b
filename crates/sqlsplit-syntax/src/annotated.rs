//! Re-segmenting scripts that carry explicit block markers.
//!
//! Migration tools such as goose let a script wrap a statement in
//!
//! ```text
//! -- +goose StatementBegin
//! CREATE FUNCTION ... ;
//! -- +goose StatementEnd
//! ```
//!
//! so that nothing between the markers is split on `;`. This module works on
//! lines, independent of the lexer: marked spans become atomic blocks, and the
//! text between them becomes plain blocks.

use std::io::BufRead;

use crate::error::SplitError;

/// A span of script text, marker lines included for atomic blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedBlock {
    pub text: String,
    /// Delimited by explicit begin/end markers; must not be re-split.
    pub atomic: bool,
}

impl AnnotatedBlock {
    /// True when the block holds only blank lines and `--` comments.
    pub fn is_empty_or_comments(&self) -> bool {
        self.text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .all(|line| line.starts_with("--"))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotatedSplit {
    pub blocks: Vec<AnnotatedBlock>,
    /// Input ended inside a `StatementBegin` with no matching `StatementEnd`.
    pub unterminated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker {
    Begin,
    End,
}

/// Line-at-a-time block builder.
pub struct AnnotationSplitter<'p> {
    prefix: &'p str,
    buf: String,
    first_line: bool,
    in_block: bool,
    blocks: Vec<AnnotatedBlock>,
}

impl<'p> AnnotationSplitter<'p> {
    /// `prefix` is the tool name in `-- +<prefix> StatementBegin`; an empty
    /// prefix recognises only the short `-- +StatementBegin` form.
    pub fn new(prefix: &'p str) -> Self {
        Self {
            prefix,
            buf: String::new(),
            first_line: true,
            in_block: false,
            blocks: Vec::new(),
        }
    }

    /// Feed one line without its line terminator.
    pub fn push_line(&mut self, line: &str) {
        match marker(line, self.prefix) {
            Some(Marker::Begin) => {
                self.flush_plain();
                self.buf.push_str(line);
                self.first_line = false;
                self.in_block = true;
            }
            Some(Marker::End) => {
                if !self.first_line {
                    self.buf.push('\n');
                }
                self.buf.push_str(line);
                let text = std::mem::take(&mut self.buf);
                self.blocks.push(AnnotatedBlock { text, atomic: true });
                self.first_line = true;
                self.in_block = false;
            }
            None => {
                if self.first_line {
                    self.first_line = false;
                } else {
                    self.buf.push('\n');
                }
                self.buf.push_str(line);
            }
        }
    }

    pub fn finish(mut self) -> AnnotatedSplit {
        self.flush_plain();
        if self.in_block {
            log::warn!(
                "saw '-- +{} StatementBegin' with no matching StatementEnd",
                self.prefix
            );
        }
        AnnotatedSplit {
            blocks: self.blocks,
            unterminated: self.in_block,
        }
    }

    /// Emit the current segment unless it is blank; always clears it.
    fn flush_plain(&mut self) {
        let text = std::mem::take(&mut self.buf);
        if !text.trim().is_empty() {
            self.blocks.push(AnnotatedBlock {
                text,
                atomic: false,
            });
        }
    }
}

fn marker(line: &str, prefix: &str) -> Option<Marker> {
    let line = line.trim();
    if !line.starts_with("--") {
        return None;
    }

    let fields: Vec<&str> = line.split_whitespace().collect();
    let command = match *fields.as_slice() {
        [_, command] => command.strip_prefix('+').unwrap_or(command),
        [_, tool, command]
            if !prefix.is_empty()
                && (tool == prefix || tool.strip_prefix('+') == Some(prefix)) =>
        {
            command
        }
        _ => return None,
    };

    match command {
        "StatementBegin" | "statementBegin" => Some(Marker::Begin),
        "StatementEnd" | "statementEnd" => Some(Marker::End),
        _ => None,
    }
}

/// Split marker-annotated text into blocks.
pub fn split_annotated(input: &str, prefix: &str) -> AnnotatedSplit {
    let mut splitter = AnnotationSplitter::new(prefix);
    for line in input.lines() {
        splitter.push_line(line);
    }
    splitter.finish()
}

/// Like [`split_annotated`], keeping only the blocks.
pub fn split_annotated_blocks(input: &str, prefix: &str) -> Vec<AnnotatedBlock> {
    split_annotated(input, prefix).blocks
}

pub fn split_annotated_reader<R: BufRead>(
    reader: R,
    prefix: &str,
) -> Result<AnnotatedSplit, SplitError> {
    let mut splitter = AnnotationSplitter::new(prefix);
    for line in reader.lines() {
        splitter.push_line(&line?);
    }
    Ok(splitter.finish())
}
