//! # Lexer - Tokenizing SQL Scripts
//!
//! This module breaks a character stream into the few token kinds the
//! statement splitter cares about. It does not understand SQL; it only knows
//! enough to tell a real statement terminator from a `;` that happens to sit
//! inside a string, a comment or a function body.
//!
//! ## The Lossless Guarantee
//!
//! Every character read from the stream ends up in exactly one token value,
//! markers included (quote characters, `--`, `/* */`, `$tag$`). Concatenating
//! the values gives back the input:
//!
//! ```
//! use sqlsplit_syntax::lexer::lex;
//!
//! let input = "SELECT 'a;b' -- note\nFROM t;";
//! let tokens = lex(input).unwrap();
//! let reconstructed: String = tokens.iter().map(|t| t.value.as_str()).collect();
//! assert_eq!(input, reconstructed);
//! ```
//!
//! The splitter drops the text of `DELIMITER` directives, so the guarantee
//! holds at this level only.
//!
//! ## Dispatch
//!
//! The first character of each token decides what gets read:
//!
//! - `'` / `"` → quoted literal up to the matching quote (doubled quote escapes)
//! - `--` → line comment through the newline
//! - `/*` → block comment through `*/`
//! - `;` → [`TokenKind::StatementEnd`]
//! - letter or `_` → a word, looked up in the [`Keyword`] table
//! - anything else → a one-character text token
//!
//! Unterminated quotes and comments are not errors: whatever was read before
//! end of input is returned as the token.
//!
//! ## Dollar-Quoted Bodies
//!
//! After the keyword `AS`, a `$tag$` opener starts an opaque body that runs to
//! the matching `$tag$`. Nothing inside is tokenized, which is what keeps
//! `BEGIN ... END;` inside a PL/pgSQL function from ending the statement.

use std::io::BufRead;

use crate::error::SplitError;
use crate::keyword::Keyword;
use crate::stream::RuneStream;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Anything with no structural meaning: words, whitespace, punctuation,
    /// literals, comments and opaque bodies.
    Text,
    /// A `;` outside any literal or comment.
    StatementEnd,
    /// The `BEGIN` keyword.
    BlockOpen,
    /// The `END` keyword.
    BlockClose,
    /// A `DELIMITER xx` line; the new delimiter is in [`Token::delimiter`].
    DelimiterDirective,
}

/// A lexed token with the exact source text it was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    /// Only set for [`TokenKind::DelimiterDirective`].
    pub delimiter: Option<String>,
}

impl Token {
    pub fn new(kind: TokenKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
            delimiter: None,
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self::new(TokenKind::Text, value)
    }
}

/// Pull-based tokenizer over a [`RuneStream`].
pub struct Lexer<R> {
    stream: RuneStream<R>,
}

impl<R: BufRead> Lexer<R> {
    pub fn new(stream: RuneStream<R>) -> Self {
        Self { stream }
    }

    /// The underlying stream, for callers that need to read past the lexer
    /// (the splitter's custom-delimiter mode).
    pub fn stream_mut(&mut self) -> &mut RuneStream<R> {
        &mut self.stream
    }

    pub fn into_stream(self) -> RuneStream<R> {
        self.stream
    }

    /// Read the next token, or `None` at end of input.
    pub fn next_token(&mut self) -> Result<Option<Token>, SplitError> {
        let Some(c) = self.stream.next()? else {
            return Ok(None);
        };

        let token = match c {
            '\'' | '"' => self.quoted(c)?,
            '-' if self.stream.peek()? == Some('-') => self.line_comment()?,
            '/' if self.stream.peek()? == Some('*') => self.block_comment()?,
            ';' => Token::new(TokenKind::StatementEnd, ";"),
            c if c.is_alphabetic() || c == '_' => self.word(c)?,
            c => Token::text(c),
        };
        Ok(Some(token))
    }

    fn quoted(&mut self, quote: char) -> Result<Token, SplitError> {
        let mut value = String::from(quote);
        while let Some(c) = self.stream.next()? {
            value.push(c);
            if c != quote {
                continue;
            }
            // A doubled quote is an escaped quote, not the end.
            if self.stream.peek()? == Some(quote) {
                self.stream.next()?;
                value.push(quote);
            } else {
                break;
            }
        }
        Ok(Token::text(value))
    }

    fn line_comment(&mut self) -> Result<Token, SplitError> {
        let mut value = String::from('-');
        while let Some(c) = self.stream.next()? {
            value.push(c);
            if c == '\n' {
                break;
            }
        }
        Ok(Token::text(value))
    }

    fn block_comment(&mut self) -> Result<Token, SplitError> {
        let mut value = String::from('/');
        // The opening `*` must not double as the closing one in `/*/`.
        if let Some(star) = self.stream.next()? {
            value.push(star);
        }
        while let Some(c) = self.stream.next()? {
            value.push(c);
            if c == '*' && self.stream.peek()? == Some('/') {
                self.stream.next()?;
                value.push('/');
                break;
            }
        }
        Ok(Token::text(value))
    }

    fn word(&mut self, first: char) -> Result<Token, SplitError> {
        let mut word = String::from(first);
        while let Some(c) = self.stream.peek()? {
            if !is_word_char(c) {
                break;
            }
            self.stream.next()?;
            word.push(c);
        }

        let token = match Keyword::classify(&word) {
            Some(Keyword::Begin) => Token::new(TokenKind::BlockOpen, word),
            Some(Keyword::End) => Token::new(TokenKind::BlockClose, word),
            Some(Keyword::Delimiter) => read_delimiter_directive(&mut self.stream, &word, None)?,
            Some(Keyword::As) => self.dollar_body(word)?,
            None => Token::text(word),
        };
        Ok(token)
    }

    /// Capture `AS $tag$ ... $tag$` as one opaque text token.
    ///
    /// Returns the text read so far as a plain token when no complete
    /// `$tag$` opener follows; normal dispatch resumes after it.
    fn dollar_body(&mut self, keyword: String) -> Result<Token, SplitError> {
        let mut value = keyword;

        while let Some(c) = self.stream.peek()? {
            if !c.is_whitespace() {
                break;
            }
            self.stream.next()?;
            value.push(c);
        }

        if self.stream.peek()? != Some('$') {
            return Ok(Token::text(value));
        }
        self.stream.next()?;
        value.push('$');

        let mut tag = String::new();
        while let Some(c) = self.stream.peek()? {
            if !is_word_char(c) {
                break;
            }
            self.stream.next()?;
            tag.push(c);
        }
        value.push_str(&tag);

        if self.stream.peek()? != Some('$') {
            return Ok(Token::text(value));
        }
        self.stream.next()?;
        value.push('$');

        let closing = format!("${tag}$");
        let body_start = value.len();
        while let Some(c) = self.stream.next()? {
            value.push(c);
            // `closing` starts with an ASCII `$`, so a byte suffix match is
            // always aligned on a character boundary.
            if value.len() - body_start >= closing.len() && value.ends_with(&closing) {
                break;
            }
        }
        Ok(Token::text(value))
    }
}

/// Read the rest of a `DELIMITER` directive through end of line or `;`.
///
/// `keyword` is the directive word as it appeared in the source. `lead` is a
/// character the caller already consumed after the keyword, if any. The new
/// delimiter is everything after the keyword, trimmed; it is empty when the
/// directive has no argument.
pub(crate) fn read_delimiter_directive<R: BufRead>(
    stream: &mut RuneStream<R>,
    keyword: &str,
    lead: Option<char>,
) -> Result<Token, SplitError> {
    let mut value = String::from(keyword);
    let mut pending = lead;
    loop {
        let c = match pending.take() {
            Some(c) => c,
            None => match stream.next()? {
                Some(c) => c,
                None => break,
            },
        };
        value.push(c);
        if c == '\n' || c == ';' {
            break;
        }
    }

    let delimiter = value[keyword.len()..].trim().to_string();
    Ok(Token {
        kind: TokenKind::DelimiterDirective,
        value,
        delimiter: Some(delimiter),
    })
}

pub(crate) fn is_word_char(c: char) -> bool {
    c.is_alphabetic() || c.is_numeric() || c == '_'
}

/// Lex a complete in-memory script.
pub fn lex(input: &str) -> Result<Vec<Token>, SplitError> {
    let mut lexer = Lexer::new(RuneStream::from_text(input));
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next_token()? {
        tokens.push(token);
    }
    Ok(tokens)
}
