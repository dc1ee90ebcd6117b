//! Character-level cursor over a buffered reader.
//!
//! The lexer and the raw-scan path of the splitter share one [`RuneStream`].
//! Whoever currently drives the split owns it through `&mut`, so the two
//! modes never observe different positions.

use std::io::{BufRead, ErrorKind};

use crate::error::SplitError;

/// A UTF-8 decoding stream with one character of lookahead.
///
/// `Ok(None)` from [`next`](Self::next) or [`peek`](Self::peek) means end of
/// input. Multi-byte characters are always decoded whole.
pub struct RuneStream<R> {
    reader: R,
    pending: Option<char>,
    /// Bytes pulled from the reader so far.
    offset: usize,
    /// Characters handed out by `next()`, net of pushbacks.
    position: usize,
}

impl<'a> RuneStream<&'a [u8]> {
    /// Stream over an in-memory script.
    pub fn from_text(input: &'a str) -> Self {
        Self::new(input.as_bytes())
    }
}

impl<R: BufRead> RuneStream<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            pending: None,
            offset: 0,
            position: 0,
        }
    }

    /// Number of characters consumed so far.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Consume and return the next character.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<Option<char>, SplitError> {
        let c = match self.pending.take() {
            Some(c) => Some(c),
            None => self.decode()?,
        };
        if c.is_some() {
            self.position += 1;
        }
        Ok(c)
    }

    /// Return the next character without consuming it.
    pub fn peek(&mut self) -> Result<Option<char>, SplitError> {
        if self.pending.is_none() {
            self.pending = self.decode()?;
        }
        Ok(self.pending)
    }

    /// Push a character back so the following `next()` returns it again.
    ///
    /// Only one character can be pending; the caller must have just read `c`.
    pub fn unread(&mut self, c: char) {
        debug_assert!(self.pending.is_none(), "only one character of pushback");
        self.pending = Some(c);
        self.position -= 1;
    }

    fn decode(&mut self) -> Result<Option<char>, SplitError> {
        let start = self.offset;
        let Some(lead) = self.read_byte()? else {
            return Ok(None);
        };

        let width = utf8_width(lead).ok_or(SplitError::InvalidUtf8 { offset: start })?;
        let mut bytes = [lead, 0, 0, 0];
        for slot in bytes.iter_mut().take(width).skip(1) {
            *slot = self
                .read_byte()?
                .ok_or(SplitError::InvalidUtf8 { offset: start })?;
        }

        std::str::from_utf8(&bytes[..width])
            .ok()
            .and_then(|s| s.chars().next())
            .map(Some)
            .ok_or(SplitError::InvalidUtf8 { offset: start })
    }

    fn read_byte(&mut self) -> Result<Option<u8>, SplitError> {
        loop {
            let buf = match self.reader.fill_buf() {
                Ok(buf) => buf,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(SplitError::Io(e)),
            };
            let Some(&b) = buf.first() else {
                return Ok(None);
            };
            self.reader.consume(1);
            self.offset += 1;
            return Ok(Some(b));
        }
    }
}

/// Encoded length of a UTF-8 sequence from its leading byte.
fn utf8_width(lead: u8) -> Option<usize> {
    match lead {
        0x00..=0x7F => Some(1),
        0xC2..=0xDF => Some(2),
        0xE0..=0xEF => Some(3),
        0xF0..=0xF4 => Some(4),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::{self, BufReader, Read};

    fn drain<R: BufRead>(stream: &mut RuneStream<R>) -> String {
        let mut out = String::new();
        while let Some(c) = stream.next().unwrap() {
            out.push(c);
        }
        out
    }

    #[test]
    fn empty_input_is_end_of_stream() {
        let mut stream = RuneStream::from_text("");
        assert_eq!(stream.peek().unwrap(), None);
        assert_eq!(stream.next().unwrap(), None);
        assert_eq!(stream.next().unwrap(), None);
    }

    #[test]
    fn peek_does_not_consume() {
        let mut stream = RuneStream::from_text("ab");
        assert_eq!(stream.peek().unwrap(), Some('a'));
        assert_eq!(stream.peek().unwrap(), Some('a'));
        assert_eq!(stream.next().unwrap(), Some('a'));
        assert_eq!(stream.position(), 1);
        assert_eq!(stream.next().unwrap(), Some('b'));
        assert_eq!(stream.next().unwrap(), None);
    }

    #[test]
    fn unread_returns_character_again() {
        let mut stream = RuneStream::from_text("xy");
        let c = stream.next().unwrap().unwrap();
        stream.unread(c);
        assert_eq!(stream.position(), 0);
        assert_eq!(drain(&mut stream), "xy");
    }

    #[test]
    fn multibyte_characters_are_atomic() {
        let input = "é→𝄞 注释";
        let mut stream = RuneStream::from_text(input);
        assert_eq!(stream.next().unwrap(), Some('é'));
        assert_eq!(stream.peek().unwrap(), Some('→'));
        assert_eq!(drain(&mut stream), "→𝄞 注释");
    }

    #[test]
    fn multibyte_across_buffer_boundary() {
        // A one-byte buffer forces every continuation byte into its own fill.
        let input = "ä€𝄞";
        let reader = BufReader::with_capacity(1, input.as_bytes());
        let mut stream = RuneStream::new(reader);
        assert_eq!(drain(&mut stream), input);
    }

    #[test]
    fn invalid_utf8_is_an_error() {
        let bytes: &[u8] = &[b'a', 0xFF, b'b'];
        let mut stream = RuneStream::new(bytes);
        assert_eq!(stream.next().unwrap(), Some('a'));
        let err = stream.next().unwrap_err();
        assert!(matches!(err, SplitError::InvalidUtf8 { offset: 1 }));
    }

    #[test]
    fn truncated_sequence_is_an_error() {
        let bytes: &[u8] = &[0xE2, 0x82];
        let mut stream = RuneStream::new(bytes);
        assert!(matches!(
            stream.next(),
            Err(SplitError::InvalidUtf8 { offset: 0 })
        ));
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::other("disk on fire"))
        }
    }

    #[test]
    fn reader_errors_propagate() {
        let mut stream = RuneStream::new(BufReader::new(FailingReader));
        assert!(matches!(stream.next(), Err(SplitError::Io(_))));
    }
}
