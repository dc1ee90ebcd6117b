//! Reserved words the lexer reacts to.
//!
//! The table is a [Logos] derive so every keyword is declared in one place and
//! matched case-insensitively. Anything not listed here is an ordinary word.
//!
//! [Logos]: https://docs.rs/logos

use logos::Logos;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    /// Opens a block; `;` inside it does not end the statement.
    #[token("begin", ignore(case))]
    Begin,

    /// Closes the innermost open block.
    #[token("end", ignore(case))]
    End,

    /// Client-side `DELIMITER xx` directive.
    #[token("delimiter", ignore(case))]
    Delimiter,

    /// May introduce a dollar-quoted body (`AS $$ ... $$`).
    #[token("as", ignore(case))]
    As,
}

impl Keyword {
    /// Look up a complete word. Prefixes do not count: `ENDING` and
    /// `BEGIN_DATE` are not keywords.
    pub fn classify(word: &str) -> Option<Keyword> {
        let mut lexer = Keyword::lexer(word);
        match lexer.next() {
            Some(Ok(keyword)) if lexer.span() == (0..word.len()) => Some(keyword),
            _ => None,
        }
    }
}
