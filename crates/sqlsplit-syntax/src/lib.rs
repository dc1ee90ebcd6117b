//! # sqlsplit-syntax
//!
//! Splits SQL migration scripts into individual statements without parsing
//! SQL. It knows just enough about the text to avoid splitting on a `;` that
//! is not a real terminator.
//!
//! ## Architecture Overview
//!
//! ```text
//! Source Text → RuneStream → Lexer → Splitter → Vec<String>
//!               (chars)      (tokens)  (depth, delimiter)
//! ```
//!
//! ### 1. Rune stream ([`stream`] module)
//!
//! Decodes UTF-8 from any [`BufRead`](std::io::BufRead), one character at a
//! time, with one character of lookahead.
//!
//! ### 2. Lexer ([`lexer`] module)
//!
//! Recognises quoted literals, comments, `BEGIN`/`END`, `DELIMITER`
//! directives and dollar-quoted bodies. Every other character is plain text,
//! so concatenating token values reproduces the input.
//!
//! ### 3. Splitter ([`splitter`] module)
//!
//! Collects token text into statements. `;` ends a statement only outside
//! `BEGIN`/`END` blocks. After a `DELIMITER //` directive the splitter reads
//! raw characters until the custom delimiter instead.
//!
//! ### Annotated blocks ([`annotated`] module)
//!
//! A separate, line-based pass for scripts that already mark atomic spans
//! with `-- +goose StatementBegin` / `-- +goose StatementEnd` comments.
//!
//! ## Quick Start
//!
//! ```
//! use sqlsplit_syntax::{split, split_annotated_blocks};
//!
//! let statements = split("INSERT INTO t VALUES ('a;b'); SELECT 1;").unwrap();
//! assert_eq!(statements, vec!["INSERT INTO t VALUES ('a;b');", " SELECT 1;"]);
//!
//! let blocks = split_annotated_blocks("-- +StatementBegin\nA; B;\n-- +StatementEnd", "");
//! assert!(blocks[0].atomic);
//! ```
//!
//! ## Malformed Input
//!
//! Unterminated quotes, comments, dollar bodies and marker blocks are never
//! errors. The text read so far becomes part of the last statement. Only
//! reader failures and invalid UTF-8 produce a [`SplitError`].

pub mod annotated;
pub mod error;
pub mod keyword;
pub mod lexer;
pub mod splitter;
pub mod stream;

pub use annotated::{
    AnnotatedBlock, AnnotatedSplit, AnnotationSplitter, split_annotated, split_annotated_blocks,
    split_annotated_reader,
};
pub use error::SplitError;
pub use lexer::{Lexer, Token, TokenKind};
pub use splitter::{
    DEFAULT_DELIMITER, SplitOptions, Splitter, split, split_reader, split_with_options,
};
pub use stream::RuneStream;

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_debug_snapshot;

    #[test]
    fn snapshot_mixed_migration() {
        let input = "CREATE TABLE users (id int);\nINSERT INTO users VALUES (1); -- seed\n";
        assert_debug_snapshot!(split(input).unwrap(), @r#"
        [
            "CREATE TABLE users (id int);",
            "\nINSERT INTO users VALUES (1);",
            " -- seed\n",
        ]
        "#);
    }

    #[test]
    fn snapshot_annotated_blocks() {
        let input = "SELECT 1;\n-- +goose StatementBegin\nBEGIN; END;\n-- +goose StatementEnd";
        assert_debug_snapshot!(split_annotated_blocks(input, "goose"), @r#"
        [
            AnnotatedBlock {
                text: "SELECT 1;",
                atomic: false,
            },
            AnnotatedBlock {
                text: "-- +goose StatementBegin\nBEGIN; END;\n-- +goose StatementEnd",
                atomic: true,
            },
        ]
        "#);
    }

    #[test]
    fn roundtrip_preserves_text() {
        let inputs = [
            "SELECT 1;",
            "SELECT 1; SELECT 2;\n",
            "-- only a comment",
            "/* open comment",
            "'open quote;",
            "BEGIN a; b; END;",
            "CREATE FUNCTION f() AS $$ x; $$;",
            "END; END; SELECT 1;",
        ];

        for input in inputs {
            let statements = split(input).unwrap();
            assert_eq!(
                statements.concat(),
                input,
                "Roundtrip failed for: {:?}",
                input
            );
        }
    }
}
