use serde::Serialize;
use sqlsplit_syntax::AnnotatedBlock;

#[derive(Serialize)]
struct BlockRecord<'a> {
    text: &'a str,
    atomic: bool,
}

/// One `-- statement N` header per non-blank statement, text trimmed.
pub fn statements_text(statements: &[String]) -> String {
    let mut out = String::new();
    let non_blank = statements
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty());
    for (index, statement) in non_blank.enumerate() {
        out.push_str(&format!("-- statement {}\n{}\n", index + 1, statement));
    }
    out
}

/// Statements exactly as split, so concatenating the array restores the
/// input.
pub fn statements_json(statements: &[String]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(statements)
}

pub fn blocks_text(blocks: &[AnnotatedBlock]) -> String {
    let mut out = String::new();
    for (index, block) in blocks.iter().enumerate() {
        let kind = if block.atomic { " (atomic)" } else { "" };
        out.push_str(&format!("-- block {}{}\n{}\n", index + 1, kind, block.text.trim()));
    }
    out
}

pub fn blocks_json(blocks: &[AnnotatedBlock]) -> serde_json::Result<String> {
    let records: Vec<BlockRecord> = blocks
        .iter()
        .map(|block| BlockRecord {
            text: &block.text,
            atomic: block.atomic,
        })
        .collect();
    serde_json::to_string_pretty(&records)
}
