use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::model::{Block, Document, Table};

const CONTEXT_BLOCKS: usize = 5;

/// Write `<name>_table.txt` with the tab-separated contents of `table`.
pub fn write_table_text(table: &Table, folder: &Path, name: &str) -> Result<PathBuf, Error> {
    let path = folder.join(format!("{name}_table.txt"));
    std::fs::write(&path, table.to_tsv())?;
    Ok(path)
}

fn describe_block(document: &Document, block: &Block, label: &str, out: &mut String) {
    match block {
        Block::Paragraph(text) => {
            let text = text.trim();
            if !text.is_empty() {
                out.push_str(&format!("[{label} paragraph] {text}\n"));
            }
        }
        Block::Table(index) => {
            out.push_str(&format!("[{label} table {}]\n", index + 1));
            if let Some(table) = document.tables.get(*index) {
                out.push_str(&table.to_tsv());
            }
            out.push('\n');
        }
    }
}

/// The body blocks around table `index`: up to five before, the table, and
/// up to five after.
pub fn table_context(document: &Document, index: usize) -> String {
    let mut out = format!("=== Context of table {} ===\n\n", index + 1);

    let Some(position) = document
        .blocks
        .iter()
        .position(|b| *b == Block::Table(index))
    else {
        out.push_str("Table not found in the document body.\n");
        return out;
    };

    out.push_str("--- Before ---\n");
    let start = position.saturating_sub(CONTEXT_BLOCKS);
    for block in &document.blocks[start..position] {
        describe_block(document, block, "preceding", &mut out);
    }

    out.push_str("\n--- Table ---\n");
    if let Some(table) = document.tables.get(index) {
        out.push_str(&table.to_tsv());
    }

    out.push_str("\n--- After ---\n");
    let end = (position + 1 + CONTEXT_BLOCKS).min(document.blocks.len());
    for block in &document.blocks[position + 1..end] {
        describe_block(document, block, "following", &mut out);
    }
    out
}

/// Write `<name>_context.txt` for table `index`.
pub fn write_context(
    document: &Document,
    index: usize,
    folder: &Path,
    name: &str,
) -> Result<PathBuf, Error> {
    let path = folder.join(format!("{name}_context.txt"));
    std::fs::write(&path, table_context(document, index))?;
    Ok(path)
}
