use crate::error::Error;
use crate::model::{NamingCoordinate, Table};

pub const FALLBACK_NAME: &str = "Untitled";
pub const MAX_NAME_CHARS: usize = 100;
/// Leaves room under the common 255-byte file name limit for the
/// `-<n> (k).<ext>` and `_context.txt` suffixes added to the name.
pub const MAX_NAME_BYTES: usize = 200;

const RESERVED: &[char] = &['\\', '/', '*', '?', ':', '"', '<', '>', '|'];
const SEPARATOR: char = '_';

/// Turn arbitrary cell text into a single safe path component.
///
/// Reserved characters and control characters become `_`, whitespace runs
/// collapse to one space, and the result is cut to [`MAX_NAME_CHARS`]
/// characters and [`MAX_NAME_BYTES`] UTF-8 bytes on a char boundary. Empty
/// or dot-only results become [`FALLBACK_NAME`]. Applying it twice gives the
/// same result as applying it once.
pub fn sanitize(raw: &str) -> String {
    let replaced: String = raw
        .chars()
        .map(|c| {
            if RESERVED.contains(&c) || (c.is_control() && !c.is_whitespace()) {
                SEPARATOR
            } else {
                c
            }
        })
        .collect();

    let collapsed = replaced.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut truncated: String = collapsed.chars().take(MAX_NAME_CHARS).collect();
    if truncated.len() > MAX_NAME_BYTES {
        let mut cut = MAX_NAME_BYTES;
        while !truncated.is_char_boundary(cut) {
            cut -= 1;
        }
        truncated.truncate(cut);
    }
    let name = truncated.trim_end();

    if name.is_empty() || name.chars().all(|c| c == '.') {
        FALLBACK_NAME.to_string()
    } else {
        name.to_string()
    }
}

/// Trimmed text of the naming cell, or `CellOutOfRange` when the table has no
/// such row or the row is too short.
pub fn resolve_name(table: &Table, coord: NamingCoordinate) -> Result<String, Error> {
    table
        .cell(coord.row, coord.col)
        .map(|cell| cell.text())
        .ok_or(Error::CellOutOfRange {
            row: coord.row,
            col: coord.col,
        })
}

/// Name used when the naming cell is missing or empty; `position` is 1-based.
pub fn fallback_name(prefix: &str, position: usize) -> String {
    sanitize(&format!("{prefix}_{position}_{FALLBACK_NAME}"))
}
