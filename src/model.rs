use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// A parsed `.docx` body: its tables in document order plus the embedded parts
/// reachable through the main document's relationships.
#[derive(Debug, Default)]
pub struct Document {
    pub tables: Vec<Table>,
    pub blocks: Vec<Block>,
    pub parts: HashMap<String, BinaryPart>,
}

/// Top-level body element, kept in order for context dumps.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Paragraph(String),
    Table(usize), // index into Document::tables
}

#[derive(Debug, Default)]
pub struct Table {
    pub index: usize,
    pub rows: Vec<Row>,
}

#[derive(Debug, Default)]
pub struct Row {
    /// Grid columns skipped before the first cell (`w:gridBefore`).
    pub grid_before: usize,
    /// Physical `w:tc` cells; a merged cell appears once.
    pub cells: Vec<Cell>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VMerge {
    #[default]
    None,
    Restart,
    Continue,
}

#[derive(Debug, Default)]
pub struct Cell {
    pub paragraphs: Vec<Paragraph>,
    /// `w:gridSpan`; 0 and 1 both mean a single column.
    pub grid_span: usize,
    pub v_merge: VMerge,
}

#[derive(Debug, Default)]
pub struct Paragraph {
    pub runs: Vec<Run>,
}

#[derive(Debug, Default)]
pub struct Run {
    pub text: String,
    pub images: Vec<ImageRef>,
}

/// One `a:blip` found inside a run. `embed` is `None` for blips without an
/// `r:embed` attribute (linked pictures, fills of non-image shapes).
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRef {
    pub embed: Option<String>,
}

#[derive(Debug, Clone)]
pub struct BinaryPart {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

impl BinaryPart {
    /// File extension for the part; unknown types fall back to `png`.
    pub fn extension(&self) -> &'static str {
        let ct = self.content_type.to_ascii_lowercase();
        if ct.contains("jpeg") || ct.contains("jpg") {
            "jpg"
        } else if ct.contains("gif") {
            "gif"
        } else {
            "png"
        }
    }
}

impl Document {
    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn resolve_relationship(&self, id: &str) -> Result<&BinaryPart, Error> {
        self.parts
            .get(id)
            .ok_or_else(|| Error::UnresolvedRelationship(id.to_string()))
    }
}

impl Table {
    /// Cell at grid position (`row`, `col`). A horizontally merged cell covers
    /// every column it spans, and a vertical-merge continuation resolves to
    /// the cell where the merge starts.
    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        let mut row = row;
        loop {
            let cell = self.rows.get(row)?.grid_cell(col)?;
            if cell.v_merge != VMerge::Continue || row == 0 {
                return Some(cell);
            }
            row -= 1;
        }
    }

    pub fn image_refs(&self) -> impl Iterator<Item = &ImageRef> {
        self.rows
            .iter()
            .flat_map(|r| &r.cells)
            .flat_map(|c| c.image_refs())
    }

    /// Tab-separated cell text, one line per row.
    pub fn to_tsv(&self) -> String {
        let mut out = String::new();
        for row in &self.rows {
            let line: Vec<String> = row.cells.iter().map(Cell::text).collect();
            out.push_str(&line.join("\t"));
            out.push('\n');
        }
        out
    }
}

impl Row {
    pub fn grid_width(&self) -> usize {
        self.grid_before + self.cells.iter().map(Cell::span).sum::<usize>()
    }

    fn grid_cell(&self, col: usize) -> Option<&Cell> {
        let mut start = self.grid_before;
        if col < start {
            return None;
        }
        for cell in &self.cells {
            let end = start + cell.span();
            if col < end {
                return Some(cell);
            }
            start = end;
        }
        None
    }
}

impl Cell {
    pub fn span(&self) -> usize {
        self.grid_span.max(1)
    }

    pub fn text(&self) -> String {
        let paragraphs: Vec<String> = self.paragraphs.iter().map(Paragraph::text).collect();
        paragraphs.join("\n").trim().to_string()
    }

    pub fn image_refs(&self) -> impl Iterator<Item = &ImageRef> {
        self.paragraphs
            .iter()
            .flat_map(|p| &p.runs)
            .flat_map(|r| &r.images)
    }
}

impl Paragraph {
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

/// The fixed (row, column) cell used to name every table, 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NamingCoordinate {
    pub row: usize,
    pub col: usize,
}

impl NamingCoordinate {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl FromStr for NamingCoordinate {
    type Err = Error;

    /// Parses `"row,col"`; both parts must be non-negative integers.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidCoordinate(s.trim().to_string());
        let (row, col) = s.split_once(',').ok_or_else(invalid)?;
        let row = row.trim().parse::<usize>().map_err(|_| invalid())?;
        let col = col.trim().parse::<usize>().map_err(|_| invalid())?;
        Ok(Self { row, col })
    }
}

impl fmt::Display for NamingCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}
