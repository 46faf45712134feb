use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum Error {
    InvalidDocx(String),
    Zip(zip::result::ZipError),
    Xml(roxmltree::Error),
    Io(std::io::Error),
    InvalidCoordinate(String),
    CellOutOfRange { row: usize, col: usize },
    UnresolvedRelationship(String),
    MalformedPicture(String),
    OutputDir { path: PathBuf, source: std::io::Error },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidDocx(reason) => write!(f, "not a valid DOCX file: {reason}"),
            Error::Zip(e) => write!(f, "ZIP error: {e}"),
            Error::Xml(e) => write!(f, "XML error: {e}"),
            Error::Io(e) => write!(f, "IO error: {e}"),
            Error::InvalidCoordinate(input) => {
                write!(f, "invalid cell coordinate '{input}', expected ROW,COL")
            }
            Error::CellOutOfRange { row, col } => {
                write!(f, "cell ({row},{col}) does not exist")
            }
            Error::UnresolvedRelationship(id) => {
                write!(f, "relationship '{id}' does not resolve to an embedded part")
            }
            Error::MalformedPicture(reason) => write!(f, "malformed picture node: {reason}"),
            Error::OutputDir { path, source } => {
                write!(f, "cannot create output directory {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Zip(e) => Some(e),
            Error::Xml(e) => Some(e),
            Error::Io(e) => Some(e),
            Error::OutputDir { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(e: zip::result::ZipError) -> Self {
        Error::Zip(e)
    }
}

impl From<roxmltree::Error> for Error {
    fn from(e: roxmltree::Error) -> Self {
        Error::Xml(e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}
