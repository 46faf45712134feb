mod batch;
mod dedup;
mod docx;
mod dump;
mod error;
mod extract;
mod model;
mod naming;
mod report;

pub use batch::{
    CancelToken, DEFAULT_PREFIX, ExtractOptions, extract_document, process_document, run,
};
pub use dedup::{Fingerprint, Fingerprints, fingerprint};
pub use docx::open;
pub use dump::table_context;
pub use error::Error;
pub use extract::{ClaimedPaths, RecordOutcome, extract_table};
pub use model::{
    BinaryPart, Block, Cell, Document, ImageRef, NamingCoordinate, Paragraph, Row, Run, Table,
    VMerge,
};
pub use naming::{
    FALLBACK_NAME, MAX_NAME_BYTES, MAX_NAME_CHARS, fallback_name, resolve_name, sanitize,
};
pub use report::{BatchReport, ERROR_LOG_FILE, ErrorLog, ExtractionResult, LogEntry};
