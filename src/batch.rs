use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::docx;
use crate::dump;
use crate::error::Error;
use crate::extract::{ClaimedPaths, extract_table};
use crate::model::{Document, NamingCoordinate, Table};
use crate::naming;
use crate::report::{BatchReport, DEFAULT_LOG_CAPACITY, ErrorLog, ExtractionResult};

pub const DEFAULT_PREFIX: &str = "Item";

/// Stops a running batch before its next table. Clones share the flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Tables without a usable name become `<prefix>_<n>_Untitled`.
    pub fallback_prefix: String,
    /// Per-table time limit; a table that exceeds it keeps no images.
    pub record_timeout: Option<Duration>,
    /// Dump table text and surrounding context for tables with a fallback name.
    pub dump_unnamed: bool,
    pub write_error_log: bool,
    pub max_log_entries: usize,
    pub cancel: CancelToken,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        // DOCX_TABLE_IMAGES_PREFIX overrides the fallback prefix
        let fallback_prefix = std::env::var("DOCX_TABLE_IMAGES_PREFIX")
            .ok()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| DEFAULT_PREFIX.to_string());
        Self {
            fallback_prefix,
            record_timeout: None,
            dump_unnamed: false,
            write_error_log: true,
            max_log_entries: DEFAULT_LOG_CAPACITY,
            cancel: CancelToken::default(),
        }
    }
}

fn process_table(
    document: &Document,
    table: &Table,
    output_dir: &Path,
    coord: NamingCoordinate,
    options: &ExtractOptions,
    claimed: &mut ClaimedPaths,
    log: &mut ErrorLog,
) -> ExtractionResult {
    let position = table.index + 1;
    let fallback = || naming::fallback_name(&options.fallback_prefix, position);

    let (name, used_fallback) = match naming::resolve_name(table, coord) {
        Ok(text) if !text.is_empty() => (naming::sanitize(&text), false),
        Ok(_) => (fallback(), true),
        Err(e) => {
            let name = fallback();
            log.push(format!("Table {position}: {e}, using '{name}'"));
            (name, true)
        }
    };

    let mut result = ExtractionResult {
        record_index: table.index,
        resolved_name: name.clone(),
        used_fallback,
        images_found: 0,
        images_written: 0,
        output_folder: None,
        error: None,
        timed_out: false,
    };

    let folder = output_dir.join(&name);
    if let Err(e) = std::fs::create_dir_all(&folder) {
        let message = format!("Table {position}: cannot create folder {}: {e}", folder.display());
        log.push(message.clone());
        result.error = Some(message);
        return result;
    }

    let deadline = options.record_timeout.map(|limit| Instant::now() + limit);
    let outcome = extract_table(table, document, &folder, &name, claimed, deadline);

    for e in &outcome.errors {
        log.push(format!("Table {position} '{name}': {e}"));
    }
    if outcome.timed_out {
        let limit = options.record_timeout.unwrap_or_default();
        let message = format!(
            "Table {position} '{name}': timed out after {}s, no images kept",
            limit.as_secs_f32()
        );
        log.push(message.clone());
        result.error = Some(message);
    }

    if used_fallback && options.dump_unnamed {
        if let Err(e) = dump::write_table_text(table, &folder, &name) {
            log.push(format!("Table {position} '{name}': cannot write table text: {e}"));
        }
        if let Err(e) = dump::write_context(document, table.index, &folder, &name) {
            log.push(format!("Table {position} '{name}': cannot write context: {e}"));
        }
    }

    log::info!(
        "Table {position}/{}: '{name}', {} images found, {} written",
        document.tables.len(),
        outcome.found,
        outcome.written
    );

    result.images_found = outcome.found;
    result.images_written = outcome.written;
    result.timed_out = outcome.timed_out;
    result.output_folder = Some(folder);
    result
}

/// Extract the images of every table in `document` into `output_dir`, one
/// folder per table named after the cell at `coord`.
///
/// Tables are handled one at a time and in order. Problems with a single
/// table or image are recorded in the report's error log; only an output
/// directory that cannot be created fails the whole run.
pub fn run(
    document: &Document,
    output_dir: &Path,
    coord: NamingCoordinate,
    options: &ExtractOptions,
) -> Result<BatchReport, Error> {
    std::fs::create_dir_all(output_dir).map_err(|source| Error::OutputDir {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let mut report = BatchReport {
        output_dir: output_dir.to_path_buf(),
        total_records: document.tables.len(),
        error_log: ErrorLog::with_capacity(options.max_log_entries),
        ..Default::default()
    };
    if document.tables.is_empty() {
        log::warn!("Document contains no tables");
    }

    let mut claimed = ClaimedPaths::default();
    for table in document.tables() {
        if options.cancel.is_cancelled() {
            log::info!("Cancelled before table {}", table.index + 1);
            report.cancelled = true;
            break;
        }
        let result = process_table(
            document,
            table,
            output_dir,
            coord,
            options,
            &mut claimed,
            &mut report.error_log,
        );
        report.record(result);
    }

    Ok(report)
}

/// Run the batch and write `error_log.txt` into `output_dir` when enabled.
/// A log that cannot be written is reported through `log`, not as a failure.
pub fn process_document(
    document: &Document,
    output_dir: &Path,
    coord: NamingCoordinate,
    options: &ExtractOptions,
) -> Result<BatchReport, Error> {
    let mut report = run(document, output_dir, coord, options)?;

    if options.write_error_log {
        match report.error_log.write_to(output_dir) {
            Ok(path) => {
                log::info!("Error log written to {}", path.display());
                report.error_log_path = Some(path);
            }
            Err(e) => log::warn!("Cannot write error log: {e}"),
        }
    }
    Ok(report)
}

/// Open `input` and process it. Fails before touching `output_dir` if the
/// document cannot be read.
pub fn extract_document(
    input: &Path,
    output_dir: &Path,
    coord: NamingCoordinate,
    options: &ExtractOptions,
) -> Result<BatchReport, Error> {
    let document = docx::open(input)?;
    process_document(&document, output_dir, coord, options)
}
