use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::dedup::Fingerprints;
use crate::error::Error;
use crate::model::{Document, Table};

/// What one table produced.
#[derive(Debug, Default)]
pub struct RecordOutcome {
    /// Resolved picture references, duplicates included.
    pub found: usize,
    pub written: usize,
    pub written_paths: Vec<PathBuf>,
    pub errors: Vec<Error>,
    pub timed_out: bool,
}

/// Output paths produced so far in one batch. Two tables that resolve to the
/// same folder name must not overwrite each other's images.
///
/// On file systems that ignore case (Windows, macOS) `Router/Router-1.png`
/// and `router/router-1.png` are the same file, so paths are compared with
/// their case folded there.
#[derive(Debug)]
pub struct ClaimedPaths {
    paths: HashSet<PathBuf>,
    case_insensitive: bool,
}

impl Default for ClaimedPaths {
    fn default() -> Self {
        Self::new(cfg!(any(windows, target_os = "macos")))
    }
}

impl ClaimedPaths {
    pub fn new(case_insensitive: bool) -> Self {
        Self {
            paths: HashSet::new(),
            case_insensitive,
        }
    }

    fn key(&self, path: &Path) -> PathBuf {
        if self.case_insensitive {
            PathBuf::from(path.to_string_lossy().to_lowercase())
        } else {
            path.to_path_buf()
        }
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.paths.contains(&self.key(path))
    }

    pub fn claim(&mut self, path: &Path) {
        let key = self.key(path);
        self.paths.insert(key);
    }

    fn release(&mut self, path: &Path) {
        let key = self.key(path);
        self.paths.remove(&key);
    }
}

fn target_path(
    folder: &Path,
    base_name: &str,
    number: usize,
    ext: &str,
    claimed: &ClaimedPaths,
) -> PathBuf {
    let path = folder.join(format!("{base_name}-{number}.{ext}"));
    if !claimed.contains(&path) {
        return path;
    }
    let mut k = 2;
    loop {
        let path = folder.join(format!("{base_name}-{number} ({k}).{ext}"));
        if !claimed.contains(&path) {
            return path;
        }
        k += 1;
    }
}

/// Write through a temporary file in the same folder and rename it into
/// place, so `target` either holds the full payload or does not change.
fn write_atomic(folder: &Path, target: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut tmp = tempfile::Builder::new()
        .prefix(".partial-")
        .tempfile_in(folder)?;
    tmp.write_all(bytes)?;
    tmp.flush()?;
    tmp.persist(target).map_err(|e| e.error)?;
    Ok(())
}

fn discard(outcome: &mut RecordOutcome, claimed: &mut ClaimedPaths) {
    for path in outcome.written_paths.drain(..) {
        if let Err(e) = std::fs::remove_file(&path) {
            log::warn!("Cannot remove {} after timeout: {e}", path.display());
        }
        claimed.release(&path);
    }
    outcome.found = 0;
    outcome.written = 0;
    outcome.timed_out = true;
}

/// Extract the embedded pictures of `table` into `folder` as
/// `<base_name>-<n>.<ext>`, numbering written images from 1 in document order.
///
/// Byte-identical pictures are written once per table. Dangling references
/// and failed writes are collected in [`RecordOutcome::errors`] and never stop
/// the table. When `deadline` passes, the files written so far are removed
/// and the table counts as having produced nothing.
pub fn extract_table(
    table: &Table,
    document: &Document,
    folder: &Path,
    base_name: &str,
    claimed: &mut ClaimedPaths,
    deadline: Option<Instant>,
) -> RecordOutcome {
    let mut outcome = RecordOutcome::default();
    let mut fingerprints = Fingerprints::new();

    for image in table.image_refs() {
        if deadline.is_some_and(|d| Instant::now() >= d) {
            discard(&mut outcome, claimed);
            return outcome;
        }

        let Some(rel_id) = image.embed.as_deref() else {
            continue;
        };
        if rel_id.is_empty() {
            outcome
                .errors
                .push(Error::MalformedPicture("empty r:embed attribute".into()));
            continue;
        }
        let part = match document.resolve_relationship(rel_id) {
            Ok(part) => part,
            Err(e) => {
                outcome.errors.push(e);
                continue;
            }
        };

        outcome.found += 1;
        if !fingerprints.insert(&part.bytes) {
            log::debug!("Skipping duplicate image {rel_id} in table {}", table.index + 1);
            continue;
        }

        let number = outcome.written + 1;
        let path = target_path(folder, base_name, number, part.extension(), claimed);
        match write_atomic(folder, &path, &part.bytes) {
            Ok(()) => {
                log::debug!("Wrote {}", path.display());
                outcome.written += 1;
                claimed.claim(&path);
                outcome.written_paths.push(path);
            }
            Err(e) => {
                fingerprints.remove(&part.bytes);
                outcome.errors.push(Error::Io(std::io::Error::new(
                    e.kind(),
                    format!("cannot write {}: {e}", path.display()),
                )));
            }
        }
    }

    outcome
}
