use std::collections::HashSet;

use md5::{Digest, Md5};

pub type Fingerprint = [u8; 16];

pub fn fingerprint(bytes: &[u8]) -> Fingerprint {
    let digest = Md5::digest(bytes);
    let mut out = [0u8; 16];
    out.copy_from_slice(&digest);
    out
}

/// Content fingerprints of the images already accepted for one table.
/// A new set is created per table, so the same picture used by two tables is
/// written once into each table's folder.
#[derive(Debug, Default)]
pub struct Fingerprints {
    seen: HashSet<Fingerprint>,
}

impl Fingerprints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` and remembers the payload if no byte-identical payload
    /// was accepted before.
    pub fn insert(&mut self, bytes: &[u8]) -> bool {
        self.seen.insert(fingerprint(bytes))
    }

    /// Forget a payload whose write failed, so a later copy can still be written.
    pub fn remove(&mut self, bytes: &[u8]) {
        self.seen.remove(&fingerprint(bytes));
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
