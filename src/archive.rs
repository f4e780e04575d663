//! In-memory view of an EPUB archive: canonical member path to bytes.

use std::collections::HashMap;
use std::io::{Cursor, Read};

use zip::ZipArchive;

use crate::audit::normalize_path;
use crate::error::Result;

/// One regular file from the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveFile {
    /// Canonical path: `/`-separated, no leading slash, no `.`/`..`.
    pub path: String,
    pub data: Vec<u8>,
}

/// Archive members in enumeration order, indexed by canonical path.
#[derive(Debug, Clone, Default)]
pub struct ArchiveFileMap {
    files: Vec<ArchiveFile>,
    index: HashMap<String, usize>,
}

impl ArchiveFileMap {
    /// Decompress a zip archive held in memory.
    ///
    /// Directory entries are skipped. A buffer that is not a readable zip
    /// archive is the one fatal failure of an audit run.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;
        let mut map = Self::default();

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().to_string();
            // The declared size comes from the archive and is not trusted.
            let mut data = Vec::new();
            file.read_to_end(&mut data)?;
            map.insert(&name, data);
        }

        tracing::debug!(members = map.len(), "loaded archive");
        Ok(map)
    }

    /// Build a map from already-decompressed entries.
    pub fn from_entries<I, P>(entries: I) -> Self
    where
        I: IntoIterator<Item = (P, Vec<u8>)>,
        P: AsRef<str>,
    {
        let mut map = Self::default();
        for (path, data) in entries {
            map.insert(path.as_ref(), data);
        }
        map
    }

    fn insert(&mut self, raw_name: &str, data: Vec<u8>) {
        let Some(path) = normalize_path(raw_name).filter(|p| !p.is_empty()) else {
            tracing::warn!(name = raw_name, "skipping archive member outside the archive root");
            return;
        };
        if self.index.contains_key(&path) {
            tracing::warn!(path = %path, "skipping duplicate archive member");
            return;
        }
        self.index.insert(path.clone(), self.files.len());
        self.files.push(ArchiveFile { path, data });
    }

    pub fn get(&self, path: &str) -> Option<&ArchiveFile> {
        self.index.get(path).map(|&i| &self.files[i])
    }

    pub fn contains(&self, path: &str) -> bool {
        self.index.contains_key(path)
    }

    /// Members in archive enumeration order.
    pub fn iter(&self) -> impl Iterator<Item = &ArchiveFile> {
        self.files.iter()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(|f| f.path.as_str())
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
