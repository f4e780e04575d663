//! Audit results and their rendering.

use std::fmt::Write;

use crate::audit::{ClassificationResult, ContentRoot};
use crate::error::Skip;

/// Outcome of one audit run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditReport {
    /// Root the references were scoped to. Empty when unscoped.
    pub content_root: ContentRoot,
    pub pixel_threshold: u64,
    pub result: ClassificationResult,
    /// Members that were left out of some step, with the reason.
    pub skipped: Vec<Skip>,
}

/// An image listed in the report.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ImageEntry {
    pub file_name: String,
    /// Canonical archive path.
    pub path: String,
    /// `path` joined onto the caller's display prefix.
    pub display_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct OversizedEntry {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub image: ImageEntry,
    pub width: u32,
    pub height: u32,
    pub pixel_area: u64,
}

/// Report rows ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ReportEntries {
    pub content_root: String,
    pub pixel_threshold: u64,
    pub unreferenced: Vec<ImageEntry>,
    pub oversized: Vec<OversizedEntry>,
    pub skipped: Vec<Skip>,
}

impl AuditReport {
    /// Build display rows, joining each path onto `display_prefix`.
    pub fn entries(&self, display_prefix: &str) -> ReportEntries {
        let entry = |path: &str| ImageEntry {
            file_name: crate::util::file_name(path).to_string(),
            path: path.to_string(),
            display_path: display_path(display_prefix, path),
        };

        ReportEntries {
            content_root: self.content_root.to_string(),
            pixel_threshold: self.pixel_threshold,
            unreferenced: self
                .result
                .unreferenced
                .iter()
                .map(|image| entry(&image.path))
                .collect(),
            oversized: self
                .result
                .oversized
                .iter()
                .map(|o| OversizedEntry {
                    image: entry(&o.image.path),
                    width: o.width,
                    height: o.height,
                    pixel_area: o.pixel_area,
                })
                .collect(),
            skipped: self.skipped.clone(),
        }
    }

    /// Two numbered sections followed by the content root.
    ///
    /// ```text
    /// Unreferenced images (1):
    ///   1. b.png  (OEBPS/images/b.png)
    ///
    /// Oversized images (0, threshold 5600000 px):
    ///   (none)
    ///
    /// Content root: OEBPS
    /// ```
    pub fn summary(&self, display_prefix: &str) -> String {
        let entries = self.entries(display_prefix);
        let mut out = String::new();

        let _ = writeln!(out, "Unreferenced images ({}):", entries.unreferenced.len());
        if entries.unreferenced.is_empty() {
            out.push_str("  (none)\n");
        }
        for (i, e) in entries.unreferenced.iter().enumerate() {
            let _ = writeln!(out, "  {}. {}  ({})", i + 1, e.file_name, e.display_path);
        }

        let _ = writeln!(
            out,
            "\nOversized images ({}, threshold {} px):",
            entries.oversized.len(),
            entries.pixel_threshold
        );
        if entries.oversized.is_empty() {
            out.push_str("  (none)\n");
        }
        for (i, e) in entries.oversized.iter().enumerate() {
            let _ = writeln!(
                out,
                "  {}. {}  ({})  {}x{} = {} px",
                i + 1,
                e.image.file_name,
                e.image.display_path,
                e.width,
                e.height,
                e.pixel_area
            );
        }

        let root = if entries.content_root.is_empty() {
            "(archive root)"
        } else {
            entries.content_root.as_str()
        };
        let _ = writeln!(out, "\nContent root: {root}");
        out
    }

    /// Pretty-printed JSON of [`AuditReport::entries`].
    #[cfg(feature = "serde")]
    pub fn to_json(&self, display_prefix: &str) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(&self.entries(display_prefix))?)
    }
}

/// Join a canonical path onto a display prefix.
///
/// Trailing slashes on the prefix are ignored. An empty prefix leaves the
/// path unchanged.
pub fn display_path(prefix: &str, path: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        path.to_string()
    } else {
        format!("{prefix}/{path}")
    }
}
