//! The audit pipeline: locate, select, collect, classify.
//!
//! ```text
//! ArchiveFileMap
//!   -> epub::locate_package        content root + package document
//!   -> epub::locate_manifest_images (only with follow_manifest_only)
//!   -> select_candidates           images eligible for reporting
//!   -> ReferenceCollector::collect every resolved reference
//!   -> classify                    unreferenced + oversized
//!   -> AuditReport
//! ```

pub mod candidates;
pub mod css;
pub mod options;
pub mod reconcile;
pub mod references;
pub mod resolve;

pub use candidates::{CandidateImage, IMAGE_EXTENSIONS, select_candidates};
pub use options::{DEFAULT_PIXEL_THRESHOLD, Options};
pub use reconcile::{ClassificationResult, DimensionProvider, HeaderProbe, OversizedImage, classify};
pub use references::{
    Collection, DocumentKind, ReferenceCollector, ReferenceSet, collect_used_references,
};
pub use resolve::{ContentRoot, is_external, normalize_path, parent_dir, resolve};

use std::collections::BTreeSet;

use tracing::instrument;

use crate::archive::ArchiveFileMap;
use crate::dom::{ArenaParser, MarkupParser};
use crate::epub::{self, PackageLocation};
use crate::error::Result;
use crate::report::AuditReport;

/// Runs audits with a fixed configuration and collaborators.
///
/// ```no_run
/// use imgaudit::{Auditor, Options};
///
/// let bytes = std::fs::read("book.epub")?;
/// let report = Auditor::new(Options::default().with_css(true)).run_bytes(&bytes)?;
/// println!("{}", report.summary(""));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct Auditor<P = ArenaParser, D = HeaderProbe> {
    options: Options,
    collector: ReferenceCollector<P>,
    dimensions: D,
}

impl Auditor {
    pub fn new(options: Options) -> Self {
        Self {
            options,
            collector: ReferenceCollector::new(),
            dimensions: HeaderProbe,
        }
    }
}

impl<P: MarkupParser, D: DimensionProvider> Auditor<P, D> {
    /// Replace the markup parser.
    pub fn with_parser<Q: MarkupParser>(self, parser: Q) -> Auditor<Q, D> {
        Auditor {
            options: self.options,
            collector: ReferenceCollector::with_parser(parser),
            dimensions: self.dimensions,
        }
    }

    /// Replace the image dimension provider.
    pub fn with_dimensions<E: DimensionProvider>(self, dimensions: E) -> Auditor<P, E> {
        Auditor {
            options: self.options,
            collector: self.collector,
            dimensions,
        }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Audit an already-loaded archive.
    ///
    /// Never fails: missing descriptors and unparsable members only narrow
    /// what the audit can see and are listed in [`AuditReport::skipped`].
    #[instrument(skip_all, fields(members = archive.len()))]
    pub fn run(&self, archive: &ArchiveFileMap) -> AuditReport {
        let options = &self.options;
        let mut skipped = Vec::new();

        let location = epub::locate_package(archive).unwrap_or_else(|skip| {
            tracing::debug!(%skip, "no content root, auditing unscoped");
            skipped.push(skip);
            PackageLocation::unscoped()
        });
        let root = location.root.clone();

        let manifest_images = if options.follow_manifest_only {
            epub::locate_manifest_images(archive, &location).unwrap_or_else(|skip| {
                tracing::debug!(%skip, "no manifest, candidates are not restricted");
                skipped.push(skip);
                BTreeSet::new()
            })
        } else {
            BTreeSet::new()
        };

        let candidates = select_candidates(archive, options, &manifest_images);
        let collection = self.collector.collect(archive, &root, options);
        skipped.extend(collection.skipped);

        let (result, probe_skips) = classify(
            &candidates,
            &collection.used,
            archive,
            &self.dimensions,
            options.pixel_threshold,
        );
        skipped.extend(probe_skips);

        tracing::info!(
            root = %root,
            candidates = candidates.len(),
            references = collection.used.len(),
            unreferenced = result.unreferenced.len(),
            oversized = result.oversized.len(),
            skipped = skipped.len(),
            "audit finished"
        );

        AuditReport {
            content_root: root,
            pixel_threshold: options.pixel_threshold,
            result,
            skipped,
        }
    }

    /// Decompress `bytes` as a zip archive and audit it.
    pub fn run_bytes(&self, bytes: &[u8]) -> Result<AuditReport> {
        let archive = ArchiveFileMap::from_bytes(bytes)?;
        Ok(self.run(&archive))
    }
}
