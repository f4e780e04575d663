//! # imgaudit
//!
//! Finds images in an EPUB that no document references, and images whose
//! pixel area reaches a threshold.
//!
//! ## Quick Start
//!
//! ```no_run
//! use imgaudit::{Options, audit_epub};
//!
//! let bytes = std::fs::read("book.epub").unwrap();
//! let report = audit_epub(&bytes, &Options::default().with_css(true)).unwrap();
//! print!("{}", report.summary(""));
//! ```
//!
//! ## How references are found
//!
//! The content root is the directory of the package document named by
//! `META-INF/container.xml`. Every `.xhtml` document is scanned for
//! `img/@src`, `srcset` candidates and `url()` in `style` attributes.
//! [`Options`] adds `.html` documents, stylesheets and SVG. References are
//! resolved to canonical archive paths and must stay inside the content
//! root:
//!
//! ```
//! use imgaudit::{ArchiveFileMap, Auditor, Options};
//!
//! let archive = ArchiveFileMap::from_entries([
//!     ("content/index.xhtml", br#"<html><body><img src="images/a.png"/></body></html>"#.to_vec()),
//!     ("content/images/a.png", Vec::new()),
//!     ("content/images/b.png", Vec::new()),
//! ]);
//! let report = Auditor::new(Options::default()).run(&archive);
//! let unreferenced: Vec<_> = report.result.unreferenced.iter().map(|c| c.file_name()).collect();
//! assert_eq!(unreferenced, vec!["b.png"]);
//! ```

pub mod archive;
pub mod audit;
pub mod dom;
pub mod epub;
pub mod error;
pub mod report;
pub mod util;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use archive::{ArchiveFile, ArchiveFileMap};
pub use audit::{Auditor, ClassificationResult, ContentRoot, DEFAULT_PIXEL_THRESHOLD, Options};
pub use error::{Error, Result, Skip, SkipReason};
pub use report::AuditReport;

/// Audit a zipped EPUB held in memory with the default collaborators.
///
/// Fails only when `bytes` is not a readable zip archive.
pub fn audit_epub(bytes: &[u8], options: &Options) -> Result<AuditReport> {
    Auditor::new(options.clone()).run_bytes(bytes)
}
