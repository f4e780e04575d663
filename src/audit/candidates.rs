//! Selection of the images an audit reports on.

use std::collections::BTreeSet;

use crate::archive::ArchiveFileMap;
use crate::util::{file_extension, file_name};

use super::options::Options;

/// Raster extensions an audit considers, lowercase.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif"];

/// An archive member eligible for classification.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CandidateImage {
    pub path: String,
    /// Lowercase extension without the dot.
    pub file_ext: String,
}

impl CandidateImage {
    /// Final path segment.
    pub fn file_name(&self) -> &str {
        file_name(&self.path)
    }
}

/// Pick candidate images from the archive, in archive order.
///
/// A member qualifies when its extension is in [`IMAGE_EXTENSIONS`] and,
/// unless `search_all_images` is set, one of its directories is named
/// `images` (any case). With `follow_manifest_only` and a non-empty
/// `manifest_images`, it must also be declared in the manifest.
pub fn select_candidates(
    archive: &ArchiveFileMap,
    options: &Options,
    manifest_images: &BTreeSet<String>,
) -> Vec<CandidateImage> {
    let manifest_filter = options.follow_manifest_only && !manifest_images.is_empty();

    archive
        .paths()
        .filter_map(|path| {
            let ext = file_extension(path)?;
            if !IMAGE_EXTENSIONS.contains(&ext.as_str()) {
                return None;
            }
            if !options.search_all_images && !in_images_dir(path) {
                return None;
            }
            if manifest_filter && !manifest_images.contains(path) {
                return None;
            }
            Some(CandidateImage {
                path: path.to_string(),
                file_ext: ext,
            })
        })
        .collect()
}

fn in_images_dir(path: &str) -> bool {
    let mut segments: Vec<&str> = path.split('/').collect();
    segments.pop();
    segments.iter().any(|s| s.eq_ignore_ascii_case("images"))
}
