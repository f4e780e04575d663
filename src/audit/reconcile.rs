//! Classification of candidates into unreferenced and oversized images.

use crate::archive::ArchiveFileMap;
use crate::error::{Skip, SkipReason};
use crate::util::{ImageDimensions, extract_image_dimensions};

use super::candidates::{CandidateImage, IMAGE_EXTENSIONS};
use super::references::ReferenceSet;

/// Source of pixel dimensions for image bytes.
pub trait DimensionProvider {
    fn dimensions(&self, data: &[u8]) -> Result<ImageDimensions, SkipReason>;
}

/// Reads dimensions from PNG, JPEG and GIF headers without decoding pixels.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderProbe;

impl DimensionProvider for HeaderProbe {
    fn dimensions(&self, data: &[u8]) -> Result<ImageDimensions, SkipReason> {
        extract_image_dimensions(data).ok_or(SkipReason::UnknownImageFormat)
    }
}

impl<F> DimensionProvider for F
where
    F: Fn(&[u8]) -> Option<ImageDimensions>,
{
    fn dimensions(&self, data: &[u8]) -> Result<ImageDimensions, SkipReason> {
        self(data).ok_or(SkipReason::UnknownImageFormat)
    }
}

/// A candidate whose pixel area reached the threshold.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct OversizedImage {
    pub image: CandidateImage,
    pub width: u32,
    pub height: u32,
    pub pixel_area: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ClassificationResult {
    pub unreferenced: Vec<CandidateImage>,
    pub oversized: Vec<OversizedImage>,
}

/// Split `candidates` into unreferenced and oversized images.
///
/// The two checks are independent, so one image can appear in both lists.
/// An image whose dimensions cannot be read is left out of the oversized
/// check and reported as a [`Skip`]. Both lists are sorted by path.
pub fn classify<D: DimensionProvider + ?Sized>(
    candidates: &[CandidateImage],
    used: &ReferenceSet,
    archive: &ArchiveFileMap,
    provider: &D,
    pixel_threshold: u64,
) -> (ClassificationResult, Vec<Skip>) {
    let mut result = ClassificationResult::default();
    let mut skipped = Vec::new();

    for candidate in candidates {
        if !used.contains(&candidate.path) {
            result.unreferenced.push(candidate.clone());
        }

        if !IMAGE_EXTENSIONS.contains(&candidate.file_ext.as_str()) {
            continue;
        }
        let Some(file) = archive.get(&candidate.path) else {
            skipped.push(Skip::new(candidate.path.clone(), SkipReason::Missing));
            continue;
        };

        match provider.dimensions(&file.data) {
            Ok(dims) => {
                let pixel_area = dims.pixel_area();
                if pixel_area >= pixel_threshold {
                    result.oversized.push(OversizedImage {
                        image: candidate.clone(),
                        width: dims.width,
                        height: dims.height,
                        pixel_area,
                    });
                }
            }
            Err(reason) => {
                tracing::debug!(path = %candidate.path, %reason, "could not read image dimensions");
                skipped.push(Skip::new(candidate.path.clone(), reason));
            }
        }
    }

    result.unreferenced.sort_by(|a, b| a.path.cmp(&b.path));
    result.oversized.sort_by(|a, b| a.image.path.cmp(&b.image.path));
    (result, skipped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::fixtures::png_header;

    fn candidate(path: &str) -> CandidateImage {
        CandidateImage {
            path: path.to_string(),
            file_ext: path.rsplit('.').next().unwrap().to_ascii_lowercase(),
        }
    }

    #[test]
    fn test_unreferenced_sorted_by_path() {
        let candidates = [
            candidate("images/z.png"),
            candidate("images/a.png"),
            candidate("images/m.png"),
        ];
        let used: ReferenceSet = ["images/m.png"].into_iter().collect();
        let archive = ArchiveFileMap::default();
        let no_dims = |_: &[u8]| -> Option<ImageDimensions> { None };

        let (result, _) = classify(&candidates, &used, &archive, &no_dims, 100);
        let paths: Vec<_> = result.unreferenced.iter().map(|c| c.path.as_str()).collect();
        assert_eq!(paths, vec!["images/a.png", "images/z.png"]);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let archive = ArchiveFileMap::from_entries([
            ("images/exact.png", png_header(100, 56)),
            ("images/below.png", png_header(99, 56)),
        ]);
        let candidates = [candidate("images/exact.png"), candidate("images/below.png")];
        let used: ReferenceSet = ["images/exact.png", "images/below.png"].into_iter().collect();

        let (result, skipped) = classify(&candidates, &used, &archive, &HeaderProbe, 5_600);
        assert!(result.unreferenced.is_empty());
        assert!(skipped.is_empty());
        assert_eq!(result.oversized.len(), 1);
        assert_eq!(result.oversized[0].image.path, "images/exact.png");
        assert_eq!(result.oversized[0].pixel_area, 5_600);
    }

    #[test]
    fn test_image_in_both_lists() {
        let archive = ArchiveFileMap::from_entries([("images/big.png", png_header(3000, 2000))]);
        let candidates = [candidate("images/big.png")];

        let (result, _) = classify(
            &candidates,
            &ReferenceSet::default(),
            &archive,
            &HeaderProbe,
            5_600_000,
        );
        assert_eq!(result.unreferenced.len(), 1);
        assert_eq!(result.oversized.len(), 1);
        assert_eq!(result.oversized[0].width, 3000);
        assert_eq!(result.oversized[0].height, 2000);
        assert_eq!(result.oversized[0].pixel_area, 6_000_000);
    }

    #[test]
    fn test_probe_failure_is_skip() {
        let archive =
            ArchiveFileMap::from_entries([("images/corrupt.jpg", b"not a jpeg".to_vec())]);
        let candidates = [candidate("images/corrupt.jpg")];

        let (result, skipped) =
            classify(&candidates, &ReferenceSet::default(), &archive, &HeaderProbe, 1);
        assert_eq!(result.unreferenced.len(), 1);
        assert!(result.oversized.is_empty());
        assert_eq!(
            skipped,
            vec![Skip::new("images/corrupt.jpg", SkipReason::UnknownImageFormat)]
        );
    }

    #[test]
    fn test_area_does_not_overflow() {
        let archive = ArchiveFileMap::from_entries([("images/huge.png", Vec::new())]);
        let candidates = [candidate("images/huge.png")];
        let huge = |_: &[u8]| Some(ImageDimensions::new(u32::MAX, u32::MAX));

        let (result, _) = classify(&candidates, &ReferenceSet::default(), &archive, &huge, 1 << 63);
        assert_eq!(result.oversized[0].pixel_area, u64::from(u32::MAX) * u64::from(u32::MAX));
    }
}
