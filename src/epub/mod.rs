//! Locating the content root and manifest of an EPUB package.

mod container;
mod package;

pub use container::{CONTAINER_PATH, parse_container_xml};
pub use package::parse_manifest_images;

use std::collections::BTreeSet;

use crate::archive::ArchiveFileMap;
use crate::audit::{ContentRoot, normalize_path, resolve};
use crate::error::{Skip, SkipReason};
use crate::util::{decode_document, file_extension};

/// Where the package document lives and the root it implies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageLocation {
    pub root: ContentRoot,
    /// Canonical path of the package document declared by the container.
    pub package_path: Option<String>,
}

impl PackageLocation {
    /// No container information: unscoped, no declared package.
    pub fn unscoped() -> Self {
        Self::default()
    }
}

/// Read the container descriptor and derive the content root from its
/// first declared rootfile.
pub fn locate_package(archive: &ArchiveFileMap) -> Result<PackageLocation, Skip> {
    let container = archive
        .get(CONTAINER_PATH)
        .ok_or_else(|| Skip::new(CONTAINER_PATH, SkipReason::Missing))?;

    let rootfiles = parse_container_xml(&container.data)
        .map_err(|reason| Skip::new(CONTAINER_PATH, reason))?;

    let package_path = rootfiles
        .first()
        .and_then(|path| normalize_path(path))
        .filter(|path| !path.is_empty())
        .ok_or_else(|| Skip::new(CONTAINER_PATH, SkipReason::NoStructure))?;

    Ok(PackageLocation {
        root: ContentRoot::from_package_path(&package_path),
        package_path: Some(package_path),
    })
}

/// Content root only. Soft failures give the unscoped root.
pub fn locate_root(archive: &ArchiveFileMap) -> ContentRoot {
    match locate_package(archive) {
        Ok(location) => location.root,
        Err(skip) => {
            tracing::debug!(%skip, "no content root, auditing unscoped");
            ContentRoot::unscoped()
        }
    }
}

/// Canonical paths of the images the package manifest declares.
///
/// The package document declared by the container is used when it exists.
/// Failing that, and only under a scoped root, the first `.opf` member below
/// the root is used instead. Hrefs resolve against the package document.
/// `Ok` with an empty set means there was nothing to look up.
pub fn locate_manifest_images(
    archive: &ArchiveFileMap,
    location: &PackageLocation,
) -> Result<BTreeSet<String>, Skip> {
    let declared = location
        .package_path
        .as_deref()
        .filter(|path| archive.contains(path));

    let package_path = match declared {
        Some(path) => path,
        None if location.root.is_scoped() => {
            let fallback = archive.paths().find(|path| {
                location.root.contains(path) && file_extension(path).as_deref() == Some("opf")
            });
            match fallback {
                Some(path) => {
                    tracing::debug!(
                        path,
                        "declared package document missing, using first .opf under root"
                    );
                    path
                }
                None => {
                    let missing =
                        location.package_path.as_deref().unwrap_or(location.root.as_str());
                    return Err(Skip::new(missing, SkipReason::Missing));
                }
            }
        }
        None => return Ok(BTreeSet::new()),
    };

    let Some(file) = archive.get(package_path) else {
        return Err(Skip::new(package_path, SkipReason::Missing));
    };
    let hrefs = parse_manifest_images(&decode_document(&file.data))
        .map_err(|reason| Skip::new(package_path, reason))?;

    Ok(hrefs
        .iter()
        .filter_map(|href| resolve(package_path, href, &location.root))
        .collect())
}

/// Local part of a possibly prefixed XML name (`opf:item` -> `item`).
fn local_name(name: &[u8]) -> &[u8] {
    name.iter()
        .rposition(|&b| b == b':')
        .map(|i| &name[i + 1..])
        .unwrap_or(name)
}

/// Attribute value with XML escapes expanded.
fn attr_value(raw: &[u8]) -> String {
    let lossy = String::from_utf8_lossy(raw);
    match quick_xml::escape::unescape(&lossy) {
        Ok(unescaped) => unescaped.into_owned(),
        Err(_) => lossy.into_owned(),
    }
}
