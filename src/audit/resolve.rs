//! Resolution of document references to canonical archive paths.
//!
//! All of this is string arithmetic over archive member names. Nothing here
//! touches a filesystem and archive names always use `/`, so `std::path` is
//! not used.

use std::fmt;

use percent_encoding::percent_decode_str;

/// Directory subtree holding the package content, e.g. `OEBPS`.
///
/// An empty root means the archive is audited unscoped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ContentRoot(String);

impl ContentRoot {
    /// Root that places no restriction on resolved paths.
    pub fn unscoped() -> Self {
        Self(String::new())
    }

    /// Build a root from a directory path, normalizing separators.
    ///
    /// A directory that climbs out of the archive yields the unscoped root.
    pub fn new(dir: &str) -> Self {
        Self(normalize_path(dir).unwrap_or_default())
    }

    /// Root for a package document: its containing directory.
    pub fn from_package_path(package_path: &str) -> Self {
        Self::new(parent_dir(package_path))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_scoped(&self) -> bool {
        !self.0.is_empty()
    }

    /// Whether a canonical path lies at or below this root.
    pub fn contains(&self, path: &str) -> bool {
        if self.0.is_empty() {
            return true;
        }
        match path.strip_prefix(self.0.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }

    /// Join a root-relative path onto the root.
    fn join(&self, relative: &str) -> String {
        if self.0.is_empty() {
            relative.to_string()
        } else {
            format!("{}/{}", self.0, relative)
        }
    }
}

impl fmt::Display for ContentRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolve a raw reference found in `base_path` to a canonical archive path.
///
/// Returns `None` when the reference points outside the archive (absolute
/// URLs, data URIs), carries nothing but a fragment or query, climbs above
/// the archive top, or leaves a scoped `root`.
///
/// ```
/// use imgaudit::audit::{ContentRoot, resolve};
///
/// let root = ContentRoot::new("OEBPS");
/// assert_eq!(
///     resolve("OEBPS/text/ch1.xhtml", "../images/a%20b.png#x", &root).as_deref(),
///     Some("OEBPS/images/a b.png")
/// );
/// assert_eq!(resolve("OEBPS/text/ch1.xhtml", "../../META-INF/x.png", &root), None);
/// ```
pub fn resolve(base_path: &str, raw_ref: &str, root: &ContentRoot) -> Option<String> {
    let reference = raw_ref.trim_matches(|c: char| c.is_ascii_whitespace());
    if reference.is_empty() || is_external(reference) {
        return None;
    }

    let end = reference.find(['#', '?']).unwrap_or(reference.len());
    let reference = &reference[..end];
    if reference.is_empty() {
        return None;
    }

    let decoded = match percent_decode_str(reference).decode_utf8() {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => reference.to_string(),
    };

    let joined = if let Some(absolute) = decoded.strip_prefix('/') {
        root.join(absolute.trim_start_matches('/'))
    } else {
        match parent_dir(base_path) {
            "" => decoded,
            dir => format!("{dir}/{decoded}"),
        }
    };

    let resolved = normalize_path(&joined)?;
    if resolved.is_empty() || !root.contains(&resolved) {
        return None;
    }
    Some(resolved)
}

/// Whether a reference addresses something outside the archive.
pub fn is_external(reference: &str) -> bool {
    if reference
        .get(..5)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("data:"))
    {
        return true;
    }

    let Some(colon) = reference.find("://") else {
        return false;
    };
    let scheme = &reference[..colon];
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Collapse `.` and `..` segments of a `/`-separated path.
///
/// Backslashes are treated as separators, empty segments are dropped and the
/// result never has a leading slash. Returns `None` if a `..` would climb
/// above the top of the archive.
pub fn normalize_path(path: &str) -> Option<String> {
    let mut parts: Vec<&str> = Vec::new();
    for segment in path.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop()?;
            }
            s => parts.push(s),
        }
    }
    Some(parts.join("/"))
}

/// Directory part of an archive path (everything before the last `/`).
pub fn parent_dir(path: &str) -> &str {
    path.rfind('/').map(|i| &path[..i]).unwrap_or("")
}
