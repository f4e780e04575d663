//! Collection of the resources that documents reference.

use std::collections::BTreeSet;

use crate::archive::ArchiveFileMap;
use crate::dom::{ArenaParser, MarkupParser, MarkupTree, ParseMode, Selector};
use crate::error::{Skip, SkipReason};
use crate::util::{decode_document, file_extension};

use super::css;
use super::options::Options;
use super::resolve::{ContentRoot, resolve};

/// How an archive member is scanned for references.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// `.xhtml`, always scanned, parsed as XML.
    Xhtml,
    /// `.html` / `.htm`, parsed leniently.
    Html,
    Stylesheet,
    Svg,
}

impl DocumentKind {
    /// Classify a member by extension. `None` means it is not scanned
    /// under `options`.
    pub fn of(path: &str, options: &Options) -> Option<Self> {
        match file_extension(path)?.as_str() {
            "xhtml" => Some(Self::Xhtml),
            "html" | "htm" if options.include_html => Some(Self::Html),
            "css" if options.include_css => Some(Self::Stylesheet),
            "svg" if options.include_svg => Some(Self::Svg),
            _ => None,
        }
    }
}

/// Canonical paths referenced by at least one scanned document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceSet(BTreeSet<String>);

impl ReferenceSet {
    pub fn contains(&self, path: &str) -> bool {
        self.0.contains(path)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Paths in lexicographic order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for ReferenceSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Outcome of a collection pass.
#[derive(Debug, Clone, Default)]
pub struct Collection {
    pub used: ReferenceSet,
    /// Documents that contributed nothing because they failed to parse.
    pub skipped: Vec<Skip>,
}

/// Scans documents through a [`MarkupParser`] and resolves what they reference.
#[derive(Debug, Clone, Default)]
pub struct ReferenceCollector<P = ArenaParser> {
    parser: P,
}

impl ReferenceCollector<ArenaParser> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<P: MarkupParser> ReferenceCollector<P> {
    pub fn with_parser(parser: P) -> Self {
        Self { parser }
    }

    /// Scan every document member and resolve its references against `root`.
    pub fn collect(
        &self,
        archive: &ArchiveFileMap,
        root: &ContentRoot,
        options: &Options,
    ) -> Collection {
        let mut collection = Collection::default();
        let mut used = BTreeSet::new();

        for file in archive.iter() {
            let Some(kind) = DocumentKind::of(&file.path, options) else {
                continue;
            };
            let text = decode_document(&file.data);

            match self.raw_references(&file.path, &text, kind, options) {
                Ok(raw) => {
                    for reference in raw {
                        if let Some(resolved) = resolve(&file.path, &reference, root) {
                            used.insert(resolved);
                        }
                    }
                }
                Err(reason) => {
                    tracing::debug!(path = %file.path, %reason, "skipping document");
                    collection.skipped.push(Skip::new(file.path.clone(), reason));
                }
            }
        }

        collection.used = ReferenceSet(used);
        collection
    }

    /// Unresolved reference strings found in one document.
    fn raw_references(
        &self,
        path: &str,
        text: &str,
        kind: DocumentKind,
        options: &Options,
    ) -> Result<Vec<String>, SkipReason> {
        match kind {
            DocumentKind::Xhtml => match self.parser.parse(text, ParseMode::Xml) {
                Ok(tree) => Ok(markup_references(&tree, options)),
                Err(reason) => {
                    tracing::debug!(path, %reason, "XHTML is not well-formed, reparsing as HTML");
                    let tree = self.parser.parse(text, ParseMode::Html)?;
                    Ok(markup_references(&tree, options))
                }
            },
            DocumentKind::Html => {
                let tree = self.parser.parse(text, ParseMode::Html)?;
                Ok(markup_references(&tree, options))
            }
            DocumentKind::Stylesheet => Ok(css::extract_urls(text)),
            DocumentKind::Svg => {
                let tree = self.parser.parse(text, ParseMode::Xml)?;
                let mut refs = image_links(&tree);
                refs.extend(style_element_urls(&tree));
                refs.extend(style_attribute_urls(&tree));
                Ok(refs)
            }
        }
    }
}

/// Collect with the default parser.
pub fn collect_used_references(
    archive: &ArchiveFileMap,
    root: &ContentRoot,
    options: &Options,
) -> Collection {
    ReferenceCollector::new().collect(archive, root, options)
}

fn markup_references<T: MarkupTree>(tree: &T, options: &Options) -> Vec<String> {
    let mut refs: Vec<String> = tree
        .find_all(Selector::Tag("img"))
        .into_iter()
        .filter_map(|node| tree.attribute(node, "src"))
        .map(str::to_string)
        .collect();

    for node in tree.find_all(Selector::HasAttribute("srcset")) {
        if let Some(srcset) = tree.attribute(node, "srcset") {
            refs.extend(srcset_urls(srcset));
        }
    }

    refs.extend(style_attribute_urls(tree));

    if options.include_svg {
        refs.extend(image_links(tree));
    }
    if options.include_css {
        refs.extend(style_element_urls(tree));
    }

    refs
}

/// URL token of each comma-separated `srcset` candidate.
fn srcset_urls(srcset: &str) -> impl Iterator<Item = String> + '_ {
    srcset
        .split(',')
        .filter_map(|candidate| candidate.split_ascii_whitespace().next())
        .map(str::to_string)
}

/// `href` and `xlink:href` of `<image>` elements.
fn image_links<T: MarkupTree>(tree: &T) -> Vec<String> {
    let mut refs = Vec::new();
    for node in tree.find_all(Selector::Tag("image")) {
        for name in ["href", "xlink:href"] {
            if let Some(href) = tree.attribute(node, name) {
                refs.push(href.to_string());
            }
        }
    }
    refs
}

fn style_element_urls<T: MarkupTree>(tree: &T) -> Vec<String> {
    tree.find_all(Selector::Tag("style"))
        .into_iter()
        .flat_map(|node| css::extract_urls(&tree.text(node)))
        .collect()
}

fn style_attribute_urls<T: MarkupTree>(tree: &T) -> Vec<String> {
    tree.find_all(Selector::HasAttribute("style"))
        .into_iter()
        .filter_map(|node| tree.attribute(node, "style"))
        .flat_map(css::extract_urls)
        .collect()
}
