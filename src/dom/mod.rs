//! Tag trees and the query interface the reference collector relies on.
//!
//! The collector never touches a concrete parser. It asks a [`MarkupParser`]
//! for a tree and queries that tree through [`MarkupTree`]. The default
//! [`ArenaParser`] parses HTML with html5ever and XML with quick-xml, both
//! into an [`ArenaDom`].

mod arena;
mod tree_sink;
mod xml;

pub use arena::{ArenaDom, ArenaNode, ArenaNodeData, ArenaNodeId, Attribute, XLINK_NS};
pub use tree_sink::ArenaSink;
pub use xml::parse_xml;

use html5ever::driver::ParseOpts;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;

use crate::error::SkipReason;

/// Element selection supported by [`MarkupTree::find_all`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector<'a> {
    /// Elements with this local name.
    Tag(&'a str),
    /// Elements carrying this attribute (`local` or `prefix:local`).
    HasAttribute(&'a str),
}

/// Read-only queries over a parsed tag tree.
pub trait MarkupTree {
    type Node: Copy;

    /// Matching elements in document order.
    fn find_all(&self, selector: Selector<'_>) -> Vec<Self::Node>;

    /// Attribute value by `local` or `prefix:local` name.
    fn attribute(&self, node: Self::Node, name: &str) -> Option<&str>;

    /// Concatenated text content below `node`.
    fn text(&self, node: Self::Node) -> String;
}

impl MarkupTree for ArenaDom {
    type Node = ArenaNodeId;

    fn find_all(&self, selector: Selector<'_>) -> Vec<ArenaNodeId> {
        self.descendants(self.document())
            .into_iter()
            .filter(|&id| match selector {
                Selector::Tag(tag) => self.element_name(id) == Some(tag),
                Selector::HasAttribute(name) => self.get_attr(id, name).is_some(),
            })
            .collect()
    }

    fn attribute(&self, node: ArenaNodeId, name: &str) -> Option<&str> {
        self.get_attr(node, name)
    }

    fn text(&self, node: ArenaNodeId) -> String {
        self.text_content(node)
    }
}

/// How a document should be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    /// Lenient HTML5 parsing. Never fails.
    Html,
    /// Strict, namespace-aware XML parsing.
    Xml,
}

/// Parser collaborator producing queryable trees.
pub trait MarkupParser {
    type Tree: MarkupTree;

    fn parse(&self, text: &str, mode: ParseMode) -> Result<Self::Tree, SkipReason>;
}

/// Default parser: html5ever for HTML, quick-xml for XML.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArenaParser;

impl MarkupParser for ArenaParser {
    type Tree = ArenaDom;

    fn parse(&self, text: &str, mode: ParseMode) -> Result<ArenaDom, SkipReason> {
        match mode {
            ParseMode::Html => Ok(parse_html(text)),
            ParseMode::Xml => parse_xml(text).map_err(SkipReason::MalformedXml),
        }
    }
}

/// Parse HTML leniently into an arena tree.
pub fn parse_html(html: &str) -> ArenaDom {
    parse_document(ArenaSink::new(), ParseOpts::default())
        .one(html)
        .into_dom()
}
