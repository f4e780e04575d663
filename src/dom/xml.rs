//! Namespace-aware XML front end for ArenaDom.
//!
//! Used for XHTML content documents and standalone SVG. Unlike the HTML
//! front end this one is strict: mismatched or unclosed tags are errors.

use std::borrow::Cow;

use html5ever::{LocalName, Namespace, Prefix, QualName};
use quick_xml::NsReader;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;

use super::arena::{ArenaDom, ArenaNodeId, Attribute};

/// Parse well-formed XML into an arena tree.
pub fn parse_xml(text: &str) -> Result<ArenaDom, String> {
    let mut reader = NsReader::from_str(text);
    reader.config_mut().trim_text(false);

    let mut dom = ArenaDom::new();
    let mut stack: Vec<ArenaNodeId> = vec![dom.document()];

    loop {
        let (ns, event) = reader.read_resolved_event().map_err(|e| e.to_string())?;
        let ns = namespace_of(&ns);

        match event {
            Event::Start(e) => {
                let id = create_element(&mut dom, &reader, ns, &e);
                dom.append(current(&stack), id);
                stack.push(id);
            }
            Event::Empty(e) => {
                let id = create_element(&mut dom, &reader, ns, &e);
                dom.append(current(&stack), id);
            }
            Event::End(_) => {
                if stack.len() <= 1 {
                    return Err("unexpected closing tag".to_string());
                }
                stack.pop();
            }
            Event::Text(e) => {
                dom.append_text(current(&stack), &String::from_utf8_lossy(e.as_ref()));
            }
            Event::CData(e) => {
                dom.append_text(current(&stack), &String::from_utf8_lossy(e.as_ref()));
            }
            Event::GeneralRef(e) => {
                let entity = String::from_utf8_lossy(e.as_ref());
                if let Some(resolved) = resolve_entity(&entity) {
                    dom.append_text(current(&stack), &resolved);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if stack.len() > 1 {
        return Err("unclosed element at end of document".to_string());
    }

    Ok(dom)
}

fn current(stack: &[ArenaNodeId]) -> ArenaNodeId {
    stack.last().copied().unwrap_or(ArenaNodeId::NONE)
}

fn create_element(
    dom: &mut ArenaDom,
    reader: &NsReader<&[u8]>,
    ns: Namespace,
    e: &BytesStart<'_>,
) -> ArenaNodeId {
    let name = e.name();
    let prefix = name.prefix().map(|p| Prefix::from(lossy(p.as_ref()).as_ref()));
    let local = LocalName::from(lossy(name.local_name().as_ref()).as_ref());

    let mut attrs = Vec::new();
    for attr in e.attributes().flatten() {
        if attr.key.as_namespace_binding().is_some() {
            continue;
        }
        let (attr_ns, attr_local) = reader.resolver().resolve_attribute(attr.key);
        let attr_ns = namespace_of(&attr_ns);
        let attr_prefix = attr
            .key
            .prefix()
            .map(|p| Prefix::from(lossy(p.as_ref()).as_ref()));

        let raw = lossy(&attr.value).into_owned();
        let value = match quick_xml::escape::unescape(&raw) {
            Ok(unescaped) => unescaped.into_owned(),
            Err(_) => raw,
        };

        attrs.push(Attribute {
            name: QualName::new(
                attr_prefix,
                attr_ns,
                LocalName::from(lossy(attr_local.as_ref()).as_ref()),
            ),
            value,
        });
    }

    dom.create_element(QualName::new(prefix, ns, local), attrs)
}

fn namespace_of(result: &ResolveResult<'_>) -> Namespace {
    match result {
        ResolveResult::Bound(ns) => Namespace::from(lossy(ns.as_ref()).as_ref()),
        _ => Namespace::from(""),
    }
}

fn lossy(bytes: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(bytes)
}

/// Resolve XML entity references.
fn resolve_entity(entity: &str) -> Option<String> {
    match entity {
        "apos" => return Some("'".to_string()),
        "quot" => return Some("\"".to_string()),
        "lt" => return Some("<".to_string()),
        "gt" => return Some(">".to_string()),
        "amp" => return Some("&".to_string()),
        _ => {}
    }

    if let Some(hex) = entity.strip_prefix("#x") {
        if let Ok(code) = u32::from_str_radix(hex, 16)
            && let Some(c) = char::from_u32(code)
        {
            return Some(c.to_string());
        }
    } else if let Some(dec) = entity.strip_prefix('#')
        && let Ok(code) = dec.parse::<u32>()
        && let Some(c) = char::from_u32(code)
    {
        return Some(c.to_string());
    }

    None
}
