//! Package document (OPF) manifest parsing.

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::error::SkipReason;

use super::{attr_value, local_name};

/// Raw `href` of every manifest item with an `image/*` media type.
///
/// Items keep their declaration order. Only items inside `<manifest>` are
/// considered.
pub fn parse_manifest_images(content: &str) -> Result<Vec<String>, SkipReason> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut hrefs = Vec::new();
    let mut in_manifest = false;
    let mut saw_package = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match local_name(e.name().as_ref()) {
                b"package" => saw_package = true,
                b"manifest" => in_manifest = true,
                b"item" if in_manifest => hrefs.extend(image_href(&e)),
                _ => {}
            },
            Ok(Event::Empty(e)) if in_manifest && local_name(e.name().as_ref()) == b"item" => {
                hrefs.extend(image_href(&e));
            }
            Ok(Event::End(e)) if local_name(e.name().as_ref()) == b"manifest" => {
                in_manifest = false;
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(SkipReason::MalformedXml(e.to_string())),
            _ => {}
        }
    }

    if !saw_package {
        return Err(SkipReason::NoStructure);
    }
    Ok(hrefs)
}

fn image_href(e: &quick_xml::events::BytesStart<'_>) -> Option<String> {
    let mut href = None;
    let mut media_type = None;

    for attr in e.attributes().flatten() {
        match attr.key.as_ref() {
            b"href" => href = Some(attr_value(&attr.value)),
            b"media-type" => media_type = Some(attr_value(&attr.value)),
            _ => {}
        }
    }

    let is_image = media_type.is_some_and(|mt| {
        mt.trim()
            .get(..6)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("image/"))
    });
    if is_image { href.filter(|h| !h.trim().is_empty()) } else { None }
}
