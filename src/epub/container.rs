//! `META-INF/container.xml` parsing.

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::error::SkipReason;
use crate::util::strip_bom;

use super::local_name;

/// Well-known location of the container descriptor.
pub const CONTAINER_PATH: &str = "META-INF/container.xml";

/// Every `rootfile/@full-path` in declaration order.
///
/// A descriptor that parses but declares no rootfile yields
/// `SkipReason::NoStructure`.
pub fn parse_container_xml(bytes: &[u8]) -> Result<Vec<String>, SkipReason> {
    let content = String::from_utf8_lossy(strip_bom(bytes));
    let mut reader = Reader::from_str(&content);
    reader.config_mut().trim_text(true);

    let mut rootfiles = Vec::new();
    loop {
        match reader.read_event() {
            Ok(Event::Empty(e)) | Ok(Event::Start(e))
                if local_name(e.name().as_ref()) == b"rootfile" =>
            {
                for attr in e.attributes().flatten() {
                    if attr.key.as_ref() == b"full-path" {
                        let path = String::from_utf8_lossy(&attr.value).trim().to_string();
                        if !path.is_empty() {
                            rootfiles.push(path);
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(SkipReason::MalformedXml(e.to_string())),
            _ => {}
        }
    }

    if rootfiles.is_empty() {
        return Err(SkipReason::NoStructure);
    }
    Ok(rootfiles)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_container_xml() {
        let container = br#"<?xml version="1.0"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#;

        assert_eq!(parse_container_xml(container).unwrap(), vec!["OEBPS/content.opf"]);
    }

    #[test]
    fn test_with_bom_and_prefix() {
        let mut container = vec![0xEF, 0xBB, 0xBF];
        container.extend_from_slice(
            br#"<c:container xmlns:c="urn:oasis:names:tc:opendocument:xmlns:container">
  <c:rootfiles><c:rootfile full-path="content.opf"/></c:rootfiles>
</c:container>"#,
        );
        assert_eq!(parse_container_xml(&container).unwrap(), vec!["content.opf"]);
    }

    #[test]
    fn test_declaration_order_kept() {
        let container = br#"<container><rootfiles>
  <rootfile full-path="a/first.opf"/>
  <rootfile full-path="b/second.opf"/>
</rootfiles></container>"#;
        assert_eq!(
            parse_container_xml(container).unwrap(),
            vec!["a/first.opf", "b/second.opf"]
        );
    }

    #[test]
    fn test_missing_rootfile() {
        let container = br#"<container><rootfiles/></container>"#;
        assert_eq!(parse_container_xml(container), Err(SkipReason::NoStructure));
    }

    #[test]
    fn test_malformed() {
        let container = br#"<container><rootfiles></container>"#;
        assert!(matches!(parse_container_xml(container), Err(SkipReason::MalformedXml(_))));
    }
}
