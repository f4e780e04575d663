//! Shared helpers for building EPUB archives in memory.

#![allow(dead_code)]

use std::io::{Cursor, Write};

use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

pub const CONTAINER_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="content/package.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#;

/// Builds a zipped EPUB with `mimetype` stored first.
pub struct EpubBuilder {
    entries: Vec<(String, Vec<u8>)>,
}

impl EpubBuilder {
    /// Package rooted at `content/` with an empty manifest.
    pub fn new() -> Self {
        Self::bare()
            .file("META-INF/container.xml", CONTAINER_XML)
            .file("content/package.opf", &package_opf(&[]))
    }

    /// No container or package document.
    pub fn bare() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn file(self, path: &str, body: &str) -> Self {
        self.bytes(path, body.as_bytes().to_vec())
    }

    pub fn bytes(mut self, path: &str, data: Vec<u8>) -> Self {
        self.entries.retain(|(p, _)| p != path);
        self.entries.push((path.to_string(), data));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        zip.start_file("mimetype", stored).unwrap();
        zip.write_all(b"application/epub+zip").unwrap();

        for (path, data) in &self.entries {
            zip.start_file(path.as_str(), deflated).unwrap();
            zip.write_all(data).unwrap();
        }

        zip.finish().unwrap().into_inner()
    }
}

/// Package document whose manifest lists `(href, media-type)` items.
pub fn package_opf(items: &[(&str, &str)]) -> String {
    let mut manifest = String::new();
    for (i, (href, media_type)) in items.iter().enumerate() {
        manifest.push_str(&format!(
            "    <item id=\"item{i}\" href=\"{href}\" media-type=\"{media_type}\"/>\n"
        ));
    }
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="3.0" unique-identifier="id">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/"><dc:title>Test</dc:title></metadata>
  <manifest>
{manifest}  </manifest>
  <spine/>
</package>"#
    )
}

/// XHTML document with `body` as the body content.
pub fn xhtml(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<html xmlns="http://www.w3.org/1999/xhtml" xmlns:xlink="http://www.w3.org/1999/xlink">
<head><title>t</title></head>
<body>{body}</body>
</html>"#
    )
}

/// PNG signature and IHDR chunk for the given size.
pub fn png(width: u32, height: u32) -> Vec<u8> {
    let mut data = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    data.extend_from_slice(&13u32.to_be_bytes());
    data.extend_from_slice(b"IHDR");
    data.extend_from_slice(&width.to_be_bytes());
    data.extend_from_slice(&height.to_be_bytes());
    data.extend_from_slice(&[8, 6, 0, 0, 0]);
    data
}

/// JPEG SOI, an APP0 segment and a baseline SOF0 header.
pub fn jpeg(width: u16, height: u16) -> Vec<u8> {
    let mut data = vec![0xFF, 0xD8];
    data.extend_from_slice(&[0xFF, 0xE0, 0x00, 0x10]);
    data.extend_from_slice(b"JFIF\0");
    data.extend_from_slice(&[1, 1, 0, 0, 1, 0, 1, 0, 0]);
    data.extend_from_slice(&[0xFF, 0xC0, 0x00, 0x11, 0x08]);
    data.extend_from_slice(&height.to_be_bytes());
    data.extend_from_slice(&width.to_be_bytes());
    data.extend_from_slice(&[3, 1, 0x22, 0, 2, 0x11, 1, 3, 0x11, 1]);
    data.extend_from_slice(&[0xFF, 0xD9]);
    data
}

/// GIF89a logical screen descriptor.
pub fn gif(width: u16, height: u16) -> Vec<u8> {
    let mut data = b"GIF89a".to_vec();
    data.extend_from_slice(&width.to_le_bytes());
    data.extend_from_slice(&height.to_le_bytes());
    data.extend_from_slice(&[0, 0, 0, 0x3B]);
    data
}
