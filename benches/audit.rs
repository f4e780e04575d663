//! Benchmarks for the audit pipeline.
//!
//! Run with: cargo bench

use std::io::{Cursor, Write};

use criterion::{Criterion, criterion_group, criterion_main};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use imgaudit::audit::css::extract_urls;
use imgaudit::audit::{ContentRoot, resolve};
use imgaudit::{ArchiveFileMap, Auditor, Options};

const CHAPTERS: usize = 60;
const IMAGES_PER_CHAPTER: usize = 8;

fn png_header(width: u32, height: u32) -> Vec<u8> {
    let mut data = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    data.extend_from_slice(&13u32.to_be_bytes());
    data.extend_from_slice(b"IHDR");
    data.extend_from_slice(&width.to_be_bytes());
    data.extend_from_slice(&height.to_be_bytes());
    data.extend_from_slice(&[8, 6, 0, 0, 0]);
    data
}

/// A synthetic book with many chapters, each referencing a slice of the images.
fn sample_epub() -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    zip.start_file("META-INF/container.xml", options).unwrap();
    zip.write_all(
        br#"<container><rootfiles><rootfile full-path="OEBPS/content.opf"/></rootfiles></container>"#,
    )
    .unwrap();
    zip.start_file("OEBPS/content.opf", options).unwrap();
    zip.write_all(b"<package><manifest/></package>").unwrap();

    let mut css = String::new();
    for chapter in 0..CHAPTERS {
        let mut body = String::new();
        for i in 0..IMAGES_PER_CHAPTER {
            let n = chapter * IMAGES_PER_CHAPTER + i;
            body.push_str(&format!(
                r#"<p>Paragraph {n} with some text.</p><img src="../images/img{n}.png" srcset="../images/img{n}.png 1x, ../images/img{n}@2x.png 2x"/>"#
            ));
            css.push_str(&format!(".c{n} {{ background: url('../images/bg{n}.png') }}\n"));
        }
        zip.start_file(format!("OEBPS/text/ch{chapter}.xhtml"), options).unwrap();
        zip.write_all(
            format!(r#"<html xmlns="http://www.w3.org/1999/xhtml"><body>{body}</body></html>"#).as_bytes(),
        )
        .unwrap();
    }

    zip.start_file("OEBPS/css/style.css", options).unwrap();
    zip.write_all(css.as_bytes()).unwrap();

    for n in 0..CHAPTERS * IMAGES_PER_CHAPTER {
        for name in [format!("img{n}.png"), format!("bg{n}.png")] {
            zip.start_file(format!("OEBPS/images/{name}"), options).unwrap();
            zip.write_all(&png_header(1200, 800)).unwrap();
        }
    }

    zip.finish().unwrap().into_inner()
}

fn bench_audit(c: &mut Criterion) {
    let bytes = sample_epub();
    let archive = ArchiveFileMap::from_bytes(&bytes).unwrap();
    let auditor = Auditor::new(Options::default().with_css(true).with_svg(true));

    c.bench_function("archive_from_bytes", |b| {
        b.iter(|| ArchiveFileMap::from_bytes(&bytes).unwrap())
    });

    c.bench_function("audit_loaded_archive", |b| b.iter(|| auditor.run(&archive)));
}

fn bench_resolve(c: &mut Criterion) {
    let root = ContentRoot::new("OEBPS");
    c.bench_function("resolve_relative", |b| {
        b.iter(|| resolve("OEBPS/text/part1/ch01.xhtml", "../../images/a%20b.png#frag", &root))
    });
}

fn bench_css(c: &mut Criterion) {
    let css: String = (0..500)
        .map(|i| {
            format!(".c{i} {{ color: red; background: URL( \"../images/bg{i}.png\" ) no-repeat; }}\n")
        })
        .collect();
    c.bench_function("extract_urls", |b| b.iter(|| extract_urls(&css)));
}

criterion_group!(benches, bench_audit, bench_resolve, bench_css);
criterion_main!(benches);
