//! Benchmarks for the extraction and tokenization pipeline.
//!
//! Run with: cargo bench

use std::hint::black_box;
use std::io::{Cursor, Write};

use criterion::{Criterion, criterion_group, criterion_main};

use tachy::mobi::palmdoc;
use tachy::{SourceDocument, extract_text, tokenize};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// A few hundred kilobytes of chapter-like HTML.
fn sample_html(paragraphs: usize) -> String {
    let mut html = String::from("<html><head><title>Bench</title></head><body>");
    for i in 0..paragraphs {
        html.push_str(&format!(
            "<p>Paragraph {i}: the <em>quick</em> brown fox jumps over the lazy dog, \
             see https://example.com/{i} &amp; write to fox{i}@example.com.</p>\n"
        ));
    }
    html.push_str("</body></html>");
    html
}

fn sample_epub(chapters: usize) -> Vec<u8> {
    let mut manifest = String::new();
    let mut spine = String::new();
    for i in 0..chapters {
        manifest.push_str(&format!(
            "<item id=\"c{i}\" href=\"c{i}.xhtml\" media-type=\"application/xhtml+xml\"/>"
        ));
        spine.push_str(&format!("<itemref idref=\"c{i}\"/>"));
    }
    let opf = format!(
        "<?xml version=\"1.0\"?><package><manifest>{manifest}</manifest><spine>{spine}</spine></package>"
    );

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    writer.start_file("META-INF/container.xml", options).unwrap();
    writer
        .write_all(br#"<container><rootfiles><rootfile full-path="OPS/book.opf"/></rootfiles></container>"#)
        .unwrap();
    writer.start_file("OPS/book.opf", options).unwrap();
    writer.write_all(opf.as_bytes()).unwrap();
    let chapter = sample_html(200);
    for i in 0..chapters {
        writer.start_file(format!("OPS/c{i}.xhtml"), options).unwrap();
        writer.write_all(chapter.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

// ============================================================================
// PalmDOC
// ============================================================================

fn bench_palmdoc(c: &mut Criterion) {
    let text = sample_html(40);
    let record = palmdoc::compress(&text.as_bytes()[..4096]);

    c.bench_function("palmdoc_decompress_record", |b| {
        b.iter(|| palmdoc::decompress(black_box(&record)));
    });
}

// ============================================================================
// Extraction
// ============================================================================

fn bench_extract_html(c: &mut Criterion) {
    let doc = SourceDocument::new("chapter.html", sample_html(1000));

    c.bench_function("extract_html", |b| {
        b.iter(|| extract_text(black_box(&doc)).unwrap());
    });
}

fn bench_extract_epub(c: &mut Criterion) {
    let doc = SourceDocument::new("book.epub", sample_epub(20));

    c.bench_function("extract_epub", |b| {
        b.iter(|| extract_text(black_box(&doc)).unwrap());
    });
}

// ============================================================================
// Tokenization
// ============================================================================

fn bench_tokenize(c: &mut Criterion) {
    let text = sample_html(1000);

    c.bench_function("tokenize", |b| {
        b.iter(|| tokenize(black_box(&text)));
    });
}

criterion_group!(
    benches,
    bench_palmdoc,
    bench_extract_html,
    bench_extract_epub,
    bench_tokenize,
);
criterion_main!(benches);
