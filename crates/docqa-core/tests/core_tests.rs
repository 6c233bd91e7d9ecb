use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use docqa_core::loader::{DocumentLoader, LoaderOptions};
use docqa_core::splitter::TextSplitter;
use docqa_core::{Error, ErrorKind};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

fn words(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[test]
fn load_single_small_text_file() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    let mut f = fs::File::create(dir.join("a.txt")).unwrap();
    writeln!(f, "Short text").unwrap();

    let docs = DocumentLoader::default().load(dir).expect("load");

    assert_eq!(docs.len(), 1, "one text file becomes one document");
    assert_eq!(docs[0].raw_text.trim(), "Short text");
    assert_eq!(docs[0].position, 0);
    assert!(docs[0].source_id.ends_with("a.txt"));
}

#[test]
fn load_orders_files_by_path_and_ignores_unsupported() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    fs::write(dir.join("b.md"), "bravo").unwrap();
    fs::write(dir.join("a.txt"), "alpha").unwrap();
    fs::write(dir.join("c.csv"), "ignored,row").unwrap();

    let docs = DocumentLoader::default().load(dir).expect("load");
    let texts: Vec<&str> = docs.iter().map(|d| d.raw_text.as_str()).collect();
    assert_eq!(texts, vec!["alpha", "bravo"]);
}

#[test]
fn load_limit_keeps_first_documents() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    fs::write(dir.join("a.txt"), "alpha bravo").unwrap();
    fs::write(dir.join("b.txt"), "charlie delta").unwrap();
    fs::write(dir.join("c.txt"), "echo foxtrot").unwrap();

    let loader = DocumentLoader::new(LoaderOptions { recursive: false, limit: Some(2) });
    let summary = loader.load_summary(dir).expect("load limited");

    assert_eq!(summary.documents.len(), 2);
    assert_eq!(summary.documents[1].raw_text, "charlie delta");
    // limit hit on a file boundary: the third file is never read
    assert_eq!(summary.files_read, 2);
    assert_eq!(summary.files_skipped, 1);
    assert_eq!(summary.documents_dropped, 0);
}

#[test]
fn load_limit_met_by_last_file_drops_nothing() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    fs::write(dir.join("a.txt"), "alpha").unwrap();
    fs::write(dir.join("b.txt"), "bravo").unwrap();

    let loader = DocumentLoader::new(LoaderOptions { recursive: false, limit: Some(2) });
    let summary = loader.load_summary(dir).expect("load");

    assert_eq!(summary.documents.len(), 2);
    assert_eq!((summary.files_read, summary.files_skipped, summary.documents_dropped), (2, 0, 0));
}

#[test]
fn load_limit_cuts_pages_inside_a_pdf() {
    let tmp = TempDir::new().unwrap();
    fs::copy(fixture("three_pages.pdf"), tmp.path().join("paper.pdf")).unwrap();
    fs::write(tmp.path().join("z.txt"), "after the paper").unwrap();

    let loader = DocumentLoader::new(LoaderOptions { recursive: false, limit: Some(1) });
    let summary = loader.load_summary(tmp.path()).expect("load");

    assert_eq!(summary.documents.len(), 1);
    assert_eq!(summary.documents[0].position, 0);
    assert_eq!(summary.documents_dropped, 1);
    assert_eq!(summary.files_skipped, 1);
}

#[test]
fn load_pdf_yields_one_document_per_non_blank_page() {
    let tmp = TempDir::new().unwrap();
    fs::copy(fixture("three_pages.pdf"), tmp.path().join("paper.pdf")).unwrap();

    let docs = DocumentLoader::default().load(tmp.path()).expect("load pdf");

    let positions: Vec<usize> = docs.iter().map(|d| d.position).collect();
    assert_eq!(positions, vec![0, 2], "blank middle page is skipped");
    assert_eq!(words(&docs[0].raw_text), "Attention is all you need");
    assert_eq!(words(&docs[1].raw_text), "Recurrent networks are sequential");
    assert!(docs.iter().all(|d| d.source_id.ends_with("paper.pdf")));
}

#[test]
fn load_recursion_is_opt_in() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    fs::write(dir.join("top.txt"), "top").unwrap();
    fs::create_dir(dir.join("nested")).unwrap();
    fs::write(dir.join("nested/inner.txt"), "inner").unwrap();

    let flat = DocumentLoader::default().load(dir).expect("flat");
    assert_eq!(flat.len(), 1);

    let deep = DocumentLoader::new(LoaderOptions { recursive: true, limit: None }).load(dir).expect("deep");
    assert_eq!(deep.len(), 2);
}

#[test]
fn load_skips_blank_documents() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    fs::write(dir.join("a.txt"), "  \n\n ").unwrap();
    fs::write(dir.join("b.txt"), "content").unwrap();

    let docs = DocumentLoader::default().load(dir).expect("load");
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].raw_text, "content");
}

#[test]
fn load_missing_directory_is_a_load_error() {
    let tmp = TempDir::new().unwrap();
    let err = DocumentLoader::default().load(&tmp.path().join("nope")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Load);
}

#[test]
fn load_directory_without_supported_files_is_a_load_error() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("notes.csv"), "a,b").unwrap();
    let err = DocumentLoader::default().load(tmp.path()).unwrap_err();
    assert!(matches!(err, Error::Load(ref msg) if msg.contains("no supported files")));
}

#[test]
fn load_corrupt_pdf_is_a_load_error() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("broken.pdf"), b"this is not a pdf").unwrap();
    let err = DocumentLoader::default().load(tmp.path()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Load);
}

#[test]
fn load_then_split_2400_char_document() {
    let tmp = TempDir::new().unwrap();
    let text: String = "0123456789".repeat(240);
    fs::write(tmp.path().join("paper.txt"), &text).unwrap();

    let docs = DocumentLoader::default().load(tmp.path()).expect("load");
    let chunks = TextSplitter::new(1000, 200).unwrap().split_documents(&docs);

    let bounds: Vec<(usize, usize)> = chunks.iter().map(|c| (c.start, c.end)).collect();
    assert_eq!(bounds, vec![(0, 1000), (800, 1800), (1600, 2400)]);
    assert_eq!(chunks[1].text, text[800..1800]);
    let indices: Vec<usize> = chunks.iter().map(|c| c.chunk_index).collect();
    assert_eq!(indices, vec![0, 1, 2]);
}
