//! Corpus streams read from files on disk

use dntmark_core::corpus::encode_tagged_line;
use dntmark_core::{sentence, CoreError, CorpusReader, PairRecord, Result};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;
use tempfile::TempDir;

fn open(path: &Path) -> BufReader<File> {
    BufReader::new(File::open(path).unwrap())
}

#[test]
fn reader_reads_tagged_files_with_alignment() {
    let temp_dir = TempDir::new().unwrap();
    let source_path = temp_dir.path().join("train.src.json");
    let target_path = temp_dir.path().join("train.trg.json");
    let alignment_path = temp_dir.path().join("train.align");

    let source = [
        encode_tagged_line(&sentence([("I", "O"), ("love", "O"), ("Rome", "B-GPE")])),
        encode_tagged_line(&sentence([("Good", "O"), ("morning", "O")])),
    ];
    let target = [
        encode_tagged_line(&sentence([("Amo", "O"), ("Roma", "B-GPE")])),
        encode_tagged_line(&sentence([("Buongiorno", "O")])),
    ];
    fs::write(&source_path, format!("{}\n{}\n", source[0], source[1])).unwrap();
    fs::write(&target_path, format!("{}\n{}\n", target[0], target[1])).unwrap();
    fs::write(&alignment_path, "1-0 2-1\n0-0 1-0\n").unwrap();

    let records: Vec<PairRecord> = CorpusReader::new(open(&source_path), open(&target_path))
        .with_alignment(open(&alignment_path))
        .collect::<Result<_>>()
        .unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].source[2].word, "Rome");
    assert_eq!(records[0].target[1].word, "Roma");
    assert_eq!(records[0].alignment.as_deref(), Some("1-0 2-1"));
    assert_eq!(records[1].index, 1);
    assert_eq!(records[1].target[0].word, "Buongiorno");
}

#[test]
fn reader_reports_short_target_file() {
    let temp_dir = TempDir::new().unwrap();
    let source_path = temp_dir.path().join("train.src.json");
    let target_path = temp_dir.path().join("train.trg.json");
    fs::write(&source_path, "[]\n[]\n").unwrap();
    fs::write(&target_path, "[]\n").unwrap();

    let mut reader = CorpusReader::new(open(&source_path), open(&target_path));
    assert!(reader.next().unwrap().is_ok());
    match reader.next() {
        Some(Err(CoreError::StreamMismatch { record, stream })) => {
            assert_eq!(record, 1);
            assert_eq!(stream, "target");
        }
        other => panic!("expected stream mismatch, got {other:?}"),
    }
    assert!(reader.next().is_none());
}
