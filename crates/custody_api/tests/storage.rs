use custody_api::fs_store::create_fs_store;
use custody_api::prelude::*;
use pretty_assertions::assert_eq;

const PHRASE: &str = "a b c d e f g h i j k l";

fn word_split() -> Scheme {
    Scheme::WordSplit(WordSplitScheme {
        destinations: vec!["p1".into(), "p2".into(), "p3".into()],
    })
}

fn manager(tmpdir: &tempdir::TempDir) -> StorageManager {
    StorageManager::new(
        create_fs_store(),
        tmpdir.path().join("prod"),
        tmpdir.path().join("open"),
    )
    .with_retrieve_dir(Some(tmpdir.path().join("retrieved")))
}

#[test]
fn files_land_where_documented() {
    let tmpdir = tempdir::TempDir::new("custody storage").unwrap();
    let mgr = manager(&tmpdir);
    mgr.store(&Secret::text(PHRASE), "root/s1/mnemonic.txt", &word_split())
        .unwrap();

    for dest in ["p1", "p2", "p3"] {
        assert!(tmpdir
            .path()
            .join("prod")
            .join(dest)
            .join("root/s1/mnemonic.txt")
            .is_file());
    }
    let record: serde_json::Value = serde_json::from_slice(
        &std::fs::read(tmpdir.path().join("open/root/s1/mnemonic.txt.json"))
            .unwrap(),
    )
    .unwrap();
    assert_eq!(PHRASE.len(), record["length"].as_u64().unwrap() as usize);
    assert_eq!("string", record["type"]);
    assert_eq!(3, record["storagePieces"].as_object().unwrap().len());
    // the record never carries the words themselves
    let text = record.to_string();
    assert!(!text.contains("\"a\""));
}

#[test]
fn deleted_first_piece_still_retrieves() {
    let tmpdir = tempdir::TempDir::new("custody storage").unwrap();
    let mgr = manager(&tmpdir);
    mgr.store(&Secret::text(PHRASE), "root/s1/mnemonic.txt", &word_split())
        .unwrap();
    std::fs::remove_file(tmpdir.path().join("prod/p1/root/s1/mnemonic.txt"))
        .unwrap();

    let mut audit = AuditLog::in_memory();
    let got = mgr
        .retrieve("root/s1/mnemonic.txt", &word_split(), Some(&mut audit))
        .unwrap();
    assert_eq!(ContentStatus::Ok, got.status);
    assert_eq!(Some(PHRASE), got.content.as_ref().and_then(|s| s.as_text()));
    assert_eq!(PieceStatus::Missing, got.pieces["p1/root/s1/mnemonic.txt"]);
    assert_eq!(
        PHRASE,
        std::fs::read_to_string(
            tmpdir.path().join("retrieved/root/s1/mnemonic.txt")
        )
        .unwrap()
    );
    let statuses: Vec<String> =
        audit.entries().iter().map(|e| e.status.to_string()).collect();
    assert_eq!(vec!["OK", "MISSING", "OK", "OK"], statuses);
}

#[test]
fn mutated_piece_is_reported_and_excluded() {
    let tmpdir = tempdir::TempDir::new("custody storage").unwrap();
    let mgr = manager(&tmpdir);
    mgr.store(&Secret::text(PHRASE), "root/s1/mnemonic.txt", &word_split())
        .unwrap();

    // rewrite piece 2 so it still parses but carries a different word
    let p2 = tmpdir.path().join("prod/p2/root/s1/mnemonic.txt");
    let altered = std::fs::read_to_string(&p2)
        .unwrap()
        .replace("\"i\"", "\"x\"");
    std::fs::write(&p2, altered).unwrap();

    let got = mgr
        .retrieve("root/s1/mnemonic.txt", &word_split(), None)
        .unwrap();
    assert_eq!(PieceStatus::Mismatch, got.pieces["p2/root/s1/mnemonic.txt"]);
    // p1 and p3 still cover every word
    assert_eq!(ContentStatus::Ok, got.status);

    std::fs::remove_file(tmpdir.path().join("prod/p3/root/s1/mnemonic.txt"))
        .unwrap();
    let got = mgr
        .retrieve("root/s1/mnemonic.txt", &word_split(), None)
        .unwrap();
    assert!(matches!(got.status, ContentStatus::Missing(_)));
    assert!(got.content.is_none());
}

#[test]
fn consistent_but_wrong_content_is_a_mismatch() {
    let tmpdir = tempdir::TempDir::new("custody storage").unwrap();
    let mgr = manager(&tmpdir);
    let clear = Scheme::Clear(ClearScheme {
        base_path: "c".into(),
    });
    mgr.store(&Secret::text("intended"), "k", &clear).unwrap();

    // replace both the piece and its digest, leave the content digest
    let piece = tmpdir.path().join("prod/c/k");
    std::fs::write(&piece, "replaced").unwrap();
    let record_path = tmpdir.path().join("open/k.json");
    let mut record: IntegrityRecord =
        serde_json::from_slice(&std::fs::read(&record_path).unwrap()).unwrap();
    record
        .storage_pieces
        .insert("c/k".into(), PieceDigest::of(b"replaced"));
    std::fs::write(&record_path, record.to_json().unwrap()).unwrap();

    let got = mgr.retrieve("k", &clear, None).unwrap();
    assert_eq!(ContentStatus::Mismatch, got.status);
    assert!(!tmpdir.path().join("retrieved/k").exists());
}
