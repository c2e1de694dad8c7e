//! Tokenizer behavior over real files

use scrcheck_core::{
    BcvRef, CoreError, ImportKind, ImportSettings, MarkerDomain, MarkerMappingTable, RefRange,
    SourceDomain, SourceFile, TextSegment, TextType, Tokenizer, WritingSystem,
    WritingSystemRegistry,
};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

const MAT: u8 = 40;

fn registry() -> WritingSystemRegistry {
    WritingSystemRegistry::new("xkal", "en")
}

fn settings_with(registry: WritingSystemRegistry) -> ImportSettings {
    ImportSettings::new(
        ImportKind::Paratext5,
        Arc::new(MarkerMappingTable::usfm_default().unwrap()),
        Arc::new(registry),
    )
}

fn write(dir: &TempDir, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn collect(settings: &ImportSettings, range: RefRange) -> Vec<TextSegment> {
    Tokenizer::for_range(settings, range)
        .collect::<Result<Vec<_>, _>>()
        .unwrap()
}

fn verse_segments(segments: &[TextSegment]) -> Vec<&TextSegment> {
    segments.iter().filter(|s| s.marker == "\\v").collect()
}

#[test]
fn test_sub_verse_bridge_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "mat.sfm", b"\\id MAT\n\\c 1\n\\p\n\\v 1 One.\n\\v 2a-2b Two.\n");
    let settings =
        settings_with(registry()).with_source(SourceFile::scan(&path, SourceDomain::Main).unwrap());

    let segments = collect(&settings, RefRange::whole_book(MAT));
    let verses = verse_segments(&segments);
    assert_eq!(verses[1].first_ref, BcvRef::with_segment(MAT, 1, 2, 1));
    assert_eq!(verses[1].last_ref, BcvRef::with_segment(MAT, 1, 2, 2));
    assert_eq!(verses[1].literal_verse.as_deref(), Some("2a-2b"));
    assert_eq!(verses[1].text, "Two.");
}

#[test]
fn test_sub_verse_letters_in_sequence() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "mat.sfm",
        b"\\id MAT\n\\c 1\n\\p\n\\v 1a First\n\\v 1c Second\n\\v 1e Third\n",
    );
    let settings =
        settings_with(registry()).with_source(SourceFile::scan(&path, SourceDomain::Main).unwrap());

    let segments = collect(&settings, RefRange::whole_book(MAT));
    let segs: Vec<u16> = verse_segments(&segments)
        .iter()
        .map(|s| s.first_ref.segment)
        .collect();
    assert_eq!(segs, vec![1, 2, 3]);
}

#[test]
fn test_verse_punctuation_reenters_text() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "mat.sfm", b"\\id MAT\n\\c 1\n\\p\n\\v 3. Then\n\\v Lost\n");
    let settings =
        settings_with(registry()).with_source(SourceFile::scan(&path, SourceDomain::Main).unwrap());

    let segments = collect(&settings, RefRange::whole_book(MAT));
    let verses = verse_segments(&segments);
    assert_eq!(verses[0].first_ref, BcvRef::new(MAT, 1, 3));
    assert_eq!(verses[0].text, ". Then");
    // no number: the previous reference stays and everything is text
    assert_eq!(verses[1].first_ref, BcvRef::new(MAT, 1, 3));
    assert_eq!(verses[1].text, "Lost");
    assert_eq!(verses[1].literal_verse, None);
}

#[test]
fn test_state_carries_across_files_of_one_book() {
    let dir = TempDir::new().unwrap();
    let first = write(&dir, "mat1.sfm", b"\\id MAT\n\\c 1\n\\p\n\\v 1 One\n\\v 2 Two\n");
    let second = write(&dir, "mat2.sfm", b"\\id MAT\n\\v 3 Three\n\\c 2\n\\v 1 Next\n");
    let settings = settings_with(registry())
        .with_source(SourceFile::scan(&first, SourceDomain::Main).unwrap())
        .with_source(SourceFile::scan(&second, SourceDomain::Main).unwrap());

    let segments = collect(&settings, RefRange::whole_book(MAT));
    let refs: Vec<String> = verse_segments(&segments)
        .iter()
        .map(|s| s.first_ref.to_string())
        .collect();
    assert_eq!(refs, vec!["MAT 1:1", "MAT 1:2", "MAT 1:3", "MAT 2:1"]);
}

#[test]
fn test_files_outside_window_are_never_opened() {
    let dir = TempDir::new().unwrap();
    let present = write(&dir, "mat1.sfm", b"\\id MAT\n\\c 1\n\\p\n\\v 1 One\n");
    let mut settings =
        settings_with(registry()).with_source(SourceFile::scan(&present, SourceDomain::Main).unwrap());
    // configured, then deleted before tokenizing
    let gone = write(&dir, "mat5.sfm", b"\\id MAT\n\\c 5\n\\p\n\\v 1 Five\n");
    settings.add_source(SourceFile::scan(&gone, SourceDomain::Main).unwrap());
    fs::remove_file(&gone).unwrap();

    let segments = collect(&settings, RefRange::chapter(MAT, 1));
    assert_eq!(verse_segments(&segments).len(), 1);

    let mut tokenizer = Tokenizer::for_range(&settings, RefRange::chapter(MAT, 5));
    match tokenizer.next() {
        Some(Err(CoreError::Io { path, .. })) => assert_eq!(path, gone),
        other => panic!("expected an I/O fault, got {other:?}"),
    }
    assert!(tokenizer.next().is_none());
}

#[test]
fn test_no_files_is_an_empty_result() {
    let settings = settings_with(registry());
    assert!(collect(&settings, RefRange::whole_book(MAT)).is_empty());
}

#[test]
fn test_legacy_file_is_converted_per_writing_system() {
    let dir = TempDir::new().unwrap();
    // 0x93/0x94 are curly quotes in windows-1252, 0xE9 is e-acute
    let path = write(
        &dir,
        "mat.sfm",
        b"\\id MAT\n\\c 1\n\\p\n\\v 1 \x93caf\xe9\x94\n\\bt \x93cafe\x94\n",
    );
    let mut registry = registry();
    let mut vernacular = WritingSystem::new("xkal");
    vernacular.legacy_encoding = Some("windows-1252".to_string());
    registry.insert(vernacular);
    let settings =
        settings_with(registry).with_source(SourceFile::scan(&path, SourceDomain::Main).unwrap());

    let segments = collect(&settings, RefRange::whole_book(MAT));
    let verse = verse_segments(&segments)[0];
    assert_eq!(verse.text, "\u{201C}caf\u{e9}\u{201D}");
    assert_eq!(verse.writing_system.as_deref(), Some("xkal"));

    // "en" has no converter configured, so its bytes are read as UTF-8
    let bt = segments.iter().find(|s| s.marker == "\\bt").unwrap();
    assert!(bt.domain.contains(MarkerDomain::BACK_TRANS));
    assert_eq!(bt.writing_system.as_deref(), Some("en"));
    assert!(bt.text.contains("cafe"));
}

#[test]
fn test_unicode_file_is_never_converted() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "mat.sfm", "\\id MAT\n\\c 1\n\\p\n\\v 1 caf\u{e9}\n".as_bytes());
    let mut registry = registry();
    let mut vernacular = WritingSystem::new("xkal");
    // would fail if it were ever asked for
    vernacular.legacy_encoding = Some("x-unknown".to_string());
    registry.insert(vernacular);
    let settings =
        settings_with(registry).with_source(SourceFile::scan(&path, SourceDomain::Main).unwrap());

    let segments = collect(&settings, RefRange::whole_book(MAT));
    assert_eq!(verse_segments(&segments)[0].text, "caf\u{e9}");
}

#[test]
fn test_back_translation_file_uses_its_locale() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "mat-bt.sfm", b"\\id MAT\n\\c 1\n\\p\n\\v 1 In the beginning\n");
    let domain = SourceDomain::BackTrans {
        locale: Some("fr".to_string()),
    };
    let settings = settings_with(registry()).with_source(SourceFile::scan(&path, domain).unwrap());

    let segments = collect(&settings, RefRange::whole_book(MAT));
    assert!(segments
        .iter()
        .all(|s| s.domain.contains(MarkerDomain::BACK_TRANS)));
    assert_eq!(verse_segments(&segments)[0].writing_system.as_deref(), Some("fr"));
}

#[test]
fn test_duplicate_book_id_keeps_state() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "mat.sfm",
        b"\\id MAT\n\\c 2\n\\p\n\\v 4 Four\n\\id MAT again\n\\v 5 Five\n",
    );
    let settings =
        settings_with(registry()).with_source(SourceFile::scan(&path, SourceDomain::Main).unwrap());

    let segments = collect(&settings, RefRange::whole_book(MAT));
    assert_eq!(
        verse_segments(&segments)[1].first_ref,
        BcvRef::new(MAT, 2, 5)
    );
}

#[test]
fn test_segments_become_tokens() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "mat.sfm",
        b"\\id MAT\n\\mt Matthew\n\\c 1\n\\p\n\\v 1 Text\\f + \\ft Note.\\f* more\n",
    );
    let settings =
        settings_with(registry()).with_source(SourceFile::scan(&path, SourceDomain::Main).unwrap());

    let tokens = Tokenizer::for_range(&settings, RefRange::whole_book(MAT))
        .into_tokens()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    let types: Vec<TextType> = tokens.iter().map(|t| t.text_type).collect();
    assert_eq!(
        types,
        vec![
            TextType::Other,
            TextType::ChapterNumber,
            TextType::VerseNumber,
            TextType::Verse,
            TextType::Note,
            TextType::Verse,
        ]
    );
    assert_eq!(tokens[0].text, "Matthew");
    assert_eq!(tokens[0].paragraph_style, "Title Main");
    assert!(tokens[4].is_note_start);
}
