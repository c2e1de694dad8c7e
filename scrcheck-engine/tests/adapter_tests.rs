//! Tokens built from an in-memory document

use scrcheck_core::{BcvRef, ObjectId, RefRange, TextType, WritingSystemRegistry};
use scrcheck_engine::{
    builtin_checks, find_check, BookAnnotations, CheckParameters, CheckRunner, Paragraph,
    ScrBook, ScrSection, StyleSheet, TextAdapter,
};
use std::sync::Arc;

const MARK: u8 = 41;

fn adapter() -> TextAdapter {
    TextAdapter::new(
        Arc::new(WritingSystemRegistry::new("xkal", "en")),
        StyleSheet::default(),
    )
}

fn mark() -> ScrBook {
    ScrBook::new(MARK)
        .with_title(Paragraph::new(1, "Title Main").text("Mark"))
        .with_section(
            ScrSection::intro()
                .with_heading(Paragraph::new(2, "Intro Section Head").text("Introduction"))
                .with_paragraph(Paragraph::new(3, "Intro Paragraph").text("About this book.")),
        )
        .with_section(
            ScrSection::new()
                .with_heading(Paragraph::new(4, "Section Head").text("John the Baptist"))
                .with_paragraph(
                    Paragraph::new(5, "Paragraph")
                        .styled("1", "Chapter Number")
                        .text("The beginning of the gospel.")
                        .styled("2", "Verse Number")
                        .text("As it is written"),
                ),
        )
        .with_section(
            ScrSection::new()
                .with_heading(Paragraph::new(6, "Section Head").text("Temptation"))
                .with_paragraph(Paragraph::new(7, "Paragraph"))
                .with_paragraph(
                    Paragraph::new(8, "Paragraph")
                        .styled("2", "Chapter Number")
                        .styled("1", "Verse Number")
                        .text("Again he entered"),
                ),
        )
}

#[test]
fn test_chapter_zero_with_only_chapter_number() {
    let book = ScrBook::new(MARK).with_section(
        ScrSection::new().with_paragraph(Paragraph::new(1, "Paragraph").styled("0", "Chapter Number")),
    );
    let tokens = adapter().tokens(&book, 0);
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].text_type, TextType::ChapterNumber);
    assert_eq!(tokens[0].text, "0");
}

#[test]
fn test_whole_book_order_and_refs() {
    let tokens = adapter().tokens(&mark(), 0);
    let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
    assert_eq!(
        texts,
        vec![
            "Mark",
            "Introduction",
            "About this book.",
            "John the Baptist",
            "1",
            "The beginning of the gospel.",
            "2",
            "As it is written",
            "Temptation",
            "2",
            "1",
            "Again he entered",
        ]
    );
    assert_eq!(tokens[0].start_ref, BcvRef::book_start(MARK));
    assert_eq!(tokens[2].start_ref.chapter, 0);
    // headings take the reference of the content below them
    assert_eq!(tokens[3].start_ref, BcvRef::new(MARK, 1, 1));
    assert_eq!(tokens[8].start_ref, BcvRef::new(MARK, 2, 1));
    assert_eq!(tokens[11].start_ref, BcvRef::new(MARK, 2, 1));
    assert_eq!(tokens[5].text_type, TextType::Verse);
    assert_eq!(tokens[3].text_type, TextType::Other);
}

#[test]
fn test_single_chapter_window() {
    let tokens = adapter().tokens(&mark(), 2);
    let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
    assert_eq!(texts, vec!["Temptation", "2", "1", "Again he entered"]);
    assert_eq!(tokens[0].owner, ObjectId(6));
    assert!(tokens[1].is_paragraph_start);
    assert_eq!(tokens[1].owner, ObjectId(8));
}

#[test]
fn test_empty_paragraph_yields_nothing() {
    let tokens = adapter().tokens(&mark(), 0);
    assert!(tokens.iter().all(|t| t.owner != ObjectId(7)));
}

#[test]
fn test_offsets_follow_owner_text() {
    let tokens = adapter().tokens(&mark(), 1);
    let verse_two = tokens.iter().find(|t| t.text == "As it is written").unwrap();
    // "1" + "The beginning of the gospel." + "2"
    assert_eq!(verse_two.offset_in_owner, 30);
}

#[test]
fn test_parameters() {
    let adapter = adapter();
    assert_eq!(adapter.parameter_value("SentenceFinalPunctuation"), ".?!");
    assert_eq!(adapter.parameter_value("VerseBridge"), "-");
    assert_eq!(adapter.parameter_value("ChapterNumberStyle"), "Chapter Number");
    assert!(adapter
        .parameter_value("HeadingStyles")
        .lines()
        .any(|s| s == "Section Head"));
}

#[test]
fn test_builtin_check_over_document() {
    let adapter = adapter();
    let checks = builtin_checks(&adapter);
    let check = find_check(&checks, "Sentence-Final Punctuation").unwrap();
    let mut annotations = BookAnnotations::new(MARK);
    CheckRunner::new()
        .run_check(
            &mut annotations,
            check,
            adapter.tokens(&mark(), 0).into_iter().map(Ok),
            RefRange::whole_book(MARK),
        )
        .unwrap();
    let owners: Vec<ObjectId> = annotations
        .records()
        .iter()
        .map(|r| r.payload.begin_object)
        .collect();
    assert_eq!(owners, vec![ObjectId(5), ObjectId(8)]);
    assert_eq!(annotations.records()[0].payload.quoted_text, "n");
}
