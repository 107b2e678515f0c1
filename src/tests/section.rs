use super::{outline, titles};
use crate::decompose::decompose;
use crate::formats::markdown::MarkdownFormat;

const DOC: &str = "# Guide

Intro.

## Install

Steps.

### From source

Build it.

## Usage

Run it.
";

#[test]
fn test_outline_nests_by_depth() {
    let units = decompose(DOC, &MarkdownFormat).unwrap();
    let sections = outline(&units);

    assert_eq!(sections.len(), 1);
    let guide = &sections[0];
    assert_eq!(guide.title, "Guide");
    assert_eq!(guide.level, 1);
    assert_eq!(guide.children.len(), 2);
    assert_eq!(guide.children[0].title, "Install");
    assert_eq!(guide.children[0].children[0].title, "From source");
    assert_eq!(guide.children[1].title, "Usage");
    assert!(guide.children[1].children.is_empty());
}

#[test]
fn test_outline_line_spans() {
    let units = decompose(DOC, &MarkdownFormat).unwrap();
    let sections = outline(&units);

    let install = &sections[0].children[0];
    assert_eq!(install.line_start, 5);
    assert_eq!(install.line_end, 11);
    assert_eq!(sections[0].line_start, 1);
    assert_eq!(sections[0].line_end, 15);
}

#[test]
fn test_titles_depth_first() {
    let units = decompose(DOC, &MarkdownFormat).unwrap();
    let sections = outline(&units);
    assert_eq!(
        titles(&sections),
        vec!["Guide", "Install", "From source", "Usage"]
    );
}

#[test]
fn test_skipped_level_nests_under_nearest_shallower() {
    let units = decompose("# Top\n\n### Deep\n\n## Mid\n", &MarkdownFormat).unwrap();
    let sections = outline(&units);
    assert_eq!(sections.len(), 1);
    assert_eq!(sections[0].children.len(), 2);
    assert_eq!(sections[0].children[0].title, "Deep");
    assert_eq!(sections[0].children[1].title, "Mid");
}

#[test]
fn test_no_headings_no_sections() {
    let units = decompose("Just text.\n\nMore text.\n", &MarkdownFormat).unwrap();
    assert!(outline(&units).is_empty());
}
