use super::{clean_heading, explicit_anchor, slugify, Slugger, UnitKind};
use crate::decompose::decompose;
use crate::formats::markdown::MarkdownFormat;

#[test]
fn test_clean_heading_strips_markers() {
    assert_eq!(clean_heading("## Getting Started"), "Getting Started");
    assert_eq!(clean_heading("  #   Spaced out   "), "Spaced out");
    assert_eq!(clean_heading("### Closed ###"), "Closed");
    assert_eq!(clean_heading("Plain"), "Plain");
}

#[test]
fn test_clean_heading_keeps_trailing_hash_in_word() {
    assert_eq!(clean_heading("# C#"), "C#");
}

#[test]
fn test_slugify() {
    assert_eq!(slugify("Getting Started"), "getting-started");
    assert_eq!(slugify("Hello, World!"), "hello-world");
    assert_eq!(slugify("snake_case and-dash"), "snake_case-and-dash");
    assert_eq!(slugify("快速 开始"), "快速-开始");
}

#[test]
fn test_explicit_anchor() {
    assert_eq!(explicit_anchor("安装 {#install}"), Some("install"));
    assert_eq!(explicit_anchor("No anchor"), None);
    assert_eq!(explicit_anchor("Broken {#}"), None);
}

#[test]
fn test_slugger_dedupes_repeated_headings() {
    let mut slugger = Slugger::default();
    assert_eq!(slugger.id_for("## Examples"), "examples");
    assert_eq!(slugger.id_for("## Examples"), "examples-1");
    assert_eq!(slugger.id_for("### Examples"), "examples-2");
    assert_eq!(slugger.id_for("## Other"), "other");
}

#[test]
fn test_slugger_honours_explicit_anchor() {
    let mut slugger = Slugger::default();
    assert_eq!(slugger.id_for("## 安装 {#install}"), "install");
}

#[test]
fn test_title_and_anchor_of_units() {
    let units = decompose("# Guide\n\n## Setup {#setup}\n\nText.\n", &MarkdownFormat).unwrap();
    assert_eq!(units[0].title().as_deref(), Some("Guide"));
    assert_eq!(units[1].title().as_deref(), Some("Setup"));
    assert_eq!(units[1].id.as_deref(), Some("setup"));
    assert_eq!(units[2].kind, UnitKind::Paragraph);
    assert_eq!(units[2].title(), None);
    assert_eq!(units[2].anchor().as_deref(), Some("setup"));
    assert_eq!(units[0].anchor().as_deref(), Some("guide"));
}

#[test]
fn test_setext_title() {
    let units = decompose("Overview\n========\n\nBody.\n", &MarkdownFormat).unwrap();
    assert_eq!(units[0].kind, UnitKind::Heading);
    assert_eq!(units[0].level, Some(1));
    assert_eq!(units[0].title().as_deref(), Some("Overview"));
    assert_eq!(units[0].id.as_deref(), Some("overview"));
}
