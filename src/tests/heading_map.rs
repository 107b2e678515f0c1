use super::{is_congruent, lookup, prune, update, HeadingMap};
use crate::decompose::decompose;
use crate::formats::markdown::MarkdownFormat;
use crate::front_matter::Document;
use crate::section::{outline, Section};

fn sections(text: &str) -> Vec<Section> {
    outline(&decompose(text, &MarkdownFormat).unwrap())
}

#[test]
fn test_lookup_ignores_markers() {
    let mut map = HeadingMap::new();
    map.insert("## Install", "安装");
    assert_eq!(lookup("Install", &map), Some("安装"));
    assert_eq!(lookup("### Install  ", &map), Some("安装"));
    assert_eq!(lookup("Usage", &map), None);
}

#[test]
fn test_update_pairs_congruent_outlines() {
    let source = sections("# Guide\n\n## Install\n\n## Usage\n");
    let target = sections("# 指南\n\n## 安装\n\n## 用法\n");
    assert!(is_congruent(&source, &target));

    let map = update(&HeadingMap::new(), &source, &target, None);
    assert_eq!(map.len(), 3);
    assert_eq!(lookup("Guide", &map), Some("指南"));
    assert_eq!(lookup("Install", &map), Some("安装"));
    assert_eq!(lookup("Usage", &map), Some("用法"));
}

#[test]
fn test_update_replaces_stale_translation() {
    let mut existing = HeadingMap::new();
    existing.insert("Install", "旧");
    let source = sections("## Install\n");
    let target = sections("## 安装\n");
    let map = update(&existing, &source, &target, None);
    assert_eq!(lookup("Install", &map), Some("安装"));
}

#[test]
fn test_prune_drops_missing_headings() {
    let mut existing = HeadingMap::new();
    existing.insert("Install", "安装");
    existing.insert("Removed", "删除");
    existing.insert("Book Title", "书名");
    let source = sections("## Install\n");

    let pruned = prune(&existing, &source, Some("Book Title"));
    let keys: Vec<&str> = pruned.iter().map(|(k, _)| k).collect();
    assert_eq!(keys, vec!["Book Title", "Install"]);
}

#[test]
fn test_prune_is_stable() {
    let mut existing = HeadingMap::new();
    existing.insert("Install", "安装");
    existing.insert("Gone", "没了");
    let source = sections("## Install\n");
    let once = prune(&existing, &source, None);
    assert_eq!(prune(&once, &source, None), once);
}

#[test]
fn test_incongruent_outlines() {
    let source = sections("## A\n\n## B\n");
    let fewer = sections("## 甲\n");
    let nested = sections("## 甲\n\n### 乙\n");
    assert!(!is_congruent(&source, &fewer));
    assert!(!is_congruent(&source, &nested));
}

#[test]
fn test_load_from_front_matter() {
    let doc = Document::split("---\ntitle: x\nheading-map:\n  Install: 安装\n---\n\n## 安装\n");
    let map = HeadingMap::load(&doc, "heading-map").unwrap();
    assert_eq!(map.len(), 1);
    assert_eq!(lookup("Install", &map), Some("安装"));
    assert!(HeadingMap::load(&doc, "other").unwrap().is_empty());
}

#[test]
fn test_load_rejects_non_map_entry() {
    let doc = Document::split("---\nheading-map: [a, b]\n---\nbody\n");
    assert!(HeadingMap::load(&doc, "heading-map").is_err());
}

#[test]
fn test_store_keeps_other_metadata() {
    let mut doc = Document::split("---\ntitle: x\n---\n\nbody\n");
    let mut map = HeadingMap::new();
    map.insert("Install", "安装");
    map.store(&mut doc, "heading-map").unwrap();

    let metadata = doc.metadata().unwrap();
    assert!(metadata.contains_key("title"));
    assert_eq!(HeadingMap::load(&doc, "heading-map").unwrap(), map);
}

#[test]
fn test_store_unchanged_leaves_text_alone() {
    let text = "---\n# translator notes\nheading-map:\n  Install: 安装\n---\n\nbody\n";
    let mut doc = Document::split(text);
    let map = HeadingMap::load(&doc, "heading-map").unwrap();
    map.store(&mut doc, "heading-map").unwrap();
    assert_eq!(doc.render(), text);
}

#[test]
fn test_store_empty_removes_key() {
    let mut doc = Document::split("---\nheading-map:\n  Install: 安装\n---\n\nbody\n");
    HeadingMap::new().store(&mut doc, "heading-map").unwrap();
    assert_eq!(doc.front_matter, None);
    assert_eq!(doc.render(), "body\n");
}
