use super::{synchronize, Glossary, SyncRequest, Synchronizer, TranslateError, TranslationRequest, Translator};
use crate::config::Config;
use crate::error::Error;
use crate::front_matter::Document;
use crate::heading_map::{lookup, HeadingMap};
use crate::locate::EditStrategy;

const OLD: &str = "# Guide\n\nIntro text.\n\n## Install\n\nRun the installer.\n";
const NEW: &str = "# Guide

Intro text.

## Install

Run the new installer.

## Usage

Call the tool.
";
const TARGET: &str = "---
heading-map:
  Guide: 指南
  Install: 安装
---

# 指南

介绍。

## 安装

运行安装程序。
";

struct Dictionary {
    entries: Vec<(&'static str, &'static str)>,
    seen: Vec<(String, String, String)>,
}

impl Dictionary {
    fn new(entries: &[(&'static str, &'static str)]) -> Self {
        Self {
            entries: entries.to_vec(),
            seen: Vec::new(),
        }
    }
}

impl Translator for Dictionary {
    fn translate(&mut self, request: &TranslationRequest<'_>) -> Result<Option<String>, TranslateError> {
        self.seen.push((
            request.text.to_string(),
            request.context_before.to_string(),
            request.target_lang.to_string(),
        ));
        Ok(self
            .entries
            .iter()
            .find(|(source, _)| *source == request.text)
            .map(|(_, target)| (*target).to_string()))
    }
}

struct Failing;

impl Translator for Failing {
    fn translate(&mut self, _request: &TranslationRequest<'_>) -> Result<Option<String>, TranslateError> {
        Err(TranslateError("quota exceeded".to_string()))
    }
}

fn request<'a>(old: &'a str, new: &'a str, target: &'a str) -> SyncRequest<'a> {
    SyncRequest {
        old_source: old,
        new_source: new,
        target,
        file_path: "docs/zh/guide.md",
        source_lang: "en",
        target_lang: "zh",
        glossary: None,
    }
}

fn chinese() -> Dictionary {
    Dictionary::new(&[
        ("Run the new installer.", "运行新的安装程序。"),
        ("## Usage", "## 用法"),
        ("Call the tool.", "调用工具。"),
    ])
}

#[test]
fn test_end_to_end() {
    let mut translator = chinese();
    let outcome = Synchronizer::new(Config::default())
        .run(&request(OLD, NEW, TARGET), &mut translator)
        .unwrap();

    let document = Document::split(&outcome.text);
    assert_eq!(
        document.body,
        "# 指南\n\n介绍。\n\n## 安装\n\n运行新的安装程序。\n\n## 用法\n\n调用工具。\n"
    );
    assert_eq!(outcome.changes.len(), 3);
    assert_eq!(outcome.applied, 3);
    assert_eq!(outcome.skipped, 0);

    let stored = HeadingMap::load(&document, "heading-map").unwrap();
    assert_eq!(stored, outcome.heading_map);
    assert_eq!(stored.len(), 3);
    assert_eq!(lookup("Usage", &stored), Some("用法"));
}

#[test]
fn test_translator_sees_only_changed_text_with_context() {
    let mut translator = chinese();
    Synchronizer::new(Config::default())
        .run(&request(OLD, NEW, TARGET), &mut translator)
        .unwrap();

    let texts: Vec<&str> = translator.seen.iter().map(|(t, _, _)| t.as_str()).collect();
    assert_eq!(texts, vec!["Run the new installer.", "## Usage", "Call the tool."]);
    let (_, before, lang) = &translator.seen[0];
    assert_eq!(before, "Intro text.\n\n## Install");
    assert_eq!(lang, "zh");
}

#[test]
fn test_no_changes_returns_target_untouched() {
    let mut translator = chinese();
    let text = synchronize(&request(OLD, OLD, TARGET), &mut translator, &Config::default()).unwrap();
    assert_eq!(text, TARGET);
    assert!(translator.seen.is_empty());
}

#[test]
fn test_translation_failure_aborts() {
    let result = Synchronizer::new(Config::default()).run(&request(OLD, NEW, TARGET), &mut Failing);
    assert!(matches!(result, Err(Error::Translation { index: 0, .. })));
}

#[test]
fn test_skipped_translations_leave_target_alone() {
    let mut translator = Dictionary::new(&[]);
    let outcome = Synchronizer::new(Config::default())
        .run(&request(OLD, NEW, TARGET), &mut translator)
        .unwrap();
    assert_eq!(outcome.applied, 0);
    assert_eq!(outcome.skipped, 3);
    assert_eq!(outcome.text, TARGET);
}

#[test]
fn test_deletion_removes_translated_paragraph() {
    let old = "## Install\n\nStep one.\n\nStep two.\n";
    let new = "## Install\n\nStep one.\n";
    let target = "---\nheading-map:\n  Install: 安装\n---\n\n## 安装\n\n第一步。\n\n第二步。\n";
    let mut translator = Dictionary::new(&[]);
    let outcome = Synchronizer::new(Config::default())
        .run(&request(old, new, target), &mut translator)
        .unwrap();

    assert_eq!(outcome.applied, 1);
    assert_eq!(Document::split(&outcome.text).body, "## 安装\n\n第一步。\n");
    assert!(translator.seen.is_empty());
}

#[test]
fn test_section_granularity_with_table() {
    let old = "## A\n\nfoo\n\n## B\n\nbar\n";
    let new = "## A\n\nfoo\n\n## C\n\nbaz\n\n## B\n\nbar\n";
    let target = "---\nheading-map:\n  A: 甲\n  B: 乙\n---\n\n## 甲\n\n...\n\n## 乙\n\n...\n";
    let config = Config {
        granularity: "sections".to_string(),
        ..Config::default()
    };
    let mut translator = Dictionary::new(&[("## C\n\nbaz", "## 丙\n\n...")]);

    let outcome = Synchronizer::new(config)
        .run(&request(old, new, target), &mut translator)
        .unwrap();
    assert_eq!(
        Document::split(&outcome.text).body,
        "## 甲\n\n...\n\n## 丙\n\n...\n\n## 乙\n\n...\n"
    );
    assert_eq!(lookup("C", &outcome.heading_map), Some("丙"));
}

#[test]
fn test_plan_without_translation() {
    let (plan, changes) = Synchronizer::new(Config::default())
        .plan(&request(OLD, NEW, TARGET))
        .unwrap();
    assert_eq!(changes.len(), 3);
    assert_eq!(plan.file, "docs/zh/guide.md");
    let strategies: Vec<EditStrategy> = plan.edits.iter().map(|e| e.strategy).collect();
    assert_eq!(
        strategies,
        vec![EditStrategy::ExactMatch, EditStrategy::Insert, EditStrategy::Insert]
    );
    assert!(plan.edits.iter().all(|e| e.replacement.is_none()));
}

#[test]
fn test_glossary_reaches_translator() {
    struct Checker(bool);
    impl Translator for Checker {
        fn translate(&mut self, request: &TranslationRequest<'_>) -> Result<Option<String>, TranslateError> {
            self.0 |= request.glossary.and_then(|g| g.get("installer")).is_some();
            Ok(None)
        }
    }

    let mut glossary = Glossary::new();
    glossary.insert("installer".to_string(), "安装程序".to_string());
    let request = SyncRequest {
        glossary: Some(&glossary),
        ..request(OLD, NEW, TARGET)
    };
    let mut checker = Checker(false);
    Synchronizer::new(Config::default()).run(&request, &mut checker).unwrap();
    assert!(checker.0);
}

#[test]
fn test_repeated_headings_update_the_right_section() {
    let old = "## Exercise\n\nFirst task.\n\n## Exercise\n\nSecond task.\n";
    let new = "## Exercise\n\nFirst task.\n\n## Exercise\n\nSecond task, revised.\n";
    let target = "---\nheading-map:\n  Exercise: 练习\n---\n\n## 练习\n\n第一题。\n\n## 练习\n\n第二题。\n";
    let mut translator = Dictionary::new(&[("Second task, revised.", "第二题（修订）。")]);

    let outcome = Synchronizer::new(Config::default())
        .run(&request(old, new, target), &mut translator)
        .unwrap();
    assert_eq!(
        Document::split(&outcome.text).body,
        "## 练习\n\n第一题。\n\n## 练习\n\n第二题（修订）。\n"
    );
}

#[test]
fn test_deleted_section_without_counterpart_leaves_target_alone() {
    let old = "## A\n\nA text.\n\n## B\n\nB text.\n\n## C\n\nC text.\n";
    let new = "## A\n\nA text.\n\n## C\n\nC text.\n";
    let target = "---\nheading-map:\n  A: 甲\n  C: 丙\n---\n\n## 甲\n\n甲文。\n\n## 丙\n\n丙文。\n";
    let mut translator = Dictionary::new(&[]);

    let outcome = Synchronizer::new(Config::default())
        .run(&request(old, new, target), &mut translator)
        .unwrap();
    assert_eq!(outcome.applied, 0);
    assert_eq!(outcome.skipped, 2);
    assert_eq!(outcome.text, target);
}

#[test]
fn test_invalid_granularity_aborts() {
    let config = Config {
        granularity: "secions".to_string(),
        ..Config::default()
    };
    let result = Synchronizer::new(config).run(&request(OLD, NEW, TARGET), &mut Dictionary::new(&[]));
    assert!(matches!(result, Err(Error::Config(_))));
}
