//! Rule source loading.
//!
//! Rules ship as AIML-style documents: `<category>` blocks holding a
//! `<pattern>` and a `<template>`, optionally grouped under
//! `<topic name="...">`. This module scrapes that subset out of a string, a
//! file, or a flat directory of files and graphs every valid category in
//! document order.
//!
//! The loader is deliberately forgiving, mirroring how rule libraries are
//! curated in practice:
//!
//! - A category missing its pattern or its template is skipped and counted,
//!   never fatal.
//! - A pattern that collides with an earlier category is dropped (the first
//!   one wins) and counted.
//! - An unreadable file inside a directory becomes a warning in the report;
//!   the rest of the directory still loads.
//!
//! Extraction is regex-based over the supported subset rather than a full
//! XML parse; templates are kept as raw text for the external renderer, so
//! nothing inside `<template>` is interpreted here.

use crate::{Engine, InsertError};
use std::fmt;
use std::io;
use std::path::Path;

/// What a load pass did. Reports from multiple files merge additively.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoadReport {
    /// Documents processed.
    pub files: usize,
    /// Categories graphed.
    pub loaded: usize,
    /// Categories skipped as malformed (missing pattern or template, or an
    /// empty pattern).
    pub skipped: usize,
    /// Categories dropped because an earlier pattern already owns the node.
    pub collisions: usize,
    /// Human-readable diagnostics for everything skipped or dropped.
    pub warnings: Vec<String>,
}

impl LoadReport {
    /// Fold another report into this one.
    pub fn absorb(&mut self, other: LoadReport) {
        self.files += other.files;
        self.loaded += other.loaded;
        self.skipped += other.skipped;
        self.collisions += other.collisions;
        self.warnings.extend(other.warnings);
    }
}

impl fmt::Display for LoadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} categories from {} file(s) ({} skipped, {} collisions)",
            self.loaded, self.files, self.skipped, self.collisions
        )
    }
}

/// Why a load call failed outright. Per-category problems never surface
/// here; they end up in the [`LoadReport`].
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// Load every category in one document string.
pub fn load_str(engine: &mut Engine, source: &str) -> LoadReport {
    let mut report = LoadReport { files: 1, ..LoadReport::default() };

    let topic_re = regex!(r#"(?is)<topic\s+name\s*=\s*"([^"]*)"\s*>(.*?)</topic>"#);

    for caps in topic_re.captures_iter(source) {
        let topic = caps.get(1).map(|m| m.as_str()).unwrap_or("");
        let body = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        load_categories(engine, body, Some(topic), &mut report);
    }

    // Categories outside any topic block.
    let without_topics = topic_re.replace_all(source, "");
    load_categories(engine, &without_topics, None, &mut report);

    report
}

fn load_categories(engine: &mut Engine, source: &str, topic: Option<&str>, report: &mut LoadReport) {
    let category_re = regex!(r"(?is)<category>(.*?)</category>");
    let pattern_re = regex!(r"(?is)<pattern>(.*?)</pattern>");
    let template_re = regex!(r"(?is)<template>(.*?)</template>");

    for caps in category_re.captures_iter(source) {
        let body = caps.get(1).map(|m| m.as_str()).unwrap_or("");

        let Some(pattern) = pattern_re.captures(body).and_then(|c| c.get(1)) else {
            report.skipped += 1;
            report.warnings.push("skipping malformed category: no <pattern>".to_string());
            continue;
        };
        let Some(template) = template_re.captures(body).and_then(|c| c.get(1)) else {
            report.skipped += 1;
            report.warnings.push("skipping malformed category: no <template>".to_string());
            continue;
        };

        // Collapse the whitespace an authored document carries.
        let pattern = pattern.as_str().split_whitespace().collect::<Vec<_>>().join(" ");
        let template = template.as_str().trim().to_string();

        let added = match topic {
            Some(name) => engine.add_category_in_topic(&pattern, &template, name),
            None => engine.add_category(&pattern, &template),
        };
        match added {
            Ok(_) => report.loaded += 1,
            Err(InsertError::EmptyPattern) => {
                report.skipped += 1;
                report.warnings.push("skipping malformed category: empty <pattern>".to_string());
            }
            Err(InsertError::TerminalCollision { winner }) => {
                report.collisions += 1;
                report
                    .warnings
                    .push(format!("dropping \"{pattern}\": already graphed by category {winner}"));
            }
        }
    }
}

/// Load a single document file or a flat directory of document files.
///
/// Directory entries load in name order so collision outcomes are stable.
/// Nested directories are not descended into; they produce a warning, as do
/// unreadable files.
pub fn load_path(engine: &mut Engine, path: &Path) -> Result<LoadReport, LoadError> {
    let meta = std::fs::metadata(path)
        .map_err(|source| LoadError::Io { path: path.display().to_string(), source })?;

    if !meta.is_dir() {
        return Ok(load_file(engine, path)?);
    }

    let mut entries: Vec<_> = std::fs::read_dir(path)
        .map_err(|source| LoadError::Io { path: path.display().to_string(), source })?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .collect();
    entries.sort();

    let mut report = LoadReport::default();
    for entry in entries {
        if entry.is_dir() {
            report.warnings.push(format!("not descending into nested folder {}", entry.display()));
            continue;
        }
        match load_file(engine, &entry) {
            Ok(file_report) => report.absorb(file_report),
            Err(err) => report.warnings.push(err.to_string()),
        }
    }
    Ok(report)
}

fn load_file(engine: &mut Engine, path: &Path) -> Result<LoadReport, LoadError> {
    let source = std::fs::read_to_string(path)
        .map_err(|source| LoadError::Io { path: path.display().to_string(), source })?;
    Ok(load_str(engine, &source))
}
