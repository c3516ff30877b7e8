//! Metadata extraction from markdown text.
//!
//! Three sources are recognised, in document order:
//!
//! ```text
//! ---                      YAML frontmatter
//! status: open
//! ---
//! due:: 2024-05-01         full-line field
//! met with [who:: [[Bob]]] and (mood:: good)   inline fields
//! ```
//!
//! Fenced code blocks are skipped.

use fieldsuggest_protocol::{DocumentFields, FieldValue, Link, LinkKind};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_yaml::Value as YamlValue;
use std::collections::BTreeMap;

static FULL_LINE_FIELD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:[-*+]\s+(?:\[.\]\s+)?|>\s*)?([^\[\]()\s:`][^\[\]():`]*?)\s*::(.*)$")
        .unwrap_or_else(|e| unreachable!("static regex: {e}"))
});

static WIKI_LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(!)?\[\[([^\]|#]*)(?:#(\^)?([^\]|]*))?(?:\|([^\]]*))?\]\]$")
        .unwrap_or_else(|e| unreachable!("static regex: {e}"))
});

static NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^-?\d+(?:\.\d+)?$").unwrap_or_else(|e| unreachable!("static regex: {e}"))
});

/// Extracts all fields of one markdown document.
pub fn parse_document(text: &str) -> DocumentFields {
    let mut fields = DocumentFields::new();
    let body = match split_frontmatter(text) {
        Some((frontmatter, body)) => {
            parse_frontmatter(frontmatter, &mut fields);
            body
        }
        None => text,
    };

    let mut in_fence = false;
    for line in body.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }
        parse_line(line, &mut fields);
    }
    fields
}

fn split_frontmatter(text: &str) -> Option<(&str, &str)> {
    let rest = text
        .strip_prefix("---\n")
        .or_else(|| text.strip_prefix("---\r\n"))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            return Some((&rest[..offset], &rest[offset + line.len()..]));
        }
        offset += line.len();
    }
    None
}

fn parse_frontmatter(raw: &str, fields: &mut DocumentFields) {
    if raw.trim().is_empty() {
        return;
    }
    let mapping = match serde_yaml::from_str::<YamlValue>(raw) {
        Ok(YamlValue::Mapping(mapping)) => mapping,
        Ok(_) => return,
        Err(err) => {
            log::debug!("Ignoring malformed frontmatter: {err}");
            return;
        }
    };
    for (key, value) in mapping {
        if let Some(key) = yaml_key(&key) {
            fields.push(key, from_yaml(value));
        }
    }
}

fn yaml_key(key: &YamlValue) -> Option<String> {
    match key {
        YamlValue::String(key) => Some(key.clone()),
        YamlValue::Number(key) => Some(key.to_string()),
        YamlValue::Bool(key) => Some(key.to_string()),
        _ => None,
    }
}

fn from_yaml(value: YamlValue) -> FieldValue {
    match value {
        YamlValue::Null => FieldValue::Null,
        YamlValue::Bool(flag) => FieldValue::Boolean(flag),
        YamlValue::Number(number) => number
            .as_f64()
            .map_or_else(|| FieldValue::Text(number.to_string()), FieldValue::Number),
        YamlValue::String(text) => match parse_link(text.trim()) {
            Some(link) => FieldValue::Link(link),
            None => FieldValue::Text(text),
        },
        YamlValue::Sequence(items) => FieldValue::List(items.into_iter().map(from_yaml).collect()),
        YamlValue::Mapping(mapping) => {
            let entries: BTreeMap<String, FieldValue> = mapping
                .into_iter()
                .filter_map(|(key, value)| Some((yaml_key(&key)?, from_yaml(value))))
                .collect();
            FieldValue::Object(entries)
        }
        YamlValue::Tagged(tagged) => from_yaml(tagged.value),
    }
}

fn parse_line(line: &str, fields: &mut DocumentFields) {
    if let Some(caps) = FULL_LINE_FIELD.captures(line) {
        let key = caps.get(1).map_or("", |m| m.as_str()).trim();
        let value = caps.get(2).map_or("", |m| m.as_str());
        if !key.is_empty() && !key.contains("://") {
            fields.push(clean_key(key), parse_value(value));
            return;
        }
    }
    for (key, value) in inline_fields(line) {
        fields.push(key, parse_value(&value));
    }
}

/// `[key:: value]` and `(key:: value)` fields embedded in running text.
fn inline_fields(line: &str) -> Vec<(String, String)> {
    let chars: Vec<char> = line.chars().collect();
    let mut found = Vec::new();
    let mut idx = 0;
    while idx < chars.len() {
        let close = match chars[idx] {
            '[' => ']',
            '(' => ')',
            _ => {
                idx += 1;
                continue;
            }
        };
        let Some(end) = matching_close(&chars, idx, close) else {
            idx += 1;
            continue;
        };
        let inner: String = chars[idx + 1..end].iter().collect();
        match inner.split_once("::") {
            Some((key, value)) if is_inline_key(key) => {
                found.push((clean_key(key.trim()), value.to_string()));
                idx = end + 1;
            }
            _ => idx += 1,
        }
    }
    found
}

fn matching_close(chars: &[char], open: usize, close: char) -> Option<usize> {
    let open_char = chars[open];
    let mut depth = 0usize;
    for (idx, &ch) in chars.iter().enumerate().skip(open + 1) {
        if ch == open_char {
            depth += 1;
        } else if ch == close {
            if depth == 0 {
                return Some(idx);
            }
            depth -= 1;
        }
    }
    None
}

fn is_inline_key(key: &str) -> bool {
    let key = key.trim();
    !key.is_empty()
        && !key
            .chars()
            .any(|ch| matches!(ch, '[' | ']' | '(' | ')' | '`' | ':'))
}

/// Strips markdown emphasis around a key, e.g. `**due**`.
fn clean_key(key: &str) -> String {
    key.trim_matches(|ch| ch == '*' || ch == '_').trim().to_string()
}

/// Types a raw inline value.
pub fn parse_value(raw: &str) -> FieldValue {
    let raw = raw.trim();
    if raw.is_empty() {
        return FieldValue::Null;
    }
    if raw.eq_ignore_ascii_case("true") {
        return FieldValue::Boolean(true);
    }
    if raw.eq_ignore_ascii_case("false") {
        return FieldValue::Boolean(false);
    }
    if NUMBER.is_match(raw) {
        if let Ok(number) = raw.parse::<f64>() {
            return FieldValue::Number(number);
        }
    }
    if let Some(link) = parse_link(raw) {
        return FieldValue::Link(link);
    }
    if raw.contains(',') {
        let links: Option<Vec<FieldValue>> = raw
            .split(',')
            .map(|part| parse_link(part.trim()).map(FieldValue::Link))
            .collect();
        if let Some(links) = links {
            return FieldValue::List(links);
        }
    }
    FieldValue::Text(raw.to_string())
}

/// Parses a complete `[[target#sub|display]]` wiki link.
pub fn parse_link(raw: &str) -> Option<Link> {
    let caps = WIKI_LINK.captures(raw)?;
    let path = caps.get(2)?.as_str().trim();
    let mut link = Link::file(path);
    if let Some(subpath) = caps.get(4).map(|m| m.as_str().trim()).filter(|s| !s.is_empty()) {
        let kind = if caps.get(3).is_some() {
            LinkKind::Block
        } else {
            LinkKind::Header
        };
        link = link.with_subpath(kind, subpath);
    } else if path.is_empty() {
        return None;
    }
    if let Some(display) = caps.get(5).map(|m| m.as_str().trim()).filter(|s| !s.is_empty()) {
        link = link.with_display(display);
    }
    if caps.get(1).is_some() {
        link = link.embedded();
    }
    Some(link)
}
