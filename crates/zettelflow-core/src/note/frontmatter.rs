//! Frontmatter codec
//!
//! Parses the `---` delimited header of a note into an ordered key/value
//! list and builds it back. Every entry remembers the exact source lines it
//! was parsed from; entries the caller never modifies are written back
//! byte-for-byte, so quoting style, block lists and comments survive.
//!
//! The header is deliberately not handed to a YAML parser: template
//! placeholders such as `{{date}}` or `<% tp.date.now() %>` are not valid
//! YAML, and they are exactly the values the repair engine needs to see.

use serde::Serialize;

const DELIMITER: &str = "---";

/// A frontmatter value: a scalar string or a list of strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FrontmatterValue {
    Scalar(String),
    List(Vec<String>),
}

impl FrontmatterValue {
    pub fn scalar(value: impl Into<String>) -> Self {
        FrontmatterValue::Scalar(value.into())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FrontmatterValue::Scalar(s) => Some(s),
            FrontmatterValue::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            FrontmatterValue::List(items) => Some(items),
            FrontmatterValue::Scalar(_) => None,
        }
    }

    fn render(&self) -> String {
        match self {
            FrontmatterValue::Scalar(s) => render_scalar(s),
            FrontmatterValue::List(items) => {
                let rendered: Vec<String> = items.iter().map(|i| render_list_item(i)).collect();
                format!("[{}]", rendered.join(", "))
            }
        }
    }
}

impl From<&str> for FrontmatterValue {
    fn from(value: &str) -> Self {
        FrontmatterValue::Scalar(value.to_string())
    }
}

impl From<String> for FrontmatterValue {
    fn from(value: String) -> Self {
        FrontmatterValue::Scalar(value)
    }
}

impl From<Vec<String>> for FrontmatterValue {
    fn from(items: Vec<String>) -> Self {
        FrontmatterValue::List(items)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    key: String,
    value: FrontmatterValue,
    /// Source text (key line plus continuation lines); `None` once modified
    raw: Option<String>,
}

impl Entry {
    fn render(&self, newline: &str) -> String {
        match &self.raw {
            Some(raw) => raw.clone(),
            None => {
                let value = self.value.render();
                if value.is_empty() {
                    format!("{}:{}", self.key, newline)
                } else {
                    format!("{}: {}{}", self.key, value, newline)
                }
            }
        }
    }
}

/// Ordered frontmatter mapping
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frontmatter {
    /// Lines before the first key (comments, blank lines)
    preamble: String,
    entries: Vec<Entry>,
    /// The source document used `\r\n` line endings
    crlf: bool,
}

impl Frontmatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|e| e.key == key)
    }

    /// First value stored under `key`
    pub fn get(&self, key: &str) -> Option<&FrontmatterValue> {
        self.entries.iter().find(|e| e.key == key).map(|e| &e.value)
    }

    /// Scalar value stored under `key`; lists yield `None`
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(FrontmatterValue::as_str)
    }

    /// Keys in header order (duplicates included)
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FrontmatterValue)> {
        self.entries.iter().map(|e| (e.key.as_str(), &e.value))
    }

    /// Set `key` to `value`, keeping its position if present.
    ///
    /// Returns whether anything changed. Later duplicates of `key` are
    /// dropped so a key is never written twice.
    pub fn set(&mut self, key: &str, value: impl Into<FrontmatterValue>) -> bool {
        let value = value.into();
        let positions: Vec<usize> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.key == key)
            .map(|(i, _)| i)
            .collect();

        let Some((&first, duplicates)) = positions.split_first() else {
            self.entries.push(Entry {
                key: key.to_string(),
                value,
                raw: None,
            });
            return true;
        };

        let mut changed = !duplicates.is_empty();
        for &index in duplicates.iter().rev() {
            self.entries.remove(index);
        }

        let entry = &mut self.entries[first];
        if entry.value != value {
            entry.value = value;
            entry.raw = None;
            changed = true;
        }
        changed
    }

    /// Remove every entry for `key`, returning the first value
    pub fn remove(&mut self, key: &str) -> Option<FrontmatterValue> {
        let first = self.get(key).cloned();
        self.entries.retain(|e| e.key != key);
        first
    }

    /// Parse header text (the lines between the delimiters)
    pub fn parse_header(header: &str) -> Self {
        let mut fm = Frontmatter::new();

        for line in header.split_inclusive('\n') {
            let content = line.trim_end_matches(['\n', '\r']);
            let trimmed = content.trim();

            let continuation = content.starts_with([' ', '\t'])
                || trimmed.is_empty()
                || trimmed.starts_with('#')
                || trimmed.starts_with("- ")
                || trimmed == "-";

            if continuation || !content.contains(':') {
                fm.absorb_continuation(line, trimmed);
                continue;
            }

            let Some((key, value)) = content.split_once(':') else {
                fm.absorb_continuation(line, trimmed);
                continue;
            };
            let key = key.trim();
            if key.is_empty() {
                fm.absorb_continuation(line, trimmed);
                continue;
            }

            fm.entries.push(Entry {
                key: key.to_string(),
                value: parse_value(value.trim()),
                raw: Some(line.to_string()),
            });
        }

        fm
    }

    fn absorb_continuation(&mut self, line: &str, trimmed: &str) {
        let Some(last) = self.entries.last_mut() else {
            self.preamble.push_str(line);
            return;
        };

        if let Some(item) = trimmed.strip_prefix('-') {
            let item = unquote(item.trim());
            match &mut last.value {
                FrontmatterValue::Scalar(s) if s.is_empty() => {
                    last.value = FrontmatterValue::List(vec![item]);
                }
                FrontmatterValue::List(items) => items.push(item),
                FrontmatterValue::Scalar(_) => {}
            }
        }

        if let Some(raw) = last.raw.as_mut() {
            raw.push_str(line);
        }
    }

    /// Line ending used for rewritten lines
    pub fn newline(&self) -> &'static str {
        if self.crlf {
            "\r\n"
        } else {
            "\n"
        }
    }

    /// Render the header lines (without delimiters)
    pub fn render_header(&self) -> String {
        let mut out = self.preamble.clone();
        for entry in &self.entries {
            out.push_str(&entry.render(self.newline()));
        }
        out
    }
}

/// Split a document into header text and body.
///
/// Returns `None` when the text does not open with a `---` line or the
/// header is never closed.
pub fn split_document(text: &str) -> Option<(&str, &str)> {
    let mut lines = text.split_inclusive('\n');
    let first = lines.next()?;
    if first.trim_end() != DELIMITER || !first.ends_with('\n') {
        return None;
    }

    let header_start = first.len();
    let mut offset = header_start;
    for line in lines {
        if line.trim_end() == DELIMITER {
            let header = &text[header_start..offset];
            let body = &text[offset + line.len()..];
            return Some((header, body));
        }
        offset += line.len();
    }
    None
}

/// Whether the text opens a header that is never closed
pub fn has_unclosed_header(text: &str) -> bool {
    let opens = text
        .split_inclusive('\n')
        .next()
        .is_some_and(|first| first.trim_end() == DELIMITER && first.ends_with('\n'));
    opens && split_document(text).is_none()
}

/// Parse a full document into frontmatter and body.
///
/// A document without a leading header yields an empty mapping and the
/// entire text as body.
pub fn parse_document(text: &str) -> (Frontmatter, String) {
    match split_document(text) {
        Some((header, body)) => {
            let mut fm = Frontmatter::parse_header(header);
            fm.crlf = text.starts_with("---\r\n");
            (fm, body.to_string())
        }
        None => (Frontmatter::new(), text.to_string()),
    }
}

/// Build a document from frontmatter and body.
///
/// An empty mapping produces the body alone.
pub fn build_document(frontmatter: &Frontmatter, body: &str) -> String {
    if frontmatter.is_empty() && frontmatter.preamble.is_empty() {
        return body.to_string();
    }
    let newline = frontmatter.newline();
    format!(
        "{}{}{}{}{}{}",
        DELIMITER,
        newline,
        frontmatter.render_header(),
        DELIMITER,
        newline,
        body
    )
}

fn parse_value(value: &str) -> FrontmatterValue {
    if value.starts_with('[') && value.ends_with(']') && value.len() >= 2 {
        let inner = &value[1..value.len() - 1];
        let items = split_flow_list(inner)
            .into_iter()
            .map(|item| unquote(item.trim()))
            .filter(|item| !item.is_empty())
            .collect();
        return FrontmatterValue::List(items);
    }
    FrontmatterValue::Scalar(unquote(value))
}

/// Split a flow list body on commas that are not inside quotes
fn split_flow_list(inner: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, c) in inner.char_indices() {
        match (quote, c) {
            (None, '"') | (None, '\'') => quote = Some(c),
            (Some(q), c) if c == q => quote = None,
            (None, ',') => {
                parts.push(&inner[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&inner[start..]);
    parts
}

fn unquote(value: &str) -> String {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == b'"' && last == b'"' {
            return value[1..value.len() - 1]
                .replace("\\\"", "\"")
                .replace("\\\\", "\\");
        }
        if first == b'\'' && last == b'\'' {
            return value[1..value.len() - 1].replace("''", "'");
        }
    }
    value.to_string()
}

fn needs_quotes(value: &str) -> bool {
    const LEADING: &[char] = &[
        '[', ']', '{', '}', '#', '&', '*', '!', '|', '>', '%', '@', '`', '"', '\'', ',', '?', '-',
    ];
    value != value.trim()
        || value.starts_with(LEADING)
        || value.contains(": ")
        || value.contains(" #")
        || value.ends_with(':')
        || value.contains('\n')
}

fn quote(value: &str) -> String {
    format!(
        "\"{}\"",
        value
            .replace('\\', "\\\\")
            .replace('"', "\\\"")
            .replace('\n', " ")
    )
}

fn render_scalar(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }
    if needs_quotes(value) {
        quote(value)
    } else {
        value.to_string()
    }
}

fn render_list_item(item: &str) -> String {
    if needs_quotes(item) || item.contains(',') || item.contains(']') {
        quote(item)
    } else {
        item.to_string()
    }
}
