//! Sectioned key file codec.
//!
//! Supports the subset of the desktop key-file format that profiles need:
//! `[section]` headers, `key=value` entries, and `#`/`;` comments. Comments
//! and blank lines are kept in place so that a load → modify → save cycle
//! leaves everything except the touched entries untouched.
//!
//! Values are stored unescaped. On output `\\`, newline, tab and carriage
//! return are escaped, as is a leading or trailing space (`\s`) so it
//! survives parsing. Only ASCII spaces and tabs around a value are trimmed;
//! any other whitespace is part of the value.

use std::fmt;

/// A parse failure, carrying the 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyFileError {
    /// 1-based line number of the offending line.
    pub line: usize,
    /// Human-readable description of the problem.
    pub message: String,
}

impl KeyFileError {
    fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for KeyFileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for KeyFileError {}

#[derive(Debug, Clone, PartialEq)]
enum Line {
    /// Comment or blank line, written back exactly as read.
    Verbatim(String),
    Entry { key: String, value: String },
}

impl Line {
    fn is_blank(&self) -> bool {
        matches!(self, Line::Verbatim(text) if text.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Group {
    name: String,
    lines: Vec<Line>,
}

impl Group {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            lines: Vec::new(),
        }
    }

    fn entry_mut(&mut self, key: &str) -> Option<&mut String> {
        self.lines.iter_mut().find_map(|line| match line {
            Line::Entry { key: k, value } if k == key => Some(value),
            _ => None,
        })
    }

    fn push_line(&mut self, line: Line) {
        // Keep trailing blank lines (the separator before the next group) last
        let at = self
            .lines
            .iter()
            .rposition(|l| !l.is_blank())
            .map_or(0, |i| i + 1);
        self.lines.insert(at, line);
    }
}

/// In-memory key file document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyFile {
    /// Comments and blank lines before the first group header.
    preamble: Vec<String>,
    groups: Vec<Group>,
}

impl KeyFile {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse key file text.
    ///
    /// Repeated group headers are merged into the first occurrence and a
    /// repeated key within a group keeps the last value.
    pub fn parse(text: &str) -> Result<Self, KeyFileError> {
        let mut doc = KeyFile::new();
        let mut current: Option<usize> = None;

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let raw = raw.strip_suffix('\r').unwrap_or(raw);
            let trimmed = raw.trim_start();

            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
                match current {
                    Some(g) => doc.groups[g].lines.push(Line::Verbatim(raw.to_string())),
                    None => doc.preamble.push(raw.to_string()),
                }
                continue;
            }

            if trimmed.starts_with('[') {
                let name = parse_header(trimmed)
                    .ok_or_else(|| KeyFileError::new(line_no, "malformed group header"))?;
                current = Some(doc.group_index_or_insert(name));
                continue;
            }

            let Some(g) = current else {
                return Err(KeyFileError::new(
                    line_no,
                    "key/value pair found before any group header",
                ));
            };
            let Some((key, value)) = trimmed.split_once('=') else {
                return Err(KeyFileError::new(
                    line_no,
                    "line is not a group header, key/value pair or comment",
                ));
            };
            let key = key.trim();
            if key.is_empty() {
                return Err(KeyFileError::new(line_no, "empty key name"));
            }
            let value = unescape(value.trim_matches(VALUE_PADDING))
                .map_err(|message| KeyFileError::new(line_no, message))?;

            let group = &mut doc.groups[g];
            match group.entry_mut(key) {
                Some(existing) => *existing = value,
                None => group.lines.push(Line::Entry {
                    key: key.to_string(),
                    value,
                }),
            }
        }

        Ok(doc)
    }

    /// Serialize the document back to text.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for line in &self.preamble {
            out.push_str(line);
            out.push('\n');
        }
        for group in &self.groups {
            out.push('[');
            out.push_str(&group.name);
            out.push_str("]\n");
            for line in &group.lines {
                match line {
                    Line::Verbatim(text) => out.push_str(text),
                    Line::Entry { key, value } => {
                        out.push_str(key);
                        out.push('=');
                        out.push_str(&escape(value));
                    }
                }
                out.push('\n');
            }
        }
        out
    }

    /// Look up a raw (unescaped) value.
    pub fn get(&self, group: &str, key: &str) -> Option<&str> {
        self.group(group)?.lines.iter().find_map(|line| match line {
            Line::Entry { key: k, value } if k == key => Some(value.as_str()),
            _ => None,
        })
    }

    /// Insert or overwrite a value, creating the group if needed.
    ///
    /// An existing entry is updated in place; a new one goes after the last
    /// non-blank line of its group.
    pub fn set(&mut self, group: &str, key: &str, value: &str) {
        let g = self.group_index_or_insert(group);
        let group = &mut self.groups[g];
        match group.entry_mut(key) {
            Some(existing) => *existing = value.to_string(),
            None => group.push_line(Line::Entry {
                key: key.to_string(),
                value: value.to_string(),
            }),
        }
    }

    /// Whether `group` contains `key`.
    pub fn has_key(&self, group: &str, key: &str) -> bool {
        self.get(group, key).is_some()
    }

    /// Keys of `group` in document order.
    pub fn keys(&self, group: &str) -> Vec<&str> {
        self.group(group)
            .map(|g| {
                g.lines
                    .iter()
                    .filter_map(|line| match line {
                        Line::Entry { key, .. } => Some(key.as_str()),
                        Line::Verbatim(_) => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Group names in document order.
    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.name.as_str())
    }

    fn group(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.name == name)
    }

    fn group_index_or_insert(&mut self, name: &str) -> usize {
        if let Some(idx) = self.groups.iter().position(|g| g.name == name) {
            return idx;
        }
        // Separate the new group from whatever precedes it
        match self.groups.last_mut() {
            Some(prev) if !prev.lines.last().is_some_and(Line::is_blank) => {
                prev.lines.push(Line::Verbatim(String::new()));
            }
            None if self.preamble.last().is_some_and(|l| !l.trim().is_empty()) => {
                self.preamble.push(String::new());
            }
            _ => {}
        }
        self.groups.push(Group::new(name));
        self.groups.len() - 1
    }
}

/// Whether `key` can be written as the left-hand side of a `key=value` line
/// and read back unchanged.
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key.trim() == key
        && !key.contains(['=', '\n', '\r'])
        && !key.starts_with(['#', ';', '['])
}

fn parse_header(line: &str) -> Option<&str> {
    let inner = line.trim_end().strip_prefix('[')?.strip_suffix(']')?;
    if inner.is_empty() || inner.contains(['[', ']']) {
        return None;
    }
    Some(inner)
}

/// Characters stripped from both ends of a raw value.
const VALUE_PADDING: [char; 2] = [' ', '\t'];

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let last = value.chars().count().saturating_sub(1);
    for (i, c) in value.chars().enumerate() {
        match c {
            ' ' if i == 0 || i == last => out.push_str("\\s"),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out
}

fn unescape(raw: &str) -> Result<String, String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('s') => out.push(' '),
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('\\') => out.push('\\'),
            Some(other) => return Err(format!("invalid escape sequence '\\{other}'")),
            None => return Err("value ends with an unfinished escape sequence".to_string()),
        }
    }
    Ok(out)
}
