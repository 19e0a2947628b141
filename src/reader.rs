//! Structured key-value reader
//!
//! Reads the deployment configuration file format into a [`RawConfigMap`].
//! No semantic validation happens here; see [`crate::DeployConfig`] for that.
//!
//! ## File Format
//!
//! ```text
//! # Comment lines start with '#' or '//'
//! AppBaseName = HelloWorld
//! AppFriendlyName = "Hello World"
//! IconFiles = """
//!     Deploy/HelloWorld.16x16.png
//!     Deploy/HelloWorld.svg
//! """
//! ```
//!
//! Keys are case-insensitive and may appear only once.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{DeployError, DeployResult};

/// Multi-line value delimiter
pub const MULTI_QUOTE: &str = "\"\"\"";

/// A single `key = value` entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawValue {
    /// Key as written in the source
    pub key: String,
    /// Raw value (quotes stripped, multi-line blocks joined with `\n`)
    pub value: String,
    /// 1-based line number where the key appears
    pub line: usize,
}

/// Case-insensitive map of raw configuration values
#[derive(Debug, Clone, Default)]
pub struct RawConfigMap {
    source_name: String,
    entries: Vec<RawValue>,
    index: HashMap<String, usize>,
    lines: Vec<String>,
}

impl RawConfigMap {
    /// Read and parse a configuration file
    pub fn from_file(path: impl AsRef<Path>) -> DeployResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        Self::parse(&name, &content)
    }

    /// Parse configuration text
    pub fn parse(source_name: &str, content: &str) -> DeployResult<Self> {
        Self::from_lines(source_name, content.lines())
    }

    /// Parse a sequence of lines
    pub fn from_lines<I, S>(source_name: &str, lines: I) -> DeployResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let lines: Vec<String> = lines.into_iter().map(|s| s.as_ref().to_string()).collect();
        let mut map = Self {
            source_name: source_name.to_string(),
            ..Default::default()
        };

        let mut n = 0;
        while n < lines.len() {
            let line_no = n + 1;
            let trimmed = lines[n].trim();
            n += 1;

            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with("//") {
                continue;
            }

            let Some((key, value)) = trimmed.split_once('=') else {
                return Err(DeployError::format(
                    source_name,
                    line_no,
                    format!("syntax error: {}", trimmed),
                ));
            };

            let key = key.trim();
            if key.is_empty() {
                return Err(DeployError::format(source_name, line_no, "syntax error: missing key"));
            }

            let value = value.trim();
            let value = if let Some(rest) = value.strip_prefix(MULTI_QUOTE) {
                let (text, consumed) = read_multi_line(rest, &lines[n..]).ok_or_else(|| {
                    DeployError::format(source_name, line_no, "no multi-line termination")
                })?;
                n += consumed;
                text
            } else {
                unquote(value).to_string()
            };

            map.insert(key, value, line_no)?;
        }

        map.lines = lines;
        tracing::debug!("Read {} values from {}", map.entries.len(), map.source_name);
        Ok(map)
    }

    fn insert(&mut self, key: &str, value: String, line: usize) -> DeployResult<()> {
        let lower = key.to_lowercase();
        if let Some(&existing) = self.index.get(&lower) {
            return Err(DeployError::format(
                &self.source_name,
                line,
                format!(
                    "duplicate key {} (first defined on line {})",
                    key, self.entries[existing].line
                ),
            ));
        }
        self.index.insert(lower, self.entries.len());
        self.entries.push(RawValue {
            key: key.to_string(),
            value,
            line,
        });
        Ok(())
    }

    /// Get a raw value by key (case-insensitive)
    pub fn get(&self, key: &str) -> Option<&str> {
        self.get_entry(key).map(|e| e.value.as_str())
    }

    /// Get the full entry by key (case-insensitive)
    pub fn get_entry(&self, key: &str) -> Option<&RawValue> {
        self.index
            .get(&key.to_lowercase())
            .map(|&i| &self.entries[i])
    }

    /// Check if a key is present
    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(&key.to_lowercase())
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the map has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in source order
    pub fn iter(&self) -> impl Iterator<Item = &RawValue> {
        self.entries.iter()
    }

    /// Name of the source (usually the file name)
    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// The original lines, unmodified
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// The original source text
    pub fn verbatim(&self) -> String {
        self.lines.join("\n")
    }
}

/// Accumulate a `"""` block. `first` is the text after the opening marker.
/// Returns the value and the number of following lines consumed.
fn read_multi_line(first: &str, rest: &[String]) -> Option<(String, usize)> {
    if let Some(pos) = first.find(MULTI_QUOTE) {
        return Some((first[..pos].trim().to_string(), 0));
    }

    let mut text = first.to_string();
    for (i, line) in rest.iter().enumerate() {
        if let Some(pos) = line.find(MULTI_QUOTE) {
            text.push('\n');
            text.push_str(&line[..pos]);
            return Some((text.trim().to_string(), i + 1));
        }
        text.push('\n');
        text.push_str(line);
    }

    None
}

/// Strip one matching pair of surrounding quotes
fn unquote(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() > 1 {
        let first = bytes[0];
        if (first == b'"' || first == b'\'') && bytes[bytes.len() - 1] == first {
            return &value[1..value.len() - 1];
        }
    }
    value
}
