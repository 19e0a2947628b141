//! Changelog parsing and rendering
//!
//! ## Format
//!
//! ```text
//! + 1.2.3;2024-05-01
//! - Fixed bug A
//! - Added feature B, with a description
//!   that wraps onto a second line
//!
//! + 1.2.2;Jane Doe;2024-04-12
//! - Initial release
//! ```
//!
//! A header is `+ VERSION;[...;]DATE`. Change lines start with `-` and are
//! only recognised after a header. Indented or wrapped lines continue the
//! current change. Any other text closes the header; following lines are
//! ignored until the next header.

use chrono::NaiveDate;
use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::error::DeployResult;
use crate::markup;

/// Maximum length of a header version
pub const MAX_VERSION_LEN: usize = 25;

/// Date formats accepted in headers (commas are removed first)
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", "%Y/%m/%d", "%d %B %Y", "%d %b %Y", "%B %d %Y", "%b %d %Y",
];

/// A changelog record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChangeEntry {
    /// Release header
    Header { version: String, date: NaiveDate },
    /// A single change description
    Change { text: String },
}

/// Parsed changelog
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Changelog {
    entries: Vec<ChangeEntry>,
}

impl Changelog {
    /// Read and parse a changelog file
    pub fn from_file(path: impl AsRef<Path>) -> DeployResult<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Ok(Self::parse(&content))
    }

    /// Parse changelog text
    pub fn parse(content: &str) -> Self {
        Self::from_lines(content.lines())
    }

    /// Parse a sequence of lines
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut entries = Vec::new();
        let mut open = false;
        let mut change: Option<String> = None;

        fn flush(change: &mut Option<String>, entries: &mut Vec<ChangeEntry>) {
            if let Some(text) = change.take().filter(|t| !t.is_empty()) {
                entries.push(ChangeEntry::Change { text });
            }
        }

        for line in lines {
            let line = line.as_ref().trim();

            if line.is_empty() {
                flush(&mut change, &mut entries);
                continue;
            }

            if let Some((version, date)) = parse_header(line) {
                flush(&mut change, &mut entries);
                entries.push(ChangeEntry::Header { version, date });
                open = true;
                continue;
            }

            if open && line.starts_with('-') && !line.starts_with("--") {
                flush(&mut change, &mut entries);
                change = Some(line.trim_start_matches(['-', ' ']).trim().to_string());
                continue;
            }

            match change.as_mut() {
                Some(text) if open => {
                    if !text.is_empty() {
                        text.push(' ');
                    }
                    text.push_str(line);
                }
                _ => open = false,
            }
        }

        flush(&mut change, &mut entries);
        Self { entries }
    }

    /// Entries in input order
    pub fn entries(&self) -> &[ChangeEntry] {
        &self.entries
    }

    /// Check if there are no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of release headers
    pub fn header_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e, ChangeEntry::Header { .. }))
            .count()
    }

    /// Render in the changelog file format
    pub fn to_plain(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            match entry {
                ChangeEntry::Header { version, date } => {
                    if !out.is_empty() {
                        out.push('\n');
                    }
                    out.push_str(&format!("+ {};{}\n", version, date.format("%Y-%m-%d")));
                }
                ChangeEntry::Change { text } => {
                    out.push_str(&format!("- {}\n", text));
                }
            }
        }
        out
    }

    /// Render as a sequence of `<release>` markup blocks
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        let mut open = false;

        for entry in &self.entries {
            match entry {
                ChangeEntry::Header { version, date } => {
                    if open {
                        close_release(&mut out);
                    }
                    out.push_str(&format!(
                        "<release version=\"{}\" date=\"{}\">\n",
                        markup::escape(version),
                        date.format("%Y-%m-%d")
                    ));
                    out.push_str("    <description>\n        <ul>\n");
                    open = true;
                }
                ChangeEntry::Change { text } => {
                    out.push_str(&format!("            <li>{}</li>\n", markup::escape(text)));
                }
            }
        }

        if open {
            close_release(&mut out);
        }
        out.trim_end().to_string()
    }
}

impl std::fmt::Display for Changelog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_plain())
    }
}

fn close_release(out: &mut String) {
    out.push_str("        </ul>\n    </description>\n</release>\n");
}

/// Parse a header line into version and date
fn parse_header(line: &str) -> Option<(String, NaiveDate)> {
    if !line.starts_with('+') || line.starts_with("++") {
        return None;
    }

    let pieces: Vec<&str> = line
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    if pieces.len() < 2 {
        return None;
    }

    let last = pieces[pieces.len() - 1];
    let Some(date) = parse_date(last) else {
        tracing::debug!("Changelog header rejected, bad date: {}", line);
        return None;
    };

    let version = pieces[0].trim_start_matches(['+', ' ']).trim();
    if version.is_empty() || version.chars().count() > MAX_VERSION_LEN {
        tracing::debug!("Changelog header rejected, bad version: {}", line);
        return None;
    }

    Some((version.to_string(), date))
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.replace(',', " ");
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(&text, fmt).ok())
}
