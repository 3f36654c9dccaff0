//! Line-based requirements.txt editing
//!
//! Only the leading package name of each line is interpreted; version
//! constraints, extras and markers are carried as opaque text.

use crate::domain::{DjangoVersion, ManifestChange, DJANGO_PACKAGE};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([A-Za-z0-9][A-Za-z0-9._-]*)").unwrap());

/// A single `name<specifier>` requirement line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    /// Package name as it should be written
    pub name: String,
    /// Version specifier, e.g. `~=1.11`
    pub specifier: String,
}

impl Requirement {
    /// Creates a new Requirement
    pub fn new(name: impl Into<String>, specifier: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            specifier: specifier.into(),
        }
    }

    /// The compatible-release Django requirement for a release line
    pub fn django(version: DjangoVersion) -> Self {
        Self::new(DJANGO_PACKAGE, version.specifier())
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, self.specifier)
    }
}

/// Normalizes a package name for comparison: lowercase ASCII alphanumerics only
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Extracts the package name from a requirement line
///
/// Returns `None` for blank lines, comments (`#`) and pip options (`-r`, `-e`, `--index-url`, ...).
pub fn package_name(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('-') {
        return None;
    }

    NAME_RE
        .captures(trimmed)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Byte order mark some Windows editors put at the start of text files
const BOM: char = '\u{feff}';

/// In-memory requirements.txt, one entry per line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequirementsFile {
    lines: Vec<String>,
    /// The file started with a byte order mark
    bom: bool,
    /// `"\r\n"` when the file used CRLF line endings, `"\n"` otherwise
    line_ending: &'static str,
}

impl Default for RequirementsFile {
    fn default() -> Self {
        Self {
            lines: Vec::new(),
            bom: false,
            line_ending: "\n",
        }
    }
}

impl RequirementsFile {
    /// Parses file content, keeping every line in order
    ///
    /// A leading byte order mark and CRLF line endings are remembered and
    /// restored by [`RequirementsFile::render`].
    pub fn parse(content: &str) -> Self {
        let (bom, body) = match content.strip_prefix(BOM) {
            Some(rest) => (true, rest),
            None => (false, content),
        };
        let line_ending = if body.contains("\r\n") { "\r\n" } else { "\n" };

        Self {
            lines: body.lines().map(str::to_string).collect(),
            bom,
            line_ending,
        }
    }

    /// Returns the lines
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Returns the line ending used when rendering
    pub fn line_ending(&self) -> &'static str {
        self.line_ending
    }

    /// Inserts or replaces the requirement
    ///
    /// The first matching line is replaced in place and any later duplicates
    /// are dropped. Without a match the requirement is appended.
    pub fn upsert(&mut self, requirement: &Requirement) -> ManifestChange {
        let target = normalize_name(&requirement.name);
        let rendered = requirement.to_string();

        let mut previous: Option<String> = None;
        let mut duplicates = 0usize;
        let mut kept = Vec::with_capacity(self.lines.len() + 1);

        for line in self.lines.drain(..) {
            let matches = package_name(&line).is_some_and(|n| normalize_name(n) == target);
            if !matches {
                kept.push(line);
                continue;
            }

            if previous.is_none() {
                previous = Some(line);
                kept.push(rendered.clone());
            } else {
                duplicates += 1;
            }
        }

        // Trailing blank lines would otherwise sit between old entries and an appended one
        while kept.last().is_some_and(|l| l.trim().is_empty()) {
            kept.pop();
        }

        let change = match previous {
            None => {
                kept.push(rendered);
                ManifestChange::Appended
            }
            Some(prev) if prev == rendered && duplicates == 0 => ManifestChange::Unchanged,
            Some(prev) => ManifestChange::Replaced { previous: prev },
        };

        self.lines = kept;
        change
    }

    /// Renders the file with a single trailing line ending
    pub fn render(&self) -> String {
        let end = self
            .lines
            .iter()
            .rposition(|l| !l.trim().is_empty())
            .map_or(0, |i| i + 1);

        if end == 0 {
            return String::new();
        }

        let mut out = String::new();
        if self.bom {
            out.push(BOM);
        }
        out.push_str(&self.lines[..end].join(self.line_ending));
        out.push_str(self.line_ending);
        out
    }
}
