//! Structured view of an action's comment block.
//!
//! ```text
//! /**
//!  * Store a new customer.
//!  *
//!  * Longer description.
//!  *
//!  * @model App\Models\Customer
//!  * @throws \Illuminate\Auth\Access\AuthorizationException
//!  */
//! ```

use crate::metadata::ExceptionTag;
use indexmap::IndexMap;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

static TAG_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^@([A-Za-z][\w-]*)(?:\s+(.*))?$").expect("tag pattern is valid")
});

/// Tags and prose extracted from a comment block
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Annotations {
    pub deprecated: bool,
    pub summary: String,
    pub description: String,
    tags: IndexMap<String, Vec<String>>,
}

impl Annotations {
    /// Parse a comment block.
    ///
    /// Returns the empty result when `enabled` is false, the block is empty or
    /// the block cannot be parsed.
    pub fn parse(doc_block: &str, enabled: bool) -> Self {
        if !enabled || doc_block.trim().is_empty() {
            return Self::default();
        }

        match Self::try_parse(doc_block) {
            Ok(annotations) => annotations,
            Err(reason) => {
                debug!("Ignoring unparsable comment block: {}", reason);
                Self::default()
            }
        }
    }

    fn try_parse(doc_block: &str) -> Result<Self, String> {
        let trimmed = doc_block.trim();
        if trimmed.starts_with("/*") && !trimmed.ends_with("*/") {
            return Err("comment block is never closed".to_string());
        }

        let mut prose: Vec<&str> = Vec::new();
        let mut tags: IndexMap<String, Vec<String>> = IndexMap::new();
        let mut last_tag: Option<String> = None;

        for line in trimmed.lines().map(strip_comment_markers) {
            if let Some(caps) = TAG_LINE.captures(line) {
                let name = caps[1].to_string();
                let value = caps.get(2).map_or("", |m| m.as_str()).trim().to_string();
                tags.entry(name.clone()).or_default().push(value);
                last_tag = Some(name);
                continue;
            }

            match &last_tag {
                // Continuation of a multi-line tag value
                Some(name) if !line.is_empty() => {
                    if let Some(value) = tags.get_mut(name).and_then(|values| values.last_mut()) {
                        if !value.is_empty() {
                            value.push(' ');
                        }
                        value.push_str(line);
                    }
                }
                Some(_) => {}
                None => prose.push(line),
            }
        }

        let (summary, description) = split_prose(&prose);

        Ok(Self {
            deprecated: tags.contains_key("deprecated"),
            summary,
            description,
            tags,
        })
    }

    /// All values of a tag, in order of appearance
    pub fn tag(&self, name: &str) -> &[String] {
        self.tags.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.contains_key(name)
    }

    /// First token of the first non-empty value of a tag
    pub fn first_tag(&self, name: &str) -> Option<&str> {
        self.tag(name)
            .iter()
            .find_map(|value| value.split_whitespace().next())
    }

    /// Exception types named by `@throws`, de-duplicated
    pub fn throws(&self) -> Vec<ExceptionTag> {
        let mut exceptions: Vec<ExceptionTag> = Vec::new();
        for value in self.tag("throws") {
            let Some(exception) = value.split_whitespace().next().map(ExceptionTag::new) else {
                continue;
            };
            if !exception.is_empty() && !exceptions.contains(&exception) {
                exceptions.push(exception);
            }
        }
        exceptions
    }
}

fn strip_comment_markers(line: &str) -> &str {
    let mut line = line.trim();
    if let Some(rest) = line.strip_prefix("/**") {
        line = rest;
    } else if let Some(rest) = line.strip_prefix("/*") {
        line = rest;
    }
    if let Some(rest) = line.strip_suffix("*/") {
        line = rest;
    }
    line = line.trim_start();
    if let Some(rest) = line.strip_prefix('*') {
        line = rest;
    }
    line.trim()
}

/// Split the text before the first tag into summary and description
fn split_prose(lines: &[&str]) -> (String, String) {
    let start = lines.iter().position(|l| !l.is_empty()).unwrap_or(lines.len());
    let lines = &lines[start..];

    let mut summary: Vec<&str> = Vec::new();
    let mut consumed = 0;
    for line in lines {
        consumed += 1;
        if line.is_empty() {
            break;
        }
        summary.push(line);
        if line.ends_with('.') {
            break;
        }
    }

    let description = lines[consumed..].join("\n").trim().to_string();
    (summary.join(" "), description)
}
