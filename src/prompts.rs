//! Prompt templates for the two generation intents.
//!
//! Templates use `{{key}}` placeholders. Substitution happens once, left to
//! right, at [`PromptBuilder::build`] time, so user-supplied values are
//! inserted verbatim and never re-expanded.
//!
//! Built-in templates are compiled in. A prompts directory holding
//! `syllabus.txt` and/or `content.txt` overrides them at startup; a missing
//! or blank file keeps the built-in.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tracing::{debug, info};

const SEPARATOR: &str = "\n\n";

pub const SYLLABUS_FILE: &str = "syllabus.txt";
pub const CONTENT_FILE: &str = "content.txt";

const SYLLABUS_TEMPLATE: &str = r#"Task: Generate a JSON array of chapters for the given subject. Each chapter is an object with two properties, "title" (a string) and "topics" (an array of strings).
Rules: Return only the JSON. Minify the output: no new-lines and no spaces between tokens.
Subject: "{{subject}}""#;

const CONTENT_TEMPLATE: &str = r#"Task: Generate Markdown content for the given topic in the context of its chapter and subject, following the requested type of generation.
Rules: The first heading must be the topic name only, never the subject or chapter. Include code examples only if the subject is programming related. Use tables for differentiations where they help.
Subject: "{{subject}}"
Chapter: "{{chapter}}"
Topic: "{{topic}}"
Type: "Summary""#;

/// Fluent builder that assembles a prompt from fragments and variables.
#[derive(Debug, Default)]
pub struct PromptBuilder {
    parts: Vec<String>,
    vars: HashMap<String, String>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the contents of `path` as a layer. Missing files are skipped.
    pub fn layer(mut self, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(text) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    self.parts.push(trimmed.to_string());
                }
            }
            Err(_) => debug!("prompt: layer '{}' not found, skipped", path.display()),
        }
        self
    }

    /// Directly append a text fragment.
    pub fn append(mut self, text: impl AsRef<str>) -> Self {
        let trimmed = text.as_ref().trim();
        if !trimmed.is_empty() {
            self.parts.push(trimmed.to_string());
        }
        self
    }

    /// Register a single `{{key}}` → `value` substitution.
    pub fn var(mut self, key: &str, value: impl Into<String>) -> Self {
        self.vars.insert(key.to_string(), value.into());
        self
    }

    /// Register several substitutions at once.
    pub fn with_vars<'a, I>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        for (k, v) in vars {
            self.vars.insert(k.to_string(), v.to_string());
        }
        self
    }

    /// Join all layers with blank lines and substitute variables.
    /// Unknown placeholders are left as-is.
    pub fn build(self) -> String {
        let joined = self.parts.join(SEPARATOR);
        let mut out = String::with_capacity(joined.len());
        let mut rest = joined.as_str();

        while let Some(open) = rest.find("{{") {
            out.push_str(&rest[..open]);
            let after = &rest[open + 2..];
            match after.find("}}") {
                Some(close) => {
                    let key = &after[..close];
                    match self.vars.get(key) {
                        Some(value) => out.push_str(value),
                        None => {
                            out.push_str("{{");
                            out.push_str(key);
                            out.push_str("}}");
                        }
                    }
                    rest = &after[close + 2..];
                }
                None => {
                    out.push_str(&rest[open..]);
                    rest = "";
                }
            }
        }
        out.push_str(rest);
        out
    }
}

/// The two resolved templates, loaded once at startup.
#[derive(Debug, Clone)]
pub struct PromptSet {
    syllabus: String,
    content: String,
}

impl Default for PromptSet {
    fn default() -> Self {
        Self {
            syllabus: SYLLABUS_TEMPLATE.to_string(),
            content: CONTENT_TEMPLATE.to_string(),
        }
    }
}

impl PromptSet {
    /// Resolve templates, preferring files in `dir` over the built-ins.
    pub fn load(dir: Option<&Path>) -> Self {
        let Some(dir) = dir else {
            return Self::default();
        };
        Self {
            syllabus: load_override(dir, SYLLABUS_FILE).unwrap_or_else(|| SYLLABUS_TEMPLATE.to_string()),
            content: load_override(dir, CONTENT_FILE).unwrap_or_else(|| CONTENT_TEMPLATE.to_string()),
        }
    }

    /// Prompt asking for a minified JSON array of `{title, topics}` chapters.
    pub fn syllabus_prompt(&self, subject: &str) -> String {
        PromptBuilder::new()
            .append(&self.syllabus)
            .var("subject", subject)
            .build()
    }

    /// Prompt asking for a Markdown summary of one topic.
    pub fn content_prompt(&self, subject: &str, chapter: &str, topic: &str) -> String {
        PromptBuilder::new()
            .append(&self.content)
            .with_vars([("subject", subject), ("chapter", chapter), ("topic", topic)])
            .build()
    }
}

fn load_override(dir: &Path, filename: &str) -> Option<String> {
    let text = PromptBuilder::new().layer(dir.join(filename)).build();
    if text.is_empty() {
        None
    } else {
        info!(template = filename, dir = %dir.display(), "using prompt override");
        Some(text)
    }
}

/// Syllabus prompt from the built-in template.
pub fn syllabus_prompt(subject: &str) -> String {
    PromptSet::default().syllabus_prompt(subject)
}

/// Content prompt from the built-in template.
pub fn content_prompt(subject: &str, chapter: &str, topic: &str) -> String {
    PromptSet::default().content_prompt(subject, chapter, topic)
}
