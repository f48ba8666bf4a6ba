/*!
 * Glossary protection.
 *
 * Terms that must survive translation untouched are swapped for placeholder
 * tokens before the text reaches a backend and swapped back afterwards.
 * When matches overlap the longest one is protected, so "net present value"
 * wins over "value" when both are configured.
 */

use std::ops::Range;

use anyhow::{Context, Result};
use regex::{NoExpand, Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

/// A term that must appear untranslated in the output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlossaryEntry {
    pub term: String,

    #[serde(default)]
    pub match_case_insensitive: bool,
}

impl GlossaryEntry {
    /// Case-sensitive entry.
    pub fn exact(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            match_case_insensitive: false,
        }
    }

    /// Case-insensitive entry.
    pub fn case_insensitive(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            match_case_insensitive: true,
        }
    }
}

/// One protected occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    /// Token that replaced the occurrence
    pub token: String,
    /// Occurrence exactly as it appeared in the source text
    pub original: String,
}

/// Placeholders introduced by `Glossary::protect`, in text order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreMap {
    pub placeholders: Vec<Placeholder>,
}

impl RestoreMap {
    pub fn is_empty(&self) -> bool {
        self.placeholders.is_empty()
    }
}

/// Text after restoration, plus the occurrences whose token went missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Restored {
    pub text: String,
    pub missing: Vec<Placeholder>,
}

impl Restored {
    /// Every placeholder was found and replaced.
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Compiled glossary; immutable for the duration of a run.
#[derive(Debug, Clone)]
pub struct Glossary {
    entries: Vec<GlossaryEntry>,
    matchers: Vec<Regex>,
}

const TOKEN_TAG: &str = "GT";

/// Compiled size allowed for a single term's matcher
const TERM_SIZE_LIMIT: usize = 1 << 20;

impl Glossary {
    /// Compile the glossary. Empty terms are ignored.
    ///
    /// Fails when a term is too large to compile into a matcher.
    pub fn new(entries: Vec<GlossaryEntry>) -> Result<Self> {
        Self::compile(entries, TERM_SIZE_LIMIT)
    }

    fn compile(entries: Vec<GlossaryEntry>, size_limit: usize) -> Result<Self> {
        let mut entries: Vec<GlossaryEntry> = entries
            .into_iter()
            .filter(|entry| !entry.term.trim().is_empty())
            .collect();
        entries.sort_by(|a, b| b.term.chars().count().cmp(&a.term.chars().count()));

        let matchers = entries
            .iter()
            .map(|entry| {
                RegexBuilder::new(&regex::escape(&entry.term))
                    .case_insensitive(entry.match_case_insensitive)
                    .size_limit(size_limit)
                    .build()
                    .with_context(|| format!("Invalid glossary term '{}'", preview(&entry.term)))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { entries, matchers })
    }

    /// A glossary that protects nothing.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
            matchers: Vec::new(),
        }
    }

    pub fn entries(&self) -> &[GlossaryEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replace every glossary occurrence in `text` with a placeholder token.
    ///
    /// Where matches of different terms overlap, the longest match wins
    /// and the others are dropped; ties go to the earlier match.
    pub fn protect(&self, text: &str) -> (String, RestoreMap) {
        if self.matchers.is_empty() {
            return (text.to_string(), RestoreMap::default());
        }

        let mut candidates: Vec<Range<usize>> = self
            .matchers
            .iter()
            .flat_map(|matcher| matcher.find_iter(text).map(|found| found.range()))
            .collect();
        candidates.sort_by(|a, b| {
            let a_len = text[a.clone()].chars().count();
            let b_len = text[b.clone()].chars().count();
            b_len.cmp(&a_len).then(a.start.cmp(&b.start))
        });

        let mut selected: Vec<Range<usize>> = Vec::new();
        for candidate in candidates {
            let overlaps = selected
                .iter()
                .any(|kept| candidate.start < kept.end && kept.start < candidate.end);
            if !overlaps {
                selected.push(candidate);
            }
        }
        selected.sort_by_key(|range| range.start);

        let tag = unique_tag(text);
        let mut masked = String::with_capacity(text.len());
        let mut restore_map = RestoreMap::default();
        let mut last_end = 0;

        for range in selected {
            let token = format!("__{}{}__", tag, restore_map.placeholders.len());
            masked.push_str(&text[last_end..range.start]);
            masked.push_str(&token);
            restore_map.placeholders.push(Placeholder {
                token,
                original: text[range.clone()].to_string(),
            });
            last_end = range.end;
        }
        masked.push_str(&text[last_end..]);

        (masked, restore_map)
    }

    /// Put the protected occurrences back into a translated text.
    ///
    /// Every copy of a token is replaced, so a backend that repeats a token
    /// cannot leak it into the output. Tokens are looked up exactly first
    /// and then case-insensitively. Occurrences whose token cannot be found
    /// are reported in `missing`.
    pub fn restore(translated: &str, restore_map: &RestoreMap) -> Restored {
        let mut text = translated.to_string();
        let mut missing = Vec::new();

        for placeholder in &restore_map.placeholders {
            if text.contains(&placeholder.token) {
                text = text.replace(&placeholder.token, &placeholder.original);
                continue;
            }

            let relaxed = RegexBuilder::new(&regex::escape(&placeholder.token))
                .case_insensitive(true)
                .build()
                .ok()
                .filter(|pattern| pattern.is_match(&text));

            match relaxed {
                Some(pattern) => {
                    text = pattern
                        .replace_all(&text, NoExpand(&placeholder.original))
                        .into_owned();
                }
                None => missing.push(placeholder.clone()),
            }
        }

        Restored { text, missing }
    }

    /// Whether `masked` holds nothing but placeholders and whitespace.
    pub fn only_placeholders(masked: &str, restore_map: &RestoreMap) -> bool {
        if restore_map.is_empty() {
            return false;
        }
        let mut rest = masked.to_string();
        for placeholder in &restore_map.placeholders {
            rest = rest.replacen(&placeholder.token, "", 1);
        }
        rest.trim().is_empty()
    }
}

impl Default for Glossary {
    fn default() -> Self {
        Self::empty()
    }
}

// Short form of a term for error messages.
fn preview(term: &str) -> String {
    const MAX_CHARS: usize = 40;
    if term.chars().count() <= MAX_CHARS {
        return term.to_string();
    }
    let mut short: String = term.chars().take(MAX_CHARS).collect();
    short.push_str("...");
    short
}

// Pick a token tag that cannot collide with text already in the span.
fn unique_tag(text: &str) -> String {
    let mut tag = TOKEN_TAG.to_string();
    while text.contains(&format!("__{}", tag)) {
        tag.push('X');
    }
    tag
}
