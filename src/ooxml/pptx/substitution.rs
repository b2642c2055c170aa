//! Paragraph-level text substitution.
//!
//! PowerPoint splits a paragraph's text into runs wherever formatting, spell
//! checking or editing history changes, so a tag such as `{{name}}` is often
//! spread over several `a:r` elements. Substitution therefore works on the
//! concatenated run text and maps matches back onto the runs.
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::xmltree::XmlElement;
use regex::Regex;
use std::cell::RefCell;
use std::collections::HashMap;
use std::ops::Range;

/// Text access and tag replacement on a single `a:p` paragraph.
///
/// The templating engine only talks to paragraphs through this trait, so a
/// different matching strategy can be plugged in without touching it.
pub trait ParagraphSubstitution {
    /// Concatenated text of every run in the paragraph.
    fn text(&self, paragraph: &XmlElement) -> String;

    /// Replace every occurrence of `tag` with `new_text`; returns whether
    /// anything was replaced.
    fn replace_tag(&self, paragraph: &mut XmlElement, tag: &str, new_text: &str) -> Result<bool>;
}

/// Default [`ParagraphSubstitution`] treating tags as regular expressions.
///
/// A tag that does not compile as a regular expression (for example
/// `{{name}}`, where the braces are not a valid repetition) is matched
/// literally. The replacement text is inserted verbatim; `$` has no special
/// meaning. Compiled patterns are cached per instance.
///
/// The replacement lands in the run where the match starts, inheriting its
/// formatting; matched text in later runs is removed.
#[derive(Debug, Default)]
pub struct RegexSubstitution {
    cache: RefCell<HashMap<String, Regex>>,
}

impl RegexSubstitution {
    pub fn new() -> Self {
        Self::default()
    }

    fn pattern(&self, tag: &str) -> Result<Regex> {
        if let Some(regex) = self.cache.borrow().get(tag) {
            return Ok(regex.clone());
        }
        let regex = match Regex::new(tag) {
            Ok(regex) => regex,
            Err(_) => Regex::new(&regex::escape(tag))
                .map_err(|e| OoxmlError::Other(format!("Invalid tag pattern '{}': {}", tag, e)))?,
        };
        self.cache
            .borrow_mut()
            .insert(tag.to_string(), regex.clone());
        Ok(regex)
    }
}

/// Text of a run (`a:r/a:t`).
fn run_text(run: &XmlElement) -> String {
    run.child("t").map(|t| t.text()).unwrap_or_default()
}

impl ParagraphSubstitution for RegexSubstitution {
    fn text(&self, paragraph: &XmlElement) -> String {
        paragraph.children_named("r").map(run_text).collect()
    }

    fn replace_tag(&self, paragraph: &mut XmlElement, tag: &str, new_text: &str) -> Result<bool> {
        if tag.is_empty() {
            return Ok(false);
        }
        let regex = self.pattern(tag)?;

        let mut texts: Vec<String> = paragraph.children_named("r").map(run_text).collect();
        let full = texts.concat();
        let matches: Vec<Range<usize>> = regex
            .find_iter(&full)
            .filter(|m| !m.is_empty())
            .map(|m| m.range())
            .collect();
        if matches.is_empty() {
            return Ok(false);
        }

        // byte ranges of each run inside `full`
        let mut spans = Vec::with_capacity(texts.len());
        let mut offset = 0;
        for text in &texts {
            spans.push(offset..offset + text.len());
            offset += text.len();
        }

        // Later matches first: edits never move the offsets of earlier ones.
        for m in matches.iter().rev() {
            for (text, span) in texts.iter_mut().zip(&spans) {
                if span.end <= m.start || span.start >= m.end || span.is_empty() {
                    continue;
                }
                let local = m.start.max(span.start) - span.start..m.end.min(span.end) - span.start;
                let replacement = if span.contains(&m.start) { new_text } else { "" };
                text.replace_range(local, replacement);
            }
        }

        for (run, text) in paragraph
            .elements_mut()
            .filter(|el| el.is("r"))
            .zip(&texts)
        {
            if let Some(t) = run.child_mut("t") {
                t.set_text(text);
            }
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::xmltree::XmlDocument;

    fn paragraph(runs: &[&str]) -> XmlElement {
        let body: String = runs
            .iter()
            .map(|t| format!("<a:r><a:rPr lang=\"en-US\"/><a:t>{}</a:t></a:r>", t))
            .collect();
        XmlDocument::parse(format!("<a:p xmlns:a=\"urn:a\">{}<a:endParaRPr/></a:p>", body).as_bytes())
            .unwrap()
            .root
    }

    fn run_texts(p: &XmlElement) -> Vec<String> {
        p.children_named("r").map(run_text).collect()
    }

    #[test]
    fn test_text_concatenates_runs() {
        let service = RegexSubstitution::new();
        assert_eq!(service.text(&paragraph(&["Hello ", "{{na", "me}}"])), "Hello {{name}}");
        assert_eq!(service.text(&paragraph(&[])), "");
    }

    #[test]
    fn test_replace_within_one_run() {
        let service = RegexSubstitution::new();
        let mut p = paragraph(&["Dear {{name}}, hi {{name}}"]);
        assert!(service.replace_tag(&mut p, "{{name}}", "Bob").unwrap());
        assert_eq!(run_texts(&p), ["Dear Bob, hi Bob"]);
    }

    #[test]
    fn test_replace_across_runs() {
        let service = RegexSubstitution::new();
        let mut p = paragraph(&["Dear {{na", "me", "}}!"]);
        assert!(service.replace_tag(&mut p, "{{name}}", "Alice").unwrap());
        assert_eq!(run_texts(&p), ["Dear Alice", "", "!"]);
        assert_eq!(service.text(&p), "Dear Alice!");
    }

    #[test]
    fn test_regex_tag_and_literal_replacement() {
        let service = RegexSubstitution::new();
        let mut p = paragraph(&["Total: 12", "34 EUR"]);
        assert!(service.replace_tag(&mut p, r"\d+", "$0").unwrap());
        assert_eq!(service.text(&p), "Total: $0 EUR");
    }

    #[test]
    fn test_no_match_and_empty_tag() {
        let service = RegexSubstitution::new();
        let mut p = paragraph(&["nothing here"]);
        assert!(!service.replace_tag(&mut p, "{{x}}", "y").unwrap());
        assert!(!service.replace_tag(&mut p, "", "y").unwrap());
        assert_eq!(run_texts(&p), ["nothing here"]);
    }

    #[test]
    fn test_escaped_text_survives() {
        let service = RegexSubstitution::new();
        let mut p = paragraph(&["A &amp; {{b}}"]);
        assert!(service.replace_tag(&mut p, "{{b}}", "<C>").unwrap());
        assert_eq!(service.text(&p), "A & <C>");
        assert!(p.to_xml_string().contains("A &amp; &lt;C&gt;"));
    }
}
