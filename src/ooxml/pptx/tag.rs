//! Tag syntax: `{{name}}` where the name uses letters, digits, `_`, `+`, `-` and `.`.
use once_cell::sync::Lazy;
use regex::Regex;

static TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{[A-Za-z0-9_+\-.]+\}\}").expect("Failed to build tag pattern"));

/// Distinct tags in `text`, in order of first appearance.
///
/// # Examples
///
/// ```
/// use pptx_templater::ooxml::pptx::tag::find_tags;
///
/// let tags = find_tags("{{title}} by {{author.name}}, {{title}} again, {{not a tag}}");
/// assert_eq!(tags, ["{{title}}", "{{author.name}}"]);
/// ```
pub fn find_tags(text: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for m in TAG.find_iter(text) {
        if !tags.iter().any(|t| t == m.as_str()) {
            tags.push(m.as_str().to_string());
        }
    }
    tags
}
