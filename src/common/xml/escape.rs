use aho_corasick::AhoCorasick;
use once_cell::sync::Lazy;

// Static initialization: automaton is built only once, thread-safe
static XML_ESCAPER: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasick::builder()
        .build(["&", "<", ">", "\"", "'"])
        .expect("Failed to build XML escaper")
});

// Text nodes only need the three structural characters escaped
static XML_TEXT_ESCAPER: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasick::builder()
        .build(["&", "<", ">"])
        .expect("Failed to build XML text escaper")
});

/// Escape XML special characters for use inside an attribute value.
///
/// # Examples
///
/// ```
/// use pptx_templater::common::xml::escape_xml;
/// assert_eq!(escape_xml("a & b"), "a &amp; b");
/// assert_eq!(escape_xml("<tag>\"hello\"</tag>"), "&lt;tag&gt;&quot;hello&quot;&lt;/tag&gt;");
/// ```
#[inline]
pub fn escape_xml(s: &str) -> String {
    XML_ESCAPER.replace_all(s, &["&amp;", "&lt;", "&gt;", "&quot;", "&apos;"])
}

/// Escape XML special characters for use as element text.
///
/// Quotes are left alone so that run text survives a round trip byte for byte.
#[inline]
pub fn escape_xml_text(s: &str) -> String {
    XML_TEXT_ESCAPER.replace_all(s, &["&amp;", "&lt;", "&gt;"])
}

/// Unescape XML special characters.
///
/// Replaces the five standard XML entities and decimal or hexadecimal character
/// references in a single pass. Unknown or malformed entities are left unchanged.
///
/// # Examples
///
/// ```
/// use pptx_templater::common::xml::unescape_xml;
/// assert_eq!(unescape_xml("&lt;a &amp; b&gt;"), "<a & b>");
/// assert_eq!(unescape_xml("&quot;hello&apos;"), "\"hello'");
/// assert_eq!(unescape_xml("&#65;&#x42;"), "AB");
/// assert_eq!(unescape_xml("&amp;lt;"), "&lt;"); // single pass
/// assert_eq!(unescape_xml("a & b"), "a & b"); // unchanged
/// assert_eq!(unescape_xml("&invalid;"), "&invalid;"); // unknown entity
/// ```
pub fn unescape_xml(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = String::with_capacity(s.len());
    let mut pos = 0;
    while let Some(offset) = memchr::memchr(b'&', &bytes[pos..]) {
        let amp = pos + offset;
        out.push_str(&s[pos..amp]);
        let resolved = memchr::memchr(b';', &bytes[amp..])
            .and_then(|end| resolve_entity(&s[amp + 1..amp + end]).map(|ch| (ch, amp + end + 1)));
        match resolved {
            Some((ch, next)) => {
                out.push(ch);
                pos = next;
            },
            None => {
                out.push('&');
                pos = amp + 1;
            },
        }
    }
    out.push_str(&s[pos..]);
    out
}

/// Resolve a general entity name (the part between `&` and `;`).
///
/// Returns `None` for entities that are neither predefined nor character references.
pub fn resolve_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let digits = name.strip_prefix('#')?;
            let code = match digits.strip_prefix('x').or_else(|| digits.strip_prefix('X')) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => digits.parse::<u32>().ok()?,
            };
            char::from_u32(code)
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_escape_keeps_quotes() {
        assert_eq!(escape_xml_text("say \"hi\" & <go>"), "say \"hi\" &amp; &lt;go&gt;");
    }

    #[test]
    fn test_resolve_entity() {
        assert_eq!(resolve_entity("amp"), Some('&'));
        assert_eq!(resolve_entity("#x20AC"), Some('€'));
        assert_eq!(resolve_entity("#8364"), Some('€'));
        assert_eq!(resolve_entity("nbsp"), None);
    }

    #[test]
    fn test_malformed_char_ref_is_kept() {
        assert_eq!(unescape_xml("&#zz; &#65;"), "&#zz; A");
        assert_eq!(unescape_xml("tail &#65"), "tail &#65");
    }
}
