use std::sync::OnceLock;

use regex::Regex;

use crate::error::TtsSaveError;

fn path_unsafe_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    // Still very permissive.
    REGEX.get_or_init(|| Regex::new(r#"[\x00-\x1F"*./:<>?\\|\]]"#).expect("path regex"))
}

fn invalid_xml_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"[\x00-\x08\x0B\x0C\x0E-\x1F]").expect("invalid xml regex"))
}

/// Makes a string usable as a single path segment. Never fails; the result
/// may be empty. Apply per segment, never to a joined path.
pub fn clean_str_for_path(s: &str) -> String {
    path_unsafe_regex()
        .replace_all(s, " ")
        .trim_end()
        .to_string()
}

pub fn normalize_line_endings(s: &str) -> String {
    s.replace('\r', "")
}

pub fn ensure_trailing_lf(s: &str) -> String {
    if s.is_empty() || s.ends_with('\n') {
        s.to_string()
    } else {
        format!("{s}\n")
    }
}

pub fn remove_extra_trailing_lf(s: &str) -> String {
    let trimmed = s.trim_end_matches('\n');
    if trimmed.len() == s.len() {
        s.to_string()
    } else {
        format!("{trimmed}\n")
    }
}

pub fn chomp(s: &str) -> &str {
    s.strip_suffix('\n').unwrap_or(s)
}

/// Escapes text for use in an XML attribute value. Control characters that
/// XML cannot represent at all are a hard error.
pub fn text_to_xml_attr(text: &str) -> Result<String, TtsSaveError> {
    if invalid_xml_regex().is_match(text) {
        return Err(TtsSaveError::new(
            "XML_ATTR_UNSUPPORTED",
            "String not supported by XML.",
        ));
    }

    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\t' => out.push_str("&#x9;"),
            '\n' => out.push_str("&#xA;"),
            '\r' => out.push_str("&#xD;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
    Ok(out)
}

pub fn pad_zeros(num: usize, width: usize) -> String {
    format!("{num:0width$}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_str_for_path_is_identity_on_legal_input() {
        assert_eq!(clean_str_for_path("Black Deck (2nd ed)"), "Black Deck (2nd ed)");
        assert_eq!(clean_str_for_path(""), "");
    }

    #[test]
    fn clean_str_for_path_replaces_illegal_chars_and_trims_end() {
        assert_eq!(clean_str_for_path("a/b\\c"), "a b c");
        assert_eq!(clean_str_for_path("v1.2: final?"), "v1 2  final");
        assert_eq!(clean_str_for_path("x\x00\x1Fy"), "x  y");
        assert_eq!(clean_str_for_path("\"*<>|]"), "");
        assert_eq!(clean_str_for_path("name   "), "name");
    }

    #[test]
    fn normalize_line_endings_strips_carriage_returns() {
        assert_eq!(normalize_line_endings("a\r\nb\rc"), "a\nbc");
    }

    #[test]
    fn trailing_lf_helpers() {
        assert_eq!(ensure_trailing_lf(""), "");
        assert_eq!(ensure_trailing_lf("a"), "a\n");
        assert_eq!(ensure_trailing_lf("a\n"), "a\n");

        assert_eq!(remove_extra_trailing_lf("a\n\n\n"), "a\n");
        assert_eq!(remove_extra_trailing_lf("a\n"), "a\n");
        assert_eq!(remove_extra_trailing_lf("a"), "a");

        assert_eq!(chomp("a\n"), "a");
        assert_eq!(chomp("a\n\n"), "a\n");
        assert_eq!(chomp("a"), "a");
    }

    #[test]
    fn text_to_xml_attr_escapes_reserved_characters() {
        let escaped = text_to_xml_attr("<a> & \"b\" '\t\n\r").expect("escapable");
        assert_eq!(escaped, "&lt;a&gt; &amp; &quot;b&quot; &#x27;&#x9;&#xA;&#xD;");
        assert_eq!(text_to_xml_attr("plain").expect("escapable"), "plain");
    }

    #[test]
    fn text_to_xml_attr_rejects_control_characters() {
        let error = text_to_xml_attr("a\x00b").expect_err("nul is not representable");
        assert_eq!(error.code, "XML_ATTR_UNSUPPORTED");
        assert!(text_to_xml_attr("a\x0Bb").is_err());
    }

    #[test]
    fn pad_zeros_pads_to_width() {
        assert_eq!(pad_zeros(7, 3), "007");
        assert_eq!(pad_zeros(123, 2), "123");
    }
}
