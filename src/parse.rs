//! Line scanner for configuration files.
//!
//! The format is a deliberately small INI subset:
//!
//! - `[selector]` starts a section; the selector text is kept verbatim,
//!   backslashes included, and handed to [`glob`](crate::glob) later.
//! - Lines whose first non-blank character is `#` or `;` are comments.
//!   There are no trailing comments: `a = b # c` sets `a` to `b # c`.
//! - `key = value` assigns into the current section. Keys are lowercased,
//!   both sides are trimmed.
//! - A line that starts with `[` but is not a well-formed header (`[*.md`,
//!   `[*.md] # note`) opens a section with an empty selector, which matches
//!   nothing, so the assignments under it never reach a broader section.
//! - Anything else is skipped without affecting the rest of the file.
//!
//! Lines before the first selector form a section with no selector.

use crate::error::EditorConfigError;
use crate::types::RawSection;

const BOM: char = '\u{feff}';

/// Split `text` into sections. Never fails; unusable lines are dropped.
pub fn parse_str(text: &str) -> Vec<RawSection> {
    let text = text.strip_prefix(BOM).unwrap_or(text);
    let mut sections = vec![RawSection::new(None)];

    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if line.starts_with('[') {
            match line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                Some(selector) => sections.push(RawSection::new(Some(selector.to_string()))),
                None => {
                    tracing::trace!(line = index + 1, "malformed section header matches nothing");
                    sections.push(RawSection::new(Some(String::new())));
                }
            }
            continue;
        }

        match parse_assignment(line) {
            Some((key, value)) => {
                if let Some(current) = sections.last_mut() {
                    current.set(key, value);
                }
            }
            None => tracing::trace!(line = index + 1, "skipping malformed property line"),
        }
    }

    sections
}

/// Decode file bytes as UTF-8 (dropping a byte-order mark) and parse them.
pub fn parse_bytes(name: &str, bytes: &[u8]) -> Result<Vec<RawSection>, EditorConfigError> {
    Ok(parse_str(decode(name, bytes)?))
}

pub(crate) fn decode<'a>(name: &str, bytes: &'a [u8]) -> Result<&'a str, EditorConfigError> {
    std::str::from_utf8(bytes).map_err(|source| EditorConfigError::Decode {
        name: name.to_string(),
        source,
    })
}

fn parse_assignment(line: &str) -> Option<(String, String)> {
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key.to_lowercase(), value.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(selector: Option<&str>, props: &[(&str, &str)]) -> RawSection {
        RawSection {
            selector: selector.map(str::to_string),
            properties: props
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn parses_preamble_and_sections() {
        let text = "\
root = true

[*]
indent_style = space
indent_size = 2

[*.md]
indent_size = 4
";
        assert_eq!(
            parse_str(text),
            vec![
                section(None, &[("root", "true")]),
                section(Some("*"), &[("indent_style", "space"), ("indent_size", "2")]),
                section(Some("*.md"), &[("indent_size", "4")]),
            ]
        );
    }

    #[test]
    fn malformed_line_is_skipped() {
        assert_eq!(parse_str("root: "), vec![section(None, &[])]);
    }

    #[test]
    fn backslashes_in_selector_are_kept() {
        assert_eq!(
            parse_str(r"[a\\b]"),
            vec![section(None, &[]), section(Some(r"a\\b"), &[])]
        );
    }

    #[test]
    fn bare_comment_marker() {
        assert_eq!(parse_str("#"), vec![section(None, &[])]);
        assert_eq!(parse_str(";"), vec![section(None, &[])]);
    }

    #[test]
    fn comments_and_blank_lines_are_ignored() {
        let text = "  # leading\n\n; semi\n[*]\n   # indented = comment\nx = 1\n";
        assert_eq!(
            parse_str(text),
            vec![section(None, &[]), section(Some("*"), &[("x", "1")])]
        );
    }

    #[test]
    fn no_trailing_comment_stripping() {
        let sections = parse_str("[*]\nx = a # b\n");
        assert_eq!(sections[1].get("x"), Some("a # b"));
    }

    #[test]
    fn keys_lowercased_values_verbatim() {
        let sections = parse_str("[*]\nIndent_Style = Space\nMy_Key = MiXeD\n");
        assert_eq!(sections[1].get("indent_style"), Some("Space"));
        assert_eq!(sections[1].get("my_key"), Some("MiXeD"));
    }

    #[test]
    fn later_assignment_in_section_wins() {
        let sections = parse_str("[*]\nx = 1\nx = 2\n");
        assert_eq!(sections[1].properties, vec![("x".into(), "2".into())]);
    }

    #[test]
    fn value_may_contain_equals() {
        let sections = parse_str("[*]\nx = a=b\n");
        assert_eq!(sections[1].get("x"), Some("a=b"));
    }

    #[test]
    fn empty_key_skipped_empty_value_kept() {
        let sections = parse_str("[*]\n= 1\ny =\n");
        assert_eq!(sections[1].properties, vec![("y".into(), "".into())]);
    }

    #[test]
    fn malformed_header_opens_empty_section() {
        let sections = parse_str("[*]\nx = 1\n[*.md\ny = 2\n[*.txt] # note\nz = 3\n");
        assert_eq!(
            sections,
            vec![
                section(None, &[]),
                section(Some("*"), &[("x", "1")]),
                section(Some(""), &[("y", "2")]),
                section(Some(""), &[("z", "3")]),
            ]
        );
    }

    #[test]
    fn duplicate_selectors_stay_separate() {
        let sections = parse_str("[*]\nx = 1\n[*]\nx = 2\n");
        assert_eq!(sections.len(), 3);
    }

    #[test]
    fn crlf_line_endings() {
        let sections = parse_str("[*]\r\nx = 1\r\n");
        assert_eq!(sections[1].get("x"), Some("1"));
    }

    #[test]
    fn bom_is_stripped() {
        let mut bytes = "\u{feff}root = true\n".as_bytes().to_vec();
        let sections = parse_bytes("bom", &bytes).unwrap();
        assert_eq!(sections[0].get("root"), Some("true"));

        bytes.clear();
        assert_eq!(parse_bytes("empty", &bytes).unwrap(), vec![section(None, &[])]);
    }

    #[test]
    fn invalid_utf8_is_reported() {
        let err = parse_bytes("bad", &[b'[', 0xff, b']']).unwrap_err();
        assert!(matches!(err, EditorConfigError::Decode { ref name, .. } if name == "bad"));
    }
}
