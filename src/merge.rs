//! Overlay matching sections and normalize the result.
//!
//! Files are applied in chain order (root-ward first), sections in file
//! order, so the last assignment of a key wins. Selectors are compiled
//! against the directory of the file that declared them.
//!
//! Normalization then runs in a fixed order:
//!
//! 1. drop `root` and every key whose value is `unset` (case-insensitive)
//! 2. `indent_style = tab` without `indent_size` implies `indent_size = tab`
//! 3. numeric `indent_size` without `tab_width` copies into `tab_width`
//! 4. numeric `tab_width` without `indent_size` copies into `indent_size`;
//!    `indent_size = tab` with a `tab_width` takes the width
//! 5. integers for `indent_size`, `tab_width`, `max_line_length`
//! 6. booleans for `trim_trailing_whitespace`, `insert_final_newline`
//! 7. lowercase `indent_style`, `end_of_line`, `charset`
//!
//! Values that do not fit their key's type are kept as strings.

use std::collections::BTreeMap;
use std::path::Path;

use crate::glob::Glob;
use crate::types::{ConfigFile, PropertyMap, PropertyValue, Visited};

const INDENT_SIZE: &str = "indent_size";
const TAB_WIDTH: &str = "tab_width";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Coercion {
    Number,
    Bool,
    Lowercase,
}

fn coercion_for(key: &str) -> Option<Coercion> {
    match key {
        "indent_size" | "tab_width" | "max_line_length" => Some(Coercion::Number),
        "trim_trailing_whitespace" | "insert_final_newline" => Some(Coercion::Bool),
        "indent_style" | "end_of_line" | "charset" => Some(Coercion::Lowercase),
        _ => None,
    }
}

/// Raw values of every section in `chain` that matches `target`, later
/// assignments overriding earlier ones.
///
/// Each matching section is recorded in `visited` when given.
pub fn overlay(
    target: &Path,
    chain: &[ConfigFile],
    mut visited: Option<&mut Vec<Visited>>,
) -> BTreeMap<String, String> {
    let mut merged = BTreeMap::new();
    for file in chain {
        let dir = file.dir();
        for section in file.sections.iter() {
            let Some(selector) = &section.selector else {
                continue;
            };
            if !Glob::compile(selector, dir).matches(target) {
                continue;
            }
            for (key, value) in &section.properties {
                merged.insert(key.clone(), value.clone());
            }
            if let Some(visited) = visited.as_deref_mut() {
                visited.push(Visited {
                    file_name: file.name.clone(),
                    selector: selector.clone(),
                });
            }
        }
    }
    merged
}

/// Apply the post-processing rules and coerce known keys.
///
/// With `drop_unset` false, `unset` values are kept as ordinary strings.
pub fn normalize(mut raw: BTreeMap<String, String>, drop_unset: bool) -> PropertyMap {
    raw.remove("root");
    if drop_unset {
        raw.retain(|_, v| !v.eq_ignore_ascii_case("unset"));
    }

    if raw
        .get("indent_style")
        .is_some_and(|v| v.eq_ignore_ascii_case("tab"))
        && !raw.contains_key(INDENT_SIZE)
    {
        raw.insert(INDENT_SIZE.into(), "tab".into());
    }

    let size = raw.get(INDENT_SIZE).cloned();
    let width = raw.get(TAB_WIDTH).cloned();
    match (size, width) {
        (Some(size), None) if parse_number(&size).is_some() => {
            raw.insert(TAB_WIDTH.into(), size);
        }
        (None, Some(width)) if parse_number(&width).is_some() => {
            raw.insert(INDENT_SIZE.into(), width);
        }
        (Some(size), Some(width)) if size.eq_ignore_ascii_case("tab") => {
            raw.insert(INDENT_SIZE.into(), width);
        }
        (Some(size), None) if size.eq_ignore_ascii_case("tab") => {
            raw.insert(INDENT_SIZE.into(), "tab".into());
        }
        _ => {}
    }

    raw.into_iter()
        .map(|(key, value)| {
            let value = coerce(&key, value);
            (key, value)
        })
        .collect()
}

/// Overlay `chain` for `target` and normalize.
pub fn resolve_properties(
    target: &Path,
    chain: &[ConfigFile],
    drop_unset: bool,
    visited: Option<&mut Vec<Visited>>,
) -> PropertyMap {
    normalize(overlay(target, chain, visited), drop_unset)
}

fn coerce(key: &str, value: String) -> PropertyValue {
    match coercion_for(key) {
        Some(Coercion::Number) => match parse_number(&value) {
            Some(n) => PropertyValue::Number(n),
            None => PropertyValue::String(value),
        },
        Some(Coercion::Bool) if value.eq_ignore_ascii_case("true") => PropertyValue::Bool(true),
        Some(Coercion::Bool) if value.eq_ignore_ascii_case("false") => PropertyValue::Bool(false),
        Some(Coercion::Lowercase) => PropertyValue::String(value.to_lowercase()),
        Some(Coercion::Bool) | None => PropertyValue::String(value),
    }
}

/// Base-10 integer, optionally negative. No `+`, no whitespace.
fn parse_number(s: &str) -> Option<i64> {
    let digits = s.strip_prefix('-').unwrap_or(s);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}
