//! Section selector compiler and matcher.
//!
//! Selectors use the EditorConfig glob dialect, not a general glob syntax:
//!
//! | syntax          | matches |
//! |-----------------|---------|
//! | `*`             | any run of characters except `/` |
//! | `**`            | any run of characters including `/` |
//! | `?`             | one character except `/` |
//! | `[abc]` `[a-z]` | one character from the class (`[!..]` / `[^..]` negate) |
//! | `{a,b,c}`       | any of the comma-separated alternatives |
//! | `{n1..n2}`      | any integer between `n1` and `n2` inclusive |
//! | `!(a\|b)`       | anything within one path segment except the alternatives |
//! | `@(..)` `?(..)` `*(..)` `+(..)` | exactly one / at most one / any number / at least one of the alternatives |
//!
//! A backslash makes the next character literal. A selector with no `/` may
//! match at any depth below its file's directory; a selector containing `/`
//! is anchored to that directory (a leading `/` is dropped).
//!
//! The directory a selector is relative to is never interpreted as a
//! pattern: [`Glob::matches`] strips it from the target path by literal
//! component comparison and only the remainder is matched.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use crate::error::PatternError;

/// Longest selector that will be compiled. Longer ones match nothing.
pub const MAX_SELECTOR_LEN: usize = 4096;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Char(char),
    /// `?`
    Any,
    /// `*`
    Star,
    /// `**` inside a segment
    GlobStar,
    /// `**/` as a whole segment: zero or more leading directories
    AnyDirs,
    Class(Class),
    Range(i64, i64),
    Group(GroupKind, Vec<Vec<Token>>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GroupKind {
    /// `@(..)` and brace alternation
    One,
    /// `?(..)`
    ZeroOrOne,
    /// `*(..)`
    ZeroOrMore,
    /// `+(..)`
    OneOrMore,
    /// `!(..)`
    Not,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Class {
    negated: bool,
    ranges: Vec<(char, char)>,
}

impl Token {
    /// Tokens that try more than one way to consume the input.
    fn branches(&self) -> bool {
        matches!(
            self,
            Token::Star | Token::GlobStar | Token::AnyDirs | Token::Group(..)
        )
    }
}

impl Class {
    fn contains(&self, c: char) -> bool {
        let hit = self.ranges.iter().any(|(lo, hi)| *lo <= c && c <= *hi);
        hit != self.negated
    }
}

/// A compiled selector, independent of the directory it is relative to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    tokens: Vec<Token>,
}

impl Pattern {
    pub fn new(selector: &str) -> Result<Self, PatternError> {
        if selector.is_empty() {
            return Err(PatternError::Empty);
        }
        let len = selector.chars().count();
        if len > MAX_SELECTOR_LEN {
            return Err(PatternError::TooLong {
                len,
                limit: MAX_SELECTOR_LEN,
            });
        }

        let (body, anchored) = match selector.strip_prefix('/') {
            Some(rest) => (rest, true),
            None => (selector, selector.contains('/')),
        };
        let offset = usize::from(selector.len() != body.len());
        let chars: Vec<char> = body.chars().collect();

        let mut tokens = Vec::new();
        if !anchored {
            tokens.push(Token::AnyDirs);
        }
        tokens.extend(parse_seq(&chars, offset)?);
        Ok(Self { tokens })
    }

    /// Match a `/`-separated path relative to the selector's directory.
    pub fn matches(&self, relative: &str) -> bool {
        let chars: Vec<char> = relative.chars().collect();
        match_tokens(&self.tokens, &Next::End, &chars, &mut Failures::default())
    }
}

/// A selector bound to the directory of the file that declared it.
///
/// Compilation never fails: a malformed selector yields a glob that matches
/// nothing.
#[derive(Debug, Clone)]
pub struct Glob {
    base: PathBuf,
    pattern: Option<Pattern>,
}

impl Glob {
    pub fn compile(selector: &str, base: &Path) -> Self {
        let pattern = match Pattern::new(selector) {
            Ok(p) => Some(p),
            Err(e) => {
                tracing::debug!(selector, error = %e, "selector matches nothing");
                None
            }
        };
        Self {
            base: base.to_path_buf(),
            pattern,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.pattern.is_some()
    }

    pub fn matches(&self, target: &Path) -> bool {
        let Some(pattern) = &self.pattern else {
            return false;
        };
        let Ok(relative) = target.strip_prefix(&self.base) else {
            return false;
        };
        pattern.matches(&to_slash(relative))
    }
}

/// Join the normal components of `path` with `/`.
pub(crate) fn to_slash(path: &Path) -> String {
    let mut out = String::new();
    for component in path.components() {
        let part = match component {
            Component::Normal(s) => s.to_string_lossy(),
            Component::ParentDir => "..".into(),
            Component::CurDir | Component::RootDir | Component::Prefix(_) => continue,
        };
        if !out.is_empty() {
            out.push('/');
        }
        out.push_str(&part);
    }
    out
}

// -- compilation -------------------------------------------------------------

fn parse_seq(chars: &[char], offset: usize) -> Result<Vec<Token>, PatternError> {
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        match c {
            '\\' => match next {
                Some(escaped) => {
                    tokens.push(Token::Char(escaped));
                    i += 2;
                }
                None => {
                    tokens.push(Token::Char('\\'));
                    i += 1;
                }
            },
            '*' | '?' | '+' | '@' | '!' if next == Some('(') => {
                let kind = match c {
                    '*' => GroupKind::ZeroOrMore,
                    '?' => GroupKind::ZeroOrOne,
                    '+' => GroupKind::OneOrMore,
                    '@' => GroupKind::One,
                    _ => GroupKind::Not,
                };
                let open = i + 1;
                let close = find_close(chars, open, '(', ')').ok_or(PatternError::Unclosed {
                    open: '(',
                    offset: offset + open,
                })?;
                let alts = split_top(&chars[open + 1..close], '|')
                    .into_iter()
                    .map(|(start, part)| parse_seq(part, offset + open + 1 + start))
                    .collect::<Result<Vec<_>, _>>()?;
                tokens.push(Token::Group(kind, alts));
                i = close + 1;
            }
            '*' if next == Some('*') => {
                let mut end = i + 2;
                while chars.get(end) == Some(&'*') {
                    end += 1;
                }
                let segment_start = i == 0 || chars[i - 1] == '/';
                if segment_start && chars.get(end) == Some(&'/') {
                    tokens.push(Token::AnyDirs);
                    i = end + 1;
                } else {
                    tokens.push(Token::GlobStar);
                    i = end;
                }
            }
            '*' => {
                tokens.push(Token::Star);
                i += 1;
            }
            '?' => {
                tokens.push(Token::Any);
                i += 1;
            }
            '[' => match parse_class(chars, i) {
                Some((class, end)) => {
                    tokens.push(Token::Class(class));
                    i = end + 1;
                }
                None => {
                    tokens.push(Token::Char('['));
                    i += 1;
                }
            },
            '{' => match find_close(chars, i, '{', '}') {
                Some(close) => {
                    let inner = &chars[i + 1..close];
                    tokens.extend(parse_brace(inner, offset + i + 1)?);
                    i = close + 1;
                }
                None => {
                    tokens.push(Token::Char('{'));
                    i += 1;
                }
            },
            _ => {
                tokens.push(Token::Char(c));
                i += 1;
            }
        }
    }

    Ok(tokens)
}

fn parse_brace(inner: &[char], offset: usize) -> Result<Vec<Token>, PatternError> {
    if let Some((lo, hi)) = parse_range(inner) {
        return Ok(vec![Token::Range(lo.min(hi), lo.max(hi))]);
    }

    let parts = split_top(inner, ',');
    if parts.len() == 1 {
        // `{single}` is literal text
        let mut tokens = vec![Token::Char('{')];
        tokens.extend(parse_seq(inner, offset)?);
        tokens.push(Token::Char('}'));
        return Ok(tokens);
    }

    let alts = parts
        .into_iter()
        .map(|(start, part)| parse_seq(part, offset + start))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(vec![Token::Group(GroupKind::One, alts)])
}

fn parse_range(inner: &[char]) -> Option<(i64, i64)> {
    let text: String = inner.iter().collect();
    let (lo, hi) = text.split_once("..")?;
    Some((parse_int(lo)?, parse_int(hi)?))
}

fn parse_int(s: &str) -> Option<i64> {
    let digits = s.strip_prefix('-').unwrap_or(s);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Parse a bracket expression starting at `start` (the `[`). Returns the
/// class and the index of the closing `]`, or `None` if it never closes.
fn parse_class(chars: &[char], start: usize) -> Option<(Class, usize)> {
    let mut i = start + 1;
    let negated = matches!(chars.get(i), Some('!' | '^'));
    if negated {
        i += 1;
    }

    let mut ranges = Vec::new();
    let mut first = true;
    loop {
        let c = *chars.get(i)?;
        if c == ']' && !first {
            return Some((Class { negated, ranges }, i));
        }
        first = false;

        let (lo, after) = class_char(chars, i)?;
        i = after;
        if chars.get(i) == Some(&'-') && chars.get(i + 1).is_some_and(|c| *c != ']') {
            let (hi, after) = class_char(chars, i + 1)?;
            ranges.push((lo, hi));
            i = after;
        } else {
            ranges.push((lo, lo));
        }
    }
}

fn class_char(chars: &[char], i: usize) -> Option<(char, usize)> {
    match chars.get(i)? {
        '\\' => chars.get(i + 1).map(|c| (*c, i + 2)),
        c => Some((*c, i + 1)),
    }
}

/// Index of the bracket closing the one at `open`, honouring escapes and
/// nesting of the same bracket pair.
fn find_close(chars: &[char], open: usize, left: char, right: char) -> Option<usize> {
    let mut depth = 0usize;
    let mut i = open;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 1,
            c if c == left => depth += 1,
            c if c == right => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Split on `sep` outside any nested `{}` or `()`, returning each part with
/// its start index.
fn split_top(chars: &[char], sep: char) -> Vec<(usize, &[char])> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 1,
            '{' | '(' => depth += 1,
            '}' | ')' => depth = depth.saturating_sub(1),
            c if c == sep && depth == 0 => {
                parts.push((start, &chars[start..i]));
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    parts.push((start, &chars[start.min(chars.len())..]));
    parts
}

// -- matching ----------------------------------------------------------------

/// What remains to be matched after the current token sequence.
enum Next<'a> {
    End,
    Seq(&'a [Token], &'a Next<'a>),
    Repeat {
        alts: &'a [Vec<Token>],
        then: &'a Next<'a>,
        last_len: usize,
    },
}

/// Identifies one matching subproblem: token slice, continuation chain and
/// input slice, all by address into buffers that outlive the match.
type Key = (usize, usize, Vec<(u8, usize, usize)>, usize, usize);

/// Subproblems already known to fail. Without it, each extra `*` multiplies
/// the work by the segment length.
#[derive(Default)]
struct Failures(HashSet<Key>);

impl Failures {
    fn key(tokens: &[Token], then: &Next<'_>, s: &[char]) -> Key {
        let mut chain = Vec::new();
        let mut next = then;
        loop {
            match next {
                Next::End => break,
                Next::Seq(tokens, rest) => {
                    chain.push((0, tokens.as_ptr() as usize, tokens.len()));
                    next = rest;
                }
                Next::Repeat {
                    alts,
                    then,
                    last_len,
                } => {
                    chain.push((1, alts.as_ptr() as usize, *last_len));
                    next = then;
                }
            }
        }
        (
            tokens.as_ptr() as usize,
            tokens.len(),
            chain,
            s.as_ptr() as usize,
            s.len(),
        )
    }
}

fn run(next: &Next<'_>, s: &[char], failed: &mut Failures) -> bool {
    match next {
        Next::End => s.is_empty(),
        Next::Seq(tokens, then) => match_tokens(tokens, then, s, failed),
        Next::Repeat {
            alts,
            then,
            last_len,
        } => {
            if run(then, s, failed) {
                return true;
            }
            // an iteration that consumed nothing cannot help
            s.len() < *last_len && repeat_once(alts, then, s, failed)
        }
    }
}

fn repeat_once(alts: &[Vec<Token>], then: &Next<'_>, s: &[char], failed: &mut Failures) -> bool {
    let again = Next::Repeat {
        alts,
        then,
        last_len: s.len(),
    };
    alts.iter().any(|alt| match_tokens(alt, &again, s, failed))
}

fn segment_len(s: &[char]) -> usize {
    s.iter().position(|c| *c == '/').unwrap_or(s.len())
}

fn match_tokens(tokens: &[Token], then: &Next<'_>, s: &[char], failed: &mut Failures) -> bool {
    let Some((first, rest)) = tokens.split_first() else {
        return run(then, s, failed);
    };

    let key = first.branches().then(|| Failures::key(tokens, then, s));
    if let Some(key) = &key
        && failed.0.contains(key)
    {
        return false;
    }

    let matched = match first {
        Token::Char(c) => s.first() == Some(c) && match_tokens(rest, then, &s[1..], failed),
        Token::Any => {
            matches!(s.first(), Some(c) if *c != '/') && match_tokens(rest, then, &s[1..], failed)
        }
        Token::Class(class) => {
            matches!(s.first(), Some(c) if *c != '/' && class.contains(*c))
                && match_tokens(rest, then, &s[1..], failed)
        }
        Token::Star => (0..=segment_len(s)).any(|i| match_tokens(rest, then, &s[i..], failed)),
        Token::GlobStar => (0..=s.len()).any(|i| match_tokens(rest, then, &s[i..], failed)),
        Token::AnyDirs => (0..=s.len())
            .filter(|&i| i == 0 || s[i - 1] == '/')
            .any(|i| match_tokens(rest, then, &s[i..], failed)),
        Token::Range(lo, hi) => integer_prefixes(s)
            .into_iter()
            .filter(|(n, _)| lo <= n && n <= hi)
            .any(|(_, len)| match_tokens(rest, then, &s[len..], failed)),
        Token::Group(kind, alts) => {
            let after = Next::Seq(rest, then);
            match kind {
                GroupKind::One => alts.iter().any(|alt| match_tokens(alt, &after, s, failed)),
                GroupKind::ZeroOrOne => {
                    run(&after, s, failed)
                        || alts.iter().any(|alt| match_tokens(alt, &after, s, failed))
                }
                GroupKind::ZeroOrMore => {
                    run(&after, s, failed) || repeat_once(alts, &after, s, failed)
                }
                GroupKind::OneOrMore => repeat_once(alts, &after, s, failed),
                GroupKind::Not => (0..=segment_len(s)).any(|i| {
                    let head = &s[..i];
                    !alts
                        .iter()
                        .any(|alt| match_tokens(alt, &Next::End, head, failed))
                        && match_tokens(rest, then, &s[i..], failed)
                }),
            }
        }
    };

    if !matched && let Some(key) = key {
        failed.0.insert(key);
    }
    matched
}

/// Every integer spelled at the start of `s`, with the number of characters
/// it spans. Leading zeros are not accepted.
fn integer_prefixes(s: &[char]) -> Vec<(i64, usize)> {
    let sign = usize::from(s.first() == Some(&'-'));
    let digits = s[sign..].iter().take_while(|c| c.is_ascii_digit()).count();
    let mut out = Vec::new();
    for len in 1..=digits {
        if len > 1 && s[sign] == '0' {
            break;
        }
        let text: String = s[..sign + len].iter().collect();
        if let Ok(n) = text.parse() {
            out.push((n, sign + len));
        }
    }
    out
}
