//! Technique detection over normalized source text.
//!
//! Detection is purely textual and runs on [`normalize`]d source, so comments
//! and formatting cannot hide or fake a signature. Each predicate is
//! independent; a unit can carry any combination of techniques.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::Technique;

/// Zero-width code points used to smuggle payloads, with the bit pattern
/// each one encodes.
pub const INVISIBLE_ALPHABET: [(char, &str); 5] = [
    ('\u{200B}', "0"),
    ('\u{200C}', "1"),
    ('\u{200D}', "00"),
    ('\u{2060}', "01"),
    ('\u{FEFF}', "10"),
];

pub fn is_invisible(c: char) -> bool {
    INVISIBLE_ALPHABET.iter().any(|(ch, _)| *ch == c)
}

static STRING_ENCODING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\x[0-9a-fA-F]{2}|\\u[0-9a-fA-F]{4}|String\.fromCharCode|atob\(")
        .expect("string encoding pattern")
});

static DISPATCHER_LOOP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"while\s*\(\s*(?:!\s*!\s*)?\[\s*\]\s*\)\s*\{.*?switch\s*\(")
        .expect("dispatcher loop pattern")
});

static ROTATION_ARITHMETIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z_$][\w$]*\s*=\s*[A-Za-z_$][\w$]*\s*\+\s*0x[0-9a-fA-F]+")
        .expect("rotation arithmetic pattern")
});

static DEAD_BRANCH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"if\s*\(\s*(?:false|!\s*!\s*\[\s*\])\s*\)").expect("dead branch pattern")
});

static NUMERIC_COMPARISON: LazyLock<Regex> = LazyLock::new(|| {
    let number = r"-?\s*(?:0[xX][0-9a-fA-F]+|\d+(?:\.\d+)?)";
    Regex::new(&format!(
        r"if\s*\(\s*{number}\s*(?:===|!==|==|!=|>=|<=|>|<)\s*{number}\s*\)"
    ))
    .expect("numeric comparison pattern")
});

/// Strip comments and collapse whitespace runs to a single space.
///
/// Comment stripping skips over string and template literals, so `"//"`
/// inside a string survives. Regex literals are not recognized.
pub fn normalize(source: &str) -> String {
    let stripped = strip_comments(source);
    let mut out = String::with_capacity(stripped.len());
    let mut pending_space = false;
    for c in stripped.chars() {
        if c.is_whitespace() && !is_invisible(c) {
            pending_space = true;
            continue;
        }
        if pending_space && !out.is_empty() {
            out.push(' ');
        }
        pending_space = false;
        out.push(c);
    }
    out
}

fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' | '\'' | '`' => {
                out.push(c);
                while let Some(inner) = chars.next() {
                    out.push(inner);
                    if inner == '\\' {
                        if let Some(escaped) = chars.next() {
                            out.push(escaped);
                        }
                    } else if inner == c {
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'/') => {
                for skipped in chars.by_ref() {
                    if skipped == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for skipped in chars.by_ref() {
                    if prev == '*' && skipped == '/' {
                        break;
                    }
                    prev = skipped;
                }
                out.push(' ');
            }
            _ => out.push(c),
        }
    }
    out
}

/// Run the text predicates over already normalized source.
///
/// VM protection is not reported here; it comes from the pluggable
/// [`VmAnalyzer`](crate::vm::VmAnalyzer).
pub fn detect(normalized: &str) -> Vec<Technique> {
    let checks: [(Technique, bool); 6] = [
        (Technique::InvisibleUnicode, normalized.chars().any(is_invisible)),
        (Technique::StringEncoding, STRING_ENCODING.is_match(normalized)),
        (
            Technique::ControlFlowFlattening,
            DISPATCHER_LOOP.is_match(normalized),
        ),
        (
            Technique::StringArrayRotation,
            ROTATION_ARITHMETIC.is_match(normalized),
        ),
        (Technique::DeadCodeInjection, DEAD_BRANCH.is_match(normalized)),
        (
            Technique::OpaquePredicates,
            NUMERIC_COMPARISON.is_match(normalized),
        ),
    ];
    checks
        .into_iter()
        .filter_map(|(technique, hit)| hit.then_some(technique))
        .collect()
}

#[cfg(test)]
#[path = "detector_tests.rs"]
mod tests;
