//! Identifier normalization for generated Swift.
//!
//! Schema keys and path segments arrive in every casing convention at once;
//! this module turns them into idiomatic Swift identifiers. Type names are
//! UpperCamelCase, field names lowerCamelCase. A configurable acronym list
//! is fully upper-cased (`userId` becomes `userID`, not `userId`), except
//! as the first word of a field name. Reserved words are escaped with
//! backticks rather than renamed so the wire-name mapping stays exact.

use std::collections::HashSet;
use std::sync::LazyLock;

/// Acronyms upper-cased by default; callers add or ignore entries per run.
pub const DEFAULT_ACRONYMS: &[&str] = &[
    "url", "id", "html", "ssl", "tls", "https", "http", "dns", "ftp", "api", "uuid", "json",
];

/// Swift reserved words that cannot be used as bare identifiers.
static SWIFT_RESERVED_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "associatedtype",
        "class",
        "deinit",
        "enum",
        "extension",
        "fileprivate",
        "func",
        "import",
        "init",
        "inout",
        "internal",
        "let",
        "open",
        "operator",
        "private",
        "precedencegroup",
        "protocol",
        "public",
        "rethrows",
        "static",
        "struct",
        "subscript",
        "typealias",
        "var",
        "break",
        "case",
        "catch",
        "continue",
        "default",
        "defer",
        "do",
        "else",
        "fallthrough",
        "for",
        "guard",
        "if",
        "in",
        "repeat",
        "return",
        "throw",
        "switch",
        "where",
        "while",
        "as",
        "false",
        "is",
        "nil",
        "self",
        "super",
        "throws",
        "true",
        "try",
        "Any",
        "Self",
        "Type",
        "Protocol",
    ]
    .into_iter()
    .collect()
});

/// Normalization rules for one compilation run.
///
/// Construction resolves the acronym configuration once: defaults plus
/// added entries minus ignored ones, sorted longest-first so longer
/// acronyms win when several are prefixes of the same token. Both
/// normalizers are pure functions of the input string and this list.
#[derive(Debug, Clone)]
pub struct NameRules {
    acronyms: Vec<String>,
}

impl Default for NameRules {
    fn default() -> Self {
        Self::new(&[], &[])
    }
}

impl NameRules {
    pub fn new(added: &[String], ignored: &[String]) -> Self {
        let mut acronyms: Vec<String> = DEFAULT_ACRONYMS
            .iter()
            .map(|a| (*a).to_string())
            .chain(added.iter().map(|a| a.to_ascii_lowercase()))
            .filter(|a| !a.is_empty() && !ignored.iter().any(|i| i.eq_ignore_ascii_case(a)))
            .collect();
        acronyms.sort_unstable();
        acronyms.dedup();
        acronyms.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        Self { acronyms }
    }

    /// Normalize a raw segment into an UpperCamelCase type name.
    pub fn type_name(&self, raw: &str) -> String {
        // A `{param}` path segment is not a valid bare type name and must
        // not collide with the sibling literal segment at the same
        // position, so it gets a disambiguating prefix.
        if let Some(inner) = raw.strip_prefix('{').and_then(|r| r.strip_suffix('}')) {
            return format!("With{}", self.type_name(inner));
        }
        let mut out = String::new();
        for word in split_words(raw) {
            out.push_str(&self.cased_word(&word));
        }
        finish_identifier(out)
    }

    /// Normalize a raw segment into a lowerCamelCase field name.
    pub fn field_name(&self, raw: &str) -> String {
        let mut out = String::new();
        for (i, word) in split_words(raw).iter().enumerate() {
            if i == 0 {
                out.push_str(&word.to_ascii_lowercase());
            } else {
                out.push_str(&self.cased_word(word));
            }
        }
        finish_identifier(out)
    }

    /// Capitalize one word, upper-casing a leading acronym. The prefix only
    /// counts as an acronym when the remainder opens a new hump:
    /// `identifier` must not become `IDentifier`.
    fn cased_word(&self, word: &str) -> String {
        if word.is_empty() {
            return String::new();
        }
        for acronym in &self.acronyms {
            if word.len() < acronym.len() || !word[..acronym.len()].eq_ignore_ascii_case(acronym) {
                continue;
            }
            let rest = &word[acronym.len()..];
            let opens_hump = rest.is_empty()
                || rest
                    .chars()
                    .next()
                    .is_some_and(|c| c.is_ascii_uppercase() || c.is_ascii_digit());
            if opens_hump {
                return format!("{}{}", acronym.to_ascii_uppercase(), self.cased_word(rest));
            }
        }
        capitalize_first(word)
    }
}

/// Split a raw segment into words on non-alphanumeric boundaries and camel
/// humps. `+` and `-` are spelled out rather than dropped: dropping them
/// would collide two distinct wire keys such as `"+1"` and `"1"`.
fn split_words(raw: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let chars: Vec<char> = raw.chars().collect();
    for (i, &c) in chars.iter().enumerate() {
        if c == '+' || c == '-' {
            flush(&mut words, &mut current);
            words.push(if c == '+' { "Plus" } else { "Minus" }.to_string());
            continue;
        }
        if !c.is_ascii_alphanumeric() {
            flush(&mut words, &mut current);
            continue;
        }
        if let Some(prev) = current.chars().next_back() {
            let next_is_lower = chars.get(i + 1).is_some_and(char::is_ascii_lowercase);
            let hump = ((prev.is_ascii_lowercase() || prev.is_ascii_digit())
                && c.is_ascii_uppercase())
                || (prev.is_ascii_uppercase() && c.is_ascii_uppercase() && next_is_lower);
            if hump {
                flush(&mut words, &mut current);
            }
        }
        current.push(c);
    }
    flush(&mut words, &mut current);
    words
}

fn flush(words: &mut Vec<String>, current: &mut String) {
    if !current.is_empty() {
        words.push(std::mem::take(current));
    }
}

/// Guard against empty results, leading digits, and reserved words.
fn finish_identifier(mut out: String) -> String {
    if out.is_empty() {
        return "_empty".to_string();
    }
    if out.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    if SWIFT_RESERVED_WORDS.contains(out.as_str()) {
        return format!("`{out}`");
    }
    out
}

/// Capitalize the first letter of a word, leaving the rest untouched.
fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}
