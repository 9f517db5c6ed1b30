//! Entity Name Normalization
//!
//! Turns a free-text entity name into the bare alphanumeric base used for
//! domain guessing:
//! - Corporate suffixes dropped: "Acme Plumbing, LLC" -> "acmeplumbing"
//! - Ampersands spelled out: "A & B Corp" -> "aandb"
//! - Everything that cannot appear in a hostname label is removed
//!
//! The base can come out empty (a name made of nothing but suffix tokens and
//! punctuation); callers must skip guess generation in that case.

use once_cell::sync::Lazy;
use regex::Regex;

/// Legal/organizational suffix tokens removed during normalization.
/// Matched as whole words anywhere in the name, so removal has to happen
/// while word boundaries (spaces, commas) are still present.
const CORPORATE_SUFFIXES: &[&str] = &[
    "company", "limited", "partners", "pllc", "llc", "inc", "corp", "ltd", "pc", "co",
];

static SUFFIX_RE: Lazy<Regex> = Lazy::new(|| {
    let pattern = format!(r"\b(?:{})\b", CORPORATE_SUFFIXES.join("|"));
    Regex::new(&pattern).expect("suffix pattern is a valid regex")
});

/// Normalize an entity name into a domain-safe base string.
///
/// Lower-cases the name, strips corporate suffix tokens as whole words,
/// rewrites `&` to `and`, then deletes every character that is not an ASCII
/// letter or digit. The result contains no separators of any kind and may be
/// empty.
pub fn domain_base(name: &str) -> String {
    let lowered = name.trim().to_lowercase();
    let stripped = SUFFIX_RE.replace_all(&lowered, " ");
    let spelled = stripped.replace('&', " and ");
    spelled.chars().filter(char::is_ascii_alphanumeric).collect()
}
