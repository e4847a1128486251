//! Model display-name normalization.
//!
//! Turns raw upstream model identifiers such as
//! `meta-llama/Llama-3.1-70b-instruct-Q4_K_M.gguf` into readable names like
//! `LLaMA 3.1 70B Instruct`. The pipeline is fixed and order-sensitive:
//!
//! 1. strip hosting prefixes ([`tables::PROVIDER_PREFIXES`]),
//! 2. strip file/quantization suffixes ([`tables::SUFFIXES`]),
//! 3. rewrite version shorthands on the whole string (`v3p1`, `3p1`, `r1`),
//! 4. split on runs of `-`, `_`, `/`, `:`,
//! 5. classify and render each token ([`token::classify`]),
//! 6. join and collapse whitespace,
//! 7. fall back to the raw input if nothing is left.
//!
//! Normalization is pure and never fails. It is not idempotent: spaces are not
//! delimiters, so a display name fed back in is one title-cased token
//! (`LLaMA 3.1 8B` comes back as `Llama 3.1 8b`).

pub mod provider_name;
pub mod tables;
pub mod token;

pub use provider_name::extract_provider_name;
pub use token::{TokenKind, classify};

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use self::tables::{PROVIDER_PREFIXES, SUFFIXES};

static V_POINT_VERSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i-u)v([0-9]+)p([0-9]+)").expect("static pattern"));
static POINT_VERSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9]+)p([0-9]+)").expect("static pattern"));
static GENERATION_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i-u)([rk])([0-9]+)").expect("static pattern"));

/// Convert a raw model identifier into a display name.
///
/// Empty input is returned unchanged; any other input yields a non-empty
/// string (the raw id when every token was stripped).
pub fn normalize_model_name(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let stripped = strip_suffixes(strip_prefixes(raw));
    let rewritten = rewrite_versions(stripped);

    let tokens: Vec<&str> = rewritten
        .split(is_delimiter)
        .filter(|t| !t.is_empty())
        .collect();

    let mut out: Vec<String> = Vec::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        let kind = classify(tokens[i].trim_matches(is_blank), tokens.get(i + 1).copied());
        kind.render(&mut out);
        i += kind.consumed();
    }

    let joined = out.join(" ");
    let result = joined
        .split(is_blank)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if result.is_empty() {
        tracing::debug!("normalization of '{}' produced nothing; keeping raw id", raw);
        raw.to_string()
    } else {
        result
    }
}

/// Whitespace as JavaScript's `trim` and `\s` see it: NEL is not blank, BOM is.
fn is_blank(c: char) -> bool {
    (c.is_whitespace() && c != '\u{85}') || c == '\u{feff}'
}

fn is_delimiter(c: char) -> bool {
    matches!(c, '-' | '_' | '/' | ':')
}

/// Remove each listed prefix once, in list order, from the evolving string.
fn strip_prefixes(id: &str) -> &str {
    PROVIDER_PREFIXES
        .iter()
        .fold(id, |s, p| strip_prefix_ignore_case(s, p).unwrap_or(s))
}

/// Remove each listed suffix once, in list order, from the evolving string.
fn strip_suffixes(id: &str) -> &str {
    SUFFIXES
        .iter()
        .fold(id, |s, p| strip_suffix_ignore_case(s, p).unwrap_or(s))
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &s[prefix.len()..])
}

fn strip_suffix_ignore_case<'a>(s: &'a str, suffix: &str) -> Option<&'a str> {
    let cut = s.len().checked_sub(suffix.len())?;
    let tail = s.get(cut..)?;
    tail.eq_ignore_ascii_case(suffix).then(|| &s[..cut])
}

fn rewrite_versions(name: &str) -> String {
    let name = V_POINT_VERSION.replace_all(name, "v${1}.${2}");
    let name = POINT_VERSION.replace_all(&name, "${1}.${2}");
    GENERATION_TAG
        .replace_all(&name, |caps: &Captures| {
            format!("{}{}", caps[1].to_ascii_uppercase(), &caps[2])
        })
        .into_owned()
}

/// First character upper-cased, the rest lower-cased.
pub(crate) fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.as_str().to_lowercase().chars())
            .collect(),
        None => String::new(),
    }
}
