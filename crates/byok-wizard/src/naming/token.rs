//! Per-token classification.
//!
//! Each matcher inspects one token (plus the raw next token for lookahead) and
//! either claims it with a [`TokenKind`] or passes. Matchers run in the order of
//! [`MATCHERS`]; the first claim wins. Date-shaped rules come before the generic
//! numeric ones because they share the same digit-heavy surface syntax.

use once_cell::sync::Lazy;
use regex::Regex;

use super::tables::{brand, purpose};
use super::title_case;

/// Parameter-size unit attached to a number (`8b`, `278m`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Billions,
    Millions,
}

impl Unit {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "b" | "B" => Some(Unit::Billions),
            "m" | "M" => Some(Unit::Millions),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Unit::Billions => "B",
            Unit::Millions => "M",
        }
    }
}

/// Classification of a single token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind<'a> {
    Empty,
    /// Eight digits, e.g. `20250929`.
    DateStamp,
    /// Four digits in one of the YYMM / MMDD / year ranges.
    DateLike(u32),
    /// `0` followed by a digit, e.g. `04`.
    DateFragment,
    /// Two single-digit tokens in a row; consumes the lookahead token.
    VersionPair(&'a str, &'a str),
    ParamSize { amount: &'a str, unit: Unit },
    MixtureSize { experts: &'a str, size: &'a str, unit: Unit },
    Version(&'a str),
    /// Already tagged generation marker like `R1`, `K2`, `M2`.
    Generation(&'a str),
    Number(&'a str),
    ExpertCount(&'a str),
    /// Short letter run fused with a sized number, e.g. `a35b`.
    CompactSize { letters: &'a str, amount: &'a str, unit: Unit },
    BrandNumbered { brand: &'static str, number: String },
    PurposeNumbered { purpose: &'static str, number: String },
    WordNumbered { word: &'a str, number: String },
    Brand(&'static str),
    Purpose(&'static str),
    Word(&'a str),
}

impl TokenKind<'_> {
    /// How many input tokens this classification consumes.
    pub fn consumed(&self) -> usize {
        match self {
            TokenKind::VersionPair(..) => 2,
            _ => 1,
        }
    }

    /// Append the display tokens (zero, one or two) to `out`.
    pub fn render(&self, out: &mut Vec<String>) {
        match self {
            TokenKind::Empty
            | TokenKind::DateStamp
            | TokenKind::DateLike(_)
            | TokenKind::DateFragment => {}
            TokenKind::VersionPair(major, minor) => out.push(format!("{major}.{minor}")),
            TokenKind::ParamSize { amount, unit } => out.push(format!("{amount}{}", unit.as_str())),
            TokenKind::MixtureSize {
                experts,
                size,
                unit,
            } => out.push(format!("{experts}x{size}{}", unit.as_str())),
            TokenKind::Version(v) => out.push(format!("V{v}")),
            TokenKind::Generation(tag) => out.push(tag.to_uppercase()),
            TokenKind::Number(n) => out.push((*n).to_string()),
            TokenKind::ExpertCount(n) => out.push(format!("{n}E")),
            TokenKind::CompactSize {
                letters,
                amount,
                unit,
            } => out.push(format!(
                "{}{amount}{}",
                letters.to_uppercase(),
                unit.as_str()
            )),
            TokenKind::BrandNumbered { brand, number } => {
                out.push((*brand).to_string());
                out.push(number.clone());
            }
            TokenKind::PurposeNumbered { purpose, number } => {
                out.push((*purpose).to_string());
                out.push(number.clone());
            }
            TokenKind::WordNumbered { word, number } => {
                out.push(title_case(word));
                out.push(number.clone());
            }
            TokenKind::Brand(b) => out.push((*b).to_string()),
            TokenKind::Purpose(p) => out.push((*p).to_string()),
            TokenKind::Word(w) => out.push(title_case(w)),
        }
    }
}

pub type Matcher = for<'a> fn(&'a str, Option<&'a str>) -> Option<TokenKind<'a>>;

/// Matchers in precedence order.
pub const MATCHERS: &[Matcher] = &[
    empty,
    date_stamp,
    date_like,
    date_fragment,
    version_pair,
    param_size,
    mixture_size,
    version,
    generation,
    number,
    expert_count,
    fused_word_number,
    brand_word,
    purpose_word,
];

/// Classify a trimmed token; anything unclaimed is a plain word.
pub fn classify<'a>(token: &'a str, next: Option<&'a str>) -> TokenKind<'a> {
    MATCHERS
        .iter()
        .find_map(|m| m(token, next))
        .unwrap_or(TokenKind::Word(token))
}

// Case-insensitive patterns use `(?i-u)` so only ASCII letters fold.
static EIGHT_DIGITS: Lazy<Regex> = Lazy::new(|| re(r"^[0-9]{8}$"));
static FOUR_DIGITS: Lazy<Regex> = Lazy::new(|| re(r"^[0-9]{4}$"));
static ZERO_DIGIT: Lazy<Regex> = Lazy::new(|| re(r"^0[0-9]$"));
static ONE_DIGIT: Lazy<Regex> = Lazy::new(|| re(r"^[0-9]$"));
static SIZE: Lazy<Regex> = Lazy::new(|| re(r"(?i-u)^([0-9]+(?:\.[0-9]+)?)(b|m)$"));
static MIXTURE: Lazy<Regex> = Lazy::new(|| re(r"(?i-u)^([0-9]+)x([0-9]+)(b|m)?$"));
static VERSION: Lazy<Regex> = Lazy::new(|| re(r"(?i-u)^v([0-9]+(?:\.[0-9]+)?)$"));
static GENERATION: Lazy<Regex> = Lazy::new(|| re(r"(?i-u)^[rkm][0-9]+$"));
static NUMBER: Lazy<Regex> = Lazy::new(|| re(r"^[0-9]+(?:\.[0-9]+)?$"));
static EXPERTS: Lazy<Regex> = Lazy::new(|| re(r"(?i-u)^([0-9]+)e$"));
static FUSED: Lazy<Regex> =
    Lazy::new(|| re(r"(?i-u)^([a-z]+)([0-9]+(?:\.[0-9]+)?)(b|m)?$"));

fn re(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static token pattern")
}

fn empty<'a>(token: &'a str, _next: Option<&'a str>) -> Option<TokenKind<'a>> {
    token.is_empty().then_some(TokenKind::Empty)
}

fn date_stamp<'a>(token: &'a str, _next: Option<&'a str>) -> Option<TokenKind<'a>> {
    EIGHT_DIGITS.is_match(token).then_some(TokenKind::DateStamp)
}

fn date_like<'a>(token: &'a str, _next: Option<&'a str>) -> Option<TokenKind<'a>> {
    if !FOUR_DIGITS.is_match(token) {
        return None;
    }
    let value: u32 = token.parse().ok()?;
    // Ranges overlap and are kept exactly as accreted: YYMM/MMDD, years, YYMM again.
    let in_range = (100..=1231).contains(&value)
        || (2020..=2099).contains(&value)
        || (2400..=2512).contains(&value);
    in_range.then_some(TokenKind::DateLike(value))
}

fn date_fragment<'a>(token: &'a str, _next: Option<&'a str>) -> Option<TokenKind<'a>> {
    ZERO_DIGIT.is_match(token).then_some(TokenKind::DateFragment)
}

fn version_pair<'a>(token: &'a str, next: Option<&'a str>) -> Option<TokenKind<'a>> {
    let next = next?;
    (ONE_DIGIT.is_match(token) && ONE_DIGIT.is_match(next))
        .then_some(TokenKind::VersionPair(token, next))
}

fn param_size<'a>(token: &'a str, _next: Option<&'a str>) -> Option<TokenKind<'a>> {
    let caps = SIZE.captures(token)?;
    Some(TokenKind::ParamSize {
        amount: caps.get(1)?.as_str(),
        unit: Unit::parse(caps.get(2)?.as_str())?,
    })
}

fn mixture_size<'a>(token: &'a str, _next: Option<&'a str>) -> Option<TokenKind<'a>> {
    let caps = MIXTURE.captures(token)?;
    let unit = match caps.get(3) {
        Some(u) => Unit::parse(u.as_str())?,
        None => Unit::Billions,
    };
    Some(TokenKind::MixtureSize {
        experts: caps.get(1)?.as_str(),
        size: caps.get(2)?.as_str(),
        unit,
    })
}

fn version<'a>(token: &'a str, _next: Option<&'a str>) -> Option<TokenKind<'a>> {
    let caps = VERSION.captures(token)?;
    Some(TokenKind::Version(caps.get(1)?.as_str()))
}

fn generation<'a>(token: &'a str, _next: Option<&'a str>) -> Option<TokenKind<'a>> {
    GENERATION
        .is_match(token)
        .then_some(TokenKind::Generation(token))
}

fn number<'a>(token: &'a str, _next: Option<&'a str>) -> Option<TokenKind<'a>> {
    NUMBER.is_match(token).then_some(TokenKind::Number(token))
}

fn expert_count<'a>(token: &'a str, _next: Option<&'a str>) -> Option<TokenKind<'a>> {
    let caps = EXPERTS.captures(token)?;
    Some(TokenKind::ExpertCount(caps.get(1)?.as_str()))
}

fn fused_word_number<'a>(token: &'a str, _next: Option<&'a str>) -> Option<TokenKind<'a>> {
    let caps = FUSED.captures(token)?;
    let letters = caps.get(1)?.as_str();
    let amount = caps.get(2)?.as_str();
    let unit = match caps.get(3) {
        Some(u) => Some(Unit::parse(u.as_str())?),
        None => None,
    };

    if let Some(unit) = unit
        && letters.len() <= 2
    {
        return Some(TokenKind::CompactSize {
            letters,
            amount,
            unit,
        });
    }

    let number = format!("{amount}{}", unit.map(Unit::as_str).unwrap_or(""));
    if let Some(brand) = brand(letters) {
        Some(TokenKind::BrandNumbered { brand, number })
    } else if let Some(purpose) = purpose(letters) {
        Some(TokenKind::PurposeNumbered { purpose, number })
    } else {
        Some(TokenKind::WordNumbered {
            word: letters,
            number,
        })
    }
}

fn brand_word<'a>(token: &'a str, _next: Option<&'a str>) -> Option<TokenKind<'a>> {
    brand(token).map(TokenKind::Brand)
}

fn purpose_word<'a>(token: &'a str, _next: Option<&'a str>) -> Option<TokenKind<'a>> {
    purpose(token).map(TokenKind::Purpose)
}
