use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};

static AUTHOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)@author +([^\n<]*) +<([^\n>]*)>").unwrap());
static NAME_JUNK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^A-Za-z .]+").unwrap());
static SCORE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([+-]?(?:\d+\.?\d*|\.\d+))\s*(?:/\s*([+-]?(?:\d+\.?\d*|\.\d+))\s*)?$").unwrap()
});

/// Marker that identifies a failed-assertion block in the run output.
pub const ERROR_MARKER: &str = "expected:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub name: String,
    pub email: String,
}

/// First `@author Name <email>` tag in `text`, with the name cleaned down to
/// letters, spaces and periods.
pub fn find_author(text: &str) -> Option<Author> {
    let caps = AUTHOR_RE.captures(text)?;
    let name = NAME_JUNK_RE.replace_all(&caps[1], "").trim().to_string();
    Some(Author {
        name,
        email: caps[2].to_string(),
    })
}

/// Escape a listing for embedding in markup. Only quotes are touched.
pub fn escape_listing(text: &str) -> String {
    text.replace('"', "&quot;").replace('\'', "&apos;")
}

/// Inverse of [`escape_listing`].
pub fn unescape_listing(text: &str) -> String {
    text.replace("&quot;", "\"").replace("&apos;", "'")
}

/// Numeric value of a score such as `47/47`, `3 / 4` or `0.5`.
pub fn evaluate_score(text: &str) -> Result<f64> {
    let invalid = || Error::InvalidScoreExpression(text.to_string());
    let caps = SCORE_RE.captures(text).ok_or_else(invalid)?;
    let numerator: f64 = caps[1].parse().map_err(|_| invalid())?;
    let value = match caps.get(2) {
        Some(d) => {
            let denominator: f64 = d.as_str().parse().map_err(|_| invalid())?;
            if denominator == 0.0 {
                return Err(invalid());
            }
            numerator / denominator
        }
        None => numerator,
    };
    Ok(value)
}

/// Text up to, not including, the first newline.
pub fn first_line(text: &str) -> &str {
    text.split('\n').next().unwrap_or(text)
}
