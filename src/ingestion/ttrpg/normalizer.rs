//! Text Normalization
//!
//! Canonicalizes pasted statblock text before any parsing: line endings,
//! exotic space separators and long dashes copied out of PDFs and wikis.

use once_cell::sync::Lazy;
use regex::Regex;

/// Unicode space separators (plus the zero-width and BOM characters that PDF
/// copy/paste tends to leave behind).
pub static UNICODE_SPACE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\p{Zs}\u{180E}\u{200B}\u{FEFF}]").expect("Failed to compile unicode space regex")
});

/// En dash, em dash and minus sign.
pub static LONG_DASH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\u{2013}\u{2014}\u{2212}]").expect("Failed to compile dash regex"));

/// Runs of horizontal whitespace.
pub static HORIZONTAL_SPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t]+").expect("Failed to compile horizontal space regex"));

/// Normalize statblock text.
///
/// CRLF and lone CR become LF, every space separator becomes an ASCII space,
/// long dashes become `-`, horizontal whitespace runs collapse to one space
/// and the ends are trimmed. Idempotent.
pub fn normalize(text: &str) -> String {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let text = UNICODE_SPACE_RE.replace_all(&text, " ");
    let text = LONG_DASH_RE.replace_all(&text, "-");
    let text = HORIZONTAL_SPACE_RE.replace_all(&text, " ");
    text.trim().to_string()
}
