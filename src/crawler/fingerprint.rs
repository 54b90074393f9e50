//! Content fingerprint for near-duplicate detection
//!
//! A deliberately cheap, lossy signature: for each structural element, the
//! character nearest the middle of its own text (skipping spaces) is taken,
//! and the second half of those characters is the fingerprint. Two pages
//! are duplicates iff their fingerprints are exactly equal.

use scraper::{ElementRef, Html, Node, Selector};

/// Element categories scanned, in this order
const CATEGORIES: [&str; 6] = ["p", "h1", "h2", "h3", "a", "div"];

/// Computes the fingerprint of a parsed document
///
/// Categories are scanned one after another; within a category elements
/// are visited in document order. A document contributing nothing yields an
/// empty fingerprint.
pub fn fingerprint(document: &Html) -> String {
    let mut signature: Vec<char> = Vec::new();

    for category in CATEGORIES {
        let Ok(selector) = Selector::parse(category) else {
            continue;
        };
        for element in document.select(&selector) {
            if let Some(c) = middle_char(&own_text(element)) {
                signature.push(c);
            }
        }
    }

    signature[signature.len() / 2..].iter().collect()
}

/// The character at the midpoint of `text`, moving forward past spaces
fn middle_char(text: &str) -> Option<char> {
    let chars: Vec<char> = text.chars().collect();
    let mut i = chars.len() / 2;
    while i < chars.len() && chars[i] == ' ' {
        i += 1;
    }
    chars.get(i).copied()
}

/// Text of the element's direct text children, excluding nested elements
///
/// Whitespace runs collapse to one space, `<br>` children count as a space,
/// and the result is trimmed.
pub fn own_text(element: ElementRef<'_>) -> String {
    let mut text = String::new();

    for child in element.children() {
        match child.value() {
            Node::Text(t) => append_normalised(&mut text, t),
            Node::Element(e) if e.name() == "br" => {
                if !text.ends_with(' ') {
                    text.push(' ');
                }
            }
            _ => {}
        }
    }

    text.trim_matches(' ').to_string()
}

fn append_normalised(accum: &mut String, fragment: &str) {
    let mut last_was_space = accum.is_empty() || accum.ends_with(' ');
    for c in fragment.chars() {
        if is_whitespace(c) {
            if !last_was_space {
                accum.push(' ');
                last_was_space = true;
            }
        } else {
            accum.push(c);
            last_was_space = false;
        }
    }
}

fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\u{0c}' | '\u{a0}')
}
