//! Identifier sanitizing.
//!
//! Each downstream ecosystem parses identifiers with its own lexical
//! rules; this module owns all three grammars so the emitters never invent
//! their own. All styles are total: they always return a string.

/// Fixed prefix applied when a class-style identifier would be empty or
/// would start with a non-letter.
const CLASS_PREFIX: &str = "App";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NameStyle {
    /// Ruby-class-like: `TitleCased`, ASCII alphanumeric, starts with a letter.
    Class,
    /// Package-id-like: lowercase ASCII alphanumeric plus dots.
    Package,
    /// Filename-like: lowercase ASCII alphanumeric plus `_` and `-`.
    File,
}

pub fn sanitize(name: &str, style: NameStyle) -> String {
    match style {
        NameStyle::Class => sanitize_class(name),
        NameStyle::Package => name
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '.')
            .collect(),
        NameStyle::File => name
            .to_lowercase()
            .replace(' ', "-")
            .chars()
            .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_' || *c == '-')
            .collect(),
    }
}

fn sanitize_class(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_alpha = false;
    for c in name.chars() {
        if c.is_ascii_alphabetic() {
            out.push(if prev_alpha {
                c.to_ascii_lowercase()
            } else {
                c.to_ascii_uppercase()
            });
        } else if c.is_ascii_digit() {
            out.push(c);
        }
        // Word boundaries are decided on the raw input, so stripped
        // characters still separate words.
        prev_alpha = c.is_alphabetic();
    }

    match out.chars().next() {
        Some(first) if first.is_ascii_alphabetic() => out,
        _ => format!("{CLASS_PREFIX}{out}"),
    }
}
