//! Text helpers used to derive human-readable labels from identifiers

/// Turn an identifier into space separated words.
///
/// Underscores and dashes separate words; empty words are dropped and the
/// case of every character is kept as is.
///
/// ```
/// use cruddy_core::prettify_string;
///
/// assert_eq!(prettify_string("first_name"), "first name");
/// ```
pub fn prettify_string(s: &str) -> String {
    s.split(['_', '-'])
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Upper-case the first character and leave the rest untouched
pub fn ucfirst(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}
