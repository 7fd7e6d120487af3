//! Identifier case conversion for model and action names.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Convert free-form text to PascalCase.
///
/// Diacritics are stripped, every run of characters outside `[A-Za-z0-9]`
/// separates words, and each word gets its first character uppercased.
pub fn to_pascal_case(input: &str) -> String {
    let plain: String = input.nfd().filter(|c| !is_combining_mark(*c)).collect();

    plain
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

/// Convert free-form text to camelCase.
pub fn to_camel_case(input: &str) -> String {
    let pascal = to_pascal_case(input);
    let mut chars = pascal.chars();
    match chars.next() {
        Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pascal_case_strips_diacritics() {
        assert_eq!(to_pascal_case("état-civil 2"), "EtatCivil2");
        assert_eq!(to_pascal_case("crème brûlée"), "CremeBrulee");
    }

    #[test]
    fn test_pascal_case_collapses_separators() {
        assert_eq!(to_pascal_case("my--post__title"), "MyPostTitle");
        assert_eq!(to_pascal_case("-leading and trailing-"), "LeadingAndTrailing");
        assert_eq!(to_pascal_case("alreadyCamel"), "AlreadyCamel");
    }

    #[test]
    fn test_degenerate_input() {
        assert_eq!(to_pascal_case(""), "");
        assert_eq!(to_pascal_case("---"), "");
        assert_eq!(to_camel_case(""), "");
    }

    #[test]
    fn test_camel_case() {
        assert_eq!(to_camel_case("my-field"), "myField");
        assert_eq!(to_camel_case("Login"), "login");
        assert_eq!(to_camel_case("2fa setup"), "2faSetup");
    }
}
