//! Prompt template placeholders
//!
//! Placeholders are written `{{name}}`, with optional inner whitespace.
//! Names follow identifier rules.

use once_cell::sync::Lazy;
use regex::Regex;

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").expect("valid placeholder regex")
});

/// Placeholder names in order of first appearance, without duplicates
#[must_use]
pub fn extract_placeholders(template: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for captures in PLACEHOLDER.captures_iter(template) {
        let name = &captures[1];
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn extracts_in_order_without_duplicates() {
        assert_eq!(
            extract_placeholders("Hi {{user}}, about {{ topic }} for {{user}}"),
            vec!["user", "topic"]
        );
    }

    #[test]
    fn ignores_malformed_placeholders() {
        assert!(extract_placeholders("{{}} {{1abc}} {single} {{two words}}").is_empty());
        assert!(extract_placeholders("").is_empty());
    }

    proptest! {
        #[test]
        fn every_identifier_is_found(name in "[A-Za-z_][A-Za-z0-9_]{0,12}") {
            let template = format!("prefix {{{{{name}}}}} suffix");
            prop_assert_eq!(extract_placeholders(&template), vec![name]);
        }
    }
}
